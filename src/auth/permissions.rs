use serde::Serialize;

use crate::auth::UserRole;

/// Things a permission can be granted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Clients,
    ClientSubscriptions,
    ClientGoals,
    ClientFeedbacks,
    ClientTrainingRegistrations,
    ClientProgress,
    Trainers,
    TrainingSessions,
    Catalog,
    Reports,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Clients => "clients",
            Resource::ClientSubscriptions => "client_subscriptions",
            Resource::ClientGoals => "client_goals",
            Resource::ClientFeedbacks => "client_feedbacks",
            Resource::ClientTrainingRegistrations => "client_training_registrations",
            Resource::ClientProgress => "client_progress",
            Resource::Trainers => "trainers",
            Resource::TrainingSessions => "training_sessions",
            Resource::Catalog => "catalog",
            Resource::Reports => "reports",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    View,
    Add,
    Change,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Add => "add",
            Action::Change => "change",
            Action::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Permission {
    pub resource: Resource,
    pub action: Action,
}

impl Permission {
    pub const fn new(resource: Resource, action: Action) -> Self {
        Self { resource, action }
    }

    pub const fn view(resource: Resource) -> Self {
        Self::new(resource, Action::View)
    }

    pub const fn add(resource: Resource) -> Self {
        Self::new(resource, Action::Add)
    }

    pub const fn change(resource: Resource) -> Self {
        Self::new(resource, Action::Change)
    }

    pub const fn delete(resource: Resource) -> Self {
        Self::new(resource, Action::Delete)
    }

    /// e.g. `add_client_goals`
    pub fn codename(&self) -> String {
        format!("{}_{}", self.action.as_str(), self.resource.as_str())
    }
}

impl UserRole {
    /// Static permission table; admins hold every permission.
    pub fn grants(&self, permission: Permission) -> bool {
        use Action::*;
        use Resource::*;

        let Permission { resource, action } = permission;
        match self {
            UserRole::Admin => true,
            UserRole::Trainer => match resource {
                Clients | ClientSubscriptions | ClientGoals | ClientFeedbacks
                | ClientTrainingRegistrations | Catalog => action == View,
                ClientProgress => matches!(action, View | Add | Change),
                Trainers => matches!(action, View | Add | Change),
                TrainingSessions => true,
                Reports => false,
            },
            UserRole::Client => match resource {
                Clients => matches!(action, View | Change),
                ClientSubscriptions => matches!(action, View | Add),
                ClientGoals | ClientFeedbacks => true,
                ClientTrainingRegistrations => matches!(action, View | Add | Delete),
                ClientProgress | Trainers | TrainingSessions | Catalog => action == View,
                Reports => false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codename() {
        assert_eq!(
            Permission::add(Resource::ClientGoals).codename(),
            "add_client_goals"
        );
        assert_eq!(
            Permission::view(Resource::ClientTrainingRegistrations).codename(),
            "view_client_training_registrations"
        );
    }

    #[test]
    fn test_admin_holds_everything() {
        for resource in [Resource::Clients, Resource::Reports, Resource::Catalog] {
            for action in [Action::View, Action::Add, Action::Change, Action::Delete] {
                assert!(UserRole::Admin.grants(Permission::new(resource, action)));
            }
        }
    }

    #[test]
    fn test_client_permissions() {
        let client = UserRole::Client;
        assert!(client.grants(Permission::add(Resource::ClientSubscriptions)));
        assert!(!client.grants(Permission::delete(Resource::ClientSubscriptions)));
        assert!(client.grants(Permission::delete(Resource::ClientTrainingRegistrations)));
        assert!(!client.grants(Permission::add(Resource::ClientProgress)));
        assert!(!client.grants(Permission::delete(Resource::Clients)));
        assert!(!client.grants(Permission::view(Resource::Reports)));
    }

    #[test]
    fn test_trainer_permissions() {
        let trainer = UserRole::Trainer;
        assert!(trainer.grants(Permission::add(Resource::ClientProgress)));
        assert!(trainer.grants(Permission::delete(Resource::TrainingSessions)));
        assert!(trainer.grants(Permission::view(Resource::Clients)));
        assert!(!trainer.grants(Permission::change(Resource::Clients)));
        assert!(!trainer.grants(Permission::add(Resource::ClientGoals)));
        assert!(!trainer.grants(Permission::delete(Resource::Trainers)));
    }
}
