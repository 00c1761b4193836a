use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{UserInfo, UserRole};
use crate::errors::{on_reference_violation, on_unique_violation, GymError, GymResult};
use crate::models::{
    ensure_trainer_capacity, Client, ClientAccount, ClientGoalDetails, ClientProfile,
    ClientProfileRequest, ClientWithGoals, CreateClientRecord, Trainer, TrainerAssignment,
    TrainerSummary, UpdateClientRecord, CLIENT_COLUMNS, TRAINER_COLUMNS,
};

const DUPLICATE_CONTACT: &str = "Client with this email or phone already exists";
const UNKNOWN_USER: &str = "Unknown user or trainer";

#[derive(Clone)]
pub struct ClientService {
    db: PgPool,
}

impl ClientService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn find_by_user(&self, user_id: Uuid) -> GymResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(client)
    }

    /// The caller's client profile, or `ClientProfileMissing`
    pub async fn require_profile(&self, user_id: Uuid) -> GymResult<Client> {
        self.find_by_user(user_id)
            .await?
            .ok_or(GymError::ClientProfileMissing)
    }

    pub async fn create_profile(
        &self,
        user_id: Uuid,
        request: ClientProfileRequest,
    ) -> GymResult<Client> {
        request.validate()?;

        if self.find_by_user(user_id).await?.is_some() {
            return Err(GymError::Conflict("Client profile already created".to_string()));
        }

        let client = sqlx::query_as::<_, Client>(&format!(
            "INSERT INTO clients (id, user_id, first_name, last_name, email, phone, birth, gender)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {CLIENT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(request.first_name.trim())
        .bind(request.last_name.trim())
        .bind(request.email.trim().to_lowercase())
        .bind(request.phone.trim())
        .bind(request.birth)
        .bind(request.gender)
        .fetch_one(&self.db)
        .await
        .map_err(on_unique_violation(DUPLICATE_CONTACT))?;

        tracing::info!("Created client profile {} for user {}", client.id, user_id);
        Ok(client)
    }

    pub async fn get_profile(&self, user_id: Uuid) -> GymResult<ClientProfile> {
        let client = self.require_profile(user_id).await?;

        let trainer = match client.trainer_id {
            Some(trainer_id) => {
                sqlx::query_as::<_, TrainerSummary>(
                    "SELECT id, first_name, last_name, phone, specialization
                     FROM trainers WHERE id = $1",
                )
                .bind(trainer_id)
                .fetch_optional(&self.db)
                .await?
            }
            None => None,
        };

        Ok(ClientProfile { client, trainer })
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        request: ClientProfileRequest,
    ) -> GymResult<Client> {
        request.validate()?;

        let client = sqlx::query_as::<_, Client>(&format!(
            "UPDATE clients
             SET first_name = $2, last_name = $3, email = $4, phone = $5, birth = $6,
                 gender = $7, updated_at = NOW()
             WHERE user_id = $1
             RETURNING {CLIENT_COLUMNS}"
        ))
        .bind(user_id)
        .bind(request.first_name.trim())
        .bind(request.last_name.trim())
        .bind(request.email.trim().to_lowercase())
        .bind(request.phone.trim())
        .bind(request.birth)
        .bind(request.gender)
        .fetch_optional(&self.db)
        .await
        .map_err(on_unique_violation(DUPLICATE_CONTACT))?
        .ok_or(GymError::ClientProfileMissing)?;

        Ok(client)
    }

    pub async fn top_up_balance(&self, user_id: Uuid, amount: Decimal) -> GymResult<Client> {
        if amount <= Decimal::ZERO {
            return Err(GymError::InvalidInput(
                "Top-up amount must be positive".to_string(),
            ));
        }

        let client = sqlx::query_as::<_, Client>(&format!(
            "UPDATE clients SET balance = balance + $2, updated_at = NOW()
             WHERE user_id = $1
             RETURNING {CLIENT_COLUMNS}"
        ))
        .bind(user_id)
        .bind(amount)
        .fetch_optional(&self.db)
        .await?
        .ok_or(GymError::ClientProfileMissing)?;

        tracing::info!("Client {} topped up {}, balance {}", client.id, amount, client.balance);
        Ok(client)
    }

    /// Clients coached by `trainer_id`, each with their goals
    pub async fn list_for_trainer(&self, trainer_id: Uuid) -> GymResult<Vec<ClientWithGoals>> {
        let clients = sqlx::query_as::<_, Client>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE trainer_id = $1
             ORDER BY last_name, first_name"
        ))
        .bind(trainer_id)
        .fetch_all(&self.db)
        .await?;

        let client_ids: Vec<Uuid> = clients.iter().map(|client| client.id).collect();
        let goals = sqlx::query_as::<_, ClientGoalDetails>(
            "SELECT cg.id, cg.client_id, cg.goal_id, g.goal_name, cg.description,
                    cg.assigned_at, cg.is_achieved
             FROM client_goals cg
             JOIN goals g ON g.id = cg.goal_id
             WHERE cg.client_id = ANY($1)
             ORDER BY cg.assigned_at DESC",
        )
        .bind(&client_ids)
        .fetch_all(&self.db)
        .await?;

        let mut goals_by_client: HashMap<Uuid, Vec<ClientGoalDetails>> = HashMap::new();
        for goal in goals {
            goals_by_client.entry(goal.client_id).or_default().push(goal);
        }

        Ok(clients
            .into_iter()
            .map(|client| ClientWithGoals {
                goals: goals_by_client.remove(&client.id).unwrap_or_default(),
                client,
            })
            .collect())
    }

    /// Every client-role account with its profile, when created
    pub async fn list_accounts(&self) -> GymResult<Vec<ClientAccount>> {
        let users = sqlx::query_as::<_, UserInfo>(
            "SELECT id, username, email, role, created_at, updated_at FROM users
             WHERE role = $1 ORDER BY username",
        )
        .bind(UserRole::Client)
        .fetch_all(&self.db)
        .await?;

        let mut profiles: HashMap<Uuid, Client> = self
            .list_records()
            .await?
            .into_iter()
            .map(|client| (client.user_id, client))
            .collect();

        Ok(users
            .into_iter()
            .map(|user| ClientAccount {
                profile: profiles.remove(&user.id),
                user,
            })
            .collect())
    }

    /// Removes a client account; the profile and its records cascade.
    pub async fn delete_account(&self, user_id: Uuid) -> GymResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1 AND role = $2")
            .bind(user_id)
            .bind(UserRole::Client)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(GymError::NotFound("Client"));
        }

        tracing::info!("Deleted client account {}", user_id);
        Ok(())
    }

    /// Assigns a trainer to the caller's profile.
    ///
    /// Requires a subscription still running at `now` and a free place with the trainer.
    /// Re-selecting the current trainer succeeds without changes.
    pub async fn assign_trainer(
        &self,
        user_id: Uuid,
        trainer_id: Uuid,
        now: DateTime<Utc>,
    ) -> GymResult<TrainerAssignment> {
        let mut tx = self.db.begin().await?;

        let client = sqlx::query_as::<_, Client>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE user_id = $1 FOR UPDATE"
        ))
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(GymError::ClientProfileMissing)?;

        let trainer = claim_trainer_slot(&mut tx, &client, trainer_id, now).await?;

        let summary = TrainerSummary {
            id: trainer.id,
            first_name: trainer.first_name.clone(),
            last_name: trainer.last_name.clone(),
            phone: trainer.phone.clone(),
            specialization: trainer.specialization.clone(),
        };

        if client.trainer_id == Some(trainer.id) {
            tx.commit().await?;
            return Ok(TrainerAssignment {
                client,
                trainer: summary,
                changed: false,
            });
        }

        let client = sqlx::query_as::<_, Client>(&format!(
            "UPDATE clients SET trainer_id = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {CLIENT_COLUMNS}"
        ))
        .bind(client.id)
        .bind(trainer.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!("Assigned trainer {} to client {}", trainer.id, client.id);
        Ok(TrainerAssignment {
            client,
            trainer: summary,
            changed: true,
        })
    }

    // Raw record access for the REST mirror

    pub async fn list_records(&self) -> GymResult<Vec<Client>> {
        let clients = sqlx::query_as::<_, Client>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients ORDER BY last_name, first_name"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(clients)
    }

    /// Inserts a profile; a trainer given here is bound by the same rules as `assign_trainer`.
    pub async fn create_record(
        &self,
        record: CreateClientRecord,
        now: DateTime<Utc>,
    ) -> GymResult<Client> {
        record.validate()?;
        if record.balance.is_sign_negative() {
            return Err(GymError::InvalidInput("Balance cannot be negative".to_string()));
        }

        let mut tx = self.db.begin().await?;

        let client = sqlx::query_as::<_, Client>(&format!(
            "INSERT INTO clients
                 (id, user_id, first_name, last_name, email, phone, birth, gender, balance)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {CLIENT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(record.user_id)
        .bind(&record.first_name)
        .bind(&record.last_name)
        .bind(record.email.to_lowercase())
        .bind(&record.phone)
        .bind(record.birth)
        .bind(record.gender)
        .bind(record.balance)
        .fetch_one(&mut *tx)
        .await
        .map_err(on_reference_violation(UNKNOWN_USER, DUPLICATE_CONTACT))?;

        let client = match record.trainer_id {
            Some(trainer_id) => {
                set_trainer(&mut tx, &client, Some(trainer_id), now).await?
            }
            None => client,
        };

        tx.commit().await?;
        Ok(client)
    }

    pub async fn get_record(&self, user_id: Uuid) -> GymResult<Client> {
        self.find_by_user(user_id).await?.ok_or(GymError::NotFound("Client"))
    }

    /// Partial update. A trainer change is bound by the same rules as `assign_trainer`.
    pub async fn update_record(
        &self,
        user_id: Uuid,
        record: UpdateClientRecord,
        now: DateTime<Utc>,
    ) -> GymResult<Client> {
        record.validate()?;
        if record.balance.is_some_and(|balance| balance.is_sign_negative()) {
            return Err(GymError::InvalidInput("Balance cannot be negative".to_string()));
        }

        let mut tx = self.db.begin().await?;

        let client = sqlx::query_as::<_, Client>(&format!(
            "UPDATE clients SET
                 first_name = COALESCE($2, first_name),
                 last_name = COALESCE($3, last_name),
                 email = COALESCE($4, email),
                 phone = COALESCE($5, phone),
                 birth = COALESCE($6, birth),
                 gender = COALESCE($7, gender),
                 balance = COALESCE($8, balance),
                 updated_at = NOW()
             WHERE user_id = $1
             RETURNING {CLIENT_COLUMNS}"
        ))
        .bind(user_id)
        .bind(record.first_name)
        .bind(record.last_name)
        .bind(record.email.map(|email| email.to_lowercase()))
        .bind(record.phone)
        .bind(record.birth)
        .bind(record.gender)
        .bind(record.balance)
        .fetch_optional(&mut *tx)
        .await
        .map_err(on_reference_violation(UNKNOWN_USER, DUPLICATE_CONTACT))?
        .ok_or(GymError::NotFound("Client"))?;

        let client = match record.trainer_id {
            Some(trainer_id) if trainer_id != client.trainer_id => {
                set_trainer(&mut tx, &client, trainer_id, now).await?
            }
            _ => client,
        };

        tx.commit().await?;
        Ok(client)
    }

    /// Deletes only the profile; the account stays.
    pub async fn delete_record(&self, user_id: Uuid) -> GymResult<()> {
        let result = sqlx::query("DELETE FROM clients WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(GymError::NotFound("Client"));
        }
        Ok(())
    }
}

/// Checks that `client` may take a place with `trainer_id` at `now` and returns the
/// trainer, locked until the transaction ends. The client's row must already be locked.
async fn claim_trainer_slot(
    tx: &mut Transaction<'static, Postgres>,
    client: &Client,
    trainer_id: Uuid,
    now: DateTime<Utc>,
) -> GymResult<Trainer> {
    let has_active: bool = sqlx::query_scalar(
        "SELECT EXISTS (
             SELECT 1 FROM client_subscriptions WHERE client_id = $1 AND end_date > $2
         )",
    )
    .bind(client.id)
    .bind(now)
    .fetch_one(&mut **tx)
    .await?;

    if !has_active {
        return Err(GymError::NoActiveSubscription);
    }

    // Locking the trainer serializes concurrent assignments to the same trainer
    let trainer = sqlx::query_as::<_, Trainer>(&format!(
        "SELECT {TRAINER_COLUMNS} FROM trainers WHERE id = $1 FOR UPDATE"
    ))
    .bind(trainer_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(GymError::NotFound("Trainer"))?;

    if client.trainer_id != Some(trainer.id) {
        let current_clients: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM clients WHERE trainer_id = $1")
                .bind(trainer.id)
                .fetch_one(&mut **tx)
                .await?;

        ensure_trainer_capacity(&trainer, current_clients)?;
    }

    Ok(trainer)
}

/// Record-level trainer write: `None` unassigns, a trainer must have a free place.
async fn set_trainer(
    tx: &mut Transaction<'static, Postgres>,
    client: &Client,
    trainer_id: Option<Uuid>,
    now: DateTime<Utc>,
) -> GymResult<Client> {
    if let Some(trainer_id) = trainer_id {
        claim_trainer_slot(tx, client, trainer_id, now)
            .await
            .map_err(|err| match err {
                GymError::NotFound("Trainer") => {
                    GymError::InvalidInput("Unknown trainer".to_string())
                }
                other => other,
            })?;
    }

    let client = sqlx::query_as::<_, Client>(&format!(
        "UPDATE clients SET trainer_id = $2, updated_at = NOW()
         WHERE id = $1
         RETURNING {CLIENT_COLUMNS}"
    ))
    .bind(client.id)
    .bind(trainer_id)
    .fetch_one(&mut **tx)
    .await?;

    tracing::info!("Client {} trainer set to {:?}", client.id, client.trainer_id);
    Ok(client)
}
