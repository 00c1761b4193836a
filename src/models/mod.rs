// Domain records, request bodies and the pure rules around them

pub mod catalog;
pub mod client;
pub mod feedback;
pub mod goal;
pub mod progress;
pub mod registration;
pub mod report;
pub mod subscription;
pub mod trainer;
pub mod training_session;
pub mod validation;

pub use catalog::*;
pub use client::*;
pub use feedback::*;
pub use goal::*;
pub use progress::*;
pub use registration::*;
pub use report::*;
pub use subscription::*;
pub use trainer::*;
pub use training_session::*;
pub use validation::*;

use serde::{Deserialize, Deserializer};

/// Distinguishes an explicit `null` from an absent field in partial updates.
/// Pair with `#[serde(default)]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_trainer_field_null_vs_absent() {
        let absent: UpdateClientRecord = serde_json::from_str(r#"{"first_name":"Ira"}"#).unwrap();
        assert_eq!(absent.trainer_id, None);

        let cleared: UpdateClientRecord = serde_json::from_str(r#"{"trainer_id":null}"#).unwrap();
        assert_eq!(cleared.trainer_id, Some(None));

        let id = Uuid::new_v4();
        let set: UpdateClientRecord =
            serde_json::from_str(&format!(r#"{{"trainer_id":"{id}"}}"#)).unwrap();
        assert_eq!(set.trainer_id, Some(Some(id)));
    }
}
