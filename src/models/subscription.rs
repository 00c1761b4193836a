use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::{GymError, GymResult};
use crate::models::SubscriptionPlan;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClientSubscription {
    pub id: Uuid,
    pub client_id: Uuid,
    pub subscription_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl ClientSubscription {
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.end_date > now
    }
}

/// Listing row joined with the plan and the owner's name
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ClientSubscriptionDetails {
    pub id: Uuid,
    pub client_id: Uuid,
    pub client_name: String,
    pub subscription_id: Uuid,
    pub plan_name: String,
    pub price: Decimal,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    pub subscription_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct PurchaseReceipt {
    pub subscription: ClientSubscription,
    pub plan_name: String,
    pub remaining_balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseTerms {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub remaining_balance: Decimal,
}

/// Computes the period and the balance left after buying `plan` at `now`.
pub fn purchase_terms(
    balance: Decimal,
    plan: &SubscriptionPlan,
    now: DateTime<Utc>,
) -> GymResult<PurchaseTerms> {
    if balance < plan.price {
        return Err(GymError::InsufficientBalance {
            balance,
            price: plan.price,
        });
    }

    Ok(PurchaseTerms {
        start_date: now,
        end_date: now + Duration::days(i64::from(plan.duration_days)),
        remaining_balance: balance - plan.price,
    })
}

#[derive(Debug, Deserialize)]
pub struct CreateSubscriptionRecord {
    pub client_id: Uuid,
    pub subscription_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateSubscriptionRecord {
    pub client_id: Option<Uuid>,
    pub subscription_id: Option<Uuid>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn plan(price: Decimal, days: i32) -> SubscriptionPlan {
        SubscriptionPlan {
            id: Uuid::new_v4(),
            name: "Monthly".to_string(),
            description: String::new(),
            price,
            duration_days: days,
        }
    }

    #[test]
    fn test_purchase_terms() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        let terms = purchase_terms(dec!(1000.00), &plan(dec!(750.50), 30), now).unwrap();

        assert_eq!(terms.start_date, now);
        assert_eq!(terms.end_date, Utc.with_ymd_and_hms(2024, 2, 9, 9, 0, 0).unwrap());
        assert_eq!(terms.remaining_balance, dec!(249.50));
    }

    #[test]
    fn test_exact_balance_is_enough() {
        let now = Utc::now();
        let terms = purchase_terms(dec!(500), &plan(dec!(500), 7), now).unwrap();
        assert_eq!(terms.remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_insufficient_balance() {
        assert_matches!(
            purchase_terms(dec!(499.99), &plan(dec!(500), 30), Utc::now()),
            Err(GymError::InsufficientBalance { balance, price })
                if balance == dec!(499.99) && price == dec!(500)
        );
    }

    #[test]
    fn test_subscription_activity() {
        let now = Utc::now();
        let sub = ClientSubscription {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            subscription_id: Uuid::new_v4(),
            start_date: now - Duration::days(30),
            end_date: now,
        };
        assert!(!sub.is_active_at(now));
        assert!(sub.is_active_at(now - Duration::seconds(1)));
    }
}
