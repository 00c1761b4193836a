use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::{on_reference_violation, on_unique_violation, GymError, GymResult};
use crate::models::{
    purchase_terms, Client, ClientSubscription, ClientSubscriptionDetails,
    CreateSubscriptionRecord, PurchaseReceipt, SubscriptionPlan, UpdateSubscriptionRecord,
    CLIENT_COLUMNS,
};

const DUPLICATE_START: &str = "Subscription for this user and start date already exists";

const DETAILS_SELECT: &str = "SELECT cs.id, cs.client_id,
        c.first_name || ' ' || c.last_name AS client_name,
        cs.subscription_id, sp.name AS plan_name, sp.price, cs.start_date, cs.end_date
     FROM client_subscriptions cs
     JOIN clients c ON c.id = cs.client_id
     JOIN subscription_plans sp ON sp.id = cs.subscription_id";

#[derive(Clone)]
pub struct SubscriptionService {
    db: PgPool,
}

impl SubscriptionService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list_for_client(&self, client_id: Uuid) -> GymResult<Vec<ClientSubscriptionDetails>> {
        let subscriptions = sqlx::query_as::<_, ClientSubscriptionDetails>(&format!(
            "{DETAILS_SELECT} WHERE cs.client_id = $1 ORDER BY cs.start_date DESC"
        ))
        .bind(client_id)
        .fetch_all(&self.db)
        .await?;

        Ok(subscriptions)
    }

    /// Subscriptions of the clients coached by `trainer_id`
    pub async fn list_for_trainer(&self, trainer_id: Uuid) -> GymResult<Vec<ClientSubscriptionDetails>> {
        let subscriptions = sqlx::query_as::<_, ClientSubscriptionDetails>(&format!(
            "{DETAILS_SELECT} WHERE c.trainer_id = $1 ORDER BY cs.start_date DESC"
        ))
        .bind(trainer_id)
        .fetch_all(&self.db)
        .await?;

        Ok(subscriptions)
    }

    pub async fn list_all(&self) -> GymResult<Vec<ClientSubscriptionDetails>> {
        let subscriptions = sqlx::query_as::<_, ClientSubscriptionDetails>(&format!(
            "{DETAILS_SELECT} ORDER BY cs.start_date DESC"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(subscriptions)
    }

    /// Buys `subscription_id` for the caller's profile and charges the balance.
    pub async fn purchase(
        &self,
        user_id: Uuid,
        subscription_id: Uuid,
        now: DateTime<Utc>,
    ) -> GymResult<PurchaseReceipt> {
        let mut tx = self.db.begin().await?;

        let plan = sqlx::query_as::<_, SubscriptionPlan>(
            "SELECT id, name, description, price, duration_days FROM subscription_plans
             WHERE id = $1",
        )
        .bind(subscription_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(GymError::NotFound("Subscription plan"))?;

        let client = sqlx::query_as::<_, Client>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE user_id = $1 FOR UPDATE"
        ))
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(GymError::ClientProfileMissing)?;

        let terms = purchase_terms(client.balance, &plan, now)?;

        let subscription = sqlx::query_as::<_, ClientSubscription>(
            "INSERT INTO client_subscriptions (id, client_id, subscription_id, start_date, end_date)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, client_id, subscription_id, start_date, end_date",
        )
        .bind(Uuid::new_v4())
        .bind(client.id)
        .bind(plan.id)
        .bind(terms.start_date)
        .bind(terms.end_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(on_unique_violation(DUPLICATE_START))?;

        sqlx::query("UPDATE clients SET balance = $2, updated_at = NOW() WHERE id = $1")
            .bind(client.id)
            .bind(terms.remaining_balance)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "Client {} bought {} for {}, balance {}",
            client.id,
            plan.name,
            plan.price,
            terms.remaining_balance
        );

        Ok(PurchaseReceipt {
            subscription,
            plan_name: plan.name,
            remaining_balance: terms.remaining_balance,
        })
    }

    pub async fn delete(&self, id: Uuid) -> GymResult<()> {
        let result = sqlx::query("DELETE FROM client_subscriptions WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(GymError::NotFound("Subscription"));
        }

        tracing::info!("Deleted client subscription {}", id);
        Ok(())
    }

    // Raw record access for the REST mirror

    pub async fn list_records(&self) -> GymResult<Vec<ClientSubscription>> {
        let subscriptions = sqlx::query_as::<_, ClientSubscription>(
            "SELECT id, client_id, subscription_id, start_date, end_date
             FROM client_subscriptions ORDER BY start_date DESC",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(subscriptions)
    }

    pub async fn create_record(&self, record: CreateSubscriptionRecord) -> GymResult<ClientSubscription> {
        check_period(record.start_date, record.end_date)?;

        sqlx::query_as::<_, ClientSubscription>(
            "INSERT INTO client_subscriptions (id, client_id, subscription_id, start_date, end_date)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, client_id, subscription_id, start_date, end_date",
        )
        .bind(Uuid::new_v4())
        .bind(record.client_id)
        .bind(record.subscription_id)
        .bind(record.start_date)
        .bind(record.end_date)
        .fetch_one(&self.db)
        .await
        .map_err(on_reference_violation("Unknown client or subscription plan", DUPLICATE_START))
    }

    pub async fn get_record(&self, id: Uuid) -> GymResult<ClientSubscription> {
        sqlx::query_as::<_, ClientSubscription>(
            "SELECT id, client_id, subscription_id, start_date, end_date
             FROM client_subscriptions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(GymError::NotFound("Subscription"))
    }

    pub async fn update_record(
        &self,
        id: Uuid,
        record: UpdateSubscriptionRecord,
    ) -> GymResult<ClientSubscription> {
        let current = self.get_record(id).await?;
        check_period(
            record.start_date.unwrap_or(current.start_date),
            record.end_date.unwrap_or(current.end_date),
        )?;

        sqlx::query_as::<_, ClientSubscription>(
            "UPDATE client_subscriptions SET
                 client_id = COALESCE($2, client_id),
                 subscription_id = COALESCE($3, subscription_id),
                 start_date = COALESCE($4, start_date),
                 end_date = COALESCE($5, end_date)
             WHERE id = $1
             RETURNING id, client_id, subscription_id, start_date, end_date",
        )
        .bind(id)
        .bind(record.client_id)
        .bind(record.subscription_id)
        .bind(record.start_date)
        .bind(record.end_date)
        .fetch_optional(&self.db)
        .await
        .map_err(on_reference_violation("Unknown client or subscription plan", DUPLICATE_START))?
        .ok_or(GymError::NotFound("Subscription"))
    }
}

fn check_period(start: DateTime<Utc>, end: DateTime<Utc>) -> GymResult<()> {
    if end <= start {
        return Err(GymError::InvalidInput(
            "End date must be after start date".to_string(),
        ));
    }
    Ok(())
}

