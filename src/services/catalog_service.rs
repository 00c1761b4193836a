use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::errors::{on_foreign_key_violation, on_unique_violation, GymError, GymResult};
use crate::models::{
    Goal, GoalRequest, Gym, GymRequest, Location, LocationRequest, SubscriptionPlan,
    SubscriptionPlanRequest, TrainingType, TrainingTypeRequest,
};

/// Gyms, locations, subscription plans, goals and training types
#[derive(Clone)]
pub struct CatalogService {
    db: PgPool,
}

impl CatalogService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    // Gyms

    pub async fn list_gyms(&self) -> GymResult<Vec<Gym>> {
        let gyms = sqlx::query_as::<_, Gym>("SELECT id, name, address FROM gyms ORDER BY name")
            .fetch_all(&self.db)
            .await?;
        Ok(gyms)
    }

    pub async fn get_gym(&self, id: Uuid) -> GymResult<Gym> {
        sqlx::query_as::<_, Gym>("SELECT id, name, address FROM gyms WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(GymError::NotFound("Gym"))
    }

    pub async fn create_gym(&self, request: GymRequest) -> GymResult<Gym> {
        request.validate()?;

        let gym = sqlx::query_as::<_, Gym>(
            "INSERT INTO gyms (id, name, address) VALUES ($1, $2, $3)
             RETURNING id, name, address",
        )
        .bind(Uuid::new_v4())
        .bind(&request.name)
        .bind(&request.address)
        .fetch_one(&self.db)
        .await?;

        tracing::info!("Created gym {}", gym.name);
        Ok(gym)
    }

    pub async fn update_gym(&self, id: Uuid, request: GymRequest) -> GymResult<Gym> {
        request.validate()?;

        sqlx::query_as::<_, Gym>(
            "UPDATE gyms SET name = $2, address = $3 WHERE id = $1
             RETURNING id, name, address",
        )
        .bind(id)
        .bind(&request.name)
        .bind(&request.address)
        .fetch_optional(&self.db)
        .await?
        .ok_or(GymError::NotFound("Gym"))
    }

    pub async fn delete_gym(&self, id: Uuid) -> GymResult<()> {
        let result = sqlx::query("DELETE FROM gyms WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(on_foreign_key_violation("Gym has scheduled training sessions"))?;
        expect_deleted(result.rows_affected(), "Gym")
    }

    // Locations

    pub async fn list_locations(&self, gym_id: Option<Uuid>) -> GymResult<Vec<Location>> {
        let locations = sqlx::query_as::<_, Location>(
            "SELECT id, gym_id, name FROM locations
             WHERE ($1::uuid IS NULL OR gym_id = $1)
             ORDER BY name",
        )
        .bind(gym_id)
        .fetch_all(&self.db)
        .await?;
        Ok(locations)
    }

    pub async fn get_location(&self, id: Uuid) -> GymResult<Location> {
        sqlx::query_as::<_, Location>("SELECT id, gym_id, name FROM locations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(GymError::NotFound("Location"))
    }

    pub async fn create_location(&self, request: LocationRequest) -> GymResult<Location> {
        request.validate()?;
        self.get_gym(request.gym_id).await?;

        let location = sqlx::query_as::<_, Location>(
            "INSERT INTO locations (id, gym_id, name) VALUES ($1, $2, $3)
             RETURNING id, gym_id, name",
        )
        .bind(Uuid::new_v4())
        .bind(request.gym_id)
        .bind(&request.name)
        .fetch_one(&self.db)
        .await
        .map_err(on_unique_violation("Location with this name already exists in the gym"))?;

        tracing::info!("Created location {} in gym {}", location.name, location.gym_id);
        Ok(location)
    }

    pub async fn update_location(&self, id: Uuid, request: LocationRequest) -> GymResult<Location> {
        request.validate()?;
        self.get_gym(request.gym_id).await?;

        sqlx::query_as::<_, Location>(
            "UPDATE locations SET gym_id = $2, name = $3 WHERE id = $1
             RETURNING id, gym_id, name",
        )
        .bind(id)
        .bind(request.gym_id)
        .bind(&request.name)
        .fetch_optional(&self.db)
        .await
        .map_err(on_unique_violation("Location with this name already exists in the gym"))?
        .ok_or(GymError::NotFound("Location"))
    }

    pub async fn delete_location(&self, id: Uuid) -> GymResult<()> {
        let result = sqlx::query("DELETE FROM locations WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(on_foreign_key_violation("Location has scheduled training sessions"))?;
        expect_deleted(result.rows_affected(), "Location")
    }

    // Subscription plans

    pub async fn list_plans(&self) -> GymResult<Vec<SubscriptionPlan>> {
        let plans = sqlx::query_as::<_, SubscriptionPlan>(
            "SELECT id, name, description, price, duration_days FROM subscription_plans
             ORDER BY price",
        )
        .fetch_all(&self.db)
        .await?;
        Ok(plans)
    }

    pub async fn get_plan(&self, id: Uuid) -> GymResult<SubscriptionPlan> {
        sqlx::query_as::<_, SubscriptionPlan>(
            "SELECT id, name, description, price, duration_days FROM subscription_plans
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(GymError::NotFound("Subscription plan"))
    }

    pub async fn create_plan(&self, request: SubscriptionPlanRequest) -> GymResult<SubscriptionPlan> {
        let request = request.validated()?;

        let plan = sqlx::query_as::<_, SubscriptionPlan>(
            "INSERT INTO subscription_plans (id, name, description, price, duration_days)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, name, description, price, duration_days",
        )
        .bind(Uuid::new_v4())
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.price)
        .bind(request.duration_days)
        .fetch_one(&self.db)
        .await?;

        tracing::info!("Created subscription plan {} at {}", plan.name, plan.price);
        Ok(plan)
    }

    pub async fn update_plan(
        &self,
        id: Uuid,
        request: SubscriptionPlanRequest,
    ) -> GymResult<SubscriptionPlan> {
        let request = request.validated()?;

        sqlx::query_as::<_, SubscriptionPlan>(
            "UPDATE subscription_plans
             SET name = $2, description = $3, price = $4, duration_days = $5
             WHERE id = $1
             RETURNING id, name, description, price, duration_days",
        )
        .bind(id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.price)
        .bind(request.duration_days)
        .fetch_optional(&self.db)
        .await?
        .ok_or(GymError::NotFound("Subscription plan"))
    }

    pub async fn delete_plan(&self, id: Uuid) -> GymResult<()> {
        let result = sqlx::query("DELETE FROM subscription_plans WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(on_foreign_key_violation("Subscription plan has been purchased"))?;
        expect_deleted(result.rows_affected(), "Subscription plan")
    }

    // Goals

    pub async fn list_goals(&self) -> GymResult<Vec<Goal>> {
        let goals = sqlx::query_as::<_, Goal>(
            "SELECT id, goal_name, description FROM goals ORDER BY goal_name",
        )
        .fetch_all(&self.db)
        .await?;
        Ok(goals)
    }

    pub async fn get_goal(&self, id: Uuid) -> GymResult<Goal> {
        sqlx::query_as::<_, Goal>("SELECT id, goal_name, description FROM goals WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(GymError::NotFound("Goal"))
    }

    pub async fn create_goal(&self, request: GoalRequest) -> GymResult<Goal> {
        request.validate()?;

        sqlx::query_as::<_, Goal>(
            "INSERT INTO goals (id, goal_name, description) VALUES ($1, $2, $3)
             RETURNING id, goal_name, description",
        )
        .bind(Uuid::new_v4())
        .bind(request.goal_name.trim())
        .bind(&request.description)
        .fetch_one(&self.db)
        .await
        .map_err(on_unique_violation("Goal with this name already exists"))
    }

    pub async fn update_goal(&self, id: Uuid, request: GoalRequest) -> GymResult<Goal> {
        request.validate()?;

        sqlx::query_as::<_, Goal>(
            "UPDATE goals SET goal_name = $2, description = $3 WHERE id = $1
             RETURNING id, goal_name, description",
        )
        .bind(id)
        .bind(request.goal_name.trim())
        .bind(&request.description)
        .fetch_optional(&self.db)
        .await
        .map_err(on_unique_violation("Goal with this name already exists"))?
        .ok_or(GymError::NotFound("Goal"))
    }

    pub async fn delete_goal(&self, id: Uuid) -> GymResult<()> {
        let result = sqlx::query("DELETE FROM goals WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(on_foreign_key_violation("Goal is assigned to clients"))?;
        expect_deleted(result.rows_affected(), "Goal")
    }

    // Training types

    pub async fn list_training_types(&self) -> GymResult<Vec<TrainingType>> {
        let types = sqlx::query_as::<_, TrainingType>(
            "SELECT id, title, description FROM training_types ORDER BY title",
        )
        .fetch_all(&self.db)
        .await?;
        Ok(types)
    }

    pub async fn get_training_type(&self, id: Uuid) -> GymResult<TrainingType> {
        sqlx::query_as::<_, TrainingType>(
            "SELECT id, title, description FROM training_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(GymError::NotFound("Training type"))
    }

    pub async fn create_training_type(&self, request: TrainingTypeRequest) -> GymResult<TrainingType> {
        let request = request.validated()?;

        sqlx::query_as::<_, TrainingType>(
            "INSERT INTO training_types (id, title, description) VALUES ($1, $2, $3)
             RETURNING id, title, description",
        )
        .bind(Uuid::new_v4())
        .bind(request.title.trim())
        .bind(request.description.trim())
        .fetch_one(&self.db)
        .await
        .map_err(on_unique_violation("Training type with this title already exists"))
    }

    pub async fn update_training_type(
        &self,
        id: Uuid,
        request: TrainingTypeRequest,
    ) -> GymResult<TrainingType> {
        let request = request.validated()?;

        sqlx::query_as::<_, TrainingType>(
            "UPDATE training_types SET title = $2, description = $3 WHERE id = $1
             RETURNING id, title, description",
        )
        .bind(id)
        .bind(request.title.trim())
        .bind(request.description.trim())
        .fetch_optional(&self.db)
        .await
        .map_err(on_unique_violation("Training type with this title already exists"))?
        .ok_or(GymError::NotFound("Training type"))
    }

    pub async fn delete_training_type(&self, id: Uuid) -> GymResult<()> {
        let result = sqlx::query("DELETE FROM training_types WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(on_foreign_key_violation("Training type is used by training sessions"))?;
        expect_deleted(result.rows_affected(), "Training type")
    }
}

fn expect_deleted(rows_affected: u64, entity: &'static str) -> GymResult<()> {
    if rows_affected == 0 {
        return Err(GymError::NotFound(entity));
    }
    Ok(())
}
