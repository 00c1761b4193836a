use chrono::{DateTime, Local, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::errors::{on_reference_violation, on_unique_violation, GymError, GymResult};
use crate::models::{
    AddGoalRequest, ClientGoal, ClientGoalDetails, CreateGoalRecord, EditGoalRequest,
    UpdateGoalRecord, CLIENT_GOAL_COLUMNS,
};

const DUPLICATE_GOAL: &str = "Goal for this user and assigned date already exists";

/// Goals assigned to clients
#[derive(Clone)]
pub struct GoalService {
    db: PgPool,
}

impl GoalService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list_for_client(&self, client_id: Uuid) -> GymResult<Vec<ClientGoalDetails>> {
        let goals = sqlx::query_as::<_, ClientGoalDetails>(
            "SELECT cg.id, cg.client_id, cg.goal_id, g.goal_name, cg.description,
                    cg.assigned_at, cg.is_achieved
             FROM client_goals cg
             JOIN goals g ON g.id = cg.goal_id
             WHERE cg.client_id = $1
             ORDER BY cg.assigned_at DESC",
        )
        .bind(client_id)
        .fetch_all(&self.db)
        .await?;

        Ok(goals)
    }

    /// A goal may be assigned once per client and day.
    pub async fn add(
        &self,
        client_id: Uuid,
        request: AddGoalRequest,
        now: DateTime<Utc>,
    ) -> GymResult<ClientGoal> {
        request.validate()?;
        self.ensure_goal_exists(request.goal_id).await?;

        let goal = sqlx::query_as::<_, ClientGoal>(&format!(
            "INSERT INTO client_goals
                 (id, client_id, goal_id, description, assigned_at, assigned_on, is_achieved)
             VALUES ($1, $2, $3, $4, $5, $6, FALSE)
             RETURNING {CLIENT_GOAL_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(client_id)
        .bind(request.goal_id)
        .bind(&request.description)
        .bind(now)
        .bind(now.with_timezone(&Local).date_naive())
        .fetch_one(&self.db)
        .await
        .map_err(on_unique_violation("This goal has already been added today"))?;

        tracing::info!("Client {} added goal {}", client_id, goal.goal_id);
        Ok(goal)
    }

    pub async fn edit(
        &self,
        client_id: Uuid,
        id: Uuid,
        request: EditGoalRequest,
    ) -> GymResult<ClientGoal> {
        request.validate()?;
        if let Some(goal_id) = request.goal_id {
            self.ensure_goal_exists(goal_id).await?;
        }

        sqlx::query_as::<_, ClientGoal>(&format!(
            "UPDATE client_goals SET
                 goal_id = COALESCE($3, goal_id),
                 description = COALESCE($4, description),
                 is_achieved = COALESCE($5, is_achieved)
             WHERE id = $1 AND client_id = $2
             RETURNING {CLIENT_GOAL_COLUMNS}"
        ))
        .bind(id)
        .bind(client_id)
        .bind(request.goal_id)
        .bind(request.description)
        .bind(request.is_achieved)
        .fetch_optional(&self.db)
        .await
        .map_err(on_unique_violation("This goal has already been added today"))?
        .ok_or(GymError::NotFound("Goal"))
    }

    pub async fn delete(&self, client_id: Uuid, id: Uuid) -> GymResult<()> {
        let result = sqlx::query("DELETE FROM client_goals WHERE id = $1 AND client_id = $2")
            .bind(id)
            .bind(client_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(GymError::NotFound("Goal"));
        }
        Ok(())
    }

    async fn ensure_goal_exists(&self, goal_id: Uuid) -> GymResult<()> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM goals WHERE id = $1)")
            .bind(goal_id)
            .fetch_one(&self.db)
            .await?;

        if !exists {
            return Err(GymError::NotFound("Goal"));
        }
        Ok(())
    }

    // Raw record access for the REST mirror

    pub async fn list_records(&self) -> GymResult<Vec<ClientGoal>> {
        let goals = sqlx::query_as::<_, ClientGoal>(&format!(
            "SELECT {CLIENT_GOAL_COLUMNS} FROM client_goals ORDER BY assigned_at DESC"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(goals)
    }

    pub async fn create_record(&self, record: CreateGoalRecord) -> GymResult<ClientGoal> {
        record.validate()?;
        let assigned_at = record.assigned_at.unwrap_or_else(Utc::now);

        sqlx::query_as::<_, ClientGoal>(&format!(
            "INSERT INTO client_goals
                 (id, client_id, goal_id, description, assigned_at, assigned_on, is_achieved)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {CLIENT_GOAL_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(record.client_id)
        .bind(record.goal_id)
        .bind(&record.description)
        .bind(assigned_at)
        .bind(assigned_at.with_timezone(&Local).date_naive())
        .bind(record.is_achieved)
        .fetch_one(&self.db)
        .await
        .map_err(on_reference_violation("Unknown client or goal", DUPLICATE_GOAL))
    }

    pub async fn get_record(&self, id: Uuid) -> GymResult<ClientGoal> {
        sqlx::query_as::<_, ClientGoal>(&format!(
            "SELECT {CLIENT_GOAL_COLUMNS} FROM client_goals WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(GymError::NotFound("Goal"))
    }

    pub async fn update_record(&self, id: Uuid, record: UpdateGoalRecord) -> GymResult<ClientGoal> {
        record.validate()?;
        let assigned_on = record
            .assigned_at
            .map(|assigned_at| assigned_at.with_timezone(&Local).date_naive());

        sqlx::query_as::<_, ClientGoal>(&format!(
            "UPDATE client_goals SET
                 client_id = COALESCE($2, client_id),
                 goal_id = COALESCE($3, goal_id),
                 description = COALESCE($4, description),
                 assigned_at = COALESCE($5, assigned_at),
                 assigned_on = COALESCE($6, assigned_on),
                 is_achieved = COALESCE($7, is_achieved)
             WHERE id = $1
             RETURNING {CLIENT_GOAL_COLUMNS}"
        ))
        .bind(id)
        .bind(record.client_id)
        .bind(record.goal_id)
        .bind(record.description)
        .bind(record.assigned_at)
        .bind(assigned_on)
        .bind(record.is_achieved)
        .fetch_optional(&self.db)
        .await
        .map_err(on_reference_violation("Unknown client or goal", DUPLICATE_GOAL))?
        .ok_or(GymError::NotFound("Goal"))
    }

    pub async fn delete_record(&self, id: Uuid) -> GymResult<()> {
        let result = sqlx::query("DELETE FROM client_goals WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(GymError::NotFound("Goal"));
        }
        Ok(())
    }
}

