use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{password::hash_password, UserRole};
use crate::models::{
    Gender, GoalRequest, GymRequest, LocationRequest, SubscriptionPlanRequest,
    TrainerProfileRequest, TrainingTypeRequest,
};
use crate::services::{CatalogService, TrainerService};

pub const DEMO_PASSWORD: &str = "Demo-pass1";

/// Fills an empty database with a demo gym, its catalog and one account per role.
pub struct DatabaseSeeder {
    pool: PgPool,
}

impl DatabaseSeeder {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn seed_all(&self) -> Result<()> {
        tracing::info!("Starting database seeding...");

        self.seed_catalog().await?;
        self.seed_accounts().await?;

        tracing::info!("Database seeding completed!");
        Ok(())
    }

    async fn seed_catalog(&self) -> Result<()> {
        let gyms: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM gyms")
            .fetch_one(&self.pool)
            .await?;
        if gyms > 0 {
            tracing::info!("Catalog already present, skipping");
            return Ok(());
        }

        let catalog = CatalogService::new(self.pool.clone());

        let gym = catalog
            .create_gym(GymRequest {
                name: "Central Gym".to_string(),
                address: "1 Main Street".to_string(),
            })
            .await?;

        for name in ["Main hall", "Yoga studio", "Pool"] {
            catalog
                .create_location(LocationRequest {
                    gym_id: gym.id,
                    name: name.to_string(),
                })
                .await?;
        }

        for (name, price, duration_days) in [
            ("Month", Decimal::new(3000, 2), 30),
            ("Quarter", Decimal::new(8000, 2), 90),
            ("Year", Decimal::new(30000, 2), 365),
        ] {
            catalog
                .create_plan(SubscriptionPlanRequest {
                    name: name.to_string(),
                    description: format!("Unlimited visits for {duration_days} days"),
                    price,
                    duration_days,
                })
                .await?;
        }

        for goal_name in ["Lose weight", "Build muscle", "Improve endurance"] {
            catalog
                .create_goal(GoalRequest {
                    goal_name: goal_name.to_string(),
                    description: String::new(),
                })
                .await?;
        }

        for (title, description) in [
            ("Strength", "Free weights and machines"),
            ("Yoga", "Flexibility, balance and breathing"),
            ("Swimming", "Technique and endurance in the pool"),
        ] {
            catalog
                .create_training_type(TrainingTypeRequest {
                    title: title.to_string(),
                    description: description.to_string(),
                })
                .await?;
        }

        tracing::info!("Seeded demo catalog for {}", gym.name);
        Ok(())
    }

    async fn seed_accounts(&self) -> Result<()> {
        self.seed_user("admin", "admin@example.com", UserRole::Admin)
            .await?;
        self.seed_user("client", "client@example.com", UserRole::Client)
            .await?;

        if let Some(user_id) = self
            .seed_user("trainer", "trainer@example.com", UserRole::Trainer)
            .await?
        {
            TrainerService::new(self.pool.clone())
                .create_profile(
                    user_id,
                    TrainerProfileRequest {
                        first_name: "Alex".to_string(),
                        last_name: "Coach".to_string(),
                        birth: NaiveDate::from_ymd_opt(1990, 5, 17)
                            .context("invalid demo birth date")?,
                        gender: Gender::Other,
                        phone: "+15550100100".to_string(),
                        qualification: "Certified personal trainer".to_string(),
                        specialization: "Strength".to_string(),
                        bio: String::new(),
                        photo: None,
                        client_qty_constraint: 10,
                    },
                    Local::now().date_naive(),
                )
                .await?;
        }

        Ok(())
    }

    /// Returns the new user's id, or `None` when the account already exists.
    async fn seed_user(&self, username: &str, email: &str, role: UserRole) -> Result<Option<Uuid>> {
        let password_hash = hash_password(DEMO_PASSWORD)?;

        let user_id: Option<Uuid> = sqlx::query_scalar(
            "INSERT INTO users (id, username, email, password_hash, role)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT DO NOTHING
             RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(email)
        .bind(&password_hash)
        .bind(role)
        .fetch_optional(&self.pool)
        .await?;

        if user_id.is_some() {
            tracing::info!("Created demo {} account {}", role, email);
        }
        Ok(user_id)
    }
}
