//! Role and permission gates of the portal handlers, over a migrated database.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Local, NaiveDate, Utc};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use gym_manager::api::routes::create_routes;
use gym_manager::auth::{AuthService, CreateUserRequest, JwtService, UserRole};
use gym_manager::models::*;
use gym_manager::services::*;

use common::{authed, send, TEST_SECRET};

struct Account {
    user_id: Uuid,
    token: String,
}

async fn account(db: &PgPool, username: &str, role: UserRole) -> Account {
    let user = AuthService::new(db.clone(), TEST_SECRET)
        .create_user(CreateUserRequest {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: "Str0ng-pass".to_string(),
            role,
        })
        .await
        .unwrap();
    let token = JwtService::new(TEST_SECRET)
        .create_access_token(user.id, username, role)
        .unwrap();

    Account {
        user_id: user.id,
        token,
    }
}

async fn client_profile(db: &PgPool, account: &Account, phone: &str) -> Client {
    ClientService::new(db.clone())
        .create_profile(
            account.user_id,
            ClientProfileRequest {
                first_name: "Iva".to_string(),
                last_name: "Client".to_string(),
                email: format!("{}@example.com", account.user_id.simple()),
                phone: phone.to_string(),
                birth: NaiveDate::from_ymd_opt(1996, 1, 20).unwrap(),
                gender: Gender::Female,
            },
        )
        .await
        .unwrap()
}

async fn trainer_profile(db: &PgPool, account: &Account, capacity: i32) -> Trainer {
    TrainerService::new(db.clone())
        .create_profile(
            account.user_id,
            TrainerProfileRequest {
                first_name: "Max".to_string(),
                last_name: "Coach".to_string(),
                birth: NaiveDate::from_ymd_opt(1985, 9, 3).unwrap(),
                gender: Gender::Male,
                phone: "+15550000200".to_string(),
                qualification: "Level 2".to_string(),
                specialization: "Cardio".to_string(),
                bio: String::new(),
                photo: None,
                client_qty_constraint: capacity,
            },
            Local::now().date_naive(),
        )
        .await
        .unwrap()
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_client_cannot_list_clients(db: PgPool) {
    let client = account(&db, "iva", UserRole::Client).await;
    let app = create_routes(db, TEST_SECRET);

    let (status, body) = send(app, authed("GET", "/api/v1/clients", &client.token, None)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error_code"], "ROLE_NOT_ALLOWED");
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_client_cannot_schedule_sessions(db: PgPool) {
    let client = account(&db, "iva", UserRole::Client).await;
    let app = create_routes(db, TEST_SECRET);
    let body = json!({
        "training_type_id": Uuid::new_v4(),
        "gym_id": Uuid::new_v4(),
        "location_id": Uuid::new_v4(),
        "session_date": (Local::now().date_naive() + Duration::days(3)).to_string(),
        "start_time": "10:00:00",
        "end_time": "11:00:00",
        "max_participants": 5
    });

    let (status, body) = send(
        app,
        authed("POST", "/api/v1/training-sessions", &client.token, Some(&body)),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error_code"], "PERMISSION_DENIED");
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_reports_are_for_admins(db: PgPool) {
    let trainer = account(&db, "max", UserRole::Trainer).await;
    let admin = account(&db, "root", UserRole::Admin).await;
    let app = create_routes(db, TEST_SECRET);

    let (status, _) = send(
        app.clone(),
        authed("GET", "/api/v1/reports/training-types", &trainer.token, None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        app,
        authed("GET", "/api/v1/reports/training-types", &admin.token, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_admin_routes_reject_other_roles(db: PgPool) {
    let trainer = account(&db, "max", UserRole::Trainer).await;
    let app = create_routes(db, TEST_SECRET);

    let (status, _) = send(app, authed("GET", "/api/v1/admin/users", &trainer.token, None)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_rest_patch_respects_trainer_capacity(db: PgPool) {
    let first = account(&db, "first", UserRole::Client).await;
    let second = account(&db, "second", UserRole::Client).await;
    let coach = account(&db, "max", UserRole::Trainer).await;
    let trainer = trainer_profile(&db, &coach, 1).await;
    let first_client = client_profile(&db, &first, "+15550000201").await;
    let second_client = client_profile(&db, &second, "+15550000202").await;

    let plan = CatalogService::new(db.clone())
        .create_plan(SubscriptionPlanRequest {
            name: "Month".to_string(),
            description: String::new(),
            price: dec!(10),
            duration_days: 30,
        })
        .await
        .unwrap();
    let subscriptions = SubscriptionService::new(db.clone());
    for client in [&first_client, &second_client] {
        subscriptions
            .create_record(CreateSubscriptionRecord {
                client_id: client.id,
                subscription_id: plan.id,
                start_date: Utc::now() - Duration::days(1),
                end_date: Utc::now() + Duration::days(29),
            })
            .await
            .unwrap();
    }
    ClientService::new(db.clone())
        .assign_trainer(first.user_id, trainer.id, Utc::now())
        .await
        .unwrap();

    let app = create_routes(db, TEST_SECRET);
    let uri = format!("/api/v1/rest/clients/{}", second.user_id);

    let (status, body) = send(
        app.clone(),
        authed("PATCH", &uri, &second.token, Some(&json!({ "trainer_id": trainer.id }))),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error_code"], "TRAINER_AT_CAPACITY");

    let (status, body) = send(
        app,
        authed(
            "PATCH",
            &uri,
            &second.token,
            Some(&json!({ "trainer_id": Uuid::new_v4() })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "INVALID_INPUT");
}
