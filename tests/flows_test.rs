//! End-to-end service flows against a real database.
//!
//! Run with `DATABASE_URL=... cargo test -- --ignored`; each test gets a fresh
//! migrated database from `sqlx::test`.

use assert_matches::assert_matches;
use chrono::{Duration, Local, NaiveDate, NaiveTime, Utc};
use rust_decimal_macros::dec;
use sqlx::PgPool;
use uuid::Uuid;

use gym_manager::auth::{AuthService, CreateUserRequest, UserRole};
use gym_manager::errors::GymError;
use gym_manager::models::*;
use gym_manager::services::*;

struct Fixture {
    location_id: Uuid,
    gym_id: Uuid,
    plan_id: Uuid,
    training_type_id: Uuid,
}

async fn seed_gym(db: &PgPool) -> Fixture {
    let catalog = CatalogService::new(db.clone());
    let gym = catalog
        .create_gym(GymRequest {
            name: "Test Gym".into(),
            address: "Somewhere 1".into(),
        })
        .await
        .unwrap();
    let location = catalog
        .create_location(LocationRequest {
            gym_id: gym.id,
            name: "Hall".into(),
        })
        .await
        .unwrap();
    let plan = catalog
        .create_plan(SubscriptionPlanRequest {
            name: "Month".into(),
            description: String::new(),
            price: dec!(30),
            duration_days: 30,
        })
        .await
        .unwrap();
    let training_type = catalog
        .create_training_type(TrainingTypeRequest {
            title: "Strength".into(),
            description: "Weights and machines".into(),
        })
        .await
        .unwrap();

    Fixture {
        location_id: location.id,
        gym_id: gym.id,
        plan_id: plan.id,
        training_type_id: training_type.id,
    }
}

async fn create_user(db: &PgPool, name: &str, role: UserRole) -> Uuid {
    AuthService::new(db.clone(), "flow_test_secret")
        .create_user(CreateUserRequest {
            username: name.to_string(),
            email: format!("{name}@example.com"),
            password: "Str0ng-pass".to_string(),
            role,
        })
        .await
        .unwrap()
        .id
}

async fn create_client(db: &PgPool, name: &str, phone: &str, balance: rust_decimal::Decimal) -> Client {
    let user_id = create_user(db, name, UserRole::Client).await;
    let clients = ClientService::new(db.clone());
    clients
        .create_profile(
            user_id,
            ClientProfileRequest {
                first_name: name.to_string(),
                last_name: "Tester".to_string(),
                email: format!("{name}@example.com"),
                phone: phone.to_string(),
                birth: NaiveDate::from_ymd_opt(1995, 3, 1).unwrap(),
                gender: Gender::Female,
            },
        )
        .await
        .unwrap();
    if balance > dec!(0) {
        clients.top_up_balance(user_id, balance).await.unwrap();
    }
    clients.require_profile(user_id).await.unwrap()
}

async fn create_trainer(db: &PgPool, name: &str, phone: &str, capacity: i32) -> Trainer {
    let user_id = create_user(db, name, UserRole::Trainer).await;
    TrainerService::new(db.clone())
        .create_profile(
            user_id,
            TrainerProfileRequest {
                first_name: name.to_string(),
                last_name: "Coach".to_string(),
                birth: NaiveDate::from_ymd_opt(1988, 7, 12).unwrap(),
                gender: Gender::Male,
                phone: phone.to_string(),
                qualification: "Level 3".to_string(),
                specialization: "Strength".to_string(),
                bio: String::new(),
                photo: None,
                client_qty_constraint: capacity,
            },
            Local::now().date_naive(),
        )
        .await
        .unwrap()
}

fn session_request(gym: &Fixture, start: (u32, u32), end: (u32, u32), max: i32) -> TrainingSessionRequest {
    TrainingSessionRequest {
        trainer_id: None,
        training_type_id: gym.training_type_id,
        gym_id: gym.gym_id,
        location_id: gym.location_id,
        session_date: Local::now().date_naive() + Duration::days(2),
        start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
        max_participants: max,
        status: None,
    }
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_purchase_charges_balance(db: PgPool) {
    let gym = seed_gym(&db).await;
    let client = create_client(&db, "buyer", "+15550000001", dec!(50)).await;
    let subscriptions = SubscriptionService::new(db.clone());

    let receipt = subscriptions
        .purchase(client.user_id, gym.plan_id, Utc::now())
        .await
        .unwrap();
    assert_eq!(receipt.remaining_balance, dec!(20));
    assert_eq!(
        receipt.subscription.end_date - receipt.subscription.start_date,
        Duration::days(30)
    );

    let second = subscriptions
        .purchase(client.user_id, gym.plan_id, Utc::now())
        .await;
    assert_matches!(second, Err(GymError::InsufficientBalance { .. }));

    let stored = ClientService::new(db.clone())
        .require_profile(client.user_id)
        .await
        .unwrap();
    assert_eq!(stored.balance, dec!(20));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_trainer_assignment_rules(db: PgPool) {
    let gym = seed_gym(&db).await;
    let trainer = create_trainer(&db, "coach", "+15550000100", 1).await;
    let first = create_client(&db, "first", "+15550000002", dec!(100)).await;
    let second = create_client(&db, "second", "+15550000003", dec!(100)).await;
    let clients = ClientService::new(db.clone());
    let subscriptions = SubscriptionService::new(db.clone());

    assert_matches!(
        clients.assign_trainer(first.user_id, trainer.id, Utc::now()).await,
        Err(GymError::NoActiveSubscription)
    );

    for client in [&first, &second] {
        subscriptions
            .purchase(client.user_id, gym.plan_id, Utc::now())
            .await
            .unwrap();
    }

    let assigned = clients
        .assign_trainer(first.user_id, trainer.id, Utc::now())
        .await
        .unwrap();
    assert!(assigned.changed);

    let again = clients
        .assign_trainer(first.user_id, trainer.id, Utc::now())
        .await
        .unwrap();
    assert!(!again.changed);

    assert_matches!(
        clients.assign_trainer(second.user_id, trainer.id, Utc::now()).await,
        Err(GymError::TrainerAtCapacity(_))
    );
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_sessions_at_one_location_need_an_hour_apart(db: PgPool) {
    let gym = seed_gym(&db).await;
    let trainer = create_trainer(&db, "coach", "+15550000100", 5).await;
    let sessions = TrainingSessionService::new(db.clone());
    let now = Local::now().naive_local();

    sessions
        .create(trainer.id, session_request(&gym, (10, 0), (11, 0), 5), now)
        .await
        .unwrap();

    assert_matches!(
        sessions
            .create(trainer.id, session_request(&gym, (11, 30), (12, 30), 5), now)
            .await,
        Err(GymError::Schedule(ScheduleError::LocationBusy))
    );

    sessions
        .create(trainer.id, session_request(&gym, (12, 0), (13, 0), 5), now)
        .await
        .unwrap();
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_registration_capacity_and_ownership(db: PgPool) {
    let gym = seed_gym(&db).await;
    let trainer = create_trainer(&db, "coach", "+15550000100", 5).await;
    let other_trainer = create_trainer(&db, "other", "+15550000101", 5).await;
    let clients = ClientService::new(db.clone());
    let subscriptions = SubscriptionService::new(db.clone());
    let sessions = TrainingSessionService::new(db.clone());
    let registrations = RegistrationService::new(db.clone());
    let now = Local::now().naive_local();

    let mut members = Vec::new();
    for (name, phone) in [("anna", "+15550000004"), ("boris", "+15550000005")] {
        let client = create_client(&db, name, phone, dec!(100)).await;
        subscriptions
            .purchase(client.user_id, gym.plan_id, Utc::now())
            .await
            .unwrap();
        clients
            .assign_trainer(client.user_id, trainer.id, Utc::now())
            .await
            .unwrap();
        members.push(clients.require_profile(client.user_id).await.unwrap());
    }

    let session = sessions
        .create(trainer.id, session_request(&gym, (9, 0), (10, 0), 1), now)
        .await
        .unwrap();
    let foreign = sessions
        .create(other_trainer.id, session_request(&gym, (15, 0), (16, 0), 5), now)
        .await
        .unwrap();

    registrations.register(&members[0], session.id).await.unwrap();

    assert_matches!(
        registrations.register(&members[0], session.id).await,
        Err(GymError::SessionFull)
    );
    assert_matches!(
        registrations.register(&members[1], session.id).await,
        Err(GymError::SessionFull)
    );
    assert_matches!(
        registrations.register(&members[1], foreign.id).await,
        Err(GymError::ForeignSession)
    );

    let trainings = registrations.client_trainings(&members[0], now).await.unwrap();
    assert_eq!(trainings.sessions.len(), 1);
    assert!(trainings.sessions[0].is_registered);

    registrations.cancel(&members[0], session.id).await.unwrap();
    assert_matches!(
        registrations.cancel(&members[0], session.id).await,
        Err(GymError::NotRegistered)
    );
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_progress_only_for_completed_sessions(db: PgPool) {
    let gym = seed_gym(&db).await;
    let trainer = create_trainer(&db, "coach", "+15550000100", 5).await;
    let client = create_client(&db, "runner", "+15550000006", dec!(100)).await;
    let clients = ClientService::new(db.clone());
    let sessions = TrainingSessionService::new(db.clone());
    let registrations = RegistrationService::new(db.clone());
    let progress = ProgressService::new(db.clone());

    SubscriptionService::new(db.clone())
        .purchase(client.user_id, gym.plan_id, Utc::now())
        .await
        .unwrap();
    clients
        .assign_trainer(client.user_id, trainer.id, Utc::now())
        .await
        .unwrap();
    let client = clients.require_profile(client.user_id).await.unwrap();

    let session = sessions
        .create(
            trainer.id,
            session_request(&gym, (18, 0), (19, 0), 3),
            Local::now().naive_local(),
        )
        .await
        .unwrap();
    registrations.register(&client, session.id).await.unwrap();

    let request = || AddProgressRequest {
        client_id: client.id,
        result: "5x5 squats at 80kg".to_string(),
        feedback: "Solid form".to_string(),
    };

    assert_matches!(
        progress.add(trainer.id, session.id, request()).await,
        Err(GymError::SessionNotCompleted)
    );

    sessions
        .finish_with(session.id, Some(trainer.id), SessionStatus::Completed)
        .await
        .unwrap();
    progress.add(trainer.id, session.id, request()).await.unwrap();

    assert_matches!(
        progress.add(trainer.id, session.id, request()).await,
        Err(GymError::Conflict(_))
    );
    assert_eq!(progress.client_progress(client.id).await.unwrap().len(), 1);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_rest_subscription_duplicate_start(db: PgPool) {
    let gym = seed_gym(&db).await;
    let client = create_client(&db, "rest", "+15550000007", dec!(0)).await;
    let subscriptions = SubscriptionService::new(db.clone());
    let start = Utc::now();
    let record = || CreateSubscriptionRecord {
        client_id: client.id,
        subscription_id: gym.plan_id,
        start_date: start,
        end_date: start + Duration::days(30),
    };

    subscriptions.create_record(record()).await.unwrap();

    let duplicate = subscriptions.create_record(record()).await;
    assert_matches!(
        duplicate,
        Err(GymError::Conflict(message))
            if message == "Subscription for this user and start date already exists"
    );
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_record_update_cannot_bypass_trainer_rules(db: PgPool) {
    let gym = seed_gym(&db).await;
    let trainer = create_trainer(&db, "coach", "+15550000100", 1).await;
    let first = create_client(&db, "first", "+15550000008", dec!(100)).await;
    let second = create_client(&db, "second", "+15550000009", dec!(100)).await;
    let clients = ClientService::new(db.clone());

    let to_trainer = |trainer_id| UpdateClientRecord {
        trainer_id: Some(trainer_id),
        ..Default::default()
    };

    assert_matches!(
        clients
            .update_record(second.user_id, to_trainer(Some(trainer.id)), Utc::now())
            .await,
        Err(GymError::NoActiveSubscription)
    );

    SubscriptionService::new(db.clone())
        .purchase(first.user_id, gym.plan_id, Utc::now())
        .await
        .unwrap();
    let assigned = clients
        .update_record(first.user_id, to_trainer(Some(trainer.id)), Utc::now())
        .await
        .unwrap();
    assert_eq!(assigned.trainer_id, Some(trainer.id));

    // The trainer's single place is taken now
    SubscriptionService::new(db.clone())
        .purchase(second.user_id, gym.plan_id, Utc::now())
        .await
        .unwrap();
    assert_matches!(
        clients
            .update_record(second.user_id, to_trainer(Some(trainer.id)), Utc::now())
            .await,
        Err(GymError::TrainerAtCapacity(_))
    );

    let assigned_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM clients WHERE trainer_id = $1")
            .bind(trainer.id)
            .fetch_one(&db)
            .await
            .unwrap();
    assert_eq!(assigned_count, 1);

    // Re-sending the current trainer and unassigning stay allowed
    clients
        .update_record(first.user_id, to_trainer(Some(trainer.id)), Utc::now())
        .await
        .unwrap();
    let unassigned = clients
        .update_record(first.user_id, to_trainer(None), Utc::now())
        .await
        .unwrap();
    assert_eq!(unassigned.trainer_id, None);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_record_update_with_unknown_trainer_is_invalid_input(db: PgPool) {
    let gym = seed_gym(&db).await;
    let client = create_client(&db, "lost", "+15550000010", dec!(100)).await;
    let clients = ClientService::new(db.clone());
    SubscriptionService::new(db.clone())
        .purchase(client.user_id, gym.plan_id, Utc::now())
        .await
        .unwrap();

    let result = clients
        .update_record(
            client.user_id,
            UpdateClientRecord {
                trainer_id: Some(Some(Uuid::new_v4())),
                ..Default::default()
            },
            Utc::now(),
        )
        .await;

    assert_matches!(result, Err(GymError::InvalidInput(message)) if message == "Unknown trainer");
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_goal_once_per_day(db: PgPool) {
    let client = create_client(&db, "goal", "+15550000011", dec!(0)).await;
    let goal = CatalogService::new(db.clone())
        .create_goal(GoalRequest {
            goal_name: "Run a marathon".into(),
            description: String::new(),
        })
        .await
        .unwrap();
    let goals = GoalService::new(db.clone());
    let request = || AddGoalRequest {
        goal_id: goal.id,
        description: "Spring race".to_string(),
    };

    goals.add(client.id, request(), Utc::now()).await.unwrap();
    assert_matches!(
        goals.add(client.id, request(), Utc::now()).await,
        Err(GymError::Conflict(message)) if message == "This goal has already been added today"
    );

    goals
        .add(client.id, request(), Utc::now() + Duration::days(1))
        .await
        .unwrap();
    assert_eq!(goals.list_for_client(client.id).await.unwrap().len(), 2);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_feedback_needs_a_trainer_and_is_daily(db: PgPool) {
    let gym = seed_gym(&db).await;
    let trainer = create_trainer(&db, "coach", "+15550000100", 5).await;
    let client = create_client(&db, "critic", "+15550000012", dec!(100)).await;
    let clients = ClientService::new(db.clone());
    let feedbacks = FeedbackService::new(db.clone());
    let today = Local::now().date_naive();
    let request = || FeedbackRequest {
        title: "Great session".to_string(),
        description: "Clear instructions".to_string(),
        rating: 5,
    };

    assert_matches!(
        feedbacks.add(&client, request(), today).await,
        Err(GymError::NoAssignedTrainer)
    );

    SubscriptionService::new(db.clone())
        .purchase(client.user_id, gym.plan_id, Utc::now())
        .await
        .unwrap();
    clients
        .assign_trainer(client.user_id, trainer.id, Utc::now())
        .await
        .unwrap();
    let client = clients.require_profile(client.user_id).await.unwrap();

    let feedback = feedbacks.add(&client, request(), today).await.unwrap();
    assert_eq!(feedback.trainer_id, trainer.id);
    assert_matches!(
        feedbacks.add(&client, request(), today).await,
        Err(GymError::Conflict(_))
    );
    feedbacks
        .add(&client, request(), today + Duration::days(1))
        .await
        .unwrap();

    let about_trainer = TrainerService::new(db.clone())
        .feedbacks(trainer.id)
        .await
        .unwrap();
    assert_eq!(about_trainer.len(), 2);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_client_trainings_requires_subscription(db: PgPool) {
    let gym = seed_gym(&db).await;
    let client = create_client(&db, "newbie", "+15550000013", dec!(100)).await;
    let registrations = RegistrationService::new(db.clone());
    let now = Local::now().naive_local();

    assert_matches!(
        registrations.client_trainings(&client, now).await,
        Err(GymError::NoSubscription)
    );

    SubscriptionService::new(db.clone())
        .purchase(client.user_id, gym.plan_id, Utc::now())
        .await
        .unwrap();

    let trainings = registrations.client_trainings(&client, now).await.unwrap();
    assert!(trainings.trainer.is_none());
    assert!(trainings.sessions.is_empty());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_session_update_skips_itself_and_checks_owner(db: PgPool) {
    let gym = seed_gym(&db).await;
    let trainer = create_trainer(&db, "coach", "+15550000100", 5).await;
    let other = create_trainer(&db, "other", "+15550000101", 5).await;
    let sessions = TrainingSessionService::new(db.clone());
    let now = Local::now().naive_local();

    let morning = sessions
        .create(trainer.id, session_request(&gym, (10, 0), (11, 0), 5), now)
        .await
        .unwrap();
    sessions
        .create(trainer.id, session_request(&gym, (13, 0), (14, 0), 5), now)
        .await
        .unwrap();

    // Overlaps only its own old slot
    let moved = sessions
        .update(
            morning.id,
            Some(trainer.id),
            session_request(&gym, (10, 30), (11, 30), 8),
            now,
        )
        .await
        .unwrap();
    assert_eq!(moved.max_participants, 8);

    assert_matches!(
        sessions
            .update(
                morning.id,
                Some(trainer.id),
                session_request(&gym, (11, 30), (12, 30), 8),
                now,
            )
            .await,
        Err(GymError::Schedule(ScheduleError::LocationBusy))
    );

    assert_matches!(
        sessions
            .update(
                morning.id,
                Some(other.id),
                session_request(&gym, (8, 0), (9, 0), 8),
                now,
            )
            .await,
        Err(GymError::NotFound("Training session"))
    );

    // Admins edit any session
    sessions
        .update(morning.id, None, session_request(&gym, (8, 0), (9, 0), 8), now)
        .await
        .unwrap();
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_only_planned_sessions_can_be_finished(db: PgPool) {
    let gym = seed_gym(&db).await;
    let trainer = create_trainer(&db, "coach", "+15550000100", 5).await;
    let sessions = TrainingSessionService::new(db.clone());

    let session = sessions
        .create(
            trainer.id,
            session_request(&gym, (10, 0), (11, 0), 5),
            Local::now().naive_local(),
        )
        .await
        .unwrap();

    let cancelled = sessions
        .finish_with(session.id, Some(trainer.id), SessionStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(cancelled.status, SessionStatus::Cancelled);

    assert_matches!(
        sessions
            .finish_with(session.id, Some(trainer.id), SessionStatus::Cancelled)
            .await,
        Err(GymError::SessionNotPlanned)
    );
    assert_matches!(
        sessions
            .finish_with(session.id, None, SessionStatus::Completed)
            .await,
        Err(GymError::SessionNotPlanned)
    );
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_deleting_trainer_unassigns_clients(db: PgPool) {
    let gym = seed_gym(&db).await;
    let trainer = create_trainer(&db, "coach", "+15550000100", 5).await;
    let client = create_client(&db, "loyal", "+15550000014", dec!(100)).await;
    let clients = ClientService::new(db.clone());
    let trainers = TrainerService::new(db.clone());

    SubscriptionService::new(db.clone())
        .purchase(client.user_id, gym.plan_id, Utc::now())
        .await
        .unwrap();
    clients
        .assign_trainer(client.user_id, trainer.id, Utc::now())
        .await
        .unwrap();

    trainers.delete_trainer(trainer.id).await.unwrap();

    let client = clients.require_profile(client.user_id).await.unwrap();
    assert_eq!(client.trainer_id, None);
    assert_matches!(
        trainers.delete_trainer(trainer.id).await,
        Err(GymError::NotFound("Trainer"))
    );
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_rankings_order_by_registrations(db: PgPool) {
    let gym = seed_gym(&db).await;
    let trainer = create_trainer(&db, "coach", "+15550000100", 5).await;
    let sessions = TrainingSessionService::new(db.clone());
    let registrations = RegistrationService::new(db.clone());
    let now = Local::now().naive_local();

    let yoga = CatalogService::new(db.clone())
        .create_training_type(TrainingTypeRequest {
            title: "Yoga".into(),
            description: "Mats and breathing".into(),
        })
        .await
        .unwrap();

    let strength = sessions
        .create(trainer.id, session_request(&gym, (9, 0), (10, 0), 5), now)
        .await
        .unwrap();
    let mut yoga_request = session_request(&gym, (12, 0), (13, 0), 5);
    yoga_request.training_type_id = yoga.id;
    let yoga_session = sessions.create(trainer.id, yoga_request, now).await.unwrap();

    let anna = create_client(&db, "anna", "+15550000015", dec!(0)).await;
    let boris = create_client(&db, "boris", "+15550000016", dec!(0)).await;
    for (client, session) in [(&anna, yoga_session.id), (&boris, yoga_session.id), (&anna, strength.id)] {
        registrations
            .create_record(CreateRegistrationRecord {
                client_id: client.id,
                session_id: session,
            })
            .await
            .unwrap();
    }

    let reports = ReportService::new(db.clone());
    let by_type = reports
        .training_type_ranking(&PeriodQuery::default())
        .await
        .unwrap();
    let ranking: Vec<(&str, i64)> = by_type
        .iter()
        .map(|row| (row.name.as_str(), row.registrations))
        .collect();
    assert_eq!(ranking, vec![("Yoga", 2), ("Strength", 1)]);

    let by_location = reports
        .location_ranking(&PeriodQuery::default())
        .await
        .unwrap();
    assert_eq!(by_location.len(), 1);
    assert_eq!(by_location[0].name, "Test Gym / Hall");
    assert_eq!(by_location[0].registrations, 3);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_rest_duplicates_report_conflicts(db: PgPool) {
    let gym = seed_gym(&db).await;
    let trainer = create_trainer(&db, "coach", "+15550000100", 5).await;
    let client = create_client(&db, "rest", "+15550000017", dec!(0)).await;
    let goal = CatalogService::new(db.clone())
        .create_goal(GoalRequest {
            goal_name: "Stretch daily".into(),
            description: String::new(),
        })
        .await
        .unwrap();
    let session = TrainingSessionService::new(db.clone())
        .create(
            trainer.id,
            session_request(&gym, (7, 0), (8, 0), 5),
            Local::now().naive_local(),
        )
        .await
        .unwrap();

    let goals = GoalService::new(db.clone());
    let assigned_at = Utc::now();
    let goal_record = || CreateGoalRecord {
        client_id: client.id,
        goal_id: goal.id,
        description: String::new(),
        assigned_at: Some(assigned_at),
        is_achieved: false,
    };
    goals.create_record(goal_record()).await.unwrap();
    assert_matches!(
        goals.create_record(goal_record()).await,
        Err(GymError::Conflict(message))
            if message == "Goal for this user and assigned date already exists"
    );

    let feedbacks = FeedbackService::new(db.clone());
    let feedback_record = || CreateFeedbackRecord {
        client_id: client.id,
        trainer_id: trainer.id,
        title: "Thanks".to_string(),
        description: "Good pace".to_string(),
        rating: 4,
        feedback_date: Some(Local::now().date_naive()),
    };
    feedbacks.create_record(feedback_record()).await.unwrap();
    assert_matches!(
        feedbacks.create_record(feedback_record()).await,
        Err(GymError::Conflict(message))
            if message == "Feedback for this user, trainer, and date already exists"
    );

    let registrations = RegistrationService::new(db.clone());
    let registration_record = || CreateRegistrationRecord {
        client_id: client.id,
        session_id: session.id,
    };
    registrations.create_record(registration_record()).await.unwrap();
    assert_matches!(
        registrations.create_record(registration_record()).await,
        Err(GymError::Conflict(message))
            if message == "Registration for this user and session already exists"
    );

    let progress = ProgressService::new(db.clone());
    let progress_record = || CreateProgressRecord {
        client_id: client.id,
        session_id: session.id,
        result: "Full range of motion".to_string(),
        feedback: "Keep going".to_string(),
    };
    progress.create_record(progress_record()).await.unwrap();
    assert_matches!(
        progress.create_record(progress_record()).await,
        Err(GymError::Conflict(message))
            if message == "Progress for this user and session already exists"
    );

    assert_matches!(
        progress
            .create_record(CreateProgressRecord {
                session_id: Uuid::new_v4(),
                ..progress_record()
            })
            .await,
        Err(GymError::InvalidInput(_))
    );
}
