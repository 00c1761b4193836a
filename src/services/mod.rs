// Business logic over the database

pub mod catalog_service;
pub mod client_service;
pub mod feedback_service;
pub mod goal_service;
pub mod progress_service;
pub mod registration_service;
pub mod report_service;
pub mod subscription_service;
pub mod trainer_service;
pub mod training_session_service;

pub use catalog_service::CatalogService;
pub use client_service::ClientService;
pub use feedback_service::FeedbackService;
pub use goal_service::GoalService;
pub use progress_service::ProgressService;
pub use registration_service::RegistrationService;
pub use report_service::ReportService;
pub use subscription_service::SubscriptionService;
pub use trainer_service::TrainerService;
pub use training_session_service::TrainingSessionService;
