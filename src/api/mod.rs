// API routes and handlers

pub mod auth;
pub mod catalog;
pub mod clients;
pub mod feedbacks;
pub mod goals;
pub mod health;
pub mod progress;
pub mod registrations;
pub mod reports;
pub mod rest;
pub mod routes;
pub mod subscriptions;
pub mod trainers;
pub mod training_sessions;

use axum::{
    extract::{Path, Query},
    Json,
};
use axum_extra::extract::WithRejection;
use serde::Serialize;
use uuid::Uuid;

use crate::errors::GymError;

pub type JsonBody<T> = WithRejection<Json<T>, GymError>;
pub type PathId = WithRejection<Path<Uuid>, GymError>;
pub type QueryParams<T> = WithRejection<Query<T>, GymError>;

/// Portal answer: the notice a page would flash plus the affected data
#[derive(Debug, Serialize)]
pub struct ActionResponse<T> {
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ActionResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            message: message.into(),
            data,
        })
    }
}
