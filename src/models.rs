// src/models.rs
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Clone, Debug, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[sqlx(rename = "password")]
    pub password_hash: String,
}

/// Payload of the signed session cookie.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SessionClaims {
    pub sub: String, // username
    pub exp: usize,
}

#[derive(Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// One prediction request, after form coercion and before any encoding.
#[derive(Clone, Debug, PartialEq)]
pub struct PredictionInput {
    pub country: String,
    pub year: i64,
    pub gender: i64,
    pub age_group: i64,
    pub suicide_count: i64,
    pub population: i64,
    pub gdp_for_year: i64,
    pub gdp_per_capita: i64,
    pub generation: i64,
}
