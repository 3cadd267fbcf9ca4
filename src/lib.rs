// src/lib.rs
use actix_web::web;

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod ml;
pub mod models;
pub mod predict;
pub mod views;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    auth::init_routes(cfg);
    predict::init_routes(cfg);
}
