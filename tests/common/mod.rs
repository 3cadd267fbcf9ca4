#![allow(dead_code)]

use actix_web::{App, web};
use sqlx::SqlitePool;
use suicide_rate_web::config::Config;
use suicide_rate_web::db;
use suicide_rate_web::ml::{LabelEncoder, Predictor, RegressionModel, RobustScaler};
use suicide_rate_web::predict::COUNTRIES;

pub struct TestContext {
    pub pool: SqlitePool,
    pub config: Config,
    pub predictor: Predictor,
}

impl TestContext {
    pub async fn new() -> TestContext {
        let pool = db::connect("sqlite::memory:")
            .await
            .expect("Failed to open in-memory database");
        db::init_schema(&pool).await.expect("Failed to create schema");

        TestContext {
            pool,
            config: get_test_config(),
            predictor: test_predictor(),
        }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(web::Data::new(self.pool.clone()))
            .app_data(web::Data::new(self.predictor.clone()))
            .app_data(web::Data::new(self.config.clone()))
            .configure(suicide_rate_web::configure_routes)
    }
}

pub fn get_test_config() -> Config {
    Config::from_iter(vec![
        ("SESSION_SECRET".to_string(), "test-secret".to_string()),
        ("DATABASE_URL".to_string(), "sqlite::memory:".to_string()),
        ("BCRYPT_COST".to_string(), "4".to_string()),
    ])
    .expect("Failed to build test config")
}

/// rate = 0.5 * gender + 2.0 * scaled suicide_count + 1.0
pub fn test_predictor() -> Predictor {
    Predictor::new(
        RegressionModel::Linear {
            coefficients: vec![0.0, 0.0, 0.5, 0.0, 2.0, 0.0, 0.0, 0.0, 0.0],
            intercept: 1.0,
        },
        RobustScaler::new(vec![100.0, 0.0, 0.0, 0.0], vec![3.0, 1.0, 1.0, 1.0])
            .expect("Failed to build scaler"),
        LabelEncoder::new(COUNTRIES.iter().map(|c| c.to_string()).collect()),
        LabelEncoder::new((1985..=2016).collect()),
    )
    .expect("Failed to build predictor")
}

// Test data helpers
pub mod test_data {
    pub fn register_form<'a>(username: &'a str, email: &'a str) -> Vec<(&'a str, &'a str)> {
        vec![
            ("username", username),
            ("email", email),
            ("password", "correct-horse"),
        ]
    }

    pub fn login_form<'a>(email: &'a str, password: &'a str) -> Vec<(&'a str, &'a str)> {
        vec![("email", email), ("password", password)]
    }

    pub fn prediction_form(country: &str) -> Vec<(&str, &str)> {
        vec![
            ("country", country),
            ("year", "2010"),
            ("gender", "1"),
            ("age_group", "2"),
            ("suicide_count", "101"),
            ("population", "500000"),
            ("gdp_for_year", "1000000000"),
            ("gdp_per_capita", "20000"),
            ("generation", "3"),
        ]
    }
}
