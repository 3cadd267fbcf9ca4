// src/predict.rs
use crate::auth;
use crate::config::Config;
use crate::ml::Predictor;
use crate::models::PredictionInput;
use crate::views;
use actix_web::{HttpRequest, HttpResponse, get, post, web};

/// Countries offered in the prediction form's dropdown.
pub const COUNTRIES: [&str; 46] = [
    "Albania",
    "Argentina",
    "Australia",
    "Austria",
    "Bahamas",
    "Belgium",
    "Brazil",
    "Canada",
    "Chile",
    "Colombia",
    "Croatia",
    "Cuba",
    "Czech Republic",
    "Denmark",
    "Ecuador",
    "Finland",
    "France",
    "Germany",
    "Greece",
    "Hungary",
    "India",
    "Ireland",
    "Israel",
    "Italy",
    "Japan",
    "Mexico",
    "Netherlands",
    "New Zealand",
    "Norway",
    "Poland",
    "Portugal",
    "Republic of Korea",
    "Romania",
    "Russian Federation",
    "Slovakia",
    "Slovenia",
    "South Africa",
    "Spain",
    "Sri Lanka",
    "Sweden",
    "Switzerland",
    "Thailand",
    "Turkey",
    "Ukraine",
    "United Kingdom",
    "United States",
];

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(home);
    cfg.service(prediction_form);
    cfg.service(predict);
}

pub fn prediction_sentence(rate: f64) -> String {
    format!("Suicide Rate is {:?} per 100k population.", rate)
}

#[get("/")]
pub async fn home(req: HttpRequest, config: web::Data<Config>) -> HttpResponse {
    let username = auth::current_username(&req, &config);
    views::html(views::home_page(&COUNTRIES, username.as_deref()))
}

#[get("/index")]
pub async fn prediction_form(req: HttpRequest, config: web::Data<Config>) -> HttpResponse {
    let username = auth::current_username(&req, &config);
    views::html(views::index_page(&COUNTRIES, username.as_deref(), None))
}

#[post("/index")]
pub async fn predict(
    req: HttpRequest,
    config: web::Data<Config>,
    predictor: web::Data<Predictor>,
    body: web::Bytes,
) -> HttpResponse {
    let username = auth::current_username(&req, &config);

    // decoded here so a bad body is reported on the page like any other input error
    let outcome =
        PredictionInput::from_body(&body).and_then(|input| predictor.predict(&input));

    let result = match outcome {
        Ok(rate) => {
            tracing::info!(rate, "Prediction served");
            prediction_sentence(rate)
        }
        Err(e) => {
            tracing::warn!("Prediction failed: {}", e);
            format!("Error in prediction: {}", e)
        }
    };

    views::html(views::index_page(
        &COUNTRIES,
        username.as_deref(),
        Some(&result),
    ))
}
