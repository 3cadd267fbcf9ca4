// src/main.rs
use actix_web::{App, HttpServer, middleware::Logger, web};
use suicide_rate_web::{config, configure_routes, db, logging, ml};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    logging::init();

    tracing::info!("Starting suicide rate prediction service");

    let config = config::Config::from_env().expect("Failed to load config from environment");

    let pool = db::connect(&config.database_url)
        .await
        .expect("Failed to open SQLite database");
    db::init_schema(&pool)
        .await
        .expect("Failed to create user table");

    let predictor = ml::Predictor::load(&config.artifact_dir)
        .await
        .expect("Failed to load model artifacts");

    let pool = web::Data::new(pool);
    let predictor = web::Data::new(predictor);
    let bind = (config.host.clone(), config.port);
    let config = web::Data::new(config);

    tracing::info!("Listening on {}:{}", bind.0, bind.1);
    HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .app_data(predictor.clone())
            .app_data(config.clone())
            .wrap(Logger::default())
            .configure(configure_routes)
    })
    .bind(bind)?
    .run()
    .await
}
