// src/auth.rs
use crate::config::Config;
use crate::db;
use crate::error::AppError;
use crate::models::{LoginForm, RegisterForm, SessionClaims};
use crate::views;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{HttpRequest, HttpResponse, get, http::header, post, web};
use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use sqlx::SqlitePool;

pub const SESSION_COOKIE: &str = "session";

pub const USERNAME_TAKEN: &str = "Username already exists.";
pub const EMAIL_TAKEN: &str = "Email already registered.";
pub const INVALID_CREDENTIALS: &str = "Invalid credentials.";

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(register_form);
    cfg.service(register);
    cfg.service(login_form);
    cfg.service(login);
    cfg.service(logout);
}

pub fn sign_session(config: &Config, username: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let expiration = Utc::now() + Duration::hours(config.session_ttl_hours);
    let claims = SessionClaims {
        sub: username.to_string(),
        exp: expiration.timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.session_secret.as_ref()),
    )
}

pub fn verify_session(config: &Config, token: &str) -> Option<String> {
    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(config.session_secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims.sub)
    .ok()
}

/// Username stored in the session cookie, if the cookie is present and valid.
pub fn current_username(req: &HttpRequest, config: &Config) -> Option<String> {
    req.cookie(SESSION_COOKIE)
        .and_then(|cookie| verify_session(config, cookie.value()))
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

#[get("/register")]
pub async fn register_form() -> HttpResponse {
    views::html(views::register_page(None))
}

#[post("/register")]
pub async fn register(
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    form: web::Form<RegisterForm>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();

    if db::get_user_by_username(&pool, &form.username)
        .await?
        .is_some()
    {
        tracing::warn!(username = %form.username, "Registration rejected: username taken");
        return Ok(views::html(views::register_page(Some(USERNAME_TAKEN))));
    }
    if db::get_user_by_email(&pool, &form.email).await?.is_some() {
        tracing::warn!(email = %form.email, "Registration rejected: email taken");
        return Ok(views::html(views::register_page(Some(EMAIL_TAKEN))));
    }

    let password_hash = hash(&form.password, config.bcrypt_cost)?;

    match db::create_user(&pool, &form.username, &form.email, &password_hash).await {
        Ok(id) => {
            tracing::info!(user_id = id, username = %form.username, "User registered");
            Ok(redirect("/login"))
        }
        // lost a race with a concurrent registration
        Err(e) if db::is_unique_violation(&e) => {
            tracing::warn!("Registration rejected by unique constraint: {}", e);
            let message = match db::get_user_by_username(&pool, &form.username).await? {
                Some(_) => USERNAME_TAKEN,
                None => EMAIL_TAKEN,
            };
            Ok(views::html(views::register_page(Some(message))))
        }
        Err(e) => Err(e.into()),
    }
}

#[get("/login")]
pub async fn login_form() -> HttpResponse {
    views::html(views::login_page(None))
}

#[post("/login")]
pub async fn login(
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, AppError> {
    let user = db::get_user_by_email(&pool, &form.email).await?;

    let user = match user {
        Some(user) => match verify(&form.password, &user.password_hash) {
            Ok(true) => user,
            Ok(false) | Err(_) => {
                tracing::warn!(email = %form.email, "Login failed: wrong password");
                return Ok(views::html(views::login_page(Some(INVALID_CREDENTIALS))));
            }
        },
        None => {
            tracing::warn!(email = %form.email, "Login failed: unknown email");
            return Ok(views::html(views::login_page(Some(INVALID_CREDENTIALS))));
        }
    };

    let token = sign_session(&config, &user.username)?;
    let cookie = Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish();

    tracing::info!(user_id = user.id, username = %user.username, "User logged in");
    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, "/index"))
        .cookie(cookie)
        .finish())
}

#[get("/logout")]
pub async fn logout(req: HttpRequest, config: web::Data<Config>) -> HttpResponse {
    if let Some(username) = current_username(&req, &config) {
        tracing::info!(username = %username, "User logged out");
    }
    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();
    HttpResponse::Found()
        .insert_header((header::LOCATION, "/"))
        .cookie(cookie)
        .finish()
}
