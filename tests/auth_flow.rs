use actix_web::{http::StatusCode, http::header, test};

mod common;
use common::{TestContext, test_data};
use suicide_rate_web::{auth, db};

async fn body_text(resp: actix_web::dev::ServiceResponse) -> String {
    let bytes = test::read_body(resp).await;
    String::from_utf8(bytes.to_vec()).expect("body is utf-8")
}

fn location(resp: &actix_web::dev::ServiceResponse) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

#[actix_web::test]
async fn test_register_redirects_to_login() {
    let ctx = TestContext::new().await;
    let app = test::init_service(ctx.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/register")
        .set_form(test_data::register_form("ana", "ana@example.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/login");

    let user = db::get_user_by_username(&ctx.pool, "ana")
        .await
        .unwrap()
        .expect("user persisted");
    assert_eq!(user.email, "ana@example.com");
    assert_ne!(user.password_hash, "correct-horse");
}

#[actix_web::test]
async fn test_register_duplicate_username_keeps_one_row() {
    let ctx = TestContext::new().await;
    let app = test::init_service(ctx.create_app()).await;

    for email in ["ana@example.com", "other@example.com"] {
        let req = test::TestRequest::post()
            .uri("/register")
            .set_form(test_data::register_form("ana", email))
            .to_request();
        let resp = test::call_service(&app, req).await;

        if email == "other@example.com" {
            assert_eq!(resp.status(), StatusCode::OK);
            let body = body_text(resp).await;
            assert!(body.contains(auth::USERNAME_TAKEN));
        }
    }

    assert_eq!(db::count_users(&ctx.pool).await.unwrap(), 1);
}

#[actix_web::test]
async fn test_register_duplicate_email_is_a_form_message() {
    let ctx = TestContext::new().await;
    let app = test::init_service(ctx.create_app()).await;

    let first = test::TestRequest::post()
        .uri("/register")
        .set_form(test_data::register_form("ana", "shared@example.com"))
        .to_request();
    test::call_service(&app, first).await;

    let second = test::TestRequest::post()
        .uri("/register")
        .set_form(test_data::register_form("bob", "shared@example.com"))
        .to_request();
    let resp = test::call_service(&app, second).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains(auth::EMAIL_TAKEN));
    assert_eq!(db::count_users(&ctx.pool).await.unwrap(), 1);
}

#[actix_web::test]
async fn test_login_sets_session_and_logout_clears_it() {
    let ctx = TestContext::new().await;
    let app = test::init_service(ctx.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/register")
        .set_form(test_data::register_form("ana", "ana@example.com"))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/login")
        .set_form(test_data::login_form("ana@example.com", "correct-horse"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/index");

    let session = resp
        .response()
        .cookies()
        .find(|c| c.name() == auth::SESSION_COOKIE)
        .expect("session cookie set")
        .into_owned();
    assert_eq!(
        auth::verify_session(&ctx.config, session.value()).as_deref(),
        Some("ana")
    );

    // the session is visible on subsequent pages
    let req = test::TestRequest::get()
        .uri("/index")
        .cookie(session.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(body_text(resp).await.contains("Logged in as ana"));

    let req = test::TestRequest::get()
        .uri("/logout")
        .cookie(session)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");

    let cleared = resp
        .response()
        .cookies()
        .find(|c| c.name() == auth::SESSION_COOKIE)
        .expect("removal cookie set");
    assert_eq!(cleared.value(), "");
}

#[actix_web::test]
async fn test_login_wrong_password_shows_message() {
    let ctx = TestContext::new().await;
    let app = test::init_service(ctx.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/register")
        .set_form(test_data::register_form("ana", "ana@example.com"))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/login")
        .set_form(test_data::login_form("ana@example.com", "wrong"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.response().cookies().next().is_none());
    assert!(body_text(resp).await.contains(auth::INVALID_CREDENTIALS));
}

#[actix_web::test]
async fn test_login_unknown_email_shows_message() {
    let ctx = TestContext::new().await;
    let app = test::init_service(ctx.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/login")
        .set_form(test_data::login_form("nobody@example.com", "whatever"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains(auth::INVALID_CREDENTIALS));
}

#[actix_web::test]
async fn test_forged_session_is_ignored() {
    let ctx = TestContext::new().await;
    let app = test::init_service(ctx.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/")
        .cookie(actix_web::cookie::Cookie::new(auth::SESSION_COOKIE, "forged"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(!body_text(resp).await.contains("Logged in as"));
}

#[actix_web::test]
async fn test_form_pages_render() {
    let ctx = TestContext::new().await;
    let app = test::init_service(ctx.create_app()).await;

    for (uri, marker) in [
        ("/", "Supported countries"),
        ("/register", r#"action="/register""#),
        ("/login", r#"action="/login""#),
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "{}", uri);
        assert!(body_text(resp).await.contains(marker), "{}", uri);
    }
}
