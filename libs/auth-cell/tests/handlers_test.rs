use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tower::ServiceExt;

use auth_cell::{doctor_routes, user_routes, AccountService, AuthState};
use notification_cell::{NewAccountNotice, NotificationDispatcher};
use security_cell::{CredentialHasher, FieldCipher, ValidationService};
use shared_database::InMemoryStore;
use shared_models::auth::ActivationClaims;
use shared_utils::test_utils::{JwtTestUtils, TestConfig};
use shared_utils::{TokenService, ACTIVATION_TOKEN_TTL};

struct TestApp {
    users: Router,
    doctors: Router,
    tokens: Arc<TokenService>,
    _notices: mpsc::UnboundedReceiver<NewAccountNotice>,
}

fn create_test_app() -> TestApp {
    let config = TestConfig::default();
    let (sender, notices) = mpsc::unbounded_channel();
    let tokens = config.token_service();

    let accounts = AccountService::new(
        Arc::new(InMemoryStore::new()),
        CredentialHasher::with_memory(config.hash_cost, 64).unwrap(),
        Arc::new(FieldCipher::new(&config.cipher_key).unwrap()),
        tokens.clone(),
        NotificationDispatcher::new(sender),
    );
    let state = AuthState {
        accounts: Arc::new(accounts),
        validator: ValidationService::new().unwrap(),
    };

    TestApp {
        users: user_routes(state.clone()),
        doctors: doctor_routes(state),
        tokens,
        _notices: notices,
    }
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn user_body(email: &str, phone: &str) -> Value {
    json!({
        "name": "Ahmed Ali",
        "email": email,
        "phone": phone,
        "password": "Secret123",
        "confirmPassword": "Secret123"
    })
}

fn activation_token(tokens: &TokenService, email: &str) -> String {
    tokens
        .issue(&ActivationClaims { email: email.to_string() }, ACTIVATION_TOKEN_TTL)
        .unwrap()
}

#[tokio::test]
async fn test_register_user_created() {
    let app = create_test_app();

    let (status, body) = send(&app.users, "POST", "/register", Some(user_body("a@x.com", "5550001234"))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(
        body["message"],
        "User registered successfully. Please check your email to activate your account."
    );
}

#[tokio::test]
async fn test_register_user_trims_input() {
    let app = create_test_app();
    let body = json!({
        "name": "  Ahmed Ali ",
        "email": " a@x.com ",
        "phone": "5550001234 ",
        "password": "Secret123",
        "confirmPassword": "Secret123"
    });

    let (status, _) = send(&app.users, "POST", "/register", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app.users, "POST", "/register", Some(user_body("a@x.com", "5550009999"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Account already exists with this email");
}

#[tokio::test]
async fn test_register_user_reports_all_validation_errors() {
    let app = create_test_app();
    let body = json!({
        "name": "A",
        "email": "not-an-email",
        "password": "weak",
        "confirmPassword": "different"
    });

    let (status, body) = send(&app.users, "POST", "/register", Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Validation failed");
    let errors = body["errors"].as_array().unwrap();
    assert!(errors.len() >= 5);
    assert!(errors.contains(&json!("\"phone\" is required")));
}

#[tokio::test]
async fn test_duplicate_phone_is_conflict() {
    let app = create_test_app();
    send(&app.users, "POST", "/register", Some(user_body("a@x.com", "5550001234"))).await;

    let (status, body) = send(&app.users, "POST", "/register", Some(user_body("b@x.com", "5550001234"))).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Account already exists with this phone number");
}

#[tokio::test]
async fn test_user_lifecycle_over_http() {
    let app = create_test_app();
    send(&app.users, "POST", "/register", Some(user_body("a@x.com", "5550001234"))).await;
    let login = json!({ "emailOrPhone": "a@x.com", "password": "Secret123" });

    let (status, body) = send(&app.users, "POST", "/login", Some(login.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        "Please activate your account first. Check your email for activation link."
    );

    let token = activation_token(&app.tokens, "a@x.com");
    let (status, body) = send(&app.users, "GET", &format!("/activate_account/{}", token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Account activated successfully! You can now login.");

    let (status, body) = send(&app.users, "POST", "/login", Some(login)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User logged in successfully");
    assert_eq!(body["user"]["email"], "a@x.com");
    assert_eq!(body["user"]["phone"], "5550001234");
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["token"].as_str().unwrap().split('.').count() == 3);
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let app = create_test_app();
    send(&app.users, "POST", "/register", Some(user_body("a@x.com", "5550001234"))).await;
    let token = activation_token(&app.tokens, "a@x.com");
    send(&app.users, "GET", &format!("/activate_account/{}", token), None).await;

    let (status, body) = send(
        &app.users,
        "POST",
        "/login",
        Some(json!({ "emailOrPhone": "5550001234", "password": "Wrong1234" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email/phone or password");
}

#[tokio::test]
async fn test_login_requires_identifier() {
    let app = create_test_app();

    let (status, body) = send(&app.users, "POST", "/login", Some(json!({ "password": "Secret123" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"], json!(["\"emailOrPhone\" is required"]));
}

#[tokio::test]
async fn test_activation_with_bad_tokens() {
    let app = create_test_app();
    let config = TestConfig::default();

    for token in [
        JwtTestUtils::create_malformed_token(),
        "garbage".to_string(),
        activation_token(&TokenService::new("other-secret"), "a@x.com"),
    ] {
        let (status, body) = send(&app.users, "GET", &format!("/activate_account/{}", token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "token {}", token);
        assert_eq!(body["message"], "Invalid or expired activation token");
    }

    let token = activation_token(&TokenService::new(&config.token_secret), "nobody@x.com");
    let (status, _) = send(&app.users, "GET", &format!("/activate_account/{}", token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_doctor_registration_and_directory() {
    let app = create_test_app();
    let body = json!({
        "name": "Sara Hassan",
        "email": "doc@x.com",
        "phone": "5550009999",
        "password": "Secret123",
        "confirmPassword": "Secret123",
        "specialty": "Cardiology",
        "description": "Heart specialist with a decade of practice",
        "experience_years": "10",
        "image": "sara.png"
    });

    let (status, body) = send(&app.doctors, "POST", "/add", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body["message"],
        "Doctor registered successfully. Please check your email to activate your account."
    );

    let (status, body) = send(&app.doctors, "GET", "/one_doctor/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["doctor"],
        json!({
            "id": 1,
            "name": "Sara Hassan",
            "email": "doc@x.com",
            "phone": "5550009999",
            "specialty": "Cardiology",
            "description": "Heart specialist with a decade of practice",
            "experience_years": 10,
            "image": "sara.png",
            "isActive": false
        })
    );

    let (status, body) = send(&app.doctors, "GET", "/all_doctors", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["doctors"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app.doctors, "GET", "/one_doctor/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Doctor not found");
}

#[tokio::test]
async fn test_doctor_login_includes_profile() {
    let app = create_test_app();
    let body = json!({
        "name": "Sara Hassan",
        "email": "doc@x.com",
        "phone": "5550009999",
        "password": "Secret123",
        "confirmPassword": "Secret123",
        "specialty": "Cardiology",
        "description": "Heart specialist with a decade of practice",
        "experience_years": 10
    });
    send(&app.doctors, "POST", "/add", Some(body)).await;
    let token = activation_token(&app.tokens, "doc@x.com");
    send(&app.doctors, "GET", &format!("/activate_account/{}", token), None).await;

    let (status, body) = send(
        &app.doctors,
        "POST",
        "/login",
        Some(json!({ "emailOrPhone": "doc@x.com", "password": "Secret123" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Doctor logged in successfully");
    assert_eq!(body["doctor"]["specialty"], "Cardiology");
    assert_eq!(body["doctor"]["image"], Value::Null);
}

#[tokio::test]
async fn test_doctor_registration_validates_profile() {
    let app = create_test_app();
    let body = json!({
        "name": "Sara Hassan",
        "email": "doc@x.com",
        "phone": "5550009999",
        "password": "Secret123",
        "confirmPassword": "Secret123",
        "specialty": "EN",
        "description": "short",
        "experience_years": 75
    });

    let (status, body) = send(&app.doctors, "POST", "/add", Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_user_directory() {
    let app = create_test_app();
    send(&app.users, "POST", "/register", Some(user_body("a@x.com", "5550001234"))).await;

    let (status, body) = send(&app.users, "GET", "/all_users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["users"],
        json!([{ "id": 1, "name": "Ahmed Ali", "email": "a@x.com", "phone": "5550001234" }])
    );

    let (status, body) = send(&app.users, "GET", "/one_user/7", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Account not found");
}

#[tokio::test]
async fn test_wrong_json_types_are_reported_with_other_field_errors() {
    let app = create_test_app();
    let body = json!({
        "name": 5,
        "email": "bad",
        "phone": "5550001234",
        "password": "Secret123",
        "confirmPassword": "Secret123"
    });

    let (status, body) = send(&app.users, "POST", "/register", Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Validation failed");
    assert_eq!(
        body["errors"],
        json!(["\"name\" must be a string", "\"email\" must be a valid email"])
    );
}

#[tokio::test]
async fn test_unreadable_bodies_get_json_errors() {
    let app = create_test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/login")
        .body(Body::from(r#"{"emailOrPhone": "a@x.com", "password": "Secret123"}"#))
        .unwrap();
    let response = app.users.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);

    let request = Request::builder()
        .method("POST")
        .uri("/register")
        .header("content-type", "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let response = app.users.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["errors"], json!(["Request body is not valid JSON"]));
}

#[tokio::test]
async fn test_experience_years_accepts_integral_float() {
    let app = create_test_app();
    let mut body = json!({
        "name": "Sara Hassan",
        "email": "doc@x.com",
        "phone": "5550009999",
        "password": "Secret123",
        "confirmPassword": "Secret123",
        "specialty": "Cardiology",
        "description": "Heart specialist with a decade of practice",
        "experience_years": 10.0
    });

    let (status, _) = send(&app.doctors, "POST", "/add", Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    body["email"] = json!("doc2@x.com");
    body["phone"] = json!("5550008888");
    body["experience_years"] = json!("ten");
    let (status, response) = send(&app.doctors, "POST", "/add", Some(body.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["errors"], json!(["\"experience_years\" must be a number"]));

    body["experience_years"] = json!(2.5);
    let (_, response) = send(&app.doctors, "POST", "/add", Some(body)).await;
    assert_eq!(response["errors"], json!(["\"experience_years\" must be an integer"]));
}
