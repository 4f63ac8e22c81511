use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use appointment_cell::{appointment_routes, AppointmentService, AppointmentState};
use security_cell::{FieldCipher, ValidationService};
use shared_database::{ClinicStore, InMemoryStore};
use shared_models::identity::{AccountKind, DoctorProfile, NewIdentity};
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

struct TestApp {
    router: Router,
    secret: String,
    doctor_id: i64,
}

async fn create_test_app() -> TestApp {
    let config = TestConfig::default();
    let store = Arc::new(InMemoryStore::new());
    let cipher = Arc::new(FieldCipher::new(&config.cipher_key).unwrap());

    let doctor = store
        .insert_identity(NewIdentity {
            kind: AccountKind::Doctor,
            name: "Sara Hassan".into(),
            email: "doc@x.com".into(),
            phone: cipher.encrypt("5550009999").unwrap(),
            password_hash: "hash".into(),
            role: None,
            doctor: Some(DoctorProfile {
                specialty: "Cardiology".into(),
                description: "Heart specialist".into(),
                experience_years: 10,
                image: None,
            }),
        })
        .await
        .unwrap();

    let state = AppointmentState {
        appointments: Arc::new(AppointmentService::new(store, cipher)),
        validator: ValidationService::new().unwrap(),
    };

    TestApp {
        router: appointment_routes(state, config.token_service()),
        secret: config.token_secret,
        doctor_id: doctor.id,
    }
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
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
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn patient_token(app: &TestApp, id: i64) -> String {
    JwtTestUtils::create_test_token(&TestUser::patient("p@x.com").with_id(id), &app.secret, None)
}

#[tokio::test]
async fn test_routes_require_token() {
    let app = create_test_app().await;

    let (status, body) = send(&app.router, "GET", "/my_appointments", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Authorization token is required");

    let expired = JwtTestUtils::create_expired_token(&TestUser::default(), &app.secret);
    let (status, body) = send(&app.router, "GET", "/my_appointments", Some(&expired), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or expired token");

    let forged = JwtTestUtils::create_invalid_signature_token(&TestUser::default());
    let (status, _) = send(&app.router, "DELETE", "/cancel/1", Some(&forged), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_doctor_tokens_cannot_book() {
    let app = create_test_app().await;
    let token = JwtTestUtils::create_test_token(&TestUser::doctor("doc@x.com"), &app.secret, None);

    let (status, body) = send(
        &app.router,
        "POST",
        "/createApointment",
        Some(&token),
        Some(json!({ "doctor_id": app.doctor_id, "date": "2025-12-15", "reason": "Checkup visit" })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Not authorized");
}

#[tokio::test]
async fn test_book_list_cancel_over_http() {
    let app = create_test_app().await;
    let token = patient_token(&app, 7);

    let (status, body) = send(
        &app.router,
        "POST",
        "/createApointment",
        Some(&token),
        Some(json!({ "doctor_id": app.doctor_id, "date": "2025-12-15T10:30:00Z", "reason": "Checkup visit" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Appointment created successfully");
    assert_eq!(
        body["appointment"],
        json!({
            "id": 1,
            "user_id": 7,
            "doctor_id": app.doctor_id,
            "date": "2025-12-15 10:30:00",
            "reason": "Checkup visit",
            "status": "scheduled"
        })
    );

    let (status, body) = send(&app.router, "GET", "/my_appointments", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["appointments"][0]["reason"], "Checkup visit");

    let (status, body) = send(&app.router, "DELETE", "/cancel/1", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Appointment cancelled successfully");

    let (_, body) = send(&app.router, "GET", "/my_appointments", Some(&token), None).await;
    assert_eq!(body["appointments"][0]["status"], "cancelled");
}

#[tokio::test]
async fn test_other_patient_cannot_cancel() {
    let app = create_test_app().await;
    let owner = patient_token(&app, 7);
    let other = patient_token(&app, 8);
    send(
        &app.router,
        "POST",
        "/createApointment",
        Some(&owner),
        Some(json!({ "doctor_id": app.doctor_id, "date": "2025-12-15", "reason": "Checkup visit" })),
    )
    .await;

    let (status, body) = send(&app.router, "DELETE", "/cancel/1", Some(&other), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Appointment not found");

    let (_, body) = send(&app.router, "GET", "/my_appointments", Some(&owner), None).await;
    assert_eq!(body["appointments"][0]["status"], "scheduled");
}

#[tokio::test]
async fn test_missing_fields_and_unknown_doctor() {
    let app = create_test_app().await;
    let token = patient_token(&app, 7);

    let (status, body) = send(
        &app.router,
        "POST",
        "/createApointment",
        Some(&token),
        Some(json!({ "doctor_id": app.doctor_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing fields: doctor_id, date, and reason are required");

    let (status, body) = send(
        &app.router,
        "POST",
        "/createApointment",
        Some(&token),
        Some(json!({ "doctor_id": "999", "date": "2025-12-15", "reason": "Checkup visit" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Doctor not found");
}

#[tokio::test]
async fn test_malformed_fields_are_validation_errors() {
    let app = create_test_app().await;
    let token = patient_token(&app, 7);

    let (status, body) = send(
        &app.router,
        "POST",
        "/createApointment",
        Some(&token),
        Some(json!({ "doctor_id": "abc", "date": "someday", "reason": "ow" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation failed");
    assert_eq!(body["errors"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_integral_float_doctor_id_books() {
    let app = create_test_app().await;
    let token = patient_token(&app, 7);

    let (status, body) = send(
        &app.router,
        "POST",
        "/createApointment",
        Some(&token),
        Some(json!({ "doctor_id": app.doctor_id as f64, "date": "2025-12-15", "reason": "Checkup visit" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["appointment"]["doctor_id"], app.doctor_id);
}

#[tokio::test]
async fn test_wrong_json_types_are_validation_errors() {
    let app = create_test_app().await;
    let token = patient_token(&app, 7);

    let (status, body) = send(
        &app.router,
        "POST",
        "/createApointment",
        Some(&token),
        Some(json!({ "doctor_id": true, "date": 20251215, "reason": "Checkup visit" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["errors"],
        json!(["\"date\" must be a string", "\"doctor_id\" must be a number"])
    );
}
