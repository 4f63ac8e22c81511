use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use serde_json::{json, Value};
use tracing::debug;

use shared_models::error::AppError;
use shared_models::identity::{AccountKind, DoctorProfile};
use shared_utils::JsonBody;

use crate::models::{LoginRequest, RegisterDoctorRequest, RegisterUserRequest, Registration};
use crate::router::AuthState;

// ==============================================================================
// REGISTRATION
// ==============================================================================

pub async fn register_user(
    State(state): State<AuthState>,
    body: JsonBody<RegisterUserRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let request = body.value.sanitized();

    state
        .validator
        .check()
        .mistyped(&body.mistyped, "string")
        .name("name", request.name.as_deref())
        .email("email", request.email.as_deref())
        .phone("phone", request.phone.as_deref())
        .password("password", request.password.as_deref())
        .matches(
            "confirmPassword",
            request.confirm_password.as_deref(),
            "password",
            request.password.as_deref(),
        )
        .finish()?;

    let registration = Registration {
        kind: AccountKind::Patient,
        name: request.name.unwrap_or_default(),
        email: request.email.unwrap_or_default(),
        phone: request.phone.unwrap_or_default(),
        password: request.password.unwrap_or_default(),
        doctor: None,
    };
    state.accounts.register(registration).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "User registered successfully. Please check your email to activate your account."
        })),
    ))
}

pub async fn register_doctor(
    State(state): State<AuthState>,
    body: JsonBody<RegisterDoctorRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let request = body.value.sanitized();
    let experience_years = request.experience_years();

    let mut check = state.validator.check();
    check.mistyped(&body.mistyped, "string");
    if let Some(problem) = experience_years.problem() {
        check.invalid("experience_years", problem);
    }
    check
        .name("name", request.name.as_deref())
        .email("email", request.email.as_deref())
        .phone("phone", request.phone.as_deref())
        .password("password", request.password.as_deref())
        .matches(
            "confirmPassword",
            request.confirm_password.as_deref(),
            "password",
            request.password.as_deref(),
        )
        .text("specialty", request.specialty.as_deref(), 3, 100)
        .text("description", request.description.as_deref(), 10, 500)
        .integer_in("experience_years", experience_years.value(), 0, 60);
    check.finish()?;

    let registration = Registration {
        kind: AccountKind::Doctor,
        name: request.name.unwrap_or_default(),
        email: request.email.unwrap_or_default(),
        phone: request.phone.unwrap_or_default(),
        password: request.password.unwrap_or_default(),
        doctor: Some(DoctorProfile {
            specialty: request.specialty.unwrap_or_default(),
            description: request.description.unwrap_or_default(),
            // Range checked above.
            experience_years: experience_years.value().unwrap_or_default() as i32,
            image: request.image,
        }),
    };
    state.accounts.register(registration).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Doctor registered successfully. Please check your email to activate your account."
        })),
    ))
}

// ==============================================================================
// LOGIN & ACTIVATION
// ==============================================================================

async fn login_as(
    state: AuthState,
    kind: AccountKind,
    body: JsonBody<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let request = body.value.sanitized();

    state
        .validator
        .check()
        .mistyped(&body.mistyped, "string")
        .email_or_phone("emailOrPhone", request.email_or_phone.as_deref())
        .required("password", request.password.as_deref())
        .finish()?;

    let outcome = state
        .accounts
        .login(
            kind,
            request.email_or_phone.as_deref().unwrap_or_default(),
            request.password.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("{} logged in successfully", kind.label()),
        kind.path_segment(): outcome.account,
        "token": outcome.token,
    })))
}

pub async fn login_user(
    State(state): State<AuthState>,
    body: JsonBody<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    login_as(state, AccountKind::Patient, body).await
}

pub async fn login_doctor(
    State(state): State<AuthState>,
    body: JsonBody<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    login_as(state, AccountKind::Doctor, body).await
}

async fn activate_as(state: AuthState, kind: AccountKind, token: String) -> Result<Json<Value>, AppError> {
    let token = token.trim();
    debug!("Activation requested for {} account", kind);

    // A token that cannot even be a JWT is reported like any other bad token.
    state
        .validator
        .check()
        .token("token", token)
        .finish()
        .map_err(|_| AppError::InvalidActivationToken)?;

    state.accounts.activate(kind, token).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Account activated successfully! You can now login."
    })))
}

pub async fn activate_user(
    State(state): State<AuthState>,
    Path(token): Path<String>,
) -> Result<Json<Value>, AppError> {
    activate_as(state, AccountKind::Patient, token).await
}

pub async fn activate_doctor(
    State(state): State<AuthState>,
    Path(token): Path<String>,
) -> Result<Json<Value>, AppError> {
    activate_as(state, AccountKind::Doctor, token).await
}

// ==============================================================================
// DIRECTORY
// ==============================================================================

pub async fn get_user(State(state): State<AuthState>, Path(id): Path<i64>) -> Result<Json<Value>, AppError> {
    let user = state.accounts.get_account(AccountKind::Patient, id).await?;
    Ok(Json(json!({ "success": true, "user": user })))
}

pub async fn list_users(State(state): State<AuthState>) -> Result<Json<Value>, AppError> {
    let users = state.accounts.list_accounts(AccountKind::Patient).await?;
    Ok(Json(json!({ "success": true, "users": users })))
}

pub async fn get_doctor(State(state): State<AuthState>, Path(id): Path<i64>) -> Result<Json<Value>, AppError> {
    let doctor = state.accounts.get_account(AccountKind::Doctor, id).await?;
    Ok(Json(json!({ "success": true, "doctor": doctor })))
}

pub async fn list_doctors(State(state): State<AuthState>) -> Result<Json<Value>, AppError> {
    let doctors = state.accounts.list_accounts(AccountKind::Doctor).await?;
    Ok(Json(json!({ "success": true, "doctors": doctors })))
}
