use axum::{
    extract::{Extension, Json, Path, State},
    http::StatusCode,
};
use serde_json::{json, Value};

use shared_models::auth::SessionClaims;
use shared_models::error::AppError;
use shared_utils::extractor::require_patient;
use shared_utils::JsonBody;

use crate::models::{BookingRequest, CreateAppointmentRequest};
use crate::router::AppointmentState;

pub async fn create_appointment(
    State(state): State<AppointmentState>,
    Extension(caller): Extension<SessionClaims>,
    body: JsonBody<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_patient(&caller)?;
    let request = body.value.sanitized();
    let doctor_id = request.doctor_id();

    // Absent fields are left to the workflow, which reports them together.
    let mut check = state.validator.check();
    check.mistyped(&body.mistyped, "string");
    if let Some(problem) = doctor_id.problem() {
        check.invalid("doctor_id", problem);
    }
    check
        .optional_positive_id("doctor_id", doctor_id.value())
        .optional_date("date", request.date.as_deref())
        .optional_text("reason", request.reason.as_deref(), 5, 500);
    check.finish()?;

    let appointment = state
        .appointments
        .book(
            caller.id,
            BookingRequest {
                doctor_id: doctor_id.value(),
                date: request.date,
                reason: request.reason,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Appointment created successfully",
            "appointment": appointment
        })),
    ))
}

pub async fn my_appointments(
    State(state): State<AppointmentState>,
    Extension(caller): Extension<SessionClaims>,
) -> Result<Json<Value>, AppError> {
    require_patient(&caller)?;

    let appointments = state.appointments.list_for_caller(caller.id).await?;

    Ok(Json(json!({
        "success": true,
        "appointments": appointments
    })))
}

pub async fn cancel_appointment(
    State(state): State<AppointmentState>,
    Extension(caller): Extension<SessionClaims>,
    Path(appointment_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    require_patient(&caller)?;

    state.appointments.cancel(caller.id, appointment_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment cancelled successfully"
    })))
}
