use axum::{
    extract::{Extension, Json, Path, State},
    http::StatusCode,
};
use serde_json::{json, Value};

use shared_models::auth::SessionClaims;
use shared_models::error::AppError;
use shared_utils::extractor::require_admin;
use shared_utils::JsonBody;

use crate::models::DepartmentRequest;
use crate::router::DepartmentState;

pub async fn add_department(
    State(state): State<DepartmentState>,
    Extension(caller): Extension<SessionClaims>,
    body: JsonBody<DepartmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    // Role gate before looking at the body.
    require_admin(&caller)?;
    let request = body.value.sanitized();

    state
        .validator
        .check()
        .mistyped(&body.mistyped, "string")
        .required("name", request.name.as_deref())
        .finish()?;
    let department = request
        .into_new()
        .ok_or_else(|| AppError::Validation(vec!["\"name\" is required".to_string()]))?;

    state.departments.add(&caller, department).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Department added successfully"
        })),
    ))
}

pub async fn list_departments(State(state): State<DepartmentState>) -> Result<Json<Value>, AppError> {
    let departments = state.departments.list().await?;
    Ok(Json(json!({ "success": true, "data": departments })))
}

pub async fn get_department(
    State(state): State<DepartmentState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let department = state.departments.get(id).await?;
    Ok(Json(json!({ "success": true, "data": department })))
}

pub async fn update_department(
    State(state): State<DepartmentState>,
    Extension(caller): Extension<SessionClaims>,
    Path(id): Path<i64>,
    body: JsonBody<DepartmentRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&caller)?;
    state
        .validator
        .check()
        .mistyped(&body.mistyped, "string")
        .finish()?;

    state
        .departments
        .update(&caller, id, body.value.sanitized().into_changes())
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Department updated successfully"
    })))
}

pub async fn delete_department(
    State(state): State<DepartmentState>,
    Extension(caller): Extension<SessionClaims>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    state.departments.delete(&caller, id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Department deleted successfully"
    })))
}
