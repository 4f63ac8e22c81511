use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use shared_models::error::AppError;

/// Request bodies that declare their string fields, so a value of the wrong
/// JSON type is reported as a field message instead of failing the whole
/// body.
pub trait TextFields {
    const TEXT_FIELDS: &'static [&'static str];
}

/// JSON body extractor whose failures render like every other
/// `AppError::Validation`. Declared string fields that arrive with another
/// JSON type are removed from the body and listed in `mistyped`, leaving
/// the handler to report them next to its own rules.
#[derive(Debug)]
pub struct JsonBody<T> {
    pub value: T,
    pub mistyped: Vec<&'static str>,
}

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + TextFields,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(mut body) = Json::<Value>::from_request(req, state)
            .await
            .map_err(rejection_error)?;

        let Some(object) = body.as_object_mut() else {
            return Err(AppError::Validation(vec![
                "Request body must be a JSON object".to_string(),
            ]));
        };

        let mistyped: Vec<&'static str> = T::TEXT_FIELDS
            .iter()
            .copied()
            .filter(|field| matches!(object.get(*field), Some(value) if !value.is_string() && !value.is_null()))
            .collect();
        for field in &mistyped {
            object.remove(*field);
        }

        let value = serde_json::from_value(body).map_err(|e| {
            debug!("Request body has an unexpected shape: {}", e);
            AppError::Validation(vec!["Request body has an unexpected shape".to_string()])
        })?;

        Ok(Self { value, mistyped })
    }
}

fn rejection_error(rejection: JsonRejection) -> AppError {
    debug!("Rejected request body: {}", rejection.body_text());

    let message = match rejection {
        JsonRejection::MissingJsonContentType(_) => "Expected request with `Content-Type: application/json`",
        JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON",
        _ => "Request body could not be read",
    };
    AppError::Validation(vec![message.to_string()])
}

/// A body value that should hold an integer. Integral floats (`10.0`) and
/// numeric strings count as integers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IntegerField {
    Absent,
    Valid(i64),
    NotInteger,
    NotNumber,
}

impl IntegerField {
    pub fn read(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => IntegerField::Absent,
            Some(Value::Number(number)) => match number.as_i64() {
                Some(integer) => IntegerField::Valid(integer),
                None => number.as_f64().map_or(IntegerField::NotNumber, integral),
            },
            Some(Value::String(raw)) => {
                let raw = raw.trim();
                if let Ok(integer) = raw.parse::<i64>() {
                    IntegerField::Valid(integer)
                } else {
                    raw.parse::<f64>().map_or(IntegerField::NotNumber, integral)
                }
            }
            Some(_) => IntegerField::NotNumber,
        }
    }

    pub fn value(&self) -> Option<i64> {
        match self {
            IntegerField::Valid(integer) => Some(*integer),
            _ => None,
        }
    }

    /// Message for a value that is present but unusable.
    pub fn problem(&self) -> Option<&'static str> {
        match self {
            IntegerField::NotInteger => Some("must be an integer"),
            IntegerField::NotNumber => Some("must be a number"),
            _ => None,
        }
    }
}

fn integral(number: f64) -> IntegerField {
    // Bounds keep the cast exact.
    if number.is_finite() && number.fract() == 0.0 && number.abs() < 9_007_199_254_740_992.0 {
        IntegerField::Valid(number as i64)
    } else if number.is_finite() {
        IntegerField::NotInteger
    } else {
        IntegerField::NotNumber
    }
}
