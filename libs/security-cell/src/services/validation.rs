// =====================================================================================
// VALIDATION SERVICE - AGGREGATED INPUT VALIDATION
// =====================================================================================
//
// Every rule that fails adds a message; nothing stops at the first problem so
// the caller sees the whole list in one response.
//
// =====================================================================================

use regex::Regex;
use tracing::debug;

use shared_models::appointment::normalize_store_timestamp;
use shared_models::error::AppError;

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";
const PHONE_PATTERN: &str = r"^[0-9]{10,15}$";
const NAME_PATTERN: &str = r"^[a-zA-Z\x{0600}-\x{06FF}\s]+$";
const TOKEN_PATTERN: &str = r"^[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+$";

const MAX_EMAIL_LENGTH: usize = 254;

#[derive(Clone)]
pub struct ValidationService {
    email: Regex,
    phone: Regex,
    name: Regex,
    token: Regex,
}

impl ValidationService {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            email: Regex::new(EMAIL_PATTERN)?,
            phone: Regex::new(PHONE_PATTERN)?,
            name: Regex::new(NAME_PATTERN)?,
            token: Regex::new(TOKEN_PATTERN)?,
        })
    }

    /// Starts a fresh set of checks for one request body.
    pub fn check(&self) -> FieldCheck<'_> {
        FieldCheck {
            rules: self,
            errors: Vec::new(),
            reported: Vec::new(),
        }
    }

    pub fn is_email(&self, value: &str) -> bool {
        value.len() <= MAX_EMAIL_LENGTH && self.email.is_match(value)
    }

    pub fn is_phone(&self, value: &str) -> bool {
        self.phone.is_match(value)
    }
}

/// Collects messages for one request. `finish` turns them into
/// `AppError::Validation` when any rule failed.
pub struct FieldCheck<'a> {
    rules: &'a ValidationService,
    errors: Vec<String>,
    // Fields already rejected for their type; later rules leave them alone.
    reported: Vec<String>,
}

impl<'a> FieldCheck<'a> {
    fn fail(&mut self, message: String) {
        self.errors.push(message);
    }

    fn is_reported(&self, field: &str) -> bool {
        self.reported.iter().any(|reported| reported == field)
    }

    fn present<'v>(&mut self, field: &str, value: Option<&'v str>) -> Option<&'v str> {
        match value.map(str::trim) {
            Some(value) if !value.is_empty() => Some(value),
            _ if self.is_reported(field) => None,
            _ => {
                self.fail(format!("\"{}\" is required", field));
                None
            }
        }
    }

    fn length(&mut self, field: &str, value: &str, min: usize, max: usize) {
        let count = value.chars().count();
        if count < min {
            self.fail(format!("\"{}\" length must be at least {} characters long", field, min));
        } else if count > max {
            self.fail(format!(
                "\"{}\" length must be less than or equal to {} characters long",
                field, max
            ));
        }
    }

    pub fn required(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        self.present(field, value);
        self
    }

    pub fn name(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = self.present(field, value) {
            self.length(field, value, 2, 50);
            if !self.rules.name.is_match(value) {
                self.fail(format!("\"{}\" may only contain letters and spaces", field));
            }
        }
        self
    }

    pub fn email(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = self.present(field, value) {
            if !self.rules.is_email(value) {
                self.fail(format!("\"{}\" must be a valid email", field));
            }
        }
        self
    }

    pub fn phone(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = self.present(field, value) {
            if !self.rules.is_phone(value) {
                self.fail(format!("\"{}\" must contain 10 to 15 digits", field));
            }
        }
        self
    }

    pub fn email_or_phone(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = self.present(field, value) {
            if !self.rules.is_email(value) && !self.rules.is_phone(value) {
                self.fail(format!("\"{}\" must be a valid email or phone number", field));
            }
        }
        self
    }

    pub fn password(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = self.present(field, value) {
            self.length(field, value, 6, 100);

            let has_lower = value.chars().any(|c| c.is_ascii_lowercase());
            let has_upper = value.chars().any(|c| c.is_ascii_uppercase());
            let has_digit = value.chars().any(|c| c.is_ascii_digit());
            if !(has_lower && has_upper && has_digit) {
                self.fail(format!(
                    "\"{}\" must contain at least one lowercase letter, one uppercase letter and one number",
                    field
                ));
            }
        }
        self
    }

    /// `value` must be present and equal to `expected`.
    pub fn matches(
        &mut self,
        field: &str,
        value: Option<&str>,
        other_field: &str,
        expected: Option<&str>,
    ) -> &mut Self {
        if let Some(value) = self.present(field, value) {
            if Some(value) != expected.map(str::trim) {
                self.fail(format!("\"{}\" must match {}", field, other_field));
            }
        }
        self
    }

    pub fn text(&mut self, field: &str, value: Option<&str>, min: usize, max: usize) -> &mut Self {
        if let Some(value) = self.present(field, value) {
            self.length(field, value, min, max);
        }
        self
    }

    /// Like `text` but absence is not an error.
    pub fn optional_text(
        &mut self,
        field: &str,
        value: Option<&str>,
        min: usize,
        max: usize,
    ) -> &mut Self {
        if let Some(value) = value {
            self.length(field, value.trim(), min, max);
        }
        self
    }

    pub fn integer_in(&mut self, field: &str, value: Option<i64>, min: i64, max: i64) -> &mut Self {
        match value {
            None if self.is_reported(field) => {}
            None => self.fail(format!("\"{}\" is required", field)),
            Some(value) if value < min => {
                self.fail(format!("\"{}\" must be greater than or equal to {}", field, min))
            }
            Some(value) if value > max => {
                self.fail(format!("\"{}\" must be less than or equal to {}", field, max))
            }
            Some(_) => {}
        }
        self
    }

    pub fn optional_positive_id(&mut self, field: &str, value: Option<i64>) -> &mut Self {
        if matches!(value, Some(id) if id < 1) {
            self.fail(format!("\"{}\" must be a positive number", field));
        }
        self
    }

    pub fn optional_date(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            if normalize_store_timestamp(value).is_none() {
                self.fail(format!("\"{}\" must be a valid date", field));
            }
        }
        self
    }

    /// Records a failure found outside these rules, e.g. a value of the wrong type.
    /// Later rules skip the field.
    pub fn invalid(&mut self, field: &str, rule: &str) -> &mut Self {
        self.fail(format!("\"{}\" {}", field, rule));
        self.reported.push(field.to_string());
        self
    }

    /// Fields that arrived with a JSON type other than `expected`.
    pub fn mistyped(&mut self, fields: &[&str], expected: &str) -> &mut Self {
        for field in fields {
            self.invalid(field, &format!("must be a {}", expected));
        }
        self
    }

    pub fn token(&mut self, field: &str, value: &str) -> &mut Self {
        if !self.rules.token.is_match(value) {
            self.fail(format!("\"{}\" must be a valid token", field));
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            return Ok(());
        }

        debug!("Validation failed with {} issue(s)", self.errors.len());
        Err(AppError::Validation(std::mem::take(&mut self.errors)))
    }
}
