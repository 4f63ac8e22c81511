pub mod body;
pub mod extractor;
pub mod jwt;
pub mod test_utils;

pub use body::{IntegerField, JsonBody, TextFields};
pub use jwt::{TokenError, TokenService, ACTIVATION_TOKEN_TTL, SESSION_TOKEN_TTL};
