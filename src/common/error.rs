// src/common/error.rs

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::wizard::WizardError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed")]
    ValidationError(#[from] ValidationErrors),

    #[error("{0}")]
    InvalidInput(String),

    #[error("email already registered")]
    EmailAlreadyExists,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("invalid or expired authorization code")]
    InvalidAuthCode,

    #[error("authentication required")]
    Unauthenticated,

    #[error("role '{0}' may not access this resource")]
    Forbidden(String),

    #[error("user not found")]
    UserNotFound,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Wizard(#[from] WizardError),

    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("payload exceeds {0} bytes")]
    PayloadTooLarge(usize),

    #[error("database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("internal server error")]
    InternalServerError(#[from] anyhow::Error),

    #[error("bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("jwt error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::EmailAlreadyExists => StatusCode::CONFLICT,
            AppError::InvalidCredentials
            | AppError::InvalidToken
            | AppError::InvalidAuthCode
            | AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::UserNotFound | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Wizard(e) => e.status(),
            AppError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the end user.
    pub fn client_message(&self) -> String {
        match self {
            AppError::ValidationError(_) => "One or more fields are invalid.".to_string(),
            AppError::EmailAlreadyExists => "This email is already in use.".to_string(),
            AppError::InvalidCredentials => "Invalid email or password.".to_string(),
            AppError::InvalidToken => "Authentication token is invalid or missing.".to_string(),
            AppError::InvalidAuthCode => "Sign-in link is invalid or has expired.".to_string(),
            AppError::Unauthenticated => "Please sign in to continue.".to_string(),
            AppError::UserNotFound => "User not found.".to_string(),
            AppError::Forbidden(_) => "You do not have access to this resource.".to_string(),
            AppError::InvalidInput(_)
            | AppError::NotFound(_)
            | AppError::Wizard(_)
            | AppError::UnsupportedMediaType(_)
            | AppError::PayloadTooLarge(_) => self.to_string(),
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => "Something went wrong.".to_string(),
        }
    }
}

/// Flattens validator output into `{ "fieldName": ["message", ...] }`.
///
/// Nested sections (location, owner details) are flattened into the draft's
/// JSON, so their fields are reported without a prefix. List entries are
/// reported as `packages[0].price`.
pub fn validation_details(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    let mut details = BTreeMap::new();
    collect_details(errors, "", &mut details);
    details
}

fn collect_details(errors: &ValidationErrors, prefix: &str, out: &mut BTreeMap<String, Vec<String>>) {
    for (field, kind) in errors.errors() {
        let name = format!("{prefix}{}", to_camel_case(field));
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages = field_errors
                    .iter()
                    .map(|e| e.message.as_ref().map_or_else(|| e.code.to_string(), |m| m.to_string()))
                    .collect();
                out.insert(name, messages);
            }
            ValidationErrorsKind::Struct(inner) => collect_details(inner, prefix, out),
            ValidationErrorsKind::List(entries) => {
                for (index, inner) in entries {
                    collect_details(inner, &format!("{name}[{index}]."), out);
                }
            }
        }
    }
}

fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if let AppError::ValidationError(errors) = &self {
            let body = Json(json!({
                "message": self.client_message(),
                "details": validation_details(errors),
            }));
            return (status, body).into_response();
        }

        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }

        let body = Json(json!({ "message": self.client_message() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::ValidationError;

    #[test]
    fn camel_cases_validator_field_names() {
        assert_eq!(to_camel_case("owner_phone"), "ownerPhone");
        assert_eq!(to_camel_case("agree_to_terms"), "agreeToTerms");
        assert_eq!(to_camel_case("title"), "title");
    }

    #[test]
    fn details_use_message_or_code() {
        let mut errors = ValidationErrors::new();
        let mut with_message = ValidationError::new("length");
        with_message.message = Some("Title must be at least 10 characters".into());
        errors.add("title", with_message);
        errors.add("owner_phone", ValidationError::new("phone"));

        let details = validation_details(&errors);
        assert_eq!(details["title"], vec!["Title must be at least 10 characters"]);
        assert_eq!(details["ownerPhone"], vec!["phone"]);
    }

    #[test]
    fn statuses_follow_error_taxonomy() {
        assert_eq!(AppError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden("user".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("property").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::PayloadTooLarge(10).status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            AppError::InternalServerError(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_errors_hide_details_from_clients() {
        let err = AppError::InternalServerError(anyhow::anyhow!("connection refused"));
        assert_eq!(err.client_message(), "Something went wrong.");
        assert_eq!(AppError::NotFound("venue").client_message(), "venue not found");
    }
}
