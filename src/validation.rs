use std::sync::LazyLock;

use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Request},
    Json,
};
use regex::Regex;
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::shared::AppError;

/// One `@`, no whitespace, and a dotted domain whose labels are non-empty
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").expect("email pattern compiles")
});

/// Absolute http(s) URL with a host and no whitespace
static HTTP_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("url pattern compiles")
});

/// A single failed field constraint, reported back to the client
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Request payloads check their own field constraints
pub trait Validate {
    fn validate(&self) -> Result<(), Vec<FieldError>>;
}

/// Collects field errors so every violation is reported at once
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, ok: bool, field: &str, message: &str) -> &mut Self {
        if !ok {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    pub fn not_blank(&mut self, value: Option<&str>, field: &str) -> &mut Self {
        if let Some(value) = value {
            self.check(
                !value.trim().is_empty(),
                field,
                &format!("{field} must not be empty"),
            );
        }
        self
    }

    /// Character length bounds, skipped when the value is absent
    pub fn length(&mut self, value: Option<&str>, field: &str, min: usize, max: usize) -> &mut Self {
        if let Some(value) = value {
            let len = value.chars().count();
            self.check(
                (min..=max).contains(&len),
                field,
                &format!("{field} must be between {min} and {max} characters"),
            );
        }
        self
    }

    pub fn email(&mut self, value: Option<&str>, field: &str) -> &mut Self {
        if let Some(value) = value {
            self.check(
                looks_like_email(value),
                field,
                &format!("{field} must be a valid email address"),
            );
        }
        self
    }

    pub fn url(&mut self, value: Option<&str>, field: &str) -> &mut Self {
        if let Some(value) = value {
            self.check(
                HTTP_URL_REGEX.is_match(value),
                field,
                &format!("{field} must be a valid URL"),
            );
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(std::mem::take(&mut self.errors))
        }
    }
}

fn looks_like_email(value: &str) -> bool {
    EMAIL_REGEX.is_match(value)
}

/// JSON body extractor that also runs `Validate`
///
/// Malformed bodies become `BadRequest` and constraint failures become
/// `Validation`, so both reach the client through the error envelope as 400s.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            debug!(error = %rejection.body_text(), "Rejected JSON body");
            AppError::BadRequest(rejection.body_text())
        })?;

        value.validate().map_err(AppError::Validation)?;
        Ok(Self(value))
    }
}
