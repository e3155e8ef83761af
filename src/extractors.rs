//! Validated query-string extractor
//!
//! `ValidatedQuery<T>` works like `web::Query<T>`, but additionally runs
//! `validator::Validate::validate()` on the deserialized value. Both a
//! missing/unparseable parameter and a failed constraint become a 400
//! `AppError::Validation` before the handler body runs.

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use lazy_static::lazy_static;
use regex::Regex;
use serde::de::DeserializeOwned;
use std::future::{ready, Ready};
use std::ops::Deref;
use validator::Validate;

use crate::error::{AppError, ValidationError};

lazy_static! {
    // Lowercase words joined by single hyphens, e.g. "home-audio"
    static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

pub struct ValidatedQuery<T>(pub T);

impl<T> ValidatedQuery<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for ValidatedQuery<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> FromRequest for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
{
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(extract(req.query_string()))
    }
}

fn extract<T: DeserializeOwned + Validate>(query: &str) -> Result<ValidatedQuery<T>, AppError> {
    let value = web::Query::<T>::from_query(query)
        .map_err(|e| AppError::Validation(ValidationError::InvalidInput(e.to_string())))?
        .into_inner();

    value.validate()?;

    Ok(ValidatedQuery(value))
}

/// Rejects strings that are empty once surrounding whitespace is removed.
pub fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        let mut err = validator::ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

pub fn valid_slug(value: &str) -> Result<(), validator::ValidationError> {
    if !SLUG_REGEX.is_match(value) {
        let mut err = validator::ValidationError::new("slug");
        err.message = Some("must be lowercase letters, digits and single hyphens".into());
        return Err(err);
    }
    Ok(())
}
