/// Admin Authentication Routes
///
/// Registration and login. Parameters arrive in the query string.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::AdminAuthService;
use crate::error::AppError;
use crate::extractors::{not_blank, ValidatedQuery};

#[derive(Debug, Deserialize, Validate)]
pub struct CredentialsParams {
    #[validate(custom(function = "not_blank"))]
    pub email: String,
    #[validate(custom(function = "not_blank"))]
    pub password: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub admin_id: i64,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// POST /admin/register
///
/// # Errors
/// - 400: email or password empty
/// - 500: store failure
pub async fn register(
    params: ValidatedQuery<CredentialsParams>,
    auth: web::Data<AdminAuthService>,
) -> Result<HttpResponse, AppError> {
    let admin_id = auth.register(&params.email, &params.password).await?;

    Ok(HttpResponse::Created().json(RegisterResponse {
        success: true,
        admin_id,
    }))
}

/// POST /admin/login
///
/// # Errors
/// - 400: empty input or wrong password
/// - 404: no admin with this email
/// - 500: store failure
pub async fn login(
    params: ValidatedQuery<CredentialsParams>,
    auth: web::Data<AdminAuthService>,
) -> Result<HttpResponse, AppError> {
    let token = auth.login(&params.email, &params.password).await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        success: true,
        access_token: token.access_token,
        token_type: token.token_type.to_string(),
        expires_in: token.expires_in,
    }))
}
