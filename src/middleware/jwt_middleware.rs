/// JWT Authentication Middleware
///
/// Guards every state-changing request under a scope. Safe methods pass
/// straight through; anything else needs a valid admin bearer token, and the
/// resulting `Identity` is injected into request extensions for handlers.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::{header, Method},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::auth::{Identity, Role, TokenIssuer};
use crate::error::{AppError, AuthError};

/// Extract and verify the bearer token in `headers`.
///
/// # Errors
/// * `MissingToken` - no `Authorization: Bearer <token>` header
/// * `Unauthorized` - the token failed verification
/// * `Forbidden` - the token's role is not allowed to mutate resources
pub fn authorize(headers: &header::HeaderMap, tokens: &TokenIssuer) -> Result<Identity, AuthError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token)
        .ok_or(AuthError::MissingToken)?;

    let claims = tokens.verify(token).map_err(AuthError::Unauthorized)?;

    let role: Role = claims.role.parse().map_err(|_| AuthError::Forbidden)?;
    if role != Role::Admin {
        return Err(AuthError::Forbidden);
    }

    Ok(Identity {
        email: claims.sub,
        role,
    })
}

/// Token part of a `Bearer <token>` header value; the scheme is case-insensitive.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

fn is_read_only(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// JWT middleware for protecting mutating routes
pub struct JwtMiddleware {
    tokens: TokenIssuer,
}

impl JwtMiddleware {
    pub fn new(tokens: TokenIssuer) -> Self {
        Self { tokens }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(JwtMiddlewareService {
            service: Rc::new(service),
            tokens: self.tokens.clone(),
        }))
    }
}

pub struct JwtMiddlewareService<S> {
    service: Rc<S>,
    tokens: TokenIssuer,
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        if is_read_only(req.method()) {
            return Box::pin(async move { service.call(req).await });
        }

        match authorize(req.headers(), &self.tokens) {
            Ok(identity) => {
                tracing::debug!(
                    email = %identity.email,
                    role = %identity.role,
                    path = %req.path(),
                    "JWT validated successfully"
                );
                req.extensions_mut().insert(identity);

                Box::pin(async move { service.call(req).await })
            }
            Err(e) => {
                tracing::warn!(
                    method = %req.method(),
                    path = %req.path(),
                    error = %e,
                    "Rejected unauthenticated request"
                );
                let error: Error = AppError::Auth(e).into();
                Box::pin(async move { Err(error) })
            }
        }
    }
}
