/// Access Gate Middleware
///
/// Admits a request only if it carries `Authorization: Bearer <token>` with a
/// currently valid session token, and attaches the token's subject to the
/// request extensions as an `AuthenticatedUser`.
///
/// Every rejection produces the same 401 body; the reason is only logged.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::auth::TokenService;
use crate::error::{AppError, TokenError};

pub const BEARER_PREFIX: &str = "Bearer ";

/// Identity of the caller of a protected request.
/// Handlers read it with `web::ReqData<AuthenticatedUser>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
}

/// Why a request was refused. Only used for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    MissingHeader,
    MalformedScheme,
    InvalidToken(TokenError),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::MissingHeader => write!(f, "authorization header missing"),
            Rejection::MalformedScheme => write!(f, "authorization scheme is not Bearer"),
            Rejection::InvalidToken(e) => write!(f, "{}", e),
        }
    }
}

/// The gate's single decision: admit with an identity, or reject
pub fn authorize(
    header: Option<&str>,
    tokens: &TokenService,
) -> Result<AuthenticatedUser, Rejection> {
    let header = header.ok_or(Rejection::MissingHeader)?;
    let token = header
        .strip_prefix(BEARER_PREFIX)
        .ok_or(Rejection::MalformedScheme)?;

    let claims = tokens.validate(token).map_err(Rejection::InvalidToken)?;

    Ok(AuthenticatedUser {
        user_id: claims.user_id,
        email: claims.email,
    })
}

/// Access gate for protected scopes
pub struct AuthGate {
    tokens: Arc<TokenService>,
}

impl AuthGate {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthGateService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(AuthGateService {
            service: Rc::new(service),
            tokens: self.tokens.clone(),
        }))
    }
}

pub struct AuthGateService<S> {
    service: Rc<S>,
    tokens: Arc<TokenService>,
}

impl<S, B> Service<ServiceRequest> for AuthGateService<S>
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
        // A header that is not visible ASCII cannot carry a bearer token
        let decision = match req.headers().get(AUTHORIZATION) {
            None => authorize(None, &self.tokens),
            Some(value) => match value.to_str() {
                Ok(value) => authorize(Some(value), &self.tokens),
                Err(_) => Err(Rejection::MalformedScheme),
            },
        };

        match decision {
            Ok(user) => {
                tracing::debug!(user_id = %user.user_id, "Request authenticated");
                req.extensions_mut().insert(user);

                let service = self.service.clone();
                Box::pin(async move { service.call(req).await })
            }
            Err(rejection) => {
                tracing::warn!(
                    path = %req.path(),
                    reason = %rejection,
                    "Request rejected by access gate"
                );
                Box::pin(async move { Err(AppError::Unauthenticated.into()) })
            }
        }
    }
}
