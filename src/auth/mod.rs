/*!
 * # Authentication and Authorization Module
 *
 * Requests authenticate with `Authorization: Bearer <jwt>`. The token is
 * decoded into an explicit [`AuthContext`] that every service call receives;
 * the access predicates in [`access`] decide what the caller may read or
 * write. Issuing credentials (login, password handling) happens elsewhere;
 * this module only issues tokens for trusted callers and validates them.
 */

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use strum::{AsRefStr, Display, EnumString};
use thiserror::Error;
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::entities::UserCollection;
use crate::errors::{ErrorResponse, ServiceError};

pub mod access;

/// Platform role carried in the token
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UserRole {
    SuperAdmin,
    TenantAdmin,
    WarehouseStaff,
    Customer,
}

/// Claim structure for JWT tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,               // Subject (user ID)
    pub name: Option<String>,      // User's name
    pub email: Option<String>,     // User's email
    pub role: UserRole,            // Platform role
    pub collection: UserCollection,
    pub tenant_id: Option<String>, // None for super admins
    pub customer_id: Option<String>,
    pub jti: String,               // JWT ID
    pub iat: i64,                  // Issued at time
    pub exp: i64,                  // Expiration time
    pub nbf: i64,                  // Not valid before time
    pub iss: String,               // Issuer
    pub aud: String,               // Audience
}

/// Identity of the caller, passed explicitly to every service operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: UserRole,
    pub tenant_id: Option<Uuid>,
    pub collection: UserCollection,
    /// Customer a portal user acts for
    pub customer_id: Option<Uuid>,
}

impl AuthContext {
    pub fn super_admin(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: UserRole::SuperAdmin,
            tenant_id: None,
            collection: UserCollection::Users,
            customer_id: None,
        }
    }

    pub fn staff(user_id: Uuid, role: UserRole, tenant_id: Uuid) -> Self {
        Self {
            user_id,
            role,
            tenant_id: Some(tenant_id),
            collection: UserCollection::Users,
            customer_id: None,
        }
    }

    pub fn customer_user(user_id: Uuid, tenant_id: Uuid, customer_id: Uuid) -> Self {
        Self {
            user_id,
            role: UserRole::Customer,
            tenant_id: Some(tenant_id),
            collection: UserCollection::CustomerUsers,
            customer_id: Some(customer_id),
        }
    }

    fn from_claims(claims: &Claims) -> Result<Self, AuthError> {
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AuthError::InvalidClaims("sub is not a UUID".to_string()))?;
        let tenant_id = parse_optional_uuid(claims.tenant_id.as_deref(), "tenant_id")?;
        let customer_id = parse_optional_uuid(claims.customer_id.as_deref(), "customer_id")?;

        if claims.role != UserRole::SuperAdmin && tenant_id.is_none() {
            return Err(AuthError::InvalidClaims(
                "tenant_id is required for tenant users".to_string(),
            ));
        }

        Ok(Self {
            user_id,
            role: claims.role,
            tenant_id,
            collection: claims.collection,
            customer_id,
        })
    }
}

fn parse_optional_uuid(value: Option<&str>, field: &str) -> Result<Option<Uuid>, AuthError> {
    value
        .map(|raw| {
            Uuid::parse_str(raw)
                .map_err(|_| AuthError::InvalidClaims(format!("{} is not a UUID", field)))
        })
        .transpose()
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub jwt_issuer: String,
    pub access_token_expiration: Duration,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: String,
        jwt_issuer: String,
        jwt_audience: String,
        access_token_expiration: Duration,
    ) -> Self {
        Self {
            jwt_secret,
            jwt_audience,
            jwt_issuer,
            access_token_expiration,
        }
    }
}

impl From<&AppConfig> for AuthConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self::new(
            cfg.jwt_secret.clone(),
            cfg.auth_issuer.clone(),
            cfg.auth_audience.clone(),
            Duration::from_secs(cfg.jwt_expiration as u64),
        )
    }
}

/// Issues and validates bearer tokens
#[derive(Clone, Debug)]
pub struct AuthService {
    config: AuthConfig,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Signs a token for the given context
    pub fn issue_token(
        &self,
        ctx: &AuthContext,
        name: Option<String>,
        email: Option<String>,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now
            + ChronoDuration::from_std(self.config.access_token_expiration)
                .map_err(|_| AuthError::TokenCreation("Invalid token duration".to_string()))?;

        let claims = Claims {
            sub: ctx.user_id.to_string(),
            name,
            email,
            role: ctx.role,
            collection: ctx.collection,
            tenant_id: ctx.tenant_id.map(|id| id.to_string()),
            customer_id: ctx.customer_id.map(|id| id.to_string()),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    /// Validate a JWT token and extract the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.jwt_issuer.as_str()]);
        validation.set_audience(&[self.config.jwt_audience.as_str()]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })
    }

    /// Validates a token and turns its claims into an [`AuthContext`]
    pub fn authenticate(&self, token: &str) -> Result<AuthContext, AuthError> {
        let claims = self.validate_token(token)?;
        AuthContext::from_claims(&claims)
    }
}

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authentication")]
    MissingAuth,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token claims: {0}")]
    InvalidClaims(String),

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Insufficient permissions")]
    InsufficientPermissions,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingAuth | Self::InvalidToken | Self::TokenExpired | Self::InvalidClaims(_) => {
                StatusCode::UNAUTHORIZED
            }
            Self::InsufficientPermissions => StatusCode::FORBIDDEN,
            Self::TokenCreation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err.status_code() {
            StatusCode::FORBIDDEN => ServiceError::Forbidden(err.to_string()),
            StatusCode::UNAUTHORIZED => ServiceError::Unauthorized(err.to_string()),
            _ => ServiceError::InternalError(err.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: match &self {
                Self::TokenCreation(_) => "Internal server error".to_string(),
                other => other.to_string(),
            },
            details: None,
            request_id: crate::tracing::current_request_id().map(|rid| rid.to_string()),
            timestamp: Utc::now().to_rfc3339(),
        };
        (status, Json(body)).into_response()
    }
}

/// Authentication middleware that validates the bearer token and stores the
/// resulting [`AuthContext`] in the request extensions
pub async fn auth_middleware(
    State(auth_service): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Response {
    match extract_auth_from_headers(request.headers(), &auth_service) {
        Ok(ctx) => {
            debug!(user_id = %ctx.user_id, role = %ctx.role, "authenticated request");
            request.extensions_mut().insert(ctx);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

fn extract_auth_from_headers(
    headers: &HeaderMap,
    auth_service: &AuthService,
) -> Result<AuthContext, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingAuth)?;

    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingAuth)?;

    auth_service.authenticate(token)
}

/// Role middleware to check the caller holds one of the allowed roles
pub async fn role_middleware(
    State(allowed): State<&'static [UserRole]>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let ctx = request
        .extensions()
        .get::<AuthContext>()
        .ok_or(AuthError::MissingAuth)?;

    if !allowed.contains(&ctx.role) {
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(next.run(request).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self, auth_service: Arc<AuthService>) -> Self;
    fn with_roles(self, auth_service: Arc<AuthService>, roles: &'static [UserRole]) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self, auth_service: Arc<AuthService>) -> Self {
        self.route_layer(axum::middleware::from_fn_with_state(
            auth_service,
            auth_middleware,
        ))
    }

    fn with_roles(self, auth_service: Arc<AuthService>, roles: &'static [UserRole]) -> Self {
        self.route_layer(axum::middleware::from_fn_with_state(roles, role_middleware))
            .with_auth(auth_service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new(AuthConfig::new(
            "unit_test_secret_with_enough_entropy_0123456789abcdef".to_string(),
            "freightwms-api".to_string(),
            "freightwms".to_string(),
            Duration::from_secs(600),
        ))
    }

    #[test]
    fn issued_token_round_trips_into_context() {
        let svc = service();
        let tenant = Uuid::new_v4();
        let customer = Uuid::new_v4();
        let ctx = AuthContext::customer_user(Uuid::new_v4(), tenant, customer);

        let token = svc.issue_token(&ctx, None, None).unwrap();
        let decoded = svc.authenticate(&token).unwrap();

        assert_eq!(decoded, ctx);
        assert_eq!(decoded.collection, UserCollection::CustomerUsers);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let other = AuthService::new(AuthConfig::new(
            "a_completely_different_secret_value_9876543210zyxwv".to_string(),
            "freightwms-api".to_string(),
            "freightwms".to_string(),
            Duration::from_secs(600),
        ));
        let token = other
            .issue_token(&AuthContext::super_admin(Uuid::new_v4()), None, None)
            .unwrap();

        assert!(matches!(
            service().authenticate(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn missing_bearer_prefix_is_missing_auth() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Token abc".parse().unwrap());
        assert!(matches!(
            extract_auth_from_headers(&headers, &service()),
            Err(AuthError::MissingAuth)
        ));
    }

    #[test]
    fn auth_errors_map_to_service_errors() {
        assert!(matches!(
            ServiceError::from(AuthError::InsufficientPermissions),
            ServiceError::Forbidden(_)
        ));
        assert!(matches!(
            ServiceError::from(AuthError::TokenExpired),
            ServiceError::Unauthorized(_)
        ));
    }
}
