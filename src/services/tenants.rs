use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::AuthContext,
    db::DbPool,
    entities::{tenant, user},
    errors::ServiceError,
    events::{Event, EventBus},
    PaginatedResponse,
};

/// Subdomains kept for the platform itself
pub const RESERVED_SUBDOMAINS: &[&str] = &[
    "admin", "api", "app", "assets", "auth", "blog", "cdn", "dashboard", "docs", "ftp", "help",
    "mail", "portal", "static", "status", "support", "www",
];

static SUBDOMAIN_PATTERN: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^[a-z0-9](?:[a-z0-9-]*[a-z0-9])?$"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubdomainError {
    #[error("Subdomain must be between 3 and 63 characters")]
    Length,
    #[error("Subdomain may only contain lowercase letters, digits and inner hyphens")]
    Format,
    #[error("Subdomain is reserved")]
    Reserved,
}

/// Trims and lowercases a requested subdomain
pub fn normalize_subdomain(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

pub fn validate_subdomain(subdomain: &str) -> Result<(), SubdomainError> {
    if !(3..=63).contains(&subdomain.len()) {
        return Err(SubdomainError::Length);
    }
    let matches = match &*SUBDOMAIN_PATTERN {
        Ok(pattern) => pattern.is_match(subdomain),
        Err(_) => false,
    };
    if !matches {
        return Err(SubdomainError::Format);
    }
    if RESERVED_SUBDOMAINS.contains(&subdomain) {
        return Err(SubdomainError::Reserved);
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubdomainAvailability {
    pub subdomain: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTenantRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub subdomain: String,
    #[validate(email)]
    pub contact_email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateTenantRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(email)]
    pub contact_email: Option<String>,
}

/// Tenant lifecycle: onboarding, profile edits and deactivation
#[derive(Clone)]
pub struct TenantService {
    db_pool: Arc<DbPool>,
    events: Arc<EventBus>,
}

impl TenantService {
    pub fn new(db_pool: Arc<DbPool>, events: Arc<EventBus>) -> Self {
        Self { db_pool, events }
    }

    /// Validates a subdomain and reports whether it is still free.
    /// Invalid subdomains are reported as unavailable with the reason.
    #[instrument(skip(self))]
    pub async fn check_subdomain(&self, raw: &str) -> Result<SubdomainAvailability, ServiceError> {
        let subdomain = normalize_subdomain(raw);
        if let Err(reason) = validate_subdomain(&subdomain) {
            return Ok(SubdomainAvailability {
                subdomain,
                available: false,
                reason: Some(reason.to_string()),
            });
        }

        let taken = self.subdomain_taken(&subdomain).await?;
        Ok(SubdomainAvailability {
            reason: taken.then(|| "Subdomain is already in use".to_string()),
            available: !taken,
            subdomain,
        })
    }

    async fn subdomain_taken(&self, subdomain: &str) -> Result<bool, ServiceError> {
        let count = tenant::Entity::find()
            .filter(tenant::Column::Subdomain.eq(subdomain))
            .count(&*self.db_pool)
            .await?;
        Ok(count > 0)
    }

    #[instrument(skip(self, ctx))]
    pub async fn create(
        &self,
        ctx: &AuthContext,
        request: CreateTenantRequest,
    ) -> Result<tenant::Model, ServiceError> {
        if !ctx.is_super_admin() {
            return Err(ServiceError::Forbidden(
                "Only platform administrators can create tenants".to_string(),
            ));
        }
        request.validate()?;

        let subdomain = normalize_subdomain(&request.subdomain);
        validate_subdomain(&subdomain).map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        if self.subdomain_taken(&subdomain).await? {
            return Err(ServiceError::Conflict(format!(
                "Subdomain {} is already in use",
                subdomain
            )));
        }

        let tenant = tenant::ActiveModel {
            name: Set(request.name),
            subdomain: Set(subdomain),
            contact_email: Set(request.contact_email),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        info!(tenant_id = %tenant.id, subdomain = %tenant.subdomain, "Tenant created");
        Ok(tenant)
    }

    #[instrument(skip(self, ctx))]
    pub async fn get(&self, ctx: &AuthContext, id: Uuid) -> Result<tenant::Model, ServiceError> {
        if !ctx.can_read_tenant(id) {
            return Err(ServiceError::not_found("Tenant", id));
        }
        tenant::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Tenant", id))
    }

    #[instrument(skip(self, ctx))]
    pub async fn list(
        &self,
        ctx: &AuthContext,
        page: u64,
        per_page: u64,
    ) -> Result<PaginatedResponse<tenant::Model>, ServiceError> {
        let mut query = tenant::Entity::find().order_by_asc(tenant::Column::Name);
        if let Some(own) = ctx.tenant_scope() {
            query = query.filter(tenant::Column::Id.eq(own));
        }
        super::paginate(&self.db_pool, query, page, per_page).await
    }

    /// Profile edits are open to platform administrators and the tenant's
    /// own administrators
    #[instrument(skip(self, ctx))]
    pub async fn update(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        request: UpdateTenantRequest,
    ) -> Result<tenant::Model, ServiceError> {
        request.validate()?;
        let tenant = self.get(ctx, id).await?;
        if !ctx.can_manage_accounts(Some(id)) {
            return Err(ServiceError::Forbidden(
                "Your role does not allow editing this tenant".to_string(),
            ));
        }

        let mut active: tenant::ActiveModel = tenant.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(email) = request.contact_email {
            active.contact_email = Set(Some(email));
        }
        Ok(active.update(&*self.db_pool).await?)
    }

    /// Deactivates a tenant and every user that belongs to it
    #[instrument(skip(self, ctx))]
    pub async fn deactivate(&self, ctx: &AuthContext, id: Uuid) -> Result<tenant::Model, ServiceError> {
        if !ctx.is_super_admin() {
            return Err(ServiceError::Forbidden(
                "Only platform administrators can deactivate tenants".to_string(),
            ));
        }
        let tenant = self.get(ctx, id).await?;
        if !tenant.is_active {
            warn!(tenant_id = %id, "Tenant already inactive");
        }

        let db = &*self.db_pool;
        let mut active: tenant::ActiveModel = tenant.into();
        active.is_active = Set(false);
        let tenant = active.update(db).await?;

        let users = user::Entity::update_many()
            .col_expr(user::Column::IsActive, Expr::value(false))
            .col_expr(user::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(user::Column::TenantId.eq(id))
            .filter(user::Column::IsActive.eq(true))
            .exec(db)
            .await?;

        info!(tenant_id = %id, users = users.rows_affected, "Tenant deactivated");
        self.events
            .publish(Event::TenantDeactivated {
                tenant_id: id,
                users_deactivated: users.rows_affected,
            })
            .await;

        Ok(tenant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("acme", Ok(()))]
    #[case("acme-freight", Ok(()))]
    #[case("a1b2c3", Ok(()))]
    #[case("ab", Err(SubdomainError::Length))]
    #[case("-acme", Err(SubdomainError::Format))]
    #[case("acme-", Err(SubdomainError::Format))]
    #[case("acme_freight", Err(SubdomainError::Format))]
    #[case("Acme", Err(SubdomainError::Format))]
    #[case("www", Err(SubdomainError::Reserved))]
    #[case("admin", Err(SubdomainError::Reserved))]
    fn subdomain_rules(#[case] subdomain: &str, #[case] expected: Result<(), SubdomainError>) {
        assert_eq!(validate_subdomain(subdomain), expected);
    }

    #[test]
    fn long_subdomain_is_rejected() {
        let long = "a".repeat(64);
        assert_eq!(validate_subdomain(&long), Err(SubdomainError::Length));
        assert_eq!(validate_subdomain(&"a".repeat(63)), Ok(()));
    }

    #[test]
    fn normalization_trims_and_lowercases() {
        assert_eq!(normalize_subdomain("  Acme-Freight "), "acme-freight");
    }
}
