use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::AuthContext,
    db::DbPool,
    entities::{customer, role, user, UserCollection},
    errors::ServiceError,
    PaginatedResponse,
};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateRoleRequest {
    /// Omitted for platform-wide roles (super admin only)
    pub tenant_id: Option<Uuid>,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_system: bool,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateRoleRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub permissions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    pub tenant_id: Option<Uuid>,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub role_id: Option<Uuid>,
    #[serde(default = "default_collection")]
    pub collection: UserCollection,
    /// Required for customer-portal users
    pub customer_id: Option<Uuid>,
}

fn default_collection() -> UserCollection {
    UserCollection::Users
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub role_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

/// Roles and users of a tenant
#[derive(Clone)]
pub struct AccountService {
    db_pool: Arc<DbPool>,
}

impl AccountService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    fn ensure_manage(ctx: &AuthContext, tenant_id: Option<Uuid>) -> Result<(), ServiceError> {
        if ctx.can_manage_accounts(tenant_id) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(
                "Your role does not allow managing accounts".to_string(),
            ))
        }
    }

    /// Platform roles are visible to every tenant
    fn can_see_role(ctx: &AuthContext, role: &role::Model) -> bool {
        match role.tenant_id {
            Some(tenant_id) => ctx.can_read_tenant(tenant_id),
            None => true,
        }
    }

    #[instrument(skip(self, ctx))]
    pub async fn create_role(
        &self,
        ctx: &AuthContext,
        request: CreateRoleRequest,
    ) -> Result<role::Model, ServiceError> {
        request.validate()?;
        let tenant_id = match (ctx.tenant_scope(), request.tenant_id) {
            (Some(own), Some(requested)) if own != requested => {
                return Err(ServiceError::Forbidden(
                    "Cannot create roles in another tenant".to_string(),
                ))
            }
            (Some(own), _) => Some(own),
            (None, requested) => requested,
        };
        Self::ensure_manage(ctx, tenant_id)?;
        if request.is_system && !ctx.is_super_admin() {
            return Err(ServiceError::Forbidden(
                "Only platform administrators can create system roles".to_string(),
            ));
        }

        let role = role::ActiveModel {
            tenant_id: Set(tenant_id),
            name: Set(request.name),
            description: Set(request.description),
            is_system: Set(request.is_system),
            permissions: Set(serde_json::json!(request.permissions)),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        info!(role_id = %role.id, name = %role.name, "Role created");
        Ok(role)
    }

    #[instrument(skip(self, ctx))]
    pub async fn get_role(&self, ctx: &AuthContext, id: Uuid) -> Result<role::Model, ServiceError> {
        let role = role::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Role", id))?;
        if !Self::can_see_role(ctx, &role) {
            return Err(ServiceError::not_found("Role", id));
        }
        Ok(role)
    }

    #[instrument(skip(self, ctx))]
    pub async fn list_roles(
        &self,
        ctx: &AuthContext,
        page: u64,
        per_page: u64,
    ) -> Result<PaginatedResponse<role::Model>, ServiceError> {
        let mut query = role::Entity::find().order_by_asc(role::Column::Name);
        if let Some(own) = ctx.tenant_scope() {
            query = query.filter(
                Condition::any()
                    .add(role::Column::TenantId.eq(own))
                    .add(role::Column::TenantId.is_null()),
            );
        }
        super::paginate(&self.db_pool, query, page, per_page).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn update_role(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        request: UpdateRoleRequest,
    ) -> Result<role::Model, ServiceError> {
        request.validate()?;
        let role = self.get_role(ctx, id).await?;
        Self::ensure_manage(ctx, role.tenant_id)?;
        if role.is_system && !ctx.is_super_admin() {
            return Err(ServiceError::Forbidden(
                "System roles can only be changed by platform administrators".to_string(),
            ));
        }

        let mut active: role::ActiveModel = role.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        if let Some(permissions) = request.permissions {
            active.permissions = Set(serde_json::json!(permissions));
        }
        Ok(active.update(&*self.db_pool).await?)
    }

    /// System roles are never deleted; roles still assigned to users
    /// cannot be deleted either.
    #[instrument(skip(self, ctx))]
    pub async fn delete_role(&self, ctx: &AuthContext, id: Uuid) -> Result<(), ServiceError> {
        let role = self.get_role(ctx, id).await?;
        Self::ensure_manage(ctx, role.tenant_id)?;

        if role.is_system {
            return Err(ServiceError::InvalidOperation(format!(
                "Role {} is a system role and cannot be deleted",
                role.name
            )));
        }

        let db = &*self.db_pool;
        let assigned = user::Entity::find()
            .filter(user::Column::RoleId.eq(id))
            .count(db)
            .await?;
        if assigned > 0 {
            return Err(ServiceError::Conflict(format!(
                "Role {} is assigned to {} user(s)",
                role.name, assigned
            )));
        }

        role.delete(db).await?;
        info!(role_id = %id, "Role deleted");
        Ok(())
    }

    async fn check_role_assignable(
        &self,
        ctx: &AuthContext,
        role_id: Uuid,
        tenant_id: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let role = self.get_role(ctx, role_id).await?;
        match role.tenant_id {
            Some(owner) if Some(owner) != tenant_id => Err(ServiceError::ValidationError(
                "role_id belongs to another tenant".to_string(),
            )),
            _ => Ok(()),
        }
    }

    #[instrument(skip(self, ctx, request), fields(email = %request.email))]
    pub async fn create_user(
        &self,
        ctx: &AuthContext,
        request: CreateUserRequest,
    ) -> Result<user::Model, ServiceError> {
        request.validate()?;
        let tenant_id = match (ctx.tenant_scope(), request.tenant_id) {
            (Some(own), Some(requested)) if own != requested => {
                return Err(ServiceError::Forbidden(
                    "Cannot create users in another tenant".to_string(),
                ))
            }
            (Some(own), _) => Some(own),
            (None, requested) => requested,
        };
        Self::ensure_manage(ctx, tenant_id)?;

        let db = &*self.db_pool;
        if request.collection == UserCollection::CustomerUsers {
            let (Some(tenant_id), Some(customer_id)) = (tenant_id, request.customer_id) else {
                return Err(ServiceError::ValidationError(
                    "Customer users need a tenant_id and a customer_id".to_string(),
                ));
            };
            let exists = customer::Entity::find_by_id(customer_id)
                .filter(customer::Column::TenantId.eq(tenant_id))
                .count(db)
                .await?;
            if exists == 0 {
                return Err(ServiceError::ValidationError(format!(
                    "Customer {} does not exist in this tenant",
                    customer_id
                )));
            }
        }
        if let Some(role_id) = request.role_id {
            self.check_role_assignable(ctx, role_id, tenant_id).await?;
        }

        let email = request.email.trim().to_ascii_lowercase();
        let duplicate = user::Entity::find()
            .filter(user::Column::Email.eq(email.clone()))
            .count(db)
            .await?;
        if duplicate > 0 {
            return Err(ServiceError::Conflict(format!(
                "A user with email {} already exists",
                email
            )));
        }

        let customer_id = match request.collection {
            UserCollection::CustomerUsers => request.customer_id,
            UserCollection::Users => None,
        };
        let user = user::ActiveModel {
            tenant_id: Set(tenant_id),
            email: Set(email),
            name: Set(request.name),
            role_id: Set(request.role_id),
            collection: Set(request.collection.to_string()),
            customer_id: Set(customer_id),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(db)
        .await?;

        info!(user_id = %user.id, "User created");
        Ok(user)
    }

    #[instrument(skip(self, ctx))]
    pub async fn get_user(&self, ctx: &AuthContext, id: Uuid) -> Result<user::Model, ServiceError> {
        let user = user::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))?;

        let visible = match user.tenant_id {
            Some(tenant_id) => {
                ctx.can_read_tenant(tenant_id) && (!ctx.is_customer() || ctx.user_id == user.id)
            }
            None => ctx.is_super_admin(),
        };
        if !visible {
            return Err(ServiceError::not_found("User", id));
        }
        Ok(user)
    }

    #[instrument(skip(self, ctx))]
    pub async fn list_users(
        &self,
        ctx: &AuthContext,
        page: u64,
        per_page: u64,
    ) -> Result<PaginatedResponse<user::Model>, ServiceError> {
        let mut query = user::Entity::find().order_by_asc(user::Column::Email);
        if let Some(own) = ctx.tenant_scope() {
            query = query.filter(user::Column::TenantId.eq(own));
        }
        if ctx.is_customer() {
            query = query.filter(user::Column::Id.eq(ctx.user_id));
        }
        super::paginate(&self.db_pool, query, page, per_page).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn update_user(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        request: UpdateUserRequest,
    ) -> Result<user::Model, ServiceError> {
        request.validate()?;
        let user = self.get_user(ctx, id).await?;
        Self::ensure_manage(ctx, user.tenant_id)?;
        if let Some(role_id) = request.role_id {
            self.check_role_assignable(ctx, role_id, user.tenant_id).await?;
        }

        let mut active: user::ActiveModel = user.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(role_id) = request.role_id {
            active.role_id = Set(Some(role_id));
        }
        if let Some(is_active) = request.is_active {
            active.is_active = Set(is_active);
        }
        Ok(active.update(&*self.db_pool).await?)
    }

    #[instrument(skip(self, ctx))]
    pub async fn delete_user(&self, ctx: &AuthContext, id: Uuid) -> Result<(), ServiceError> {
        let user = self.get_user(ctx, id).await?;
        Self::ensure_manage(ctx, user.tenant_id)?;
        if user.id == ctx.user_id {
            return Err(ServiceError::InvalidOperation(
                "Users cannot delete themselves".to_string(),
            ));
        }
        user.delete(&*self.db_pool).await?;
        info!(user_id = %id, "User deleted");
        Ok(())
    }
}
