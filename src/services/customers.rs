use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{
        access::{customer_condition, ensure_read, ensure_write, tenant_condition, write_tenant},
        AuthContext,
    },
    db::DbPool,
    entities::{customer, inbound_job, outbound_job, paying_customer, sku},
    errors::ServiceError,
    PaginatedResponse,
};

/// Contact details shared by customers and paying customers
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePartyRequest {
    pub tenant_id: Option<Uuid>,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePartyRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
}

/// Customers (stock owners) and paying customers (bill-to parties)
#[derive(Clone)]
pub struct CustomerService {
    db_pool: Arc<DbPool>,
}

impl CustomerService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, ctx))]
    pub async fn create_customer(
        &self,
        ctx: &AuthContext,
        request: CreatePartyRequest,
    ) -> Result<customer::Model, ServiceError> {
        request.validate()?;
        let tenant_id = write_tenant(ctx, request.tenant_id)?;

        let customer = customer::ActiveModel {
            tenant_id: Set(tenant_id),
            name: Set(request.name),
            email: Set(request.email),
            phone: Set(request.phone),
            address_line1: Set(request.address_line1),
            address_line2: Set(request.address_line2),
            city: Set(request.city),
            state: Set(request.state),
            postcode: Set(request.postcode),
            country: Set(request.country),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        info!(customer_id = %customer.id, "Customer created");
        Ok(customer)
    }

    /// Portal users only see the customer they act for
    #[instrument(skip(self, ctx))]
    pub async fn get_customer(&self, ctx: &AuthContext, id: Uuid) -> Result<customer::Model, ServiceError> {
        let customer = customer::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Customer", id))?;
        ensure_read(ctx, "Customer", id, customer.tenant_id, Some(customer.id))?;
        Ok(customer)
    }

    #[instrument(skip(self, ctx))]
    pub async fn list_customers(
        &self,
        ctx: &AuthContext,
        page: u64,
        per_page: u64,
    ) -> Result<PaginatedResponse<customer::Model>, ServiceError> {
        let query = customer::Entity::find()
            .filter(tenant_condition(ctx, customer::Column::TenantId))
            .filter(customer_condition(ctx, customer::Column::Id))
            .order_by_asc(customer::Column::Name);
        super::paginate(&self.db_pool, query, page, per_page).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn update_customer(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        request: UpdatePartyRequest,
    ) -> Result<customer::Model, ServiceError> {
        request.validate()?;
        let customer = self.get_customer(ctx, id).await?;
        ensure_write(ctx, customer.tenant_id)?;

        let mut active: customer::ActiveModel = customer.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if request.email.is_some() {
            active.email = Set(request.email);
        }
        if request.phone.is_some() {
            active.phone = Set(request.phone);
        }
        if request.address_line1.is_some() {
            active.address_line1 = Set(request.address_line1);
        }
        if request.address_line2.is_some() {
            active.address_line2 = Set(request.address_line2);
        }
        if request.city.is_some() {
            active.city = Set(request.city);
        }
        if request.state.is_some() {
            active.state = Set(request.state);
        }
        if request.postcode.is_some() {
            active.postcode = Set(request.postcode);
        }
        if request.country.is_some() {
            active.country = Set(request.country);
        }
        Ok(active.update(&*self.db_pool).await?)
    }

    /// Customers still owning SKUs or jobs are kept
    #[instrument(skip(self, ctx))]
    pub async fn delete_customer(&self, ctx: &AuthContext, id: Uuid) -> Result<(), ServiceError> {
        let customer = self.get_customer(ctx, id).await?;
        ensure_write(ctx, customer.tenant_id)?;

        let db = &*self.db_pool;
        let skus = sku::Entity::find()
            .filter(sku::Column::CustomerId.eq(id))
            .count(db)
            .await?;
        let inbound = inbound_job::Entity::find()
            .filter(inbound_job::Column::CustomerId.eq(id))
            .count(db)
            .await?;
        let outbound = outbound_job::Entity::find()
            .filter(outbound_job::Column::CustomerId.eq(id))
            .count(db)
            .await?;
        if skus + inbound + outbound > 0 {
            return Err(ServiceError::Conflict(format!(
                "Customer {} still has {} SKU(s) and {} job(s)",
                customer.name,
                skus,
                inbound + outbound
            )));
        }

        customer.delete(db).await?;
        info!(customer_id = %id, "Customer deleted");
        Ok(())
    }

    #[instrument(skip(self, ctx))]
    pub async fn create_paying_customer(
        &self,
        ctx: &AuthContext,
        request: CreatePartyRequest,
    ) -> Result<paying_customer::Model, ServiceError> {
        request.validate()?;
        let tenant_id = write_tenant(ctx, request.tenant_id)?;

        let paying = paying_customer::ActiveModel {
            tenant_id: Set(tenant_id),
            name: Set(request.name),
            email: Set(request.email),
            phone: Set(request.phone),
            address_line1: Set(request.address_line1),
            address_line2: Set(request.address_line2),
            city: Set(request.city),
            state: Set(request.state),
            postcode: Set(request.postcode),
            country: Set(request.country),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        info!(paying_customer_id = %paying.id, "Paying customer created");
        Ok(paying)
    }

    #[instrument(skip(self, ctx))]
    pub async fn get_paying_customer(
        &self,
        ctx: &AuthContext,
        id: Uuid,
    ) -> Result<paying_customer::Model, ServiceError> {
        let paying = paying_customer::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("PayingCustomer", id))?;
        ensure_read(ctx, "PayingCustomer", id, paying.tenant_id, None)?;
        Ok(paying)
    }

    #[instrument(skip(self, ctx))]
    pub async fn list_paying_customers(
        &self,
        ctx: &AuthContext,
        page: u64,
        per_page: u64,
    ) -> Result<PaginatedResponse<paying_customer::Model>, ServiceError> {
        let query = paying_customer::Entity::find()
            .filter(tenant_condition(ctx, paying_customer::Column::TenantId))
            .order_by_asc(paying_customer::Column::Name);
        super::paginate(&self.db_pool, query, page, per_page).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn update_paying_customer(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        request: UpdatePartyRequest,
    ) -> Result<paying_customer::Model, ServiceError> {
        request.validate()?;
        let paying = self.get_paying_customer(ctx, id).await?;
        ensure_write(ctx, paying.tenant_id)?;

        let mut active: paying_customer::ActiveModel = paying.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if request.email.is_some() {
            active.email = Set(request.email);
        }
        if request.phone.is_some() {
            active.phone = Set(request.phone);
        }
        if request.address_line1.is_some() {
            active.address_line1 = Set(request.address_line1);
        }
        if request.address_line2.is_some() {
            active.address_line2 = Set(request.address_line2);
        }
        if request.city.is_some() {
            active.city = Set(request.city);
        }
        if request.state.is_some() {
            active.state = Set(request.state);
        }
        if request.postcode.is_some() {
            active.postcode = Set(request.postcode);
        }
        if request.country.is_some() {
            active.country = Set(request.country);
        }
        Ok(active.update(&*self.db_pool).await?)
    }

    #[instrument(skip(self, ctx))]
    pub async fn delete_paying_customer(&self, ctx: &AuthContext, id: Uuid) -> Result<(), ServiceError> {
        let paying = self.get_paying_customer(ctx, id).await?;
        ensure_write(ctx, paying.tenant_id)?;
        paying.delete(&*self.db_pool).await?;
        info!(paying_customer_id = %id, "Paying customer deleted");
        Ok(())
    }
}
