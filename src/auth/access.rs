//! Tenant scoping and per-collection access predicates.
//!
//! Reads outside the caller's tenant surface as "not found" so record ids
//! from other tenants are not disclosed; writes the caller's role does not
//! allow are "forbidden".

use sea_orm::{ColumnTrait, Condition};
use uuid::Uuid;

use super::{AuthContext, UserRole};
use crate::entities::UserCollection;
use crate::errors::ServiceError;

impl AuthContext {
    pub fn is_super_admin(&self) -> bool {
        self.role == UserRole::SuperAdmin
    }

    /// Portal users see only their own customer's records
    pub fn is_customer(&self) -> bool {
        self.role == UserRole::Customer || self.collection == UserCollection::CustomerUsers
    }

    /// The tenant the caller is confined to; `None` means every tenant
    pub fn tenant_scope(&self) -> Option<Uuid> {
        if self.is_super_admin() {
            None
        } else {
            self.tenant_id
        }
    }

    pub fn can_read_tenant(&self, tenant_id: Uuid) -> bool {
        self.is_super_admin() || self.tenant_id == Some(tenant_id)
    }

    /// Whether a record belonging to `customer_id` is visible to the caller
    pub fn can_read_customer_record(&self, tenant_id: Uuid, customer_id: Option<Uuid>) -> bool {
        if !self.can_read_tenant(tenant_id) {
            return false;
        }
        if !self.is_customer() {
            return true;
        }
        match customer_id {
            Some(owner) => self.customer_id == Some(owner),
            None => true,
        }
    }

    /// Operational records: bookings, jobs, stock, fleet
    pub fn can_write_operational(&self, tenant_id: Uuid) -> bool {
        match self.role {
            UserRole::SuperAdmin => true,
            UserRole::TenantAdmin | UserRole::WarehouseStaff => {
                !self.is_customer() && self.tenant_id == Some(tenant_id)
            }
            UserRole::Customer => false,
        }
    }

    /// Roles and users
    pub fn can_manage_accounts(&self, tenant_id: Option<Uuid>) -> bool {
        match self.role {
            UserRole::SuperAdmin => true,
            UserRole::TenantAdmin => tenant_id.is_some() && self.tenant_id == tenant_id,
            _ => false,
        }
    }
}

/// Fails with NotFound unless the record is visible to the caller
pub fn ensure_read(
    ctx: &AuthContext,
    entity: &str,
    id: Uuid,
    tenant_id: Uuid,
    customer_id: Option<Uuid>,
) -> Result<(), ServiceError> {
    if ctx.can_read_customer_record(tenant_id, customer_id) {
        Ok(())
    } else {
        Err(ServiceError::not_found(entity, id))
    }
}

/// Fails unless the caller may modify operational records of `tenant_id`
pub fn ensure_write(ctx: &AuthContext, tenant_id: Uuid) -> Result<(), ServiceError> {
    if ctx.can_write_operational(tenant_id) {
        Ok(())
    } else if ctx.can_read_tenant(tenant_id) {
        Err(ServiceError::Forbidden(
            "Your role does not allow modifying this record".to_string(),
        ))
    } else {
        Err(ServiceError::Forbidden(
            "Record belongs to another tenant".to_string(),
        ))
    }
}

/// Resolves the tenant a new record is created in.
///
/// Tenant users always write into their own tenant; super admins must name
/// one explicitly.
pub fn write_tenant(ctx: &AuthContext, requested: Option<Uuid>) -> Result<Uuid, ServiceError> {
    let tenant_id = match (ctx.tenant_scope(), requested) {
        (Some(own), Some(req)) if own != req => {
            return Err(ServiceError::Forbidden(
                "Cannot create records in another tenant".to_string(),
            ))
        }
        (Some(own), _) => own,
        (None, Some(req)) => req,
        (None, None) => {
            return Err(ServiceError::ValidationError(
                "tenant_id is required".to_string(),
            ))
        }
    };

    ensure_write(ctx, tenant_id)?;
    Ok(tenant_id)
}

/// Row filter restricting a query to the caller's tenant
pub fn tenant_condition<C: ColumnTrait>(ctx: &AuthContext, tenant_column: C) -> Condition {
    match ctx.tenant_scope() {
        Some(tenant_id) => Condition::all().add(tenant_column.eq(tenant_id)),
        None => Condition::all(),
    }
}

/// Row filter for tables that carry a customer reference
pub fn customer_condition<C: ColumnTrait>(ctx: &AuthContext, customer_column: C) -> Condition {
    if !ctx.is_customer() {
        return Condition::all();
    }
    match ctx.customer_id {
        Some(customer_id) => Condition::all().add(customer_column.eq(customer_id)),
        // A portal user without a customer sees nothing customer-owned
        None => Condition::all().add(customer_column.is_in(Vec::<Uuid>::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn super_admin_reads_and_writes_everywhere() {
        let ctx = AuthContext::super_admin(Uuid::new_v4());
        let tenant = Uuid::new_v4();
        assert!(ctx.can_read_customer_record(tenant, Some(Uuid::new_v4())));
        assert!(ctx.can_write_operational(tenant));
        assert!(ctx.can_manage_accounts(None));
        assert_eq!(ctx.tenant_scope(), None);
    }

    #[test]
    fn staff_confined_to_own_tenant() {
        let tenant = Uuid::new_v4();
        let other = Uuid::new_v4();
        let ctx = AuthContext::staff(Uuid::new_v4(), UserRole::WarehouseStaff, tenant);

        assert!(ctx.can_write_operational(tenant));
        assert!(!ctx.can_write_operational(other));
        assert!(!ctx.can_read_tenant(other));
        assert!(!ctx.can_manage_accounts(Some(tenant)));
        assert_matches!(ensure_write(&ctx, other), Err(ServiceError::Forbidden(_)));
    }

    #[test]
    fn tenant_admin_manages_accounts_in_own_tenant_only() {
        let tenant = Uuid::new_v4();
        let ctx = AuthContext::staff(Uuid::new_v4(), UserRole::TenantAdmin, tenant);
        assert!(ctx.can_manage_accounts(Some(tenant)));
        assert!(!ctx.can_manage_accounts(Some(Uuid::new_v4())));
        assert!(!ctx.can_manage_accounts(None));
    }

    #[test]
    fn customer_user_is_read_only_and_restricted_to_own_customer() {
        let tenant = Uuid::new_v4();
        let customer = Uuid::new_v4();
        let ctx = AuthContext::customer_user(Uuid::new_v4(), tenant, customer);

        assert!(ctx.can_read_customer_record(tenant, Some(customer)));
        assert!(ctx.can_read_customer_record(tenant, None));
        assert!(!ctx.can_read_customer_record(tenant, Some(Uuid::new_v4())));
        assert!(!ctx.can_write_operational(tenant));
        assert_matches!(
            ensure_read(&ctx, "Sku", Uuid::new_v4(), tenant, Some(Uuid::new_v4())),
            Err(ServiceError::NotFound(_))
        );
    }

    #[test]
    fn write_tenant_resolution() {
        let tenant = Uuid::new_v4();
        let staff = AuthContext::staff(Uuid::new_v4(), UserRole::TenantAdmin, tenant);
        assert_eq!(write_tenant(&staff, None).unwrap(), tenant);
        assert_eq!(write_tenant(&staff, Some(tenant)).unwrap(), tenant);
        assert_matches!(
            write_tenant(&staff, Some(Uuid::new_v4())),
            Err(ServiceError::Forbidden(_))
        );

        let admin = AuthContext::super_admin(Uuid::new_v4());
        assert_matches!(
            write_tenant(&admin, None),
            Err(ServiceError::ValidationError(_))
        );
        assert_eq!(write_tenant(&admin, Some(tenant)).unwrap(), tenant);
    }
}
