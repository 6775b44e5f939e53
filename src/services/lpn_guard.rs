//! Double-allocation guard for pallets (LPNs).
//!
//! The decision is made on the row read just before the write. There is no
//! version column, so two writers racing on the same pallet are not
//! serialised here.

use thiserror::Error;
use uuid::Uuid;

use crate::entities::{put_away_stock, AllocationStatus};

/// What an update does to a pallet's allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationCheck {
    /// The update does not set `allocated`
    NotAllocating,
    /// Re-allocation to the job that already holds the pallet
    AlreadyAllocatedToJob(Uuid),
    /// A fresh allocation to this job
    Allocate(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationRejection {
    #[error("LPN {lpn_number} is deleted and cannot be allocated")]
    Deleted { lpn_number: String },
    /// The pallet is held by another outbound job
    #[error("LPN {lpn_number} is already allocated to outbound job {job_id}")]
    AlreadyAllocated { lpn_number: String, job_id: Uuid },
    #[error("outbound_job_id is required when allocating")]
    MissingOutboundJob,
}

/// Checks an update of `stored` that requests `requested_status` and
/// optionally names `requested_job`.
///
/// A pallet held by a job (allocated, picked or dispatched) cannot be
/// pointed at another job unless the same update releases it. When the
/// update names no job, the job already on the row is used.
pub fn check_allocation(
    stored: &put_away_stock::Model,
    requested_status: Option<AllocationStatus>,
    requested_job: Option<Uuid>,
) -> Result<AllocationCheck, AllocationRejection> {
    if requested_status == Some(AllocationStatus::Available) {
        return Ok(AllocationCheck::NotAllocating);
    }
    if let (Some(holder), Some(job)) = (holding_job(stored), requested_job) {
        if holder != job {
            return Err(AllocationRejection::AlreadyAllocated {
                lpn_number: stored.lpn_number.clone(),
                job_id: holder,
            });
        }
    }

    let effective_status = match (requested_status, requested_job) {
        (Some(status), _) => Some(status),
        (None, Some(_)) => stored.allocation_status(),
        (None, None) => None,
    };
    if effective_status != Some(AllocationStatus::Allocated) {
        return Ok(AllocationCheck::NotAllocating);
    }
    if stored.is_deleted {
        return Err(AllocationRejection::Deleted {
            lpn_number: stored.lpn_number.clone(),
        });
    }

    let job = requested_job
        .or(stored.outbound_job_id)
        .ok_or(AllocationRejection::MissingOutboundJob)?;

    if stored.allocation_status() != Some(AllocationStatus::Allocated) {
        return Ok(AllocationCheck::Allocate(job));
    }

    Ok(AllocationCheck::AlreadyAllocatedToJob(job))
}

/// The outbound job a pallet is committed to, if any
fn holding_job(stored: &put_away_stock::Model) -> Option<Uuid> {
    stored
        .allocation_status()
        .filter(AllocationStatus::counts_as_allocated)
        .and(stored.outbound_job_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;

    fn lpn(status: AllocationStatus, job: Option<Uuid>) -> put_away_stock::Model {
        put_away_stock::Model {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            lpn_number: "LPN-000123".to_string(),
            warehouse_id: None,
            location: Some("A-01-02".to_string()),
            sku_id: None,
            qty: 40,
            inbound_job_id: None,
            inbound_product_line_id: None,
            container_detail_id: None,
            outbound_job_id: job,
            outbound_product_line_id: None,
            allocation_status: status.to_string(),
            is_deleted: false,
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn second_job_is_rejected_naming_the_holder() {
        let holder = Uuid::new_v4();
        let stored = lpn(AllocationStatus::Allocated, Some(holder));

        let result = check_allocation(&stored, Some(AllocationStatus::Allocated), Some(Uuid::new_v4()));

        assert_eq!(
            result,
            Err(AllocationRejection::AlreadyAllocated {
                lpn_number: "LPN-000123".to_string(),
                job_id: holder,
            })
        );
    }

    #[test]
    fn same_job_reallocation_is_allowed() {
        let job = Uuid::new_v4();
        let stored = lpn(AllocationStatus::Allocated, Some(job));

        assert_eq!(
            check_allocation(&stored, Some(AllocationStatus::Allocated), Some(job)),
            Ok(AllocationCheck::AlreadyAllocatedToJob(job))
        );
        // no job in the update keeps the stored one
        assert_eq!(
            check_allocation(&stored, Some(AllocationStatus::Allocated), None),
            Ok(AllocationCheck::AlreadyAllocatedToJob(job))
        );
    }

    #[test]
    fn available_pallet_can_be_allocated() {
        let job = Uuid::new_v4();
        let stored = lpn(AllocationStatus::Available, None);
        assert_eq!(
            check_allocation(&stored, Some(AllocationStatus::Allocated), Some(job)),
            Ok(AllocationCheck::Allocate(job))
        );
    }

    #[test]
    fn held_pallet_cannot_change_job_under_another_status() {
        let holder = Uuid::new_v4();
        let other = Uuid::new_v4();
        for held in [AllocationStatus::Allocated, AllocationStatus::Picked, AllocationStatus::Dispatched] {
            let stored = lpn(held, Some(holder));
            for requested in [AllocationStatus::Reserved, AllocationStatus::Picked, AllocationStatus::Allocated] {
                assert_eq!(
                    check_allocation(&stored, Some(requested), Some(other)),
                    Err(AllocationRejection::AlreadyAllocated {
                        lpn_number: "LPN-000123".to_string(),
                        job_id: holder,
                    }),
                    "{held} -> {requested}"
                );
            }
        }
    }

    #[test]
    fn picked_pallet_keeps_its_job_when_reallocated() {
        let job = Uuid::new_v4();
        let stored = lpn(AllocationStatus::Picked, Some(job));
        assert_eq!(
            check_allocation(&stored, Some(AllocationStatus::Allocated), None),
            Ok(AllocationCheck::Allocate(job))
        );
    }

    #[test]
    fn release_may_name_any_job() {
        let stored = lpn(AllocationStatus::Allocated, Some(Uuid::new_v4()));
        assert_eq!(
            check_allocation(&stored, Some(AllocationStatus::Available), Some(Uuid::new_v4())),
            Ok(AllocationCheck::NotAllocating)
        );
    }

    #[test]
    fn reserved_pallet_is_not_held() {
        let stored = lpn(AllocationStatus::Reserved, Some(Uuid::new_v4()));
        let job = Uuid::new_v4();
        assert_eq!(
            check_allocation(&stored, Some(AllocationStatus::Allocated), Some(job)),
            Ok(AllocationCheck::Allocate(job))
        );
    }

    #[test]
    fn allocation_requires_a_job() {
        let stored = lpn(AllocationStatus::Available, None);
        assert_eq!(
            check_allocation(&stored, Some(AllocationStatus::Allocated), None),
            Err(AllocationRejection::MissingOutboundJob)
        );
    }

    #[test]
    fn deleted_pallet_cannot_be_allocated() {
        let mut stored = lpn(AllocationStatus::Available, None);
        stored.is_deleted = true;
        assert_matches!(
            check_allocation(&stored, Some(AllocationStatus::Allocated), Some(Uuid::new_v4())),
            Err(AllocationRejection::Deleted { .. })
        );
    }

    #[test]
    fn other_updates_pass_through() {
        let stored = lpn(AllocationStatus::Allocated, Some(Uuid::new_v4()));
        assert_eq!(
            check_allocation(&stored, Some(AllocationStatus::Available), None),
            Ok(AllocationCheck::NotAllocating)
        );
        assert_eq!(
            check_allocation(&stored, None, None),
            Ok(AllocationCheck::NotAllocating)
        );
    }

    #[test]
    fn moving_an_allocated_pallet_to_another_job_is_rejected() {
        let stored = lpn(AllocationStatus::Allocated, Some(Uuid::new_v4()));
        assert_matches!(
            check_allocation(&stored, None, Some(Uuid::new_v4())),
            Err(AllocationRejection::AlreadyAllocated { .. })
        );
    }
}
