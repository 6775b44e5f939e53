//! Status derivation rules for containers and bookings.
//!
//! Everything here is pure: the recalculators in `container_status` and
//! `booking_status` load the inputs, call these functions and write the
//! result back only when it differs from what is stored.

use crate::entities::{BookingStatus, ContainerStatus, JobType};

/// Booking status for an import booking, or `None` for an empty container set.
///
/// Rules are evaluated in order; the first match wins.
pub fn aggregate_import(statuses: &[ContainerStatus]) -> Option<BookingStatus> {
    if statuses.is_empty() {
        return None;
    }
    let total = statuses.len();
    let put_away = count(statuses, ContainerStatus::PutAway);
    let received = count(statuses, ContainerStatus::Received);

    let status = if put_away == total {
        BookingStatus::PutAway
    } else if put_away > 0 && put_away + received == total {
        BookingStatus::PartiallyPutAway
    } else if received == total {
        BookingStatus::Received
    } else if put_away + received > 0 {
        BookingStatus::PartiallyReceived
    } else {
        BookingStatus::Expecting
    };
    Some(status)
}

/// Booking status for an export booking, or `None` for an empty container set.
pub fn aggregate_export(statuses: &[ContainerStatus]) -> Option<BookingStatus> {
    if statuses.is_empty() {
        return None;
    }
    let total = statuses.len();
    let dispatched = count(statuses, ContainerStatus::Dispatched);
    let picked_up = count(statuses, ContainerStatus::PickedUp);

    let status = if dispatched == total {
        BookingStatus::Dispatched
    } else if dispatched > 0 && dispatched + picked_up == total {
        BookingStatus::PartiallyDispatched
    } else if picked_up == total {
        BookingStatus::ReadyToDispatch
    } else if dispatched + picked_up > 0 {
        BookingStatus::PartiallyPicked
    } else {
        BookingStatus::Allocated
    };
    Some(status)
}

pub fn aggregate_booking_status(
    job_type: JobType,
    statuses: &[ContainerStatus],
) -> Option<BookingStatus> {
    match job_type {
        JobType::Import => aggregate_import(statuses),
        JobType::Export => aggregate_export(statuses),
    }
}

/// The status a booking should move to, or `None` when nothing is written:
/// terminal bookings, empty container sets and unchanged results.
pub fn next_booking_status(
    current: BookingStatus,
    job_type: JobType,
    statuses: &[ContainerStatus],
) -> Option<BookingStatus> {
    if current.is_terminal() {
        return None;
    }
    aggregate_booking_status(job_type, statuses).filter(|next| *next != current)
}

fn count(statuses: &[ContainerStatus], wanted: ContainerStatus) -> usize {
    statuses.iter().filter(|s| **s == wanted).count()
}

/// Quantities of one stock-allocation product line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineProgress {
    pub received_qty: i32,
    pub allocated_qty: i32,
    pub picked_qty: i32,
}

/// Import container: every line received means received, and put away once a
/// live LPN references the container. Anything less is expecting.
pub fn derive_import_container_status(lines: &[LineProgress], has_put_away: bool) -> ContainerStatus {
    let fully_received = !lines.is_empty() && lines.iter().all(|l| l.received_qty > 0);
    match (fully_received, has_put_away) {
        (true, true) => ContainerStatus::PutAway,
        (true, false) => ContainerStatus::Received,
        (false, _) => ContainerStatus::Expecting,
    }
}

/// Export container status, or `None` to leave it as it is.
///
/// Dispatched containers are never moved back, and without any allocated
/// line there is nothing to derive from.
pub fn derive_export_container_status(
    current: ContainerStatus,
    lines: &[LineProgress],
    has_completed_pickup: bool,
) -> Option<ContainerStatus> {
    if current == ContainerStatus::Dispatched {
        return None;
    }
    let mut allocated = lines.iter().filter(|l| l.allocated_qty > 0).peekable();
    allocated.peek()?;

    let fully_picked = allocated.all(|l| l.picked_qty >= l.allocated_qty);
    if has_completed_pickup && fully_picked {
        Some(ContainerStatus::PickedUp)
    } else {
        Some(ContainerStatus::Allocated)
    }
}

/// Target container status, or `None` when the container keeps its status.
pub fn next_container_status(
    job_type: JobType,
    current: ContainerStatus,
    lines: &[LineProgress],
    has_put_away: bool,
    has_completed_pickup: bool,
) -> Option<ContainerStatus> {
    let derived = match job_type {
        JobType::Import => Some(derive_import_container_status(lines, has_put_away)),
        JobType::Export => derive_export_container_status(current, lines, has_completed_pickup),
    };
    derived.filter(|next| *next != current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use crate::entities::ContainerStatus::*;

    #[rstest]
    #[case(&[PutAway, PutAway], BookingStatus::PutAway)]
    #[case(&[Received, Received, PutAway], BookingStatus::PartiallyPutAway)]
    #[case(&[Received, Received], BookingStatus::Received)]
    #[case(&[Expecting, Received], BookingStatus::PartiallyReceived)]
    #[case(&[Expecting, PutAway], BookingStatus::PartiallyReceived)]
    #[case(&[Expecting, Expecting], BookingStatus::Expecting)]
    fn import_aggregation(#[case] statuses: &[ContainerStatus], #[case] expected: BookingStatus) {
        assert_eq!(aggregate_import(statuses), Some(expected));
    }

    #[rstest]
    #[case(&[Dispatched, Dispatched], BookingStatus::Dispatched)]
    #[case(&[Dispatched, PickedUp], BookingStatus::PartiallyDispatched)]
    #[case(&[PickedUp, PickedUp], BookingStatus::ReadyToDispatch)]
    #[case(&[Allocated, PickedUp], BookingStatus::PartiallyPicked)]
    #[case(&[Allocated, Dispatched], BookingStatus::PartiallyPicked)]
    #[case(&[Allocated], BookingStatus::Allocated)]
    fn export_aggregation(#[case] statuses: &[ContainerStatus], #[case] expected: BookingStatus) {
        assert_eq!(aggregate_export(statuses), Some(expected));
    }

    #[test]
    fn empty_container_set_yields_nothing() {
        assert_eq!(aggregate_import(&[]), None);
        assert_eq!(aggregate_export(&[]), None);
        assert_eq!(
            next_booking_status(BookingStatus::Received, JobType::Import, &[]),
            None
        );
    }

    #[test]
    fn terminal_booking_is_never_overwritten() {
        assert_eq!(
            next_booking_status(BookingStatus::Cancelled, JobType::Import, &[PutAway]),
            None
        );
        assert_eq!(
            next_booking_status(BookingStatus::Completed, JobType::Export, &[Allocated]),
            None
        );
    }

    #[test]
    fn unchanged_booking_status_is_not_rewritten() {
        assert_eq!(
            next_booking_status(BookingStatus::Received, JobType::Import, &[Received]),
            None
        );
        assert_eq!(
            next_booking_status(BookingStatus::Received, JobType::Import, &[Received, PutAway]),
            Some(BookingStatus::PartiallyPutAway)
        );
    }

    fn line(received: i32, allocated: i32, picked: i32) -> LineProgress {
        LineProgress {
            received_qty: received,
            allocated_qty: allocated,
            picked_qty: picked,
        }
    }

    #[test]
    fn import_container_rules() {
        assert_eq!(derive_import_container_status(&[], true), Expecting);
        assert_eq!(
            derive_import_container_status(&[line(5, 0, 0), line(0, 0, 0)], false),
            Expecting
        );
        assert_eq!(
            derive_import_container_status(&[line(5, 0, 0), line(1, 0, 0)], false),
            Received
        );
        assert_eq!(
            derive_import_container_status(&[line(5, 0, 0)], true),
            PutAway
        );
    }

    #[test]
    fn export_container_rules() {
        // no allocated line: unchanged
        assert_eq!(
            derive_export_container_status(Allocated, &[line(0, 0, 0)], true),
            None
        );
        // pickup done but short picked
        assert_eq!(
            derive_export_container_status(Allocated, &[line(0, 10, 4)], true),
            Some(Allocated)
        );
        // fully picked but no completed pickup record
        assert_eq!(
            derive_export_container_status(Allocated, &[line(0, 10, 10)], false),
            Some(Allocated)
        );
        // unallocated lines are ignored for the picked check
        assert_eq!(
            derive_export_container_status(Allocated, &[line(0, 10, 10), line(0, 0, 0)], true),
            Some(PickedUp)
        );
        assert_eq!(
            derive_export_container_status(PickedUp, &[line(0, 10, 2)], true),
            Some(Allocated)
        );
    }

    #[test]
    fn dispatched_container_is_never_moved_back() {
        assert_eq!(
            next_container_status(JobType::Export, Dispatched, &[line(0, 10, 0)], false, false),
            None
        );
    }

    #[test]
    fn next_container_status_skips_unchanged() {
        assert_eq!(
            next_container_status(JobType::Import, Received, &[line(3, 0, 0)], false, false),
            None
        );
        assert_eq!(
            next_container_status(JobType::Import, Received, &[line(3, 0, 0)], true, false),
            Some(PutAway)
        );
    }
}
