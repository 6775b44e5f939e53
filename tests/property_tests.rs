use freightwms_api::{
    entities::{BookingStatus, ContainerStatus, JobType},
    services::status_rules::{aggregate_booking_status, next_booking_status},
};
use proptest::prelude::*;

fn import_status() -> impl Strategy<Value = ContainerStatus> {
    prop_oneof![
        Just(ContainerStatus::Expecting),
        Just(ContainerStatus::Received),
        Just(ContainerStatus::PutAway),
    ]
}

fn export_status() -> impl Strategy<Value = ContainerStatus> {
    prop_oneof![
        Just(ContainerStatus::Allocated),
        Just(ContainerStatus::PickedUp),
        Just(ContainerStatus::Dispatched),
    ]
}

fn import_rank(status: BookingStatus) -> u8 {
    match status {
        BookingStatus::Expecting => 0,
        BookingStatus::PartiallyReceived => 1,
        BookingStatus::Received => 2,
        BookingStatus::PartiallyPutAway => 3,
        BookingStatus::PutAway => 4,
        other => panic!("not an import status: {other}"),
    }
}

proptest! {
    #[test]
    fn container_order_does_not_matter(
        statuses in prop::collection::vec(import_status(), 1..12),
        rotation in 0usize..12,
    ) {
        let mut shuffled = statuses.clone();
        shuffled.rotate_left(rotation % statuses.len());
        shuffled.reverse();
        prop_assert_eq!(
            aggregate_booking_status(JobType::Import, &statuses),
            aggregate_booking_status(JobType::Import, &shuffled)
        );
    }

    #[test]
    fn export_bookings_stay_on_the_export_ladder(
        statuses in prop::collection::vec(export_status(), 1..12),
    ) {
        let status = aggregate_booking_status(JobType::Export, &statuses);
        prop_assert!(matches!(
            status,
            Some(
                BookingStatus::Allocated
                    | BookingStatus::PartiallyPicked
                    | BookingStatus::ReadyToDispatch
                    | BookingStatus::PartiallyDispatched
                    | BookingStatus::Dispatched
            )
        ));
    }

    #[test]
    fn receiving_a_container_never_moves_a_booking_back(
        statuses in prop::collection::vec(import_status(), 1..12),
        index in 0usize..12,
    ) {
        let mut statuses = statuses;
        let index = index % statuses.len();
        statuses[index] = ContainerStatus::Expecting;

        let before = aggregate_booking_status(JobType::Import, &statuses);
        let mut after_receipt = statuses.clone();
        after_receipt[index] = ContainerStatus::Received;
        let after = aggregate_booking_status(JobType::Import, &after_receipt);

        let (Some(before), Some(after)) = (before, after) else {
            panic!("non-empty container sets always aggregate");
        };
        prop_assert!(import_rank(after) >= import_rank(before));
    }

    #[test]
    fn terminal_bookings_are_left_alone(
        statuses in prop::collection::vec(import_status(), 0..12),
        completed in any::<bool>(),
    ) {
        let current = if completed { BookingStatus::Completed } else { BookingStatus::Cancelled };
        prop_assert_eq!(next_booking_status(current, JobType::Import, &statuses), None);
    }
}
