//! Repository ports (interfaces) consumed by the inactivity notifier.
//! Implementations live in the Postgres adapter under
//! `database::infrastructure::postgres`.

pub mod availability;
pub mod volunteers;

pub use availability::AvailabilityRepository;
pub use volunteers::VolunteerRepository;
