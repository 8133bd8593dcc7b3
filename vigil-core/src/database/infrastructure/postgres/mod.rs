//! PostgreSQL infrastructure adapters implementing the database ports.

pub mod repositories;

pub use repositories::availability::PostgresAvailabilityRepository;
pub use repositories::volunteers::PostgresVolunteerRepository;
