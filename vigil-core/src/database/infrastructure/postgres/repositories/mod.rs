pub mod availability;
pub mod volunteers;
