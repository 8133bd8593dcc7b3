pub mod inactivity;
