pub mod availability;
pub mod booking;
pub mod dashboard;
pub mod lifecycle;
