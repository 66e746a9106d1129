pub mod availability;
pub mod dashboard;
pub mod fixture;
pub mod pagination;
pub mod session;
pub mod session_set;
pub mod slot;
pub mod tutor;
