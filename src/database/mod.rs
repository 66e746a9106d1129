pub mod availability;
pub mod memory_repository;
pub mod session;
pub mod tutor;
