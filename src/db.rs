// src/db.rs

pub mod store;

pub mod profile_repo;
pub use profile_repo::ProfileRepository;
pub mod button_repo;
pub use button_repo::ButtonRepository;
pub mod navigation_repo;
pub use navigation_repo::NavigationRepository;
pub mod entitlement_repo;
pub use entitlement_repo::{EntitlementRepository, UsageRepository};

#[cfg(test)]
pub mod memory_store;
