// src/services.rs

pub mod access_service;
pub mod auth;
pub mod button_service;
pub mod feature_service;
pub mod navigation_service;
pub mod permission_service;
pub mod profile_service;
pub mod quota_service;

#[cfg(test)]
pub mod test_support;
