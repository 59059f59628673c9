// src/handlers.rs

pub mod access;
pub mod buttons;
pub mod entitlements;
pub mod navigation;
pub mod permissions;
pub mod profiles;
