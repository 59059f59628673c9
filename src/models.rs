// src/models.rs

pub mod access;
pub mod auth;
pub mod button;
pub mod entitlement;
pub mod navigation;
pub mod permission;
pub mod profile;
