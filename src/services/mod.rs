// src/services/mod.rs

pub mod auth;
pub mod catalog_service;
pub mod domain_service;
pub mod order_service;
pub mod tenancy_service;
