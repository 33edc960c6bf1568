// src/handlers/mod.rs

pub mod auth;
pub mod catalog;
pub mod domains;
pub mod orders;
pub mod storefront;
