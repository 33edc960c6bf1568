// src/models/mod.rs

pub mod auth;
pub mod catalog;
pub mod domains;
pub mod orders;
