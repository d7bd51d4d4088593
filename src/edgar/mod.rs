// src/edgar/mod.rs
pub mod backoff;
pub mod client;
pub mod filing;
pub mod models;
pub mod resolver;
