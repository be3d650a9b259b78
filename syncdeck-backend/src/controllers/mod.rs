//! HTTP surface. One module per resource; each exposes a
//! `config(cfg: &mut web::ServiceConfig)` used from `main`.

pub mod auth;
pub mod changes;
pub mod databases;
pub mod health;
pub mod operations;
pub mod settings;
pub mod stats;
