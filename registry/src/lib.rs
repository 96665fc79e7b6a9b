//! Source registry: organization-scoped storage of external data-source configurations,
//! with an admin REST API.

pub mod admin;
pub mod auth;
pub mod crypto;
pub mod entity;
pub mod model;
pub mod settings;
pub mod source_store;
