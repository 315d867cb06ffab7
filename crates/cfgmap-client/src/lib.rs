//! CRUD collaborators for configuration entities
//!
//! Services take and return typed entities and marshal them with the wire
//! codec from `cfgmap-core`. [`Guarded`] checks identity preconditions
//! before anything is sent.

pub mod config;
pub mod credentials;
pub mod error;
pub mod memory;
pub mod rest;
pub mod service;

pub use config::ClientConfig;
pub use credentials::{ApiToken, BearerToken, Credentials, Headers, NoCredentials};
pub use error::{Error, Result};
pub use memory::InMemoryService;
pub use rest::RestService;
pub use service::{CrudService, Entity, Guarded, Stub};
