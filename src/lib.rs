#![doc = "The `teamforge` library crate."]
#![doc = ""]
#![doc = "Multi-tenant task tracking: accounts with email verification, cookie sessions,"]
#![doc = "projects with owners and members, and tasks. Services sit behind persistence"]
#![doc = "ports with a PostgreSQL and an in-memory adapter; user lookups can be fronted by"]
#![doc = "a Redis read-through cache."]

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;

pub use crate::error::AppError;
pub use crate::state::{AppState, Ports};
