//! Core services consumed by UI callers.
//!
//! # Responsibility
//! - Select and own the storage backend (`data_service`).
//! - Turn raw credentials into authenticated users (`auth`).
//!
//! # Invariants
//! - Services reach storage only through the `EntityStore` port and never
//!   branch on the concrete backend.

pub mod auth;
pub mod data_service;
