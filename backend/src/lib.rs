//! Tiramisu backend core library.
//!
//! Provides the persistent document store, the repositories built on it,
//! the credential and token services, and the access-control pipeline
//! behind the questionnaire service. Inbound adapters (HTTP or otherwise)
//! construct an [`context::AppContext`] and call the domain services;
//! nothing in this crate depends on a transport.

pub mod config;
pub mod context;
pub mod domain;
pub mod outbound;
