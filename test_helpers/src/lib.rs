//! Test helpers shared across crates in the workspace.
//!
//! This crate provides an in-memory Consul agent and `figment::Jail`
//! wrappers.

pub mod consul;
pub mod figment;
