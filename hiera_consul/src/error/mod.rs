//! Error types produced by Consul lookups.

mod constructors;
mod types;

pub use types::LookupError;

#[cfg(test)]
mod tests;
