//! Domain services: content persistence.

pub mod store;
