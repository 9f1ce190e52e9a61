//! Domain layer: entities and the storage contracts they depend on.

pub mod entity;
pub mod repository;
