//! Stateful services behind the HTTP handlers.

pub mod bucket_list_service;
pub mod identity_store;
pub mod persistence;
pub mod record_repository;
pub mod session_registry;
