// Infrastructure layer - Configuration and storage adapters
pub mod config;
pub mod memory_repository;
