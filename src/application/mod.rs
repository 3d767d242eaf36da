// Application layer - Use cases over form sessions
pub mod calculator_service;
pub mod session_repository;
