// Presentation layer - HTTP routes, handlers and page rendering
pub mod app_state;
pub mod handlers;
pub mod page;
pub mod routes;
