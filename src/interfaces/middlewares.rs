pub mod browser_context;
pub mod route_guard;
