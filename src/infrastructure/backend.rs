pub mod gotrue;
pub mod memory;
pub mod memory_session;
pub mod query;
pub mod rest;
pub mod session;
pub mod store;
