pub mod blog;
pub mod contact;
pub mod extractors;
pub mod portfolio;
pub mod session;
pub mod view_scope;
