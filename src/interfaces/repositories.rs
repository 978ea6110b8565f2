pub mod backend_repo;
pub mod category;
pub mod contact;
pub mod post;
pub mod project;
