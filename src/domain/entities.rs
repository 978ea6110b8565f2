pub mod category;
pub mod contact;
pub mod identity;
pub mod post;
pub mod project;
pub mod validation;
