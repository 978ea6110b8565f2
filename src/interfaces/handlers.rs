pub mod admin;
pub mod admin_blog;
pub mod admin_contacts;
pub mod admin_portfolio;
pub mod auth;
pub mod blog;
pub mod contact;
pub mod home;
pub mod json_error;
pub mod navigation;
pub mod portfolio;
pub mod views;
