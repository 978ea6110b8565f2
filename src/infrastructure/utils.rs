pub mod html;
pub mod valid_id;
