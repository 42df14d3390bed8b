pub mod listing;
pub mod resource;
pub mod user;
