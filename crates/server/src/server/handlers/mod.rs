pub mod download;
pub mod migrate;
pub mod resources;
pub mod upload;
