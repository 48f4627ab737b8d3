pub mod handler;
pub mod params;
