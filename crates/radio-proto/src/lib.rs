pub mod config;
pub mod echonest;
pub mod error;
pub mod feedback;
pub mod platform;
pub mod protocol;
pub mod state;
