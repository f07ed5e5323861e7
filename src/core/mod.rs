pub mod config;
pub mod errors;
pub mod kernel;
pub mod legacy;
pub mod traits;
pub mod types;
