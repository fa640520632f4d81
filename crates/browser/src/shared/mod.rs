pub mod js;
pub mod dom;
pub mod errors;
pub mod config;

pub use config::WaitConfig;
pub use errors::to_driver_error;
