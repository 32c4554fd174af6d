pub mod resources;
pub mod samples;
pub mod validation;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
