pub mod consts;
pub mod model;

pub use model::{AppConfig, BuilderConfig, InstallerConfig, RuntimeConfig, Variant};
