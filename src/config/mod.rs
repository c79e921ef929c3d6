pub mod settings;

pub use settings::{GeneralConfig, Settings};
