pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::container::DetachedContainer;
pub use config::TomlConfig;
pub use self::core::{configuration::Properties, wps::Wps};
pub use domain::model::Format;
pub use domain::ports::{FormatSink, FormatSource, LifecycleState, ServletContainer};
pub use utils::error::{Result, WpsError};
