pub mod capabilities;
pub mod configuration;
pub mod wps;

pub use crate::domain::model::Format;
pub use crate::domain::ports::{LifecycleState, ServletContainer, StartContext};
pub use crate::utils::error::Result;
