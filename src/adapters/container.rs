use crate::domain::ports::{LifecycleState, ServletContainer, StartContext};
use crate::utils::error::Result;

/// A container that accepts the start context without binding a listener.
///
/// Used for dry runs and for inspecting exactly what a real container would be
/// handed on start.
#[derive(Debug)]
pub struct DetachedContainer {
    state: LifecycleState,
    last_context: Option<StartContext>,
    starts: usize,
}

impl DetachedContainer {
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Stopped,
            last_context: None,
            starts: 0,
        }
    }

    pub fn last_context(&self) -> Option<&StartContext> {
        self.last_context.as_ref()
    }

    pub fn start_count(&self) -> usize {
        self.starts
    }
}

impl Default for DetachedContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl ServletContainer for DetachedContainer {
    fn start(&mut self, context: &StartContext) -> Result<()> {
        tracing::debug!(
            "Detached container mounting {} servlets on port {}",
            context.servlets.len(),
            context.port
        );
        self.last_context = Some(context.clone());
        self.starts += 1;
        self.state = LifecycleState::Started;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.state = LifecycleState::Stopped;
        Ok(())
    }

    fn state(&self) -> LifecycleState {
        self.state
    }
}
