use crate::utils::error::Result;

/// Any external record that carries the three format fields.
pub trait FormatSource {
    fn mime_type(&self) -> Option<&str>;
    fn encoding(&self) -> Option<&str>;
    fn schema(&self) -> Option<&str>;
}

/// Any external record a format can be written into.
pub trait FormatSink {
    fn set_mime_type(&mut self, mime_type: &str);
    fn set_encoding(&mut self, encoding: &str);
    fn set_schema(&mut self, schema: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Stopped,
    Starting,
    Started,
    Stopping,
    Failed,
}

impl LifecycleState {
    pub fn is_running(self) -> bool {
        matches!(self, LifecycleState::Starting | LifecycleState::Started)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServletMapping {
    pub context_path: String,
    pub path: String,
    pub servlet: String,
}

/// Everything the embedded container needs to boot the service.
#[derive(Debug, Clone)]
pub struct StartContext {
    pub port: u16,
    pub servlets: Vec<ServletMapping>,
    pub configuration_xml: String,
    pub capabilities_xml: String,
}

/// The embedded servlet container hosting the processing service.
///
/// `start` and `stop` may block until the listener is bound or released.
pub trait ServletContainer: Send {
    fn start(&mut self, context: &StartContext) -> Result<()>;
    fn stop(&mut self) -> Result<()>;
    fn state(&self) -> LifecycleState;
}
