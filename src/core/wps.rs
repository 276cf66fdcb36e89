use crate::adapters::container::DetachedContainer;
use crate::core::capabilities::CapabilitiesSkeleton;
use crate::core::configuration::{
    DataHandler, Properties, Property, WpsConfiguration, ALGORITHM_PROPERTY,
    LOCAL_ALGORITHM_REPOSITORY,
};
use crate::domain::model::Format;
use crate::domain::ports::{LifecycleState, ServletContainer, ServletMapping, StartContext};
use crate::utils::error::{Result, WpsError};
use crate::utils::validation::{validate_class_name, validate_service_url};
use std::sync::{Mutex, MutexGuard, PoisonError};
use url::Url;

pub const WEB_PROCESSING_SERVICE_PATH: &str = "/WebProcessingService";
pub const RETRIEVE_RESULT_SERVLET_PATH: &str = "/RetrieveResultServlet";
pub const ROOT_CONTEXT: &str = "/";

const WEB_PROCESSING_SERVICE_SERVLET: &str = "org.n52.wps.server.WebProcessingService";
const RETRIEVE_RESULT_SERVLET: &str = "org.n52.wps.server.RetrieveResultServlet";

struct Inner<C> {
    configuration: WpsConfiguration,
    container: C,
    parser_count: usize,
    generator_count: usize,
}

/// An embedded Web Processing Service.
///
/// Registrations and settings build up the configuration document until
/// [`Wps::start`] hands it to the servlet container. A single lock serialises
/// every mutation, lifecycle transition and status query; mutating a running
/// server fails with [`WpsError::IllegalState`].
pub struct Wps<C: ServletContainer = DetachedContainer> {
    port: u16,
    service_url: Url,
    servlets: Vec<ServletMapping>,
    inner: Mutex<Inner<C>>,
}

impl Wps<DetachedContainer> {
    pub fn detached(host: &str, port: u16) -> Result<Self> {
        Self::new(host, port, DetachedContainer::new())
    }
}

impl<C: ServletContainer> Wps<C> {
    pub fn new(host: &str, port: u16, container: C) -> Result<Self> {
        Self::create(host, port, false, container)
    }

    pub fn with_https(host: &str, port: u16, container: C) -> Result<Self> {
        Self::create(host, port, true, container)
    }

    fn create(host: &str, port: u16, https: bool, container: C) -> Result<Self> {
        let protocol = if https { "https" } else { "http" };
        let base = validate_service_url("server", protocol, host, port)?;
        let service_url = base
            .join(WEB_PROCESSING_SERVICE_PATH.trim_start_matches('/'))
            .map_err(|e| WpsError::InvalidConfigValueError {
                field: "server".to_string(),
                value: host.to_string(),
                reason: format!("Invalid service path: {}", e),
            })?;

        let servlets = vec![
            ServletMapping {
                context_path: ROOT_CONTEXT.to_string(),
                path: WEB_PROCESSING_SERVICE_PATH.to_string(),
                servlet: WEB_PROCESSING_SERVICE_SERVLET.to_string(),
            },
            ServletMapping {
                context_path: ROOT_CONTEXT.to_string(),
                path: RETRIEVE_RESULT_SERVLET_PATH.to_string(),
                servlet: RETRIEVE_RESULT_SERVLET.to_string(),
            },
        ];

        tracing::debug!("Created WPS configuration for {}", service_url);

        Ok(Self {
            port,
            service_url,
            servlets,
            inner: Mutex::new(Inner {
                configuration: WpsConfiguration::new(host, port, https),
                container,
                parser_count: 0,
                generator_count: 0,
            }),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner<C>>> {
        self.inner.lock().map_err(|_| WpsError::LockPoisoned)
    }

    /// Locks for a mutation, which is only allowed while the server is not running.
    fn lock_for(&self, operation: &str) -> Result<MutexGuard<'_, Inner<C>>> {
        let guard = self.lock()?;
        if guard.container.state().is_running() {
            tracing::warn!("Refusing to {} while the server is running", operation);
            return Err(WpsError::illegal_state(format!(
                "cannot {} while the server is running",
                operation
            )));
        }
        Ok(guard)
    }

    pub fn service_url(&self) -> &Url {
        &self.service_url
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn set_min_pool_size(&self, size: u32) -> Result<&Self> {
        self.lock_for("set the minimum pool size")?
            .configuration
            .server
            .min_pool_size = size;
        Ok(self)
    }

    pub fn set_max_pool_size(&self, size: u32) -> Result<&Self> {
        self.lock_for("set the maximum pool size")?
            .configuration
            .server
            .max_pool_size = size;
        Ok(self)
    }

    pub fn set_include_data_inputs_in_response(&self, include: bool) -> Result<&Self> {
        self.lock_for("change response data inputs")?
            .configuration
            .server
            .include_data_inputs_in_response = include;
        Ok(self)
    }

    pub fn set_keep_alive(&self, seconds: u32) -> Result<&Self> {
        self.lock_for("set the keep-alive")?
            .configuration
            .server
            .keep_alive_seconds = seconds;
        Ok(self)
    }

    pub fn set_computation_timeout(&self, milliseconds: u32) -> Result<&Self> {
        self.lock_for("set the computation timeout")?
            .configuration
            .server
            .computation_timeout_millis = milliseconds;
        Ok(self)
    }

    pub fn set_max_queued_tasks(&self, max: u32) -> Result<&Self> {
        self.lock_for("set the task queue length")?
            .configuration
            .server
            .max_queued_tasks = max;
        Ok(self)
    }

    /// Registers (or re-activates) an algorithm repository and appends its properties.
    pub fn add_algorithm_repository(
        &self,
        class_name: &str,
        properties: Option<&Properties>,
    ) -> Result<&Self> {
        validate_class_name("repository.class_name", class_name)?;
        let mut inner = self.lock_for("add an algorithm repository")?;
        inner
            .configuration
            .add_repository_properties(class_name, properties);
        tracing::debug!("Registered algorithm repository {}", class_name);
        Ok(self)
    }

    /// Registers an algorithm on the local algorithm repository.
    pub fn add_algorithm(&self, class_name: &str) -> Result<&Self> {
        validate_class_name("algorithm", class_name)?;
        let mut inner = self.lock_for("add an algorithm")?;
        inner
            .configuration
            .ensure_repository(LOCAL_ALGORITHM_REPOSITORY)
            .properties
            .push(Property::active(ALGORITHM_PROPERTY, class_name));
        tracing::debug!("Registered algorithm {}", class_name);
        Ok(self)
    }

    pub fn add_parser(
        &self,
        class_name: &str,
        formats: &[Format],
        properties: Option<&Properties>,
    ) -> Result<&Self> {
        validate_class_name("parser.class_name", class_name)?;
        let mut inner = self.lock_for("add a parser")?;
        let name = format!("parser{}", inner.parser_count);
        inner.parser_count += 1;
        tracing::debug!(
            "Registered parser {} as {} with {} formats",
            class_name,
            name,
            formats.len()
        );
        inner
            .configuration
            .parsers
            .push(DataHandler::new(name, class_name, formats, properties));
        Ok(self)
    }

    pub fn add_generator(
        &self,
        class_name: &str,
        formats: &[Format],
        properties: Option<&Properties>,
    ) -> Result<&Self> {
        validate_class_name("generator.class_name", class_name)?;
        let mut inner = self.lock_for("add a generator")?;
        let name = format!("generator{}", inner.generator_count);
        inner.generator_count += 1;
        tracing::debug!(
            "Registered generator {} as {} with {} formats",
            class_name,
            name,
            formats.len()
        );
        inner
            .configuration
            .generators
            .push(DataHandler::new(name, class_name, formats, properties));
        Ok(self)
    }

    /// Snapshot of the configuration document as it stands.
    pub fn configuration(&self) -> Result<WpsConfiguration> {
        Ok(self.lock()?.configuration.clone())
    }

    pub fn configuration_xml(&self) -> Result<String> {
        self.lock()?.configuration.to_xml()
    }

    /// Renders the configuration and boots the container. Blocks until the
    /// container reports back.
    pub fn start(&self) -> Result<()> {
        let mut inner = self.lock_for("start")?;

        let context = StartContext {
            port: self.port,
            servlets: self.servlets.clone(),
            configuration_xml: inner.configuration.to_xml()?,
            capabilities_xml: CapabilitiesSkeleton::default().to_xml()?,
        };

        tracing::info!("Starting WPS at {}", self.service_url);
        if let Err(e) = inner.container.start(&context) {
            tracing::error!("WPS failed to start: {}", e);
            return Err(e);
        }
        tracing::info!("WPS started at {}", self.service_url);
        Ok(())
    }

    pub fn stop(&self) -> Result<()> {
        let mut inner = self.lock()?;
        if !inner.container.state().is_running() {
            return Err(WpsError::illegal_state("cannot stop a server that is not running"));
        }

        tracing::info!("Stopping WPS at {}", self.service_url);
        inner.container.stop()?;
        tracing::info!("WPS stopped");
        Ok(())
    }

    /// Runs `f` against the container under the configuration lock.
    pub fn inspect_container<R>(&self, f: impl FnOnce(&C) -> R) -> R {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&inner.container)
    }

    pub fn state(&self) -> LifecycleState {
        self.inspect_container(|container| container.state())
    }

    pub fn is_running(&self) -> bool {
        self.state().is_running()
    }

    pub fn is_started(&self) -> bool {
        self.state() == LifecycleState::Started
    }

    pub fn is_starting(&self) -> bool {
        self.state() == LifecycleState::Starting
    }

    pub fn is_stopping(&self) -> bool {
        self.state() == LifecycleState::Stopping
    }

    pub fn is_stopped(&self) -> bool {
        self.state() == LifecycleState::Stopped
    }

    pub fn is_failed(&self) -> bool {
        self.state() == LifecycleState::Failed
    }
}
