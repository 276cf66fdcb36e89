use crate::core::configuration::Properties;
use crate::core::wps::Wps;
use crate::domain::model::Format;
use crate::domain::ports::ServletContainer;
use crate::utils::error::{Result, WpsError};
use crate::utils::validation::{
    validate_class_name, validate_non_empty_string, validate_positive_number, validate_range,
    validate_required_field, validate_service_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"))
}

/// Deployment description of an embedded WPS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub repositories: Vec<RepositoryConfig>,
    #[serde(default)]
    pub algorithms: Vec<String>,
    #[serde(default)]
    pub parsers: Vec<HandlerConfig>,
    #[serde(default)]
    pub generators: Vec<HandlerConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub https: bool,
    pub min_pool_size: Option<u32>,
    pub max_pool_size: Option<u32>,
    pub keep_alive_seconds: Option<u32>,
    pub computation_timeout_millis: Option<u32>,
    pub max_queued_tasks: Option<u32>,
    pub include_data_inputs_in_response: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub class_name: String,
    #[serde(default)]
    pub properties: Properties,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandlerConfig {
    pub class_name: String,
    #[serde(default)]
    pub formats: Vec<FormatConfig>,
    #[serde(default)]
    pub properties: Properties,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormatConfig {
    pub mime_type: Option<String>,
    pub encoding: Option<String>,
    pub schema: Option<String>,
}

impl From<&FormatConfig> for Format {
    fn from(config: &FormatConfig) -> Self {
        Format::new(
            config.mime_type.as_deref(),
            config.encoding.as_deref(),
            config.schema.as_deref(),
        )
    }
}

impl HandlerConfig {
    pub fn formats(&self) -> Vec<Format> {
        self.formats.iter().map(Format::from).collect()
    }

    fn properties(&self) -> Option<&Properties> {
        (!self.properties.is_empty()).then_some(&self.properties)
    }
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(WpsError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| WpsError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as written.
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        let protocol = if self.server.https { "https" } else { "http" };
        validate_service_url("server", protocol, &self.server.host, self.server.port)?;

        if let Some(size) = self.server.min_pool_size {
            validate_positive_number("server.min_pool_size", size as usize, 1)?;
        }
        if let Some(size) = self.server.max_pool_size {
            validate_positive_number("server.max_pool_size", size as usize, 1)?;
            let min = self
                .server
                .min_pool_size
                .unwrap_or(crate::core::configuration::DEFAULT_MIN_POOL_SIZE);
            validate_range("server.max_pool_size", size, min, u32::MAX)?;
        }

        for repository in &self.repositories {
            validate_class_name("repositories.class_name", &repository.class_name)?;
        }
        for algorithm in &self.algorithms {
            validate_class_name("algorithms", algorithm)?;
        }
        for handler in self.parsers.iter().chain(&self.generators) {
            validate_class_name("handlers.class_name", &handler.class_name)?;
            for format in &handler.formats {
                let mime_type = validate_required_field("handlers.formats.mime_type", &format.mime_type)?;
                validate_non_empty_string("handlers.formats.mime_type", mime_type)?;
            }
        }

        Ok(())
    }

    /// Builds a server from this description.
    pub fn build<C: ServletContainer>(&self, container: C) -> Result<Wps<C>> {
        let wps = if self.server.https {
            Wps::with_https(&self.server.host, self.server.port, container)?
        } else {
            Wps::new(&self.server.host, self.server.port, container)?
        };
        self.apply(&wps)?;
        Ok(wps)
    }

    /// Registers everything described here on `wps`, which must not be running.
    pub fn apply<C: ServletContainer>(&self, wps: &Wps<C>) -> Result<()> {
        let server = &self.server;
        if let Some(size) = server.min_pool_size {
            wps.set_min_pool_size(size)?;
        }
        if let Some(size) = server.max_pool_size {
            wps.set_max_pool_size(size)?;
        }
        if let Some(seconds) = server.keep_alive_seconds {
            wps.set_keep_alive(seconds)?;
        }
        if let Some(millis) = server.computation_timeout_millis {
            wps.set_computation_timeout(millis)?;
        }
        if let Some(max) = server.max_queued_tasks {
            wps.set_max_queued_tasks(max)?;
        }
        if let Some(include) = server.include_data_inputs_in_response {
            wps.set_include_data_inputs_in_response(include)?;
        }

        for repository in &self.repositories {
            let properties = (!repository.properties.is_empty()).then_some(&repository.properties);
            wps.add_algorithm_repository(&repository.class_name, properties)?;
        }
        for algorithm in &self.algorithms {
            wps.add_algorithm(algorithm)?;
        }
        for parser in &self.parsers {
            wps.add_parser(&parser.class_name, &parser.formats(), parser.properties())?;
        }
        for generator in &self.generators {
            wps.add_generator(&generator.class_name, &generator.formats(), generator.properties())?;
        }

        tracing::info!(
            "Applied deployment: {} repositories, {} algorithms, {} parsers, {} generators",
            self.repositories.len(),
            self.algorithms.len(),
            self.parsers.len(),
            self.generators.len()
        );
        Ok(())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
