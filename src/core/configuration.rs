use crate::adapters::schema::ConfiguredFormat;
use crate::domain::model::Format;
use crate::utils::error::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::collections::BTreeMap;
use std::io::{Cursor, Write};

pub const CONFIGURATION_NAMESPACE: &str = "http://n52.org/wps";
pub const LOCAL_ALGORITHM_REPOSITORY: &str = "org.n52.wps.server.LocalAlgorithmRepository";
pub const ALGORITHM_PROPERTY: &str = "Algorithm";
pub const DATABASE_CLASS_PROPERTY: &str = "DATABASE_CLASS_NAME";
pub const FLAT_FILE_DATABASE: &str = "org.n52.wps.server.database.FlatFileDatabase";

pub const DEFAULT_MIN_POOL_SIZE: u32 = 10;
pub const DEFAULT_MAX_POOL_SIZE: u32 = 20;
pub const DEFAULT_KEEP_ALIVE_SECONDS: u32 = 1000;
pub const DEFAULT_COMPUTATION_TIMEOUT_MILLIS: u32 = 5;
pub const DEFAULT_MAX_QUEUED_TASKS: u32 = 100;

/// Free-form handler properties; each value becomes its own `Property` element.
pub type Properties = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    /// `None` leaves the `active` attribute off.
    pub active: Option<bool>,
    pub value: String,
}

impl Property {
    pub fn active(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: Some(true),
            value: value.into(),
        }
    }

    pub fn unflagged(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: None,
            value: value.into(),
        }
    }
}

fn expand_properties(properties: Option<&Properties>) -> impl Iterator<Item = Property> + '_ {
    properties
        .into_iter()
        .flat_map(|map| map.iter())
        .flat_map(|(name, values)| values.iter().map(move |value| Property::active(name, value)))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub name: String,
    pub class_name: String,
    pub active: bool,
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataHandler {
    pub name: String,
    pub class_name: String,
    pub active: bool,
    pub formats: Vec<ConfiguredFormat>,
    pub properties: Vec<Property>,
}

impl DataHandler {
    pub fn new<'f>(
        name: String,
        class_name: &str,
        formats: impl IntoIterator<Item = &'f Format>,
        properties: Option<&Properties>,
    ) -> Self {
        Self {
            name,
            class_name: class_name.to_string(),
            active: true,
            formats: formats.into_iter().map(ConfiguredFormat::from).collect(),
            properties: expand_properties(properties).collect(),
        }
    }

    pub fn supported_formats(&self) -> impl Iterator<Item = Format> + '_ {
        self.formats.iter().map(|configured| Format::of(configured))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub hostname: String,
    pub hostport: u16,
    pub protocol: String,
    pub webapp_path: String,
    pub cache_capabilities: bool,
    pub include_data_inputs_in_response: bool,
    pub min_pool_size: u32,
    pub max_pool_size: u32,
    pub keep_alive_seconds: u32,
    pub computation_timeout_millis: u32,
    pub max_queued_tasks: u32,
    pub database: Vec<Property>,
}

impl ServerSettings {
    pub fn new(hostname: &str, hostport: u16, https: bool) -> Self {
        Self {
            hostname: hostname.to_string(),
            hostport,
            protocol: if https { "https" } else { "http" }.to_string(),
            webapp_path: String::new(),
            cache_capabilities: true,
            include_data_inputs_in_response: false,
            min_pool_size: DEFAULT_MIN_POOL_SIZE,
            max_pool_size: DEFAULT_MAX_POOL_SIZE,
            keep_alive_seconds: DEFAULT_KEEP_ALIVE_SECONDS,
            computation_timeout_millis: DEFAULT_COMPUTATION_TIMEOUT_MILLIS,
            max_queued_tasks: DEFAULT_MAX_QUEUED_TASKS,
            database: vec![Property::unflagged(DATABASE_CLASS_PROPERTY, FLAT_FILE_DATABASE)],
        }
    }
}

/// In-memory WPS configuration document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WpsConfiguration {
    pub algorithm_repositories: Vec<Repository>,
    pub remote_repositories: Vec<Repository>,
    pub parsers: Vec<DataHandler>,
    pub generators: Vec<DataHandler>,
    pub server: ServerSettings,
}

impl WpsConfiguration {
    pub fn new(hostname: &str, hostport: u16, https: bool) -> Self {
        Self {
            algorithm_repositories: Vec::new(),
            remote_repositories: Vec::new(),
            parsers: Vec::new(),
            generators: Vec::new(),
            server: ServerSettings::new(hostname, hostport, https),
        }
    }

    /// Returns the repository with `class_name`, appending a new one if none exists.
    /// The repository is (re)activated and its name reset to the class name.
    pub fn ensure_repository(&mut self, class_name: &str) -> &mut Repository {
        let existing = self
            .algorithm_repositories
            .iter()
            .position(|repository| repository.class_name == class_name);
        let index = match existing {
            Some(index) => index,
            None => {
                self.algorithm_repositories.push(Repository {
                    name: String::new(),
                    class_name: String::new(),
                    active: false,
                    properties: Vec::new(),
                });
                self.algorithm_repositories.len() - 1
            }
        };

        let repository = &mut self.algorithm_repositories[index];
        repository.active = true;
        repository.class_name = class_name.to_string();
        repository.name = class_name.to_string();
        repository
    }

    pub fn add_repository_properties(&mut self, class_name: &str, properties: Option<&Properties>) {
        let repository = self.ensure_repository(class_name);
        repository.properties.extend(expand_properties(properties));
    }

    pub fn repository(&self, class_name: &str) -> Option<&Repository> {
        self.algorithm_repositories
            .iter()
            .find(|repository| repository.class_name == class_name)
    }

    /// Class names registered on the local algorithm repository.
    pub fn algorithms(&self) -> Vec<&str> {
        self.repository(LOCAL_ALGORITHM_REPOSITORY)
            .map(|repository| {
                repository
                    .properties
                    .iter()
                    .filter(|p| p.name == ALGORITHM_PROPERTY)
                    .map(|p| p.value.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut root = BytesStart::new("WPSConfiguration");
        root.push_attribute(("xmlns", CONFIGURATION_NAMESPACE));
        writer.write_event(Event::Start(root))?;

        write_repository_list(&mut writer, "AlgorithmRepositoryList", &self.algorithm_repositories)?;
        write_repository_list(&mut writer, "RemoteRepositoryList", &self.remote_repositories)?;

        writer.write_event(Event::Start(BytesStart::new("Datahandlers")))?;
        write_handler_list(&mut writer, "ParserList", "Parser", &self.parsers)?;
        write_handler_list(&mut writer, "GeneratorList", "Generator", &self.generators)?;
        writer.write_event(Event::End(BytesEnd::new("Datahandlers")))?;

        write_server(&mut writer, &self.server)?;

        writer.write_event(Event::End(BytesEnd::new("WPSConfiguration")))?;

        let mut output = writer.into_inner().into_inner();
        output.push(b'\n');
        Ok(String::from_utf8(output)?)
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn write_container<W: Write>(writer: &mut Writer<W>, name: &str, is_empty: bool) -> Result<bool> {
    if is_empty {
        writer.write_event(Event::Empty(BytesStart::new(name)))?;
        return Ok(false);
    }
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    Ok(true)
}

fn write_properties<W: Write>(writer: &mut Writer<W>, properties: &[Property]) -> Result<()> {
    for property in properties {
        let mut start = BytesStart::new("Property");
        start.push_attribute(("name", property.name.as_str()));
        if let Some(active) = property.active {
            start.push_attribute(("active", flag(active)));
        }
        writer.write_event(Event::Start(start))?;
        writer.write_event(Event::Text(BytesText::new(&property.value)))?;
        writer.write_event(Event::End(BytesEnd::new("Property")))?;
    }
    Ok(())
}

fn write_repository_list<W: Write>(
    writer: &mut Writer<W>,
    list_name: &str,
    repositories: &[Repository],
) -> Result<()> {
    if !write_container(writer, list_name, repositories.is_empty())? {
        return Ok(());
    }

    for repository in repositories {
        let mut start = BytesStart::new("Repository");
        start.push_attribute(("name", repository.name.as_str()));
        start.push_attribute(("className", repository.class_name.as_str()));
        start.push_attribute(("active", flag(repository.active)));

        if repository.properties.is_empty() {
            writer.write_event(Event::Empty(start))?;
        } else {
            writer.write_event(Event::Start(start))?;
            write_properties(writer, &repository.properties)?;
            writer.write_event(Event::End(BytesEnd::new("Repository")))?;
        }
    }

    writer.write_event(Event::End(BytesEnd::new(list_name)))?;
    Ok(())
}

fn write_format<W: Write>(writer: &mut Writer<W>, format: &ConfiguredFormat) -> Result<()> {
    let mut start = BytesStart::new("Format");
    if let Some(mime_type) = &format.mime_type {
        start.push_attribute(("mimetype", mime_type.as_str()));
    }
    if let Some(encoding) = &format.encoding {
        start.push_attribute(("encoding", encoding.as_str()));
    }
    if let Some(schema) = &format.schema {
        start.push_attribute(("schema", schema.as_str()));
    }
    writer.write_event(Event::Empty(start))?;
    Ok(())
}

fn write_handler_list<W: Write>(
    writer: &mut Writer<W>,
    list_name: &str,
    element_name: &str,
    handlers: &[DataHandler],
) -> Result<()> {
    if !write_container(writer, list_name, handlers.is_empty())? {
        return Ok(());
    }

    for handler in handlers {
        let mut start = BytesStart::new(element_name);
        start.push_attribute(("name", handler.name.as_str()));
        start.push_attribute(("className", handler.class_name.as_str()));
        start.push_attribute(("active", flag(handler.active)));

        if handler.formats.is_empty() && handler.properties.is_empty() {
            writer.write_event(Event::Empty(start))?;
            continue;
        }

        writer.write_event(Event::Start(start))?;
        for format in &handler.formats {
            write_format(writer, format)?;
        }
        write_properties(writer, &handler.properties)?;
        writer.write_event(Event::End(BytesEnd::new(element_name)))?;
    }

    writer.write_event(Event::End(BytesEnd::new(list_name)))?;
    Ok(())
}

fn write_server<W: Write>(writer: &mut Writer<W>, server: &ServerSettings) -> Result<()> {
    let hostport = server.hostport.to_string();
    let min_pool_size = server.min_pool_size.to_string();
    let max_pool_size = server.max_pool_size.to_string();
    let keep_alive = server.keep_alive_seconds.to_string();
    let timeout = server.computation_timeout_millis.to_string();
    let max_queued = server.max_queued_tasks.to_string();

    let mut start = BytesStart::new("Server");
    start.push_attribute(("hostname", server.hostname.as_str()));
    start.push_attribute(("hostport", hostport.as_str()));
    start.push_attribute(("protocol", server.protocol.as_str()));
    start.push_attribute(("webappPath", server.webapp_path.as_str()));
    // attribute name follows the 52N schema spelling
    start.push_attribute(("cacheCapabilites", flag(server.cache_capabilities)));
    start.push_attribute((
        "includeDataInputsInResponse",
        flag(server.include_data_inputs_in_response),
    ));
    start.push_attribute(("minPoolSize", min_pool_size.as_str()));
    start.push_attribute(("maxPoolSize", max_pool_size.as_str()));
    start.push_attribute(("keepAliveSeconds", keep_alive.as_str()));
    start.push_attribute(("computationTimeoutMilliSeconds", timeout.as_str()));
    start.push_attribute(("maxQueuedTasks", max_queued.as_str()));
    writer.write_event(Event::Start(start))?;

    if write_container(writer, "Database", server.database.is_empty())? {
        write_properties(writer, &server.database)?;
        writer.write_event(Event::End(BytesEnd::new("Database")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("Server")))?;
    Ok(())
}
