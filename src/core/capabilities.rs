use crate::utils::error::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::{Cursor, Write};

pub const SERVICE: &str = "WPS";
pub const SERVICE_VERSION: &str = "1.0.0";
pub const UPDATE_SEQUENCE: &str = "1";
pub const LANGUAGE: &str = "en-US";

pub const GET_CAPABILITIES: &str = "GetCapabilities";
pub const DESCRIBE_PROCESS: &str = "DescribeProcess";
pub const EXECUTE: &str = "Execute";

const WPS_NAMESPACE: &str = "http://www.opengis.net/wps/1.0.0";
const OWS_NAMESPACE: &str = "http://www.opengis.net/ows/1.1";
const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub name: &'static str,
    pub get: bool,
    pub post: bool,
}

/// Static part of the capabilities document; the service fills in process
/// offerings and endpoint references itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilitiesSkeleton {
    pub language: String,
    pub operations: Vec<Operation>,
}

impl Default for CapabilitiesSkeleton {
    fn default() -> Self {
        Self {
            language: LANGUAGE.to_string(),
            operations: vec![
                Operation {
                    name: GET_CAPABILITIES,
                    get: true,
                    post: false,
                },
                Operation {
                    name: DESCRIBE_PROCESS,
                    get: true,
                    post: false,
                },
                Operation {
                    name: EXECUTE,
                    get: true,
                    post: true,
                },
            ],
        }
    }
}

impl CapabilitiesSkeleton {
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut root = BytesStart::new("wps:Capabilities");
        root.push_attribute(("xmlns:wps", WPS_NAMESPACE));
        root.push_attribute(("xmlns:ows", OWS_NAMESPACE));
        root.push_attribute(("xmlns:xlink", XLINK_NAMESPACE));
        root.push_attribute(("service", SERVICE));
        root.push_attribute(("version", SERVICE_VERSION));
        root.push_attribute(("updateSequence", UPDATE_SEQUENCE));
        root.push_attribute(("xml:lang", self.language.as_str()));
        writer.write_event(Event::Start(root))?;

        writer.write_event(Event::Start(BytesStart::new("ows:ServiceIdentification")))?;
        write_text_element(&mut writer, "ows:ServiceType", SERVICE)?;
        write_text_element(&mut writer, "ows:ServiceTypeVersion", SERVICE_VERSION)?;
        writer.write_event(Event::End(BytesEnd::new("ows:ServiceIdentification")))?;

        writer.write_event(Event::Start(BytesStart::new("ows:OperationsMetadata")))?;
        for operation in &self.operations {
            write_operation(&mut writer, operation)?;
        }
        writer.write_event(Event::End(BytesEnd::new("ows:OperationsMetadata")))?;

        writer.write_event(Event::Start(BytesStart::new("wps:Languages")))?;
        writer.write_event(Event::Start(BytesStart::new("wps:Default")))?;
        write_text_element(&mut writer, "ows:Language", &self.language)?;
        writer.write_event(Event::End(BytesEnd::new("wps:Default")))?;
        writer.write_event(Event::Start(BytesStart::new("wps:Supported")))?;
        write_text_element(&mut writer, "ows:Language", &self.language)?;
        writer.write_event(Event::End(BytesEnd::new("wps:Supported")))?;
        writer.write_event(Event::End(BytesEnd::new("wps:Languages")))?;

        writer.write_event(Event::End(BytesEnd::new("wps:Capabilities")))?;

        let mut output = writer.into_inner().into_inner();
        output.push(b'\n');
        Ok(String::from_utf8(output)?)
    }
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_operation<W: Write>(writer: &mut Writer<W>, operation: &Operation) -> Result<()> {
    let mut start = BytesStart::new("ows:Operation");
    start.push_attribute(("name", operation.name));
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Start(BytesStart::new("ows:DCP")))?;
    writer.write_event(Event::Start(BytesStart::new("ows:HTTP")))?;

    // hrefs stay empty, the service rewrites them per request
    if operation.get {
        let mut get = BytesStart::new("ows:Get");
        get.push_attribute(("xlink:href", ""));
        writer.write_event(Event::Empty(get))?;
    }
    if operation.post {
        let mut post = BytesStart::new("ows:Post");
        post.push_attribute(("xlink:href", ""));
        writer.write_event(Event::Empty(post))?;
    }

    writer.write_event(Event::End(BytesEnd::new("ows:HTTP")))?;
    writer.write_event(Event::End(BytesEnd::new("ows:DCP")))?;
    writer.write_event(Event::End(BytesEnd::new("ows:Operation")))?;
    Ok(())
}
