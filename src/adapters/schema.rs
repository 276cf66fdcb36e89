//! Boundary records of the WPS 1.0.0 schema that carry format fields, and the
//! conversions between them and [`Format`].
//!
//! Lookups through the nested description containers never fail: an absent
//! level yields `None` or an empty [`Formats`] sequence.

use crate::domain::model::Format;
use crate::domain::ports::{FormatSink, FormatSource};
use std::iter::FusedIterator;

macro_rules! format_record {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $name {
            pub mime_type: Option<String>,
            pub encoding: Option<String>,
            pub schema: Option<String>,
        }

        impl FormatSource for $name {
            fn mime_type(&self) -> Option<&str> {
                self.mime_type.as_deref()
            }

            fn encoding(&self) -> Option<&str> {
                self.encoding.as_deref()
            }

            fn schema(&self) -> Option<&str> {
                self.schema.as_deref()
            }
        }

        impl FormatSink for $name {
            fn set_mime_type(&mut self, mime_type: &str) {
                self.mime_type = Some(mime_type.to_string());
            }

            fn set_encoding(&mut self, encoding: &str) {
                self.encoding = Some(encoding.to_string());
            }

            fn set_schema(&mut self, schema: &str) {
                self.schema = Some(schema.to_string());
            }
        }

        impl From<&Format> for $name {
            fn from(format: &Format) -> Self {
                let mut record = Self::default();
                format.encode_to(&mut record);
                record
            }
        }
    };
}

format_record!(
    /// `wps:Reference` of an Execute input.
    InputReference
);
format_record!(
    /// `wps:Output` of a response document request.
    DocumentOutputDefinition
);
format_record!(
    /// `wps:RawDataOutput` request.
    OutputDefinition
);
format_record!(
    /// `wps:Reference` of an Execute output.
    OutputReference
);
format_record!(
    /// Inline `wps:ComplexData` payload.
    ComplexData
);
format_record!(
    /// `Format` entry of a process description.
    ComplexDataDescription
);
format_record!(
    /// `Format` entry of a parser or generator in the configuration document.
    ConfiguredFormat
);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplexDataCombination {
    pub format: ComplexDataDescription,
}

impl FormatSource for ComplexDataCombination {
    fn mime_type(&self) -> Option<&str> {
        self.format.mime_type()
    }

    fn encoding(&self) -> Option<&str> {
        self.format.encoding()
    }

    fn schema(&self) -> Option<&str> {
        self.format.schema()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplexDataCombinations {
    pub formats: Vec<ComplexDataDescription>,
}

impl ComplexDataCombinations {
    pub fn formats(&self) -> Formats<'_> {
        Formats::of(Some(self.formats.as_slice()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupportedComplexData {
    pub default: Option<ComplexDataCombination>,
    pub supported: Option<ComplexDataCombinations>,
}

impl SupportedComplexData {
    pub fn default_format(&self) -> Option<Format> {
        self.default.as_ref().map(|combination| Format::of(combination))
    }

    pub fn supported_formats(&self) -> Formats<'_> {
        formats_of(self.supported.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputDescription {
    pub identifier: String,
    pub complex_data: Option<SupportedComplexData>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputDescription {
    pub identifier: String,
    pub complex_output: Option<SupportedComplexData>,
}

/// Process input or output descriptions that may declare complex data.
pub trait DescribesComplexData {
    fn complex_data(&self) -> Option<&SupportedComplexData>;

    fn default_format(&self) -> Option<Format> {
        self.complex_data()
            .and_then(SupportedComplexData::default_format)
    }

    fn supported_formats(&self) -> Formats<'_> {
        self.complex_data()
            .map(SupportedComplexData::supported_formats)
            .unwrap_or_default()
    }
}

impl DescribesComplexData for InputDescription {
    fn complex_data(&self) -> Option<&SupportedComplexData> {
        self.complex_data.as_ref()
    }
}

impl DescribesComplexData for OutputDescription {
    fn complex_data(&self) -> Option<&SupportedComplexData> {
        self.complex_output.as_ref()
    }
}

/// Lazy sequence of formats over a description list. Clone it to restart.
#[derive(Debug, Clone, Default)]
pub struct Formats<'a> {
    inner: std::slice::Iter<'a, ComplexDataDescription>,
}

impl<'a> Formats<'a> {
    pub fn of(list: Option<&'a [ComplexDataDescription]>) -> Self {
        Self {
            inner: list.unwrap_or(&[]).iter(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

impl Iterator for Formats<'_> {
    type Item = Format;

    fn next(&mut self) -> Option<Format> {
        self.inner.next().map(|description| Format::of(description))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Formats<'_> {}

impl FusedIterator for Formats<'_> {}

pub fn formats_of(list: Option<&ComplexDataCombinations>) -> Formats<'_> {
    list.map(ComplexDataCombinations::formats)
        .unwrap_or_default()
}

pub fn default_format_of<D: DescribesComplexData>(description: Option<&D>) -> Option<Format> {
    description.and_then(DescribesComplexData::default_format)
}

pub fn supported_formats_of<D: DescribesComplexData>(description: Option<&D>) -> Formats<'_> {
    description
        .map(DescribesComplexData::supported_formats)
        .unwrap_or_default()
}
