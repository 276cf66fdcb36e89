use thiserror::Error;

#[derive(Error, Debug)]
pub enum WpsError {
    #[error("Illegal state: {message}")]
    IllegalState { message: String },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Servlet container error: {message}")]
    ContainerError { message: String },

    #[error("Configuration lock poisoned")]
    LockPoisoned,

    #[error("Rendered XML is not valid UTF-8: {0}")]
    XmlError(#[from] std::string::FromUtf8Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    State,
    Configuration,
    Container,
    System,
}

impl WpsError {
    pub fn illegal_state(message: impl Into<String>) -> Self {
        WpsError::IllegalState {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            WpsError::IllegalState { .. } => ErrorCategory::State,
            WpsError::InvalidConfigValueError { .. }
            | WpsError::MissingConfigError { .. }
            | WpsError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            WpsError::ContainerError { .. } => ErrorCategory::Container,
            WpsError::LockPoisoned | WpsError::XmlError(_) | WpsError::IoError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::State => "Stop the server before changing its configuration",
            ErrorCategory::Configuration => "Check the deployment description for invalid values",
            ErrorCategory::Container => "Inspect the servlet container logs",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, WpsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(
            WpsError::illegal_state("running").category(),
            ErrorCategory::State
        );
        let err = WpsError::MissingConfigError {
            field: "server.host".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.to_string(), "Missing configuration field: server.host");
        assert_eq!(WpsError::LockPoisoned.category(), ErrorCategory::System);
    }

    #[test]
    fn test_invalid_utf8_output_is_an_xml_error() {
        fn render(bytes: Vec<u8>) -> Result<String> {
            Ok(String::from_utf8(bytes)?)
        }

        let err = render(vec![b'<', 0xff, b'>']).unwrap_err();
        assert!(matches!(err, WpsError::XmlError(_)));
        assert_eq!(err.category(), ErrorCategory::System);
        assert_eq!(render(b"<a/>".to_vec()).unwrap(), "<a/>");
    }
}
