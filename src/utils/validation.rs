use crate::utils::error::{Result, WpsError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Builds the base URL the service will be reachable under.
pub fn validate_service_url(field_name: &str, protocol: &str, host: &str, port: u16) -> Result<Url> {
    validate_non_empty_string(field_name, host)?;
    if port == 0 {
        return Err(WpsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: port.to_string(),
            reason: "Port must be greater than 0".to_string(),
        });
    }

    let raw = format!("{}://{}:{}/", protocol, host, port);
    match Url::parse(&raw) {
        Ok(url)
            if url
                .host_str()
                .is_some_and(|parsed| parsed.eq_ignore_ascii_case(host))
                && url.port_or_known_default() == Some(port) =>
        {
            Ok(url)
        }
        Ok(url) => Err(WpsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: host.to_string(),
            reason: format!("Host does not stand alone in {}", url),
        }),
        Err(e) => Err(WpsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: host.to_string(),
            reason: format!("Invalid host: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(WpsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| WpsError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(WpsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// Fully qualified class names: dot separated identifiers, `$` allowed for nested classes.
pub fn validate_class_name(field_name: &str, value: &str) -> Result<()> {
    validate_non_empty_string(field_name, value)?;

    let valid = value.split('.').all(|segment| {
        let mut chars = segment.chars();
        match chars.next() {
            Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {
                chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
            }
            _ => false,
        }
    });

    if !valid {
        return Err(WpsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Not a fully qualified class name".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(WpsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}
