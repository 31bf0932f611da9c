//! Error types for the fallible edges of the engine.
//!
//! Rendering a tick never fails. Errors only surface when settings are
//! validated at construction and when external labels are parsed into the
//! engine's closed enums.

use thiserror::Error;

/// Invalid runtime settings or display geometry.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("display size {width}x{height} is empty")]
    EmptyDisplay { width: u32, height: u32 },

    #[error("UI frequency must be positive, got {0}")]
    InvalidUiFrequency(f32),

    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f32 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },

    #[error(transparent)]
    Theme(#[from] ThemeError),
}

/// A turn-signal theme descriptor could not be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ThemeError {
    #[error("unknown turn signal style '{0}'")]
    UnknownStyle(String),

    #[error("theme descriptor '{0}' has no '_<period_ms>' suffix")]
    MissingPeriod(String),

    #[error("invalid frame period in theme descriptor '{0}'")]
    InvalidPeriod(String),
}

/// An external speed-limit source label is not one of the known sources.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown speed limit source '{0}'")]
pub struct ParseSourceError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offending_value() {
        let e = ConfigError::Negative { field: "speed_limit_offset", value: -3.0 };
        assert_eq!(e.to_string(), "speed_limit_offset must not be negative, got -3");

        let e = ParseSourceError("Radar".into());
        assert_eq!(e.to_string(), "unknown speed limit source 'Radar'");
    }

    #[test]
    fn test_theme_error_converts_into_config_error() {
        let e: ConfigError = ThemeError::UnknownStyle("wavy".into()).into();
        assert_eq!(e.to_string(), "unknown turn signal style 'wavy'");
    }
}
