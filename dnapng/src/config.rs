use crate::alphabet::{Base, DEFAULT_PADDING};
use crate::error::CodecError;
use crate::layout::Layout;

#[cfg(feature = "serde")]
use serde::Deserialize;

/// Default maximum distance, in 0–255 intensity units, between a sampled
/// pixel and the base it is classified as.
pub const DEFAULT_TOLERANCE: u8 = 20;

/// Settings shared by encode and decode.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct CodecConfig {
    pub layout: Layout,
    /// Character emitted for transparent blocks and accepted in input.
    pub padding: char,
    /// Start encoded images fully transparent instead of opaque black.
    pub transparent_padding: bool,
    pub tolerance: u8,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            layout: Layout::default(),
            padding: DEFAULT_PADDING,
            transparent_padding: true,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl CodecConfig {
    pub fn validate(&self) -> Result<(), CodecError> {
        self.layout.validate()?;
        if Base::from_char(self.padding.to_ascii_uppercase()).is_some() {
            return Err(CodecError::InvalidConfiguration(format!(
                "padding character '{}' collides with a base",
                self.padding
            )));
        }
        if self.padding.is_whitespace() || self.padding.is_control() {
            return Err(CodecError::InvalidConfiguration(
                "padding character must be printable".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse a TOML config and validate it. Missing keys take their defaults.
    #[cfg(feature = "serde")]
    pub fn from_toml(toml_str: &str) -> Result<CodecConfig, ConfigError> {
        let config: CodecConfig =
            toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Parse(String),
    #[error(transparent)]
    Invalid(#[from] CodecError),
}
