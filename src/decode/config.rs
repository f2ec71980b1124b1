//! Decode engine configuration and hint construction.

use super::Symbology;
use crate::capture::ConfigError;
use rxing::{DecodeHintValue, DecodeHints};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Formats and hints handed to the multi-format reader.
///
/// The UPC/EAN readers always verify the EAN-13 check digit and always
/// probe for 2/5-digit supplements, so those behaviours need no hint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// Formats to look for, highest priority first.
    pub formats: Vec<Symbology>,
    /// Spend more time looking for a symbol.
    pub try_harder: bool,
    /// Assume the raster holds nothing but the symbol, for readers that
    /// support it.
    pub pure_barcode: bool,
    /// Character set for byte-mode payloads.
    pub character_set: String,
    /// Retry with global-histogram binarization when the hybrid binarizer
    /// finds nothing.
    pub global_histogram_fallback: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            formats: Symbology::PRIORITY.to_vec(),
            try_harder: true,
            pure_barcode: true,
            character_set: "ISO-8859-1".to_owned(),
            global_histogram_fallback: true,
        }
    }
}

impl DecodeConfig {
    /// Rejects an empty format list.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.formats.is_empty() {
            return Err(ConfigError::NoFormats);
        }
        Ok(())
    }

    /// Builds the reader hints.
    pub fn hints(&self) -> DecodeHints {
        let formats: HashSet<_> = self
            .formats
            .iter()
            .map(|s| s.to_barcode_format())
            .collect();

        DecodeHints::default()
            .with(DecodeHintValue::PossibleFormats(formats))
            .with(DecodeHintValue::TryHarder(self.try_harder))
            .with(DecodeHintValue::PureBarcode(self.pure_barcode))
            .with(DecodeHintValue::CharacterSet(self.character_set.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DecodeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.formats[0], Symbology::Ean13);
        assert!(config.try_harder);
        assert!(config.pure_barcode);
        assert_eq!(config.character_set, "ISO-8859-1");
    }

    #[test]
    fn test_empty_formats_rejected() {
        let config = DecodeConfig {
            formats: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NoFormats)));
    }

    #[test]
    fn test_formats_from_toml() {
        let config: DecodeConfig = toml::from_str(r#"formats = ["ean13", "code128"]"#).unwrap();
        assert_eq!(config.formats, vec![Symbology::Ean13, Symbology::Code128]);
        assert!(config.try_harder);
    }
}
