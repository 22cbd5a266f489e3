use crate::error::{FountainError, Result};
use crate::fec::MAX_SOURCE_SYMBOLS;
use serde::Deserialize;
use std::path::Path;

/// Codec settings loaded from the `[codec]` table of a TOML file.
#[derive(Clone, Debug, PartialEq)]
pub struct CodecConfig {
    pub symbol_size: usize,
    /// Repair symbols to emit as a fraction of K.
    pub repair_overhead: f64,
    pub min_repair_symbols: u32,
    pub max_source_symbols: usize,
    pub parallel_repair: bool,
    pub log_level: String,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            symbol_size: 1400,
            repair_overhead: 0.25,
            min_repair_symbols: 2,
            max_source_symbols: MAX_SOURCE_SYMBOLS,
            parallel_repair: true,
            log_level: "info".to_string(),
        }
    }
}

impl CodecConfig {
    /// Load configuration from a TOML string. Missing keys keep their defaults.
    pub fn from_toml(s: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct Root {
            codec: Option<Codec>,
        }

        #[derive(Deserialize)]
        struct Codec {
            symbol_size: Option<usize>,
            repair_overhead: Option<f64>,
            min_repair_symbols: Option<u32>,
            max_source_symbols: Option<usize>,
            parallel_repair: Option<bool>,
            log_level: Option<String>,
        }

        let raw: Root = toml::from_str(s)?;
        let mut cfg = Self::default();
        if let Some(c) = raw.codec {
            if let Some(v) = c.symbol_size {
                cfg.symbol_size = v;
            }
            if let Some(v) = c.repair_overhead {
                cfg.repair_overhead = v;
            }
            if let Some(v) = c.min_repair_symbols {
                cfg.min_repair_symbols = v;
            }
            if let Some(v) = c.max_source_symbols {
                cfg.max_source_symbols = v;
            }
            if let Some(v) = c.parallel_repair {
                cfg.parallel_repair = v;
            }
            if let Some(v) = c.log_level {
                cfg.log_level = v;
            }
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from a file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.symbol_size == 0 || self.symbol_size > u16::MAX as usize {
            return Err(FountainError::Config(format!(
                "symbol_size must be in 1..={}, got {}",
                u16::MAX,
                self.symbol_size
            )));
        }
        if !self.repair_overhead.is_finite() || self.repair_overhead < 0.0 {
            return Err(FountainError::Config(format!(
                "repair_overhead must be a non-negative fraction, got {}",
                self.repair_overhead
            )));
        }
        if self.max_source_symbols == 0 || self.max_source_symbols > MAX_SOURCE_SYMBOLS {
            return Err(FountainError::Config(format!(
                "max_source_symbols must be in 1..={}, got {}",
                MAX_SOURCE_SYMBOLS, self.max_source_symbols
            )));
        }
        Ok(())
    }

    /// Repair symbols to emit for a block of `k` source symbols.
    pub fn repair_count(&self, k: usize) -> u32 {
        let scaled = (k as f64 * self.repair_overhead).ceil() as u32;
        scaled.max(self.min_repair_symbols)
    }

    /// Checks a payload against the configured block ceiling.
    pub fn check_payload(&self, len: usize) -> Result<usize> {
        let k = len.div_ceil(self.symbol_size);
        if k > self.max_source_symbols {
            return Err(FountainError::UnsupportedSize {
                requested: k,
                max: self.max_source_symbols,
            });
        }
        Ok(k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_codec_table() {
        let cfg = CodecConfig::from_toml(
            r#"
            [codec]
            symbol_size = 512
            repair_overhead = 0.5
            parallel_repair = false
            "#,
        )
        .unwrap();
        assert_eq!(cfg.symbol_size, 512);
        assert_eq!(cfg.repair_overhead, 0.5);
        assert!(!cfg.parallel_repair);
        assert_eq!(cfg.min_repair_symbols, 2);
        assert_eq!(cfg.repair_count(10), 5);
        assert_eq!(cfg.repair_count(1), 2);
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(CodecConfig::from_toml("").unwrap(), CodecConfig::default());
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            CodecConfig::from_toml("[codec]\nsymbol_size = 0"),
            Err(FountainError::Config(_))
        ));
        assert!(matches!(
            CodecConfig::from_toml("[codec]\nrepair_overhead = -1.0"),
            Err(FountainError::Config(_))
        ));
        assert!(matches!(
            CodecConfig::from_toml("[codec]\nsymbol_size = \"big\""),
            Err(FountainError::Toml(_))
        ));
    }

    #[test]
    fn payload_ceiling() {
        let cfg = CodecConfig {
            symbol_size: 10,
            max_source_symbols: 4,
            ..CodecConfig::default()
        };
        assert_eq!(cfg.check_payload(40).unwrap(), 4);
        assert!(matches!(
            cfg.check_payload(41),
            Err(FountainError::UnsupportedSize { requested: 5, max: 4 })
        ));
    }
}
