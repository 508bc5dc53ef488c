use std::collections::BTreeSet;
use std::time::Duration;

use serde::Deserialize;

use super::barcode::BarcodeFormat;
use super::error::ConfigError;

/// Configuration for a scan attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfiguration {
    /// Symbologies the decode call should recognize (default: QR only).
    pub formats: BTreeSet<BarcodeFormat>,

    /// Decode timeout handed to the backend. The session never enforces it.
    pub timeout: Option<Duration>,

    /// Kick off the platform's one-time scanner module install once
    /// capability has been confirmed (default: true).
    pub install_module: bool,
}

/// Wire shape accepted by [`ScanConfiguration::from_json`].
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawScanConfiguration {
    #[serde(default)]
    formats: Option<Vec<BarcodeFormat>>,
    #[serde(default)]
    timeout_ms: Option<u64>,
    #[serde(default)]
    install_module: Option<bool>,
}

impl ScanConfiguration {
    pub fn with_formats(formats: impl IntoIterator<Item = BarcodeFormat>) -> Self {
        Self {
            formats: formats.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn install_module(mut self, install: bool) -> Self {
        self.install_module = install;
        self
    }

    pub fn accepts(&self, format: BarcodeFormat) -> bool {
        self.formats.contains(&format)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.formats.is_empty() {
            return Err(ConfigError::NoFormats);
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration, e.g.
    /// `{"formats": ["qr_code", "ean_13"], "timeout_ms": 15000}`.
    ///
    /// Omitted fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawScanConfiguration =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let defaults = Self::default();
        let config = Self {
            formats: raw
                .formats
                .map(|f| f.into_iter().collect())
                .unwrap_or(defaults.formats),
            timeout: raw.timeout_ms.map(Duration::from_millis),
            install_module: raw.install_module.unwrap_or(defaults.install_module),
        };
        config.validate()?;
        Ok(config)
    }
}

impl Default for ScanConfiguration {
    fn default() -> Self {
        Self {
            formats: BTreeSet::from([BarcodeFormat::QrCode]),
            timeout: None,
            install_module: true,
        }
    }
}
