use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Barcode symbology a decode call can be configured to recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarcodeFormat {
    Aztec,
    Codabar,
    #[serde(rename = "code_39")]
    Code39,
    #[serde(rename = "code_93")]
    Code93,
    #[serde(rename = "code_128")]
    Code128,
    DataMatrix,
    #[serde(rename = "ean_8")]
    Ean8,
    #[serde(rename = "ean_13")]
    Ean13,
    Itf,
    #[serde(rename = "pdf_417")]
    Pdf417,
    QrCode,
    UpcA,
    UpcE,
}

impl BarcodeFormat {
    pub const ALL: [BarcodeFormat; 13] = [
        Self::Aztec,
        Self::Codabar,
        Self::Code39,
        Self::Code93,
        Self::Code128,
        Self::DataMatrix,
        Self::Ean8,
        Self::Ean13,
        Self::Itf,
        Self::Pdf417,
        Self::QrCode,
        Self::UpcA,
        Self::UpcE,
    ];

    /// Canonical lowercase identifier, e.g. `qr_code`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aztec => "aztec",
            Self::Codabar => "codabar",
            Self::Code39 => "code_39",
            Self::Code93 => "code_93",
            Self::Code128 => "code_128",
            Self::DataMatrix => "data_matrix",
            Self::Ean8 => "ean_8",
            Self::Ean13 => "ean_13",
            Self::Itf => "itf",
            Self::Pdf417 => "pdf_417",
            Self::QrCode => "qr_code",
            Self::UpcA => "upc_a",
            Self::UpcE => "upc_e",
        }
    }

    /// Resolve a native symbology identifier.
    ///
    /// Platforms spell identifiers differently (`QR_CODE`, `qr_code`, `pdf417`),
    /// so matching ignores case and underscores. Returns `None` for anything
    /// outside the known set; callers treat that as "ignore this candidate".
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        let normalized: String = identifier
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        Self::ALL
            .into_iter()
            .find(|format| format.as_str().replace('_', "") == normalized)
    }
}

impl std::fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BarcodeFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_identifier(s).ok_or_else(|| format!("unknown barcode format: {}", s))
    }
}

/// One barcode reported by the native layer for a single decode call.
///
/// `format` is `None` when the platform reported a symbology this crate does
/// not know about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBarcode {
    pub raw_value: String,
    pub format: Option<BarcodeFormat>,
}

impl DecodedBarcode {
    pub fn new(raw_value: impl Into<String>, format: Option<BarcodeFormat>) -> Self {
        Self {
            raw_value: raw_value.into(),
            format,
        }
    }
}

/// The decoded value handed to the host after a successful scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanPayload {
    pub raw_value: String,
    pub format: BarcodeFormat,
    pub scanned_at: DateTime<Utc>,
}

impl ScanPayload {
    pub fn new(raw_value: impl Into<String>, format: BarcodeFormat) -> Self {
        Self {
            raw_value: raw_value.into(),
            format,
            scanned_at: Utc::now(),
        }
    }
}
