//! Translation between core `BarcodeFormat` values and the identifiers each
//! native layer speaks.

use scan_session_core::BarcodeFormat;

/// Identifier vocabulary of a native scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatScheme {
    /// Capacitor plugins: `QR_CODE`, `EAN_13`, `PDF_417`.
    Capacitor,
    /// Browser `BarcodeDetector`: `qr_code`, `ean_13`, `pdf417`.
    WebDetector,
}

impl FormatScheme {
    pub fn identifier(self, format: BarcodeFormat) -> &'static str {
        match self {
            FormatScheme::Capacitor => match format {
                BarcodeFormat::Aztec => "AZTEC",
                BarcodeFormat::Codabar => "CODABAR",
                BarcodeFormat::Code39 => "CODE_39",
                BarcodeFormat::Code93 => "CODE_93",
                BarcodeFormat::Code128 => "CODE_128",
                BarcodeFormat::DataMatrix => "DATA_MATRIX",
                BarcodeFormat::Ean8 => "EAN_8",
                BarcodeFormat::Ean13 => "EAN_13",
                BarcodeFormat::Itf => "ITF",
                BarcodeFormat::Pdf417 => "PDF_417",
                BarcodeFormat::QrCode => "QR_CODE",
                BarcodeFormat::UpcA => "UPC_A",
                BarcodeFormat::UpcE => "UPC_E",
            },
            FormatScheme::WebDetector => match format {
                BarcodeFormat::Pdf417 => "pdf417",
                other => other.as_str(),
            },
        }
    }

    pub fn identifiers(self, formats: &[BarcodeFormat]) -> Vec<String> {
        formats
            .iter()
            .map(|format| self.identifier(*format).to_string())
            .collect()
    }

    /// Inverse of [`FormatScheme::identifier`], ignoring ASCII case.
    /// Identifiers outside this scheme resolve to `None`.
    pub fn parse(self, identifier: &str) -> Option<BarcodeFormat> {
        let format = BarcodeFormat::ALL
            .into_iter()
            .find(|format| self.identifier(*format).eq_ignore_ascii_case(identifier));
        if format.is_none() {
            log::debug!("Unrecognized native barcode format {:?}", identifier);
        }
        format
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_format_round_trips_in_both_schemes() {
        for scheme in [FormatScheme::Capacitor, FormatScheme::WebDetector] {
            for format in BarcodeFormat::ALL {
                assert_eq!(scheme.parse(scheme.identifier(format)), Some(format));
            }
        }
    }

    #[test]
    fn web_detector_spells_pdf417_without_underscore() {
        assert_eq!(FormatScheme::WebDetector.identifier(BarcodeFormat::Pdf417), "pdf417");
        assert_eq!(FormatScheme::Capacitor.identifier(BarcodeFormat::Pdf417), "PDF_417");
    }

    #[test]
    fn schemes_do_not_accept_each_others_spellings() {
        assert_eq!(FormatScheme::Capacitor.parse("pdf417"), None);
        assert_eq!(FormatScheme::WebDetector.parse("PDF_417"), None);
        assert_eq!(FormatScheme::Capacitor.parse("PDF_417"), Some(BarcodeFormat::Pdf417));
        assert_eq!(FormatScheme::WebDetector.parse("pdf417"), Some(BarcodeFormat::Pdf417));
    }

    #[test]
    fn parsing_ignores_case() {
        assert_eq!(FormatScheme::Capacitor.parse("qr_code"), Some(BarcodeFormat::QrCode));
        assert_eq!(FormatScheme::WebDetector.parse("QR_CODE"), Some(BarcodeFormat::QrCode));
    }

    #[test]
    fn unknown_identifiers_are_dropped() {
        assert_eq!(FormatScheme::Capacitor.parse("MAXICODE"), None);
        assert_eq!(FormatScheme::WebDetector.parse("unknown"), None);
    }
}
