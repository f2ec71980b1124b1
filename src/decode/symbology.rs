//! Barcode symbologies understood by the scanner.

use rxing::BarcodeFormat;
use serde::{Deserialize, Serialize};

/// A barcode symbology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symbology {
    /// EAN-13.
    Ean13,
    /// UPC-A.
    UpcA,
    /// EAN-8.
    Ean8,
    /// UPC-E.
    UpcE,
    /// Code 128.
    Code128,
    /// Code 39.
    Code39,
    /// Code 93.
    Code93,
    /// Codabar.
    Codabar,
    /// QR Code.
    Qr,
    /// Data Matrix.
    DataMatrix,
}

impl Symbology {
    /// Default decode priority. EAN-13 comes first since it subsumes UPC-A.
    pub const PRIORITY: [Symbology; 10] = [
        Symbology::Ean13,
        Symbology::UpcA,
        Symbology::Ean8,
        Symbology::UpcE,
        Symbology::Code128,
        Symbology::Code39,
        Symbology::Code93,
        Symbology::Codabar,
        Symbology::Qr,
        Symbology::DataMatrix,
    ];

    /// Lowercase name, as written in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Symbology::Ean13 => "EAN-13",
            Symbology::UpcA => "UPC-A",
            Symbology::Ean8 => "EAN-8",
            Symbology::UpcE => "UPC-E",
            Symbology::Code128 => "Code 128",
            Symbology::Code39 => "Code 39",
            Symbology::Code93 => "Code 93",
            Symbology::Codabar => "Codabar",
            Symbology::Qr => "QR Code",
            Symbology::DataMatrix => "Data Matrix",
        }
    }

    /// Maps to the decoder library's format tag.
    pub fn to_barcode_format(self) -> BarcodeFormat {
        match self {
            Symbology::Ean13 => BarcodeFormat::EAN_13,
            Symbology::UpcA => BarcodeFormat::UPC_A,
            Symbology::Ean8 => BarcodeFormat::EAN_8,
            Symbology::UpcE => BarcodeFormat::UPC_E,
            Symbology::Code128 => BarcodeFormat::CODE_128,
            Symbology::Code39 => BarcodeFormat::CODE_39,
            Symbology::Code93 => BarcodeFormat::CODE_93,
            Symbology::Codabar => BarcodeFormat::CODABAR,
            Symbology::Qr => BarcodeFormat::QR_CODE,
            Symbology::DataMatrix => BarcodeFormat::DATA_MATRIX,
        }
    }

    /// Maps from the decoder library's format tag. Formats outside the
    /// scanner's set yield `None`.
    pub fn from_barcode_format(format: &BarcodeFormat) -> Option<Self> {
        Some(match format {
            BarcodeFormat::EAN_13 => Symbology::Ean13,
            BarcodeFormat::UPC_A => Symbology::UpcA,
            BarcodeFormat::EAN_8 => Symbology::Ean8,
            BarcodeFormat::UPC_E => Symbology::UpcE,
            BarcodeFormat::CODE_128 => Symbology::Code128,
            BarcodeFormat::CODE_39 => Symbology::Code39,
            BarcodeFormat::CODE_93 => Symbology::Code93,
            BarcodeFormat::CODABAR => Symbology::Codabar,
            BarcodeFormat::QR_CODE => Symbology::Qr,
            BarcodeFormat::DATA_MATRIX => Symbology::DataMatrix,
            _ => return None,
        })
    }
}

impl std::fmt::Display for Symbology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
