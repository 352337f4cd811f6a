use thiserror::Error;

/// Errors surfaced by the QR text-format pipeline.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QrCodeError {
    #[error("qr code error, format not found (id: {0})")]
    FormatNotFound(String),

    #[error("qr code error, device data invalid for format: {0}")]
    InvalidDeviceData(String),
}
