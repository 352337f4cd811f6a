//! QR text encoding of device payloads.
//!
//! A stateless, self-contained transform with no resolution or cardinality
//! logic: look the formatter up by id, encode the device, validate, marshal
//! to text. The hosting transport decides what to do with the text (QR image
//! rendering is out of scope here).
//!
//! Formats are registered once at construction time; the service itself
//! holds no mutable state and is cheap to clone.

pub mod error;
pub mod formats;

use std::{future::Future, pin::Pin, sync::Arc, task::Poll};

use tower::Service;
#[cfg(feature = "devreg_tracing")]
use tracing::info;

use crate::{
    qrcode::{
        error::QrCodeError,
        formats::{FormatRegistry, QrCodeFormat},
    },
    registry::naming::EndDevice,
};

/// QR text-format requests.
#[derive(Debug, Clone)]
pub enum QrCodeRequest {
    /// Return the descriptor of the format registered under this id.
    GetFormat(String),

    /// Return the descriptors of every registered format.
    ListFormats,

    /// Encode the device with the format registered under `format_id` and
    /// return the marshaled text.
    GenerateText {
        /// Identifier of the format to encode with
        format_id: String,
        /// Device payload to encode
        device: EndDevice,
    },
}

/// QR text-format responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QrCodeResponse {
    /// Descriptor of a single format.
    Format(QrCodeFormat),

    /// Descriptors of every registered format, indexed by id.
    Formats(std::collections::HashMap<String, QrCodeFormat>),

    /// Marshaled device text.
    Text(String),
}

/// QR text-format API service.
#[derive(Clone)]
pub struct QrCodeApiService {
    formats: Arc<FormatRegistry>,
}

impl Default for QrCodeApiService {
    fn default() -> Self {
        Self::new(FormatRegistry::default())
    }
}

impl QrCodeApiService {
    /// Creates a service over the given format registry.
    pub fn new(formats: FormatRegistry) -> Self {
        Self { formats: Arc::new(formats) }
    }
}

impl Service<QrCodeRequest> for QrCodeApiService {
    type Response = QrCodeResponse;
    type Error = QrCodeError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: QrCodeRequest) -> Self::Future {
        let formats = self.formats.clone();
        Box::pin(async move {
            match request {
                QrCodeRequest::GetFormat(id) => {
                    #[cfg(feature = "devreg_tracing")]
                    info!("[qrcode] GetFormat: id: {}", id);
                    match formats.get(&id) {
                        Some(format) => Ok(QrCodeResponse::Format(format.format())),
                        None => Err(QrCodeError::FormatNotFound(id)),
                    }
                }
                QrCodeRequest::ListFormats => {
                    #[cfg(feature = "devreg_tracing")]
                    info!("[qrcode] ListFormats");
                    Ok(QrCodeResponse::Formats(formats.descriptors()))
                }
                QrCodeRequest::GenerateText { format_id, device } => {
                    #[cfg(feature = "devreg_tracing")]
                    info!("[qrcode] GenerateText: format_id: {}, ids: {:?}", format_id, device.ids);
                    let Some(format) = formats.get(&format_id) else {
                        return Err(QrCodeError::FormatNotFound(format_id));
                    };
                    let data = format.encode(&device)?;
                    data.validate()?;
                    let text = data.marshal_text()?;
                    Ok(QrCodeResponse::Text(text))
                }
            }
        })
    }
}
