//! End-device text formats and their registry.
//!
//! A format turns a device payload into an encodable data value, which is
//! validated and then marshaled to the final text. The three stages are kept
//! distinct so a format can reject a device either structurally (encode) or
//! semantically (validate) before any text is produced.

use std::{collections::HashMap, sync::Arc};

use crate::{
    qrcode::error::QrCodeError,
    registry::naming::{EndDevice, Eui64},
};

/// Descriptor of a registered text format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrCodeFormat {
    /// Human-readable format name
    pub name: String,
    /// Short description of what the format encodes
    pub description: String,
}

/// Encoded device data, ready for validation and text marshaling.
pub trait QrCodeData: Send {
    /// Checks that the encoded data satisfies the format's requirements.
    fn validate(&self) -> Result<(), QrCodeError>;

    /// Marshals the validated data to its text representation.
    fn marshal_text(&self) -> Result<String, QrCodeError>;
}

/// A text format end devices can be encoded with.
pub trait EndDeviceFormat: Send + Sync {
    /// Returns the format descriptor.
    fn format(&self) -> QrCodeFormat;

    /// Encodes the device payload into this format's data value.
    fn encode(&self, device: &EndDevice) -> Result<Box<dyn QrCodeData>, QrCodeError>;
}

/// LoRa Alliance TR005-style device identification text.
///
/// Encodes the join and device EUIs as `LW:D0:<JoinEUI>:<DevEUI>`, with an
/// `:S<serial>` extension when the device carries a `serial_number`
/// attribute.
#[derive(Debug, Clone, Default)]
pub struct Tr005Format;

/// Identifier of the TR005 format in the registry.
pub const TR005_FORMAT_ID: &str = "tr005";

struct Tr005Data {
    join_eui: Option<Eui64>,
    dev_eui: Option<Eui64>,
    serial_number: Option<String>,
}

impl QrCodeData for Tr005Data {
    fn validate(&self) -> Result<(), QrCodeError> {
        if self.join_eui.is_none() {
            return Err(QrCodeError::InvalidDeviceData("join_eui is required".to_string()));
        }
        if self.dev_eui.is_none() {
            return Err(QrCodeError::InvalidDeviceData("dev_eui is required".to_string()));
        }
        Ok(())
    }

    fn marshal_text(&self) -> Result<String, QrCodeError> {
        let (Some(join_eui), Some(dev_eui)) = (self.join_eui, self.dev_eui) else {
            return Err(QrCodeError::InvalidDeviceData(
                "cannot marshal without both EUIs".to_string(),
            ));
        };
        let mut text = format!("LW:D0:{join_eui}:{dev_eui}");
        if let Some(serial_number) = &self.serial_number {
            text.push_str(&format!(":S{serial_number}"));
        }
        Ok(text)
    }
}

impl EndDeviceFormat for Tr005Format {
    fn format(&self) -> QrCodeFormat {
        QrCodeFormat {
            name: "TR005 LoRa Alliance".to_string(),
            description: "LoRa Alliance TR005 end device identification".to_string(),
        }
    }

    fn encode(&self, device: &EndDevice) -> Result<Box<dyn QrCodeData>, QrCodeError> {
        Ok(Box::new(Tr005Data {
            join_eui: device.ids.join_eui,
            dev_eui: device.ids.dev_eui,
            serial_number: device.attributes.get("serial_number").cloned(),
        }))
    }
}

/// Registry of known text formats, indexed by format id.
#[derive(Clone)]
pub struct FormatRegistry {
    formats: HashMap<String, Arc<dyn EndDeviceFormat>>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        let mut registry = Self { formats: HashMap::new() };
        registry.register(TR005_FORMAT_ID, Arc::new(Tr005Format));
        registry
    }
}

impl FormatRegistry {
    /// Registry with no format registered.
    pub fn empty() -> Self {
        Self { formats: HashMap::new() }
    }

    /// Registers a format under the given id, replacing any previous entry.
    pub fn register(&mut self, id: impl Into<String>, format: Arc<dyn EndDeviceFormat>) {
        self.formats.insert(id.into(), format);
    }

    /// Looks up a format by id.
    pub fn get(&self, id: &str) -> Option<Arc<dyn EndDeviceFormat>> {
        self.formats.get(id).cloned()
    }

    /// Descriptors of every registered format, indexed by id.
    pub fn descriptors(&self) -> HashMap<String, QrCodeFormat> {
        self.formats.iter().map(|(id, format)| (id.clone(), format.format())).collect()
    }
}
