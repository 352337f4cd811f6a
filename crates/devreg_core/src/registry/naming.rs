//! Device identification and payload model.
//!
//! This module defines the identifier and entity types used throughout the
//! registry. Devices are addressed by a multi-field identifier set in which
//! every attribute is optional: a fully populated set pins down a single
//! device, a partial set may match several. The matching semantics live here
//! so that the store and the dispatcher agree on what "matches" means.
//!
//! ## Identifier semantics
//!
//! A filter matches a candidate when every attribute populated on the filter
//! equals the candidate's same attribute. An attribute populated on the
//! filter but absent on the candidate is a mismatch; an empty filter matches
//! everything.
//!
//! Stored devices always carry the full `(application_id, device_id)` pair,
//! which the store uses as its primary key. Hardware EUIs are secondary
//! lookup attributes and are not unique by construction.

use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use thiserror::Error;

/// Field paths scoping a partial update; empty means "all fields".
///
/// The interpretation of the mask is a store-level policy, the registry core
/// passes it through unchanged.
pub type FieldMask = Vec<String>;

/// Error returned when parsing a malformed EUI-64 string.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid EUI-64 (expected 16 hex characters): {0}")]
pub struct InvalidEui64(pub String);

/// IEEE EUI-64 hardware identifier, rendered as 16 uppercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Eui64(pub [u8; 8]);

impl Display for Eui64 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

impl FromStr for Eui64 {
    type Err = InvalidEui64;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 16 || !s.is_ascii() {
            return Err(InvalidEui64(s.to_string()));
        }
        let mut bytes = [0u8; 8];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[2 * i..2 * i + 2], 16)
                .map_err(|_| InvalidEui64(s.to_string()))?;
        }
        Ok(Self(bytes))
    }
}

/// Identifier set addressing zero, one or many devices.
///
/// Every attribute is optional; a set with no populated attribute matches
/// every stored device. The set is immutable once handed to a resolution
/// call, requests pass it by value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DeviceIdentifiers {
    /// Device identifier, unique within an application
    pub device_id: Option<String>,
    /// Owning application identifier
    pub application_id: Option<String>,
    /// Hardware device EUI
    pub dev_eui: Option<Eui64>,
    /// Join/application EUI
    pub join_eui: Option<Eui64>,
}

impl DeviceIdentifiers {
    /// Creates a fully specified identifier set for the given application and
    /// device identifiers.
    pub fn new(application_id: impl Into<String>, device_id: impl Into<String>) -> Self {
        Self {
            device_id: Some(device_id.into()),
            application_id: Some(application_id.into()),
            ..Default::default()
        }
    }

    /// Populates the device EUI attribute.
    pub fn with_dev_eui(self, dev_eui: Eui64) -> Self {
        Self { dev_eui: Some(dev_eui), ..self }
    }

    /// Populates the join EUI attribute.
    pub fn with_join_eui(self, join_eui: Eui64) -> Self {
        Self { join_eui: Some(join_eui), ..self }
    }

    /// Returns true when no attribute is populated.
    pub fn is_empty(&self) -> bool {
        self.device_id.is_none()
            && self.application_id.is_none()
            && self.dev_eui.is_none()
            && self.join_eui.is_none()
    }

    /// Returns true when every attribute populated on `self` equals the
    /// candidate's same attribute. An empty filter matches everything.
    pub fn matches(&self, candidate: &Self) -> bool {
        attribute_matches(&self.device_id, &candidate.device_id)
            && attribute_matches(&self.application_id, &candidate.application_id)
            && attribute_matches(&self.dev_eui, &candidate.dev_eui)
            && attribute_matches(&self.join_eui, &candidate.join_eui)
    }

    /// Returns the `(application_id, device_id)` pair when both are present.
    ///
    /// This is the storage primary key; stored devices always have one.
    pub fn primary_key(&self) -> Option<(String, String)> {
        match (&self.application_id, &self.device_id) {
            (Some(application_id), Some(device_id)) => {
                Some((application_id.clone(), device_id.clone()))
            }
            _ => None,
        }
    }
}

fn attribute_matches<T: PartialEq>(filter: &Option<T>, candidate: &Option<T>) -> bool {
    match filter {
        Some(wanted) => candidate.as_ref() == Some(wanted),
        None => true,
    }
}

/// A registered end device: its identifying attributes plus payload fields.
///
/// Owned by the store; the registry core only holds devices for the duration
/// of a single operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndDevice {
    /// Identifying attributes of the device
    pub ids: DeviceIdentifiers,
    /// Human-readable device name
    pub name: String,
    /// Free-form device description
    pub description: String,
    /// Identifier of the frequency plan the device operates under
    pub frequency_plan_id: String,
    /// User-defined key/value attributes
    pub attributes: BTreeMap<String, String>,
}

impl EndDevice {
    /// Creates a device carrying only the given identifiers.
    pub fn new(ids: DeviceIdentifiers) -> Self {
        Self { ids, ..Default::default() }
    }

    /// Sets the device name.
    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self { name: name.into(), ..self }
    }

    /// Sets the device description.
    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self { description: description.into(), ..self }
    }
}
