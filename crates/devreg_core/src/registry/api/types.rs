//! Registry API type definitions.
//!
//! This module defines the request and response types for the three
//! in-process contracts of the registry access layer:
//!
//! ## Registry API
//! The operation surface consumed by the hosting transport: list, get,
//! set (upsert) and delete of end devices addressed by identifier sets.
//!
//! ## Store API
//! The Entity Store Port consumed (never implemented) by the dispatcher:
//! attribute-based lookup, create, field-masked update, and delete.
//!
//! ## Check API
//! The pre-operation check pipeline: one request variant per registry
//! operation, carrying the caller-supplied argument of that operation. A
//! checker vetoes by returning an error; the registry classifies it before
//! surfacing.

use crate::registry::naming::{DeviceIdentifiers, EndDevice, FieldMask};

/// Registry operation requests.
///
/// Each operation resolves the given identifier set against the store and
/// interprets the resulting match count before touching any state:
/// 1. Run the registered pre-operation check, if any
/// 2. Resolve matching devices through the store
/// 3. Branch on the match count (0 / 1 / many) per operation
#[derive(Debug, Clone)]
pub enum RegistryRequest {
    /// List devices matching the given identifier filter.
    ///
    /// Tolerates any match count, including zero. An empty filter lists
    /// every stored device.
    ListDevices(DeviceIdentifiers),

    /// Return the single device matching the given identifier set.
    ///
    /// Zero matches is NotFound, more than one is Conflict; ambiguity is
    /// never silently resolved.
    GetDevice(DeviceIdentifiers),

    /// Create or update the device carrying these identifying attributes.
    ///
    /// Resolution uses the device's own identifiers: zero matches creates
    /// the device, exactly one updates it with the payload restricted to
    /// the field mask, more than one is Conflict with no mutation.
    SetDevice {
        /// Desired device payload, including its identifying attributes
        device: EndDevice,
        /// Field paths the mutation should affect; empty means all fields
        field_mask: FieldMask,
    },

    /// Delete the single device matching the given identifier set.
    ///
    /// Zero matches is NotFound, more than one is Conflict with no
    /// deletion attempted.
    DeleteDevice(DeviceIdentifiers),
}

/// Registry operation responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryResponse {
    /// Devices matching a list filter, in store order.
    Devices(Vec<EndDevice>),

    /// The single device matching a get request.
    Device(EndDevice),

    /// Success-empty acknowledgment for set and delete requests.
    Ack,
}

/// Entity Store Port requests.
///
/// The registry consumes this contract; implementations own persistence,
/// lookup and the field-mask policy (empty mask means all fields, unknown
/// paths are store errors).
#[derive(Debug, Clone)]
pub enum StoreRequest {
    /// Return every stored device matched by the identifier set.
    FindByIdentifiers(DeviceIdentifiers),

    /// Create a device from the payload restricted to the field mask.
    ///
    /// The payload's identifying attributes are always kept; the mask scopes
    /// the remaining fields.
    Create {
        /// Device payload to create
        device: EndDevice,
        /// Field paths to take from the payload; empty means all fields
        field_mask: FieldMask,
    },

    /// Update the stored device identified by `target` with the payload
    /// restricted to the field mask.
    ///
    /// `target` carries the resolved device's own stored identifiers, not
    /// the possibly partial set the caller supplied.
    Update {
        /// Stored identifiers of the device to mutate
        target: DeviceIdentifiers,
        /// New device payload
        device: EndDevice,
        /// Field paths to apply from the payload; empty means all fields
        field_mask: FieldMask,
    },

    /// Delete the stored device identified by `target`.
    Delete(DeviceIdentifiers),
}

/// Entity Store Port responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreResponse {
    /// Matches of a lookup, in whatever order the store returns.
    Matches(Vec<EndDevice>),

    /// The device as stored after a create.
    Created(EndDevice),

    /// Acknowledgment of a completed update.
    Updated,

    /// Acknowledgment of a completed delete.
    Deleted,
}

/// Pre-operation check requests, one variant per registry operation.
///
/// Each variant carries the caller-supplied argument of its operation so a
/// checker can implement arbitrary authorization or validation logic
/// without the registry knowing its semantics.
#[derive(Debug, Clone)]
pub enum CheckRequest {
    /// About to list devices with this filter.
    List(DeviceIdentifiers),

    /// About to get the device matching this identifier set.
    Get(DeviceIdentifiers),

    /// About to create or update this device.
    Set {
        /// Device payload supplied by the caller
        device: EndDevice,
        /// Field mask supplied by the caller
        field_mask: FieldMask,
    },

    /// About to delete the device matching this identifier set.
    Delete(DeviceIdentifiers),
}

/// Pre-operation check responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckResponse {
    /// The check passed; execution proceeds normally.
    Pass,
}
