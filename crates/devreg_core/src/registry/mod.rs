//! Device registry access layer.
//!
//! This module exposes a generic device registry through an in-process
//! operation surface, enforcing the cardinality and validation contracts a
//! bare key-value store does not provide.
//!
//! ## Core architecture
//!
//! The layer is built from three separable pieces, each a `tower::Service`:
//!
//! ### Operation dispatcher
//! [`devices::DeviceRegistryService`] handles ListDevices, GetDevice,
//! SetDevice and DeleteDevice requests. Every operation runs check →
//! resolve → branch-on-count, translating the resolved cardinality into
//! proceed / NotFound / Conflict / create-vs-update behavior.
//!
//! ### Entity Store Port
//! The dispatcher consumes a store service speaking
//! [`api::StoreRequest`]; [`storage::InMemoryStore`] is the reference
//! implementation used by tests, benches and the demo binary.
//!
//! ### Check pipeline
//! An optional host-supplied checker runs before any resolution and can
//! veto the operation; see [`checks`].
//!
//! ## Default service stack
//!
//! [`RegistryApiDefaultStack`] combines the in-memory store with the no-op
//! checker. [`init_registry`] and [`init_registry_with_check`] build ready
//! to use stacks for hosts and tests.

pub mod api;
pub mod checks;
pub mod devices;
pub mod error;
pub mod naming;
pub mod storage;

/// Standard registry service stack with default component configuration.
///
/// Combines the in-memory reference store with the no-op checker. Suitable
/// for tests, benches and in-process embedding; production hosts substitute
/// their own store service.
pub type RegistryApiDefaultStack =
    devices::DeviceRegistryService<storage::InMemoryStore, checks::CheckNop>;

/// Initialize a registry stack over a fresh in-memory store with no check
/// registered.
pub fn init_registry() -> RegistryApiDefaultStack {
    devices::DeviceRegistryService::new(storage::InMemoryStore::default())
}

/// Initialize a registry stack over a fresh in-memory store with the given
/// pre-operation checker.
///
/// The checker is invoked with the operation's caller-supplied argument
/// before any resolution or mutation work; see [`checks`] for the veto and
/// error-classification contract.
pub fn init_registry_with_check<C>(
    check: C,
) -> devices::DeviceRegistryService<storage::InMemoryStore, C> {
    devices::DeviceRegistryService::new(storage::InMemoryStore::default()).with_check(check)
}
