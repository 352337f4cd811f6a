//! Reference implementation of the Entity Store Port.
//!
//! `InMemoryStore` keeps devices in a concurrent map keyed by the
//! `(application_id, device_id)` pair. It backs the tests, benches and the
//! demo binary; production deployments substitute their own store service
//! behind the same `StoreRequest` contract.
//!
//! The field-mask policy lives here, not in the registry core: an empty
//! mask means "all fields", an unknown path is a store error. The registry
//! passes masks through unchanged.

use std::{future::Future, pin::Pin, sync::Arc, task::Poll};

use dashmap::DashMap;
use tower::Service;

use crate::registry::{
    api::{StoreRequest, StoreResponse},
    error::RegistryError,
    naming::{DeviceIdentifiers, EndDevice, FieldMask},
};

type DeviceMap = DashMap<(String, String), EndDevice>;

/// Copies the masked fields of `src` onto `dst`.
///
/// An empty mask copies the whole payload. Field paths address either a
/// whole payload field or a single identifying attribute; an unsupported
/// path fails the mutation before any state changed.
pub fn apply_field_mask(
    dst: &mut EndDevice,
    src: &EndDevice,
    field_mask: &FieldMask,
) -> Result<(), RegistryError> {
    if field_mask.is_empty() {
        *dst = src.clone();
        return Ok(());
    }
    for path in field_mask {
        match path.as_str() {
            "ids" => dst.ids = src.ids.clone(),
            "ids.device_id" => dst.ids.device_id = src.ids.device_id.clone(),
            "ids.application_id" => dst.ids.application_id = src.ids.application_id.clone(),
            "ids.dev_eui" => dst.ids.dev_eui = src.ids.dev_eui,
            "ids.join_eui" => dst.ids.join_eui = src.ids.join_eui,
            "name" => dst.name = src.name.clone(),
            "description" => dst.description = src.description.clone(),
            "frequency_plan_id" => dst.frequency_plan_id = src.frequency_plan_id.clone(),
            "attributes" => dst.attributes = src.attributes.clone(),
            unknown => {
                return Err(RegistryError::Storage(format!(
                    "unsupported field path: {unknown}"
                )));
            }
        }
    }
    Ok(())
}

/// In-memory device store keyed by `(application_id, device_id)`.
///
/// Cloning is shallow; all clones share the same underlying map, so a store
/// handed to several services behaves like one store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    devices: Arc<DeviceMap>,
}

impl InMemoryStore {
    /// Number of stored devices.
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Returns true when no device is stored.
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    fn find(&self, filter: &DeviceIdentifiers) -> Vec<EndDevice> {
        let mut matches: Vec<EndDevice> = self
            .devices
            .iter()
            .filter(|entry| filter.matches(&entry.value().ids))
            .map(|entry| entry.value().clone())
            .collect();
        // DashMap iteration order is arbitrary; keep list output stable
        matches.sort_by(|a, b| a.ids.device_id.cmp(&b.ids.device_id));
        matches
    }

    fn create(&self, device: &EndDevice, field_mask: &FieldMask) -> Result<EndDevice, RegistryError> {
        let Some(key) = device.ids.primary_key() else {
            return Err(RegistryError::Storage(
                "cannot create a device without device_id and application_id".to_string(),
            ));
        };
        let mut created = EndDevice::new(device.ids.clone());
        apply_field_mask(&mut created, device, field_mask)?;
        if self.devices.contains_key(&key) {
            return Err(RegistryError::Storage(format!(
                "device already stored under ({}, {})",
                key.0, key.1
            )));
        }
        self.devices.insert(key, created.clone());
        Ok(created)
    }

    fn update(
        &self,
        target: &DeviceIdentifiers,
        device: &EndDevice,
        field_mask: &FieldMask,
    ) -> Result<(), RegistryError> {
        let Some(key) = target.primary_key() else {
            return Err(RegistryError::Storage(
                "update target is missing device_id and application_id".to_string(),
            ));
        };
        let Some(stored) = self.devices.get(&key).map(|entry| entry.value().clone()) else {
            return Err(RegistryError::Storage(format!(
                "no device stored under ({}, {})",
                key.0, key.1
            )));
        };

        // Apply on a copy so a rejected mask leaves the record untouched
        let mut updated = stored;
        apply_field_mask(&mut updated, device, field_mask)?;
        let Some(new_key) = updated.ids.primary_key() else {
            return Err(RegistryError::Storage(
                "update would strip device_id or application_id".to_string(),
            ));
        };
        if new_key != key {
            if self.devices.contains_key(&new_key) {
                return Err(RegistryError::Storage(format!(
                    "device already stored under ({}, {})",
                    new_key.0, new_key.1
                )));
            }
            self.devices.remove(&key);
        }
        self.devices.insert(new_key, updated);
        Ok(())
    }

    fn delete(&self, target: &DeviceIdentifiers) -> Result<(), RegistryError> {
        let Some(key) = target.primary_key() else {
            return Err(RegistryError::Storage(
                "delete target is missing device_id and application_id".to_string(),
            ));
        };
        match self.devices.remove(&key) {
            Some(_) => Ok(()),
            None => Err(RegistryError::Storage(format!(
                "no device stored under ({}, {})",
                key.0, key.1
            ))),
        }
    }
}

impl Service<StoreRequest> for InMemoryStore {
    type Response = StoreResponse;
    type Error = RegistryError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: StoreRequest) -> Self::Future {
        let store = self.clone();
        Box::pin(async move {
            match request {
                StoreRequest::FindByIdentifiers(filter) => {
                    Ok(StoreResponse::Matches(store.find(&filter)))
                }
                StoreRequest::Create { device, field_mask } => {
                    store.create(&device, &field_mask).map(StoreResponse::Created)
                }
                StoreRequest::Update { target, device, field_mask } => {
                    store.update(&target, &device, &field_mask)?;
                    Ok(StoreResponse::Updated)
                }
                StoreRequest::Delete(target) => {
                    store.delete(&target)?;
                    Ok(StoreResponse::Deleted)
                }
            }
        })
    }
}
