use std::{
    future::Future,
    pin::Pin,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    task::Poll,
};

use tower::Service;

use crate::registry::{
    api::{StoreRequest, StoreResponse},
    error::RegistryError,
    naming::{DeviceIdentifiers, EndDevice},
    storage::InMemoryStore,
};

pub(super) fn device_fixture(application_id: &str, device_id: &str) -> EndDevice {
    EndDevice::new(DeviceIdentifiers::new(application_id, device_id))
}

pub(super) fn device_fixture_with_euis(
    application_id: &str,
    device_id: &str,
    join_eui: &str,
    dev_eui: &str,
) -> EndDevice {
    EndDevice::new(
        DeviceIdentifiers::new(application_id, device_id)
            .with_join_eui(join_eui.parse().unwrap())
            .with_dev_eui(dev_eui.parse().unwrap()),
    )
}

/// Per-request call counters of a [`RecordingStore`].
#[derive(Debug, Default)]
pub(super) struct StoreCounters {
    pub finds: AtomicUsize,
    pub creates: AtomicUsize,
    pub updates: AtomicUsize,
    pub deletes: AtomicUsize,
}

impl StoreCounters {
    pub fn mutations(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
            + self.updates.load(Ordering::SeqCst)
            + self.deletes.load(Ordering::SeqCst)
    }
}

/// Store wrapper recording how often each request kind reaches the store.
///
/// Lets tests assert that vetoed or ambiguous operations generated zero
/// store traffic of the guarded kinds.
#[derive(Clone, Default)]
pub(super) struct RecordingStore {
    inner: InMemoryStore,
    counters: Arc<StoreCounters>,
}

impl RecordingStore {
    pub fn counters(&self) -> Arc<StoreCounters> {
        self.counters.clone()
    }
}

impl Service<StoreRequest> for RecordingStore {
    type Response = StoreResponse;
    type Error = RegistryError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: StoreRequest) -> Self::Future {
        let counter = match &request {
            StoreRequest::FindByIdentifiers(_) => &self.counters.finds,
            StoreRequest::Create { .. } => &self.counters.creates,
            StoreRequest::Update { .. } => &self.counters.updates,
            StoreRequest::Delete(_) => &self.counters.deletes,
        };
        counter.fetch_add(1, Ordering::SeqCst);
        self.inner.call(request)
    }
}

macro_rules! set_device {
    ($registry:expr, $device:expr) => {
        set_device!($registry, $device, Vec::new())
    };
    ($registry:expr, $device:expr, $field_mask:expr) => {
        assert_eq!(
            $registry
                .call(crate::registry::api::RegistryRequest::SetDevice {
                    device: $device.clone(),
                    field_mask: $field_mask,
                })
                .await
                .unwrap(),
            crate::registry::api::RegistryResponse::Ack
        )
    };
}

macro_rules! get_device {
    ($registry:expr, $ids:expr) => {{
        match $registry
            .call(crate::registry::api::RegistryRequest::GetDevice($ids.clone()))
            .await
            .unwrap()
        {
            crate::registry::api::RegistryResponse::Device(device) => device,
            other => panic!("expected RegistryResponse::Device, got {:?}", other),
        }
    }};
}

macro_rules! delete_device {
    ($registry:expr, $ids:expr) => {
        assert_eq!(
            $registry
                .call(crate::registry::api::RegistryRequest::DeleteDevice($ids.clone()))
                .await
                .unwrap(),
            crate::registry::api::RegistryResponse::Ack
        )
    };
}

macro_rules! assert_device_count {
    ($registry:expr, $filter:expr, $count:expr) => {{
        match $registry
            .call(crate::registry::api::RegistryRequest::ListDevices($filter.clone()))
            .await
            .unwrap()
        {
            crate::registry::api::RegistryResponse::Devices(devices) => {
                assert_eq!(devices.len(), $count)
            }
            other => panic!("expected RegistryResponse::Devices, got {:?}", other),
        }
    }};
}
