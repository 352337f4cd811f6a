#[macro_use]
mod fixtures;

use std::time::Duration;

use fixtures::{RecordingStore, device_fixture, device_fixture_with_euis};
use tower::{BoxError, Service, ServiceBuilder, filter::FilterLayer, timeout::TimeoutLayer};

use crate::{
    qrcode::{QrCodeApiService, QrCodeRequest, QrCodeResponse, formats::TR005_FORMAT_ID},
    registry::{
        api::{CheckRequest, RegistryRequest, RegistryResponse},
        checks::{CheckFn, RequestValidator},
        devices::DeviceRegistryService,
        error::RegistryError,
        init_registry,
        naming::{DeviceIdentifiers, EndDevice},
    },
};

#[tokio::test]
async fn integration_registry_lifecycle() {
    #[cfg(feature = "devreg_tracing")]
    crate::devreg_tracing::init();
    let mut registry = ServiceBuilder::new()
        .layer(TimeoutLayer::new(Duration::from_millis(100)))
        .service(init_registry());

    let device = device_fixture("app1", "dev1").with_name("pressure sensor");
    let ids = device.ids.clone();

    // Create, then read back
    set_device!(registry, device);
    assert_eq!(get_device!(registry, ids).name, "pressure sensor");

    // Masked update only touches the named field
    let update = device_fixture("app1", "dev1")
        .with_name("renamed sensor")
        .with_description("must not land");
    set_device!(registry, update, vec!["name".to_string()]);
    let updated = get_device!(registry, ids);
    assert_eq!(updated.name, "renamed sensor");
    assert_eq!(updated.description, "");

    // Delete once, then the registry no longer knows the device
    delete_device!(registry, ids);
    assert_eq!(
        registry.call(RegistryRequest::GetDevice(ids.clone())).await.unwrap_err().to_string(),
        "device registry error, device not found"
    );
    assert_eq!(
        registry.call(RegistryRequest::DeleteDevice(ids)).await.unwrap_err().to_string(),
        "device registry error, device not found"
    );
}

#[tokio::test]
async fn integration_registry_ambiguous_resolution_mutates_nothing() {
    #[cfg(feature = "devreg_tracing")]
    crate::devreg_tracing::init();
    let store = RecordingStore::default();
    let counters = store.counters();
    let mut registry = DeviceRegistryService::new(store);

    // Two devices share a device EUI; only the primary pair is unique
    let dev1 = device_fixture_with_euis("app1", "dev1", "70B3D57ED0000000", "AABBCCDDEEFF0011");
    let dev2 = device_fixture_with_euis("app1", "dev2", "70B3D57ED0000000", "AABBCCDDEEFF0011");
    set_device!(registry, dev1);
    set_device!(registry, dev2);
    let mutations_after_seed = counters.mutations();

    let by_dev_eui = DeviceIdentifiers {
        dev_eui: Some("AABBCCDDEEFF0011".parse().unwrap()),
        ..Default::default()
    };

    // Get, Set and Delete all refuse the ambiguous identifier set
    assert!(matches!(
        registry.call(RegistryRequest::GetDevice(by_dev_eui.clone())).await.unwrap_err(),
        RegistryError::TooManyDevices
    ));
    let ambiguous_payload = EndDevice::new(by_dev_eui.clone());
    assert!(matches!(
        registry
            .call(RegistryRequest::SetDevice {
                device: ambiguous_payload,
                field_mask: Vec::new(),
            })
            .await
            .unwrap_err(),
        RegistryError::TooManyDevices
    ));
    assert!(matches!(
        registry.call(RegistryRequest::DeleteDevice(by_dev_eui)).await.unwrap_err(),
        RegistryError::TooManyDevices
    ));

    // Resolution ran but no mutation reached the store
    assert_eq!(counters.mutations(), mutations_after_seed);
    assert_device_count!(registry, DeviceIdentifiers::default(), 2);
}

#[tokio::test]
async fn integration_registry_tenant_check() {
    #[cfg(feature = "devreg_tracing")]
    crate::devreg_tracing::init();
    // Host-injected check enforcing tenant ownership before any resolution
    let tenant_check = CheckFn::new(|request: CheckRequest| async move {
        let application_id = match &request {
            CheckRequest::List(ids) | CheckRequest::Get(ids) | CheckRequest::Delete(ids) => {
                ids.application_id.clone()
            }
            CheckRequest::Set { device, .. } => device.ids.application_id.clone(),
        };
        if application_id.as_deref() == Some("tenant-a") {
            Ok(())
        } else {
            Err(BoxError::from("application is not owned by tenant-a"))
        }
    });
    let store = RecordingStore::default();
    let counters = store.counters();
    let mut registry = DeviceRegistryService::new(store).with_check(tenant_check);

    set_device!(registry, device_fixture("tenant-a", "dev1"));

    // Foreign tenant is vetoed before the resolver sees anything
    let finds_before = counters.finds.load(std::sync::atomic::Ordering::SeqCst);
    let err = registry
        .call(RegistryRequest::GetDevice(DeviceIdentifiers::new("tenant-b", "dev1")))
        .await
        .unwrap_err();
    assert_eq!(err.code(), 3);
    assert_eq!(
        err.to_string(),
        "device registry error, argument check failed: application is not owned by tenant-a"
    );
    assert_eq!(counters.finds.load(std::sync::atomic::Ordering::SeqCst), finds_before);

    // The owning tenant proceeds normally
    assert_eq!(get_device!(registry, DeviceIdentifiers::new("tenant-a", "dev1")).ids.device_id,
        Some("dev1".to_string()));
}

#[tokio::test]
async fn integration_registry_validated_requests() {
    #[cfg(feature = "devreg_tracing")]
    crate::devreg_tracing::init();
    let mut registry = ServiceBuilder::new()
        .layer(FilterLayer::new(RequestValidator))
        .service(init_registry());

    // An empty identifier set is rejected before any store traffic
    assert_eq!(
        registry
            .call(RegistryRequest::GetDevice(DeviceIdentifiers::default()))
            .await
            .unwrap_err()
            .to_string(),
        "device registry error, invalid request"
    );

    // Populated identifier sets flow through the validator
    set_device!(registry, device_fixture("app1", "dev1"));
    assert_device_count!(registry, DeviceIdentifiers::default(), 1);
}

#[tokio::test]
async fn integration_registry_concurrent_operations() {
    #[cfg(feature = "devreg_tracing")]
    crate::devreg_tracing::init();
    let registry = init_registry();
    let device_count: usize = 32;

    let mut tasks = Vec::new();
    for i in 0..device_count {
        let mut registry = registry.clone();
        tasks.push(tokio::spawn(async move {
            let device = device_fixture("app1", &format!("dev{i}"));
            let ids = device.ids.clone();
            registry
                .call(RegistryRequest::SetDevice { device, field_mask: Vec::new() })
                .await
                .unwrap();
            match registry.call(RegistryRequest::GetDevice(ids)).await.unwrap() {
                RegistryResponse::Device(found) => {
                    assert_eq!(found.ids.device_id, Some(format!("dev{i}")));
                }
                other => panic!("expected RegistryResponse::Device, got {other:?}"),
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let mut registry = registry;
    assert_device_count!(registry, DeviceIdentifiers::default(), device_count);
}

#[tokio::test]
async fn integration_registry_qrcode_roundtrip() {
    #[cfg(feature = "devreg_tracing")]
    crate::devreg_tracing::init();
    let mut registry = init_registry();
    let mut qrcode = QrCodeApiService::default();

    let device = device_fixture_with_euis("app1", "dev1", "70B3D57ED0000000", "AABBCCDDEEFF0011");
    set_device!(registry, device);

    // Encode the stored payload, not the request payload
    let stored = get_device!(registry, device.ids);
    assert_eq!(
        qrcode
            .call(QrCodeRequest::GenerateText {
                format_id: TR005_FORMAT_ID.to_string(),
                device: stored,
            })
            .await
            .unwrap(),
        QrCodeResponse::Text("LW:D0:70B3D57ED0000000:AABBCCDDEEFF0011".to_string())
    );
}
