//! Device registry operation dispatcher.
//!
//! `DeviceRegistryService` is the core of the access layer: it sits between
//! the operation surface and the Entity Store Port and enforces the
//! cardinality contract every operation relies on. Each call runs strictly
//! in sequence: pre-operation check, identifier resolution, then a branch on
//! the resolved match count:
//!
//! - **ListDevices** tolerates any count, including zero
//! - **GetDevice** requires exactly one match; zero is NotFound, several is
//!   Conflict
//! - **SetDevice** creates on zero matches, updates on exactly one, and
//!   refuses to mutate on several
//! - **DeleteDevice** requires exactly one match before deleting
//!
//! Ambiguity is never silently resolved: no mutation executes unless the
//! precondition count (zero for create, exactly one for update/delete) is
//! unambiguously satisfied. Between resolution and the guarded mutation a
//! concurrent operation can still change the match count; that window is
//! accepted, the store contract offers no conditional mutate to close it.
//!
//! The service is stateless and `Clone`; concurrency safety is delegated
//! entirely to the store behind it.

use std::{future::Future, pin::Pin, task::Poll};

use tower::{BoxError, Service};
#[cfg(feature = "devreg_tracing")]
use tracing::info;

use crate::registry::{
    api::{
        CheckRequest, CheckResponse, RegistryRequest, RegistryResponse, StoreRequest,
        StoreResponse,
    },
    checks::CheckNop,
    error::RegistryError,
    naming::{DeviceIdentifiers, EndDevice},
};

/// Resolves an identifier set to the sequence of matching devices.
///
/// Delegates directly to the store's attribute-based lookup; no filtering,
/// sorting or deduplication happens here. Cardinality interpretation is the
/// dispatcher's job, which keeps the two concerns separately testable. Store
/// errors are propagated unmodified.
pub async fn find_by_identifiers<S>(
    store: &mut S,
    ids: DeviceIdentifiers,
) -> Result<Vec<EndDevice>, RegistryError>
where
    S: Service<StoreRequest, Response = StoreResponse, Error = RegistryError>,
{
    match store.call(StoreRequest::FindByIdentifiers(ids)).await? {
        StoreResponse::Matches(devices) => Ok(devices),
        _ => Err(RegistryError::InternalRegistryError),
    }
}

async fn run_check<C>(check: &mut C, request: CheckRequest) -> Result<(), RegistryError>
where
    C: Service<CheckRequest, Response = CheckResponse, Error = BoxError>,
{
    match check.call(request).await {
        Ok(CheckResponse::Pass) => Ok(()),
        Err(err) => Err(RegistryError::from_check(err)),
    }
}

/// Device registry API service.
///
/// Generic over the store service `S` (the Entity Store Port) and the
/// checker service `C` (the pre-operation check pipeline). Constructed with
/// the no-op checker by default; hosts inject authorization or validation
/// logic with [`with_check`](Self::with_check).
#[derive(Debug, Clone)]
pub struct DeviceRegistryService<S, C> {
    /// Entity Store Port the registry resolves and mutates through
    store: S,
    /// Pre-operation check pipeline
    check: C,
}

impl<S> DeviceRegistryService<S, CheckNop> {
    /// Creates a registry service over the given store with no check
    /// registered.
    pub fn new(store: S) -> Self {
        Self { store, check: CheckNop }
    }
}

impl<S, C> DeviceRegistryService<S, C> {
    /// Replaces the checker invoked before every operation.
    pub fn with_check<C2>(self, check: C2) -> DeviceRegistryService<S, C2> {
        DeviceRegistryService { store: self.store, check }
    }
}

impl<S, C> Service<RegistryRequest> for DeviceRegistryService<S, C>
where
    S: Service<StoreRequest, Response = StoreResponse, Error = RegistryError>
        + Clone
        + Send
        + 'static,
    S::Future: Send,
    C: Service<CheckRequest, Response = CheckResponse, Error = BoxError>
        + Clone
        + Send
        + 'static,
    C::Future: Send,
{
    type Response = RegistryResponse;
    type Error = RegistryError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: RegistryRequest) -> Self::Future {
        let mut store = self.store.clone();
        let mut check = self.check.clone();
        Box::pin(async move {
            match request {
                RegistryRequest::ListDevices(filter) => {
                    #[cfg(feature = "devreg_tracing")]
                    info!("[registry] ListDevices: filter: {:?}", filter);
                    run_check(&mut check, CheckRequest::List(filter.clone())).await?;
                    let devices = find_by_identifiers(&mut store, filter).await?;
                    Ok(RegistryResponse::Devices(devices))
                }
                RegistryRequest::GetDevice(ids) => {
                    #[cfg(feature = "devreg_tracing")]
                    info!("[registry] GetDevice: ids: {:?}", ids);
                    run_check(&mut check, CheckRequest::Get(ids.clone())).await?;
                    let mut matches = find_by_identifiers(&mut store, ids).await?;
                    match matches.len() {
                        0 => Err(RegistryError::DeviceNotFound),
                        1 => Ok(RegistryResponse::Device(matches.remove(0))),
                        _ => Err(RegistryError::TooManyDevices),
                    }
                }
                RegistryRequest::SetDevice { device, field_mask } => {
                    #[cfg(feature = "devreg_tracing")]
                    info!(
                        "[registry] SetDevice: ids: {:?}, field_mask: {:?}",
                        device.ids, field_mask
                    );
                    run_check(
                        &mut check,
                        CheckRequest::Set {
                            device: device.clone(),
                            field_mask: field_mask.clone(),
                        },
                    )
                    .await?;
                    let mut matches =
                        find_by_identifiers(&mut store, device.ids.clone()).await?;
                    match matches.len() {
                        0 => match store.call(StoreRequest::Create { device, field_mask }).await? {
                            StoreResponse::Created(_) => Ok(RegistryResponse::Ack),
                            _ => Err(RegistryError::InternalRegistryError),
                        },
                        1 => {
                            // Mutate the resolved device under its stored
                            // identifiers, not the caller's possibly partial set
                            let target = matches.remove(0).ids;
                            match store
                                .call(StoreRequest::Update { target, device, field_mask })
                                .await?
                            {
                                StoreResponse::Updated => Ok(RegistryResponse::Ack),
                                _ => Err(RegistryError::InternalRegistryError),
                            }
                        }
                        _ => Err(RegistryError::TooManyDevices),
                    }
                }
                RegistryRequest::DeleteDevice(ids) => {
                    #[cfg(feature = "devreg_tracing")]
                    info!("[registry] DeleteDevice: ids: {:?}", ids);
                    run_check(&mut check, CheckRequest::Delete(ids.clone())).await?;
                    let mut matches = find_by_identifiers(&mut store, ids).await?;
                    match matches.len() {
                        0 => Err(RegistryError::DeviceNotFound),
                        1 => {
                            let target = matches.remove(0).ids;
                            match store.call(StoreRequest::Delete(target)).await? {
                                StoreResponse::Deleted => Ok(RegistryResponse::Ack),
                                _ => Err(RegistryError::InternalRegistryError),
                            }
                        }
                        _ => Err(RegistryError::TooManyDevices),
                    }
                }
            }
        })
    }
}
