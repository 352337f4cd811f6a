//! Pre-operation checks and request validation.
//!
//! The registry runs an optional, host-supplied check before any resolution
//! or mutation work. The checker is a single polymorphic service handling
//! one request variant per operation; `CheckNop` is the default and passes
//! everything, `CheckFn` adapts an async closure for hosts that want to plug
//! authorization logic without writing a service type.
//!
//! A checker vetoes by returning an error. Errors that already speak the
//! registry taxonomy are propagated verbatim, anything else is wrapped into
//! `CheckFailed` with the original error preserved as cause (see
//! `RegistryError::from_check`).
//!
//! `RequestValidator` is a separate, optional `tower::filter` predicate the
//! host may layer in front of the registry to reject structurally empty
//! identifier sets before they reach the checker or the store.

use std::{future::Future, pin::Pin, task::Poll};

use tower::{BoxError, Service, filter::Predicate};

use crate::registry::{
    api::{CheckRequest, CheckResponse, RegistryRequest},
    error::RegistryError,
};

/// Default checker: passes every operation.
///
/// Behavior with `CheckNop` is identical to having no check registered at
/// all.
#[derive(Debug, Clone, Default)]
pub struct CheckNop;

impl Service<CheckRequest> for CheckNop {
    type Response = CheckResponse;
    type Error = BoxError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _request: CheckRequest) -> Self::Future {
        Box::pin(async { Ok(CheckResponse::Pass) })
    }
}

/// Adapter turning an async closure into a checker service.
///
/// The closure receives the check request of the invoked operation and
/// vetoes by returning an error. Returning a `RegistryError` keeps its
/// classification, any other error kind surfaces as `CheckFailed`.
#[derive(Debug, Clone)]
pub struct CheckFn<F>(F);

impl<F> CheckFn<F> {
    pub fn new(check: F) -> Self {
        Self(check)
    }
}

impl<F, Fut> Service<CheckRequest> for CheckFn<F>
where
    F: FnMut(CheckRequest) -> Fut,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    type Response = CheckResponse;
    type Error = BoxError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: CheckRequest) -> Self::Future {
        let outcome = (self.0)(request);
        Box::pin(async move { outcome.await.map(|_| CheckResponse::Pass) })
    }
}

/// Request validator for the registry operation surface.
///
/// Rejects get, set and delete requests whose identifier set has no
/// populated attribute: such a set matches every stored device and can only
/// end in NotFound or Conflict, so the host may choose to fail it before any
/// store traffic. List requests are exempt, an empty filter is the "list
/// everything" idiom.
///
/// Apply with `tower::filter::FilterLayer` in front of the registry service.
#[derive(Debug, Clone)]
pub struct RequestValidator;

impl Predicate<RegistryRequest> for RequestValidator {
    type Request = RegistryRequest;

    fn check(&mut self, request: RegistryRequest) -> Result<Self::Request, BoxError> {
        match &request {
            RegistryRequest::GetDevice(ids) | RegistryRequest::DeleteDevice(ids)
                if ids.is_empty() =>
            {
                Err(Box::new(RegistryError::InvalidRequest))
            }
            RegistryRequest::SetDevice { device, .. } if device.ids.is_empty() => {
                Err(Box::new(RegistryError::InvalidRequest))
            }
            _ => Ok(request),
        }
    }
}
