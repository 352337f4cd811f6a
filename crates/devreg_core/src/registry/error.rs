use thiserror::Error;
use tower::BoxError;

/// Coarse error classification, mirroring the HTTP-like classes surfaced to
/// transport adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    NotFound,
    Conflict,
    InvalidArgument,
    Unknown,
}

/// Errors surfaced by the device registry.
///
/// The first three variants form the fixed taxonomy of the access layer,
/// each with a stable numeric code. Everything else is passed through with
/// whatever classification its producer gave it; the registry never invents
/// taxonomy for failures it does not own.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("device registry error, device not found")]
    DeviceNotFound,

    #[error("device registry error, too many devices found")]
    TooManyDevices,

    #[error("device registry error, argument check failed: {0}")]
    CheckFailed(#[source] BoxError),

    #[error("device registry error, invalid request")]
    InvalidRequest,

    #[error("device registry error, storage failure: {0}")]
    Storage(String),

    #[error("device registry error, internal registry error")]
    InternalRegistryError,
}

impl RegistryError {
    /// Stable numeric code of the classified error kinds; 0 for pass-through
    /// errors outside the fixed taxonomy.
    pub fn code(&self) -> u32 {
        match self {
            Self::DeviceNotFound => 1,
            Self::TooManyDevices => 2,
            Self::CheckFailed(_) => 3,
            _ => 0,
        }
    }

    /// HTTP-like class of the error.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::DeviceNotFound => ErrorClass::NotFound,
            Self::TooManyDevices => ErrorClass::Conflict,
            Self::CheckFailed(_) | Self::InvalidRequest => ErrorClass::InvalidArgument,
            Self::Storage(_) | Self::InternalRegistryError => ErrorClass::Unknown,
        }
    }

    /// Classifies an error returned by a pre-operation check.
    ///
    /// A check that already speaks the registry taxonomy keeps its own
    /// classification (e.g. a permission check surfacing its own error kind);
    /// anything else is wrapped into `CheckFailed` with the original error
    /// preserved as cause.
    pub fn from_check(err: BoxError) -> Self {
        match err.downcast::<Self>() {
            Ok(classified) => *classified,
            Err(unclassified) => Self::CheckFailed(unclassified),
        }
    }
}
