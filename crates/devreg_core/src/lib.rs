//! Core library of the devreg device registry.
//!
//! - [`registry`]: the access layer proper — operation dispatcher,
//!   identifier resolution, cardinality enforcement, check pipeline, error
//!   taxonomy, and the in-memory reference store
//! - [`qrcode`]: stateless QR text encoding of device payloads
//!
//! Everything is exposed as `tower::Service` values invoked in-process with
//! already-decoded arguments; transports live in hosting crates.

pub mod qrcode;
pub mod registry;

#[cfg(feature = "devreg_tracing")]
pub mod devreg_tracing;

#[cfg(test)]
mod tests;
