//! Vaultcore Service Boundary
//!
//! Exposes the crypto and key-store operations (`encrypt`, `decrypt`,
//! `generate_key`, `generate_random`, `rotate_key`, `store_credential`,
//! `retrieve_credential`, `delete_credential`) to callers across a
//! process/transport boundary.
//!
//! # Contract
//!
//! - All operations are asynchronous and individually awaitable; callers
//!   observe a single logical await per call
//! - Validation errors are raised synchronously, before any dispatch
//! - Cancellation is cooperative: checked before dispatch, after which the
//!   operation runs to completion; a cancelled-before-dispatch call has no
//!   observable side effects
//! - Errors cross the boundary as a stable `category + message` shape
//!   ([`WireError`]); raw internal types never leak
//! - Requests on the same key identifier are serialized; independent
//!   requests have no ordering guarantees
//!
//! Timeouts are not enforced internally: a caller imposing one simply
//! cancels the pending operation, which is safe under the contract above.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod cancel;
mod connection;
mod error;
mod service;

pub use cancel::CancelToken;
pub use connection::{ConnectionMonitor, LinkState};
pub use error::{ErrorCategory, ServiceError, WireError};
pub use service::{CryptoService, RotatedKey};
