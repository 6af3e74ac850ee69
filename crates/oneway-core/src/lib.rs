#![deny(missing_docs)]

//! # oneway-core -- Foundational Types for the Oneway API
//!
//! Every other crate in the workspace depends on this one. It has no internal
//! crate dependencies and knows nothing about HTTP: only `serde`, `thiserror`,
//! `chrono`, `uuid` and `regex` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for credentials.** An [`AccessToken`] cannot be passed
//!    where a [`RefreshToken`] is expected, and neither prints its value in
//!    `Debug` output.
//!
//! 2. **Request primitives validate at construction.** A [`PhoneNumber`],
//!    [`EmailAddress`] or [`OtpCode`] in hand is already well-formed, so the
//!    [`SessionStore`] is never called with malformed input.
//!
//! 3. **One contract for the identity provider.** [`SessionStore`] is the only
//!    seam between the API and the hosted auth service; tests swap in a fake.

pub mod error;
pub mod identity;
pub mod otp;
pub mod store;
pub mod token;

pub use error::{StoreError, ValidationError};
pub use identity::{Identity, Session, SignInMethod, UserId};
pub use otp::{EmailAddress, OtpChannel, OtpCode, OtpType, PhoneNumber};
pub use store::{SessionStore, UserUpdate};
pub use token::{AccessToken, CredentialPair, RefreshToken};
