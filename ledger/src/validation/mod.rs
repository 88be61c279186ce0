//! Payload validity predicates for the ledger.
//!
//! This module implements concrete payload validators that plug into the
//! ledger service via [`crate::chain::validator::PayloadValidator`].
//!
//! It currently provides:
//!
//! - [`base::BasePayloadValidity`]: cheap shape and size checks.
//! - [`passport::PassportValidity`]: harvest events must carry the digest
//!   of their own QR-code payload.

pub mod base;
pub mod config;
pub mod passport;

pub use base::BasePayloadValidity;
pub use config::ValidationConfig;
pub use passport::PassportValidity;

use crate::chain::validator::CombinedValidator;

/// Validator stack used by a "typical" ledger: shape checks, then the
/// passport check.
pub type DefaultPayloadValidator = CombinedValidator<BasePayloadValidity, PassportValidity>;
