//! Payload validity predicates used by the ledger.

use crate::types::Payload;

use super::error::ValidationError;

/// Pluggable validity predicate for payloads.
///
/// Runs before a payload is sealed into a block. Implementations should be
/// deterministic and side-effect free.
pub trait PayloadValidator {
    fn validate(&self, payload: &Payload) -> Result<(), ValidationError>;
}

/// A trivial validator that accepts every payload.
///
/// Useful for tests that need to store shapes the default rules reject.
pub struct AcceptAllValidator;

impl PayloadValidator for AcceptAllValidator {
    fn validate(&self, _payload: &Payload) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// A validator that composes two other validators.
///
/// `CombinedValidator { first, second }` runs `first.validate` and then
/// `second.validate`, failing fast on the first error.
#[derive(Default)]
pub struct CombinedValidator<A, B> {
    pub first: A,
    pub second: B,
}

impl<A, B> CombinedValidator<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A, B> PayloadValidator for CombinedValidator<A, B>
where
    A: PayloadValidator,
    B: PayloadValidator,
{
    fn validate(&self, payload: &Payload) -> Result<(), ValidationError> {
        self.first.validate(payload)?;
        self.second.validate(payload)?;
        Ok(())
    }
}
