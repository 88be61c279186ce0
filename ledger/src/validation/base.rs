//! Base validity predicate for payloads.
//!
//! This validator enforces cheap, deterministic invariants that do not
//! depend on the rest of the chain, such as:
//!
//! - a non-blank batch id on every event,
//! - bounded text fields and bounded canonical payload size,
//! - a finite, non-negative harvest quantity.

use crate::chain::error::ValidationError;
use crate::chain::validator::PayloadValidator;
use crate::types::Payload;

use super::config::ValidationConfig;

/// Base validity predicate for payloads.
///
/// This struct is configured using [`ValidationConfig`] and performs
/// purely payload-local checks that are inexpensive to run.
#[derive(Clone, Debug)]
pub struct BasePayloadValidity {
    max_field_len: usize,
    max_payload_bytes: usize,
}

impl BasePayloadValidity {
    /// Constructs a new `BasePayloadValidity` from the validation config.
    pub fn new(cfg: &ValidationConfig) -> Self {
        Self {
            max_field_len: cfg.max_field_len,
            max_payload_bytes: cfg.max_payload_bytes,
        }
    }

    fn check_batch_id(&self, payload: &Payload) -> Result<(), ValidationError> {
        match payload.batch_id() {
            Some(batch_id) if !batch_id.is_empty() => Ok(()),
            Some(_) => Err(ValidationError::Invalid("batchId must not be empty")),
            None => Err(ValidationError::Invalid("payload carries no batchId")),
        }
    }

    fn check_field_lengths(&self, payload: &Payload) -> Result<(), ValidationError> {
        for (name, value) in payload.text_fields() {
            if value.len() > self.max_field_len {
                return Err(ValidationError::Custom(format!(
                    "field {name} is {} bytes, exceeds max_field_len={}",
                    value.len(),
                    self.max_field_len
                )));
            }
        }
        Ok(())
    }

    fn check_payload_size(&self, payload: &Payload) -> Result<(), ValidationError> {
        let cfg = bincode::config::standard();
        let size = bincode::serde::encode_to_vec(payload, cfg)
            .map_err(|e| ValidationError::Custom(format!("payload not encodable: {e}")))?
            .len();
        if size > self.max_payload_bytes {
            return Err(ValidationError::Custom(format!(
                "payload size {} bytes exceeds max_payload_bytes={}",
                size, self.max_payload_bytes
            )));
        }
        Ok(())
    }

    fn check_quantity(&self, payload: &Payload) -> Result<(), ValidationError> {
        if let Payload::HarvestSold { quantity, .. } = payload {
            if !quantity.is_finite() || *quantity < 0.0 {
                return Err(ValidationError::Invalid(
                    "quantity must be a finite, non-negative number",
                ));
            }
        }
        Ok(())
    }
}

impl Default for BasePayloadValidity {
    fn default() -> Self {
        Self::new(&ValidationConfig::default())
    }
}

impl PayloadValidator for BasePayloadValidity {
    fn validate(&self, payload: &Payload) -> Result<(), ValidationError> {
        self.check_batch_id(payload)?;
        self.check_field_lengths(payload)?;
        self.check_payload_size(payload)?;
        self.check_quantity(payload)?;
        Ok(())
    }
}
