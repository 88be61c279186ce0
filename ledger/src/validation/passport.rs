//! Digital passport predicate.
//!
//! A `HARVEST_SOLD` payload is only accepted when its `digitalPassport` is
//! the digest of its own `qrDataString`. Other payloads pass through.

use crate::chain::error::ValidationError;
use crate::chain::validator::PayloadValidator;
use crate::types::Payload;

#[derive(Clone, Copy, Debug, Default)]
pub struct PassportValidity;

impl PayloadValidator for PassportValidity {
    fn validate(&self, payload: &Payload) -> Result<(), ValidationError> {
        if let Payload::HarvestSold {
            digital_passport,
            qr_data_string,
            ..
        } = payload
        {
            if !digital_passport.matches(qr_data_string) {
                return Err(ValidationError::Invalid(
                    "digitalPassport does not match qrDataString",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BatchId, DigitalPassport};

    fn harvest(passport_of: &str, qr: &str) -> Payload {
        Payload::HarvestSold {
            batch_id: BatchId::from("B1"),
            farmer_id: "f-1".to_string(),
            crop: "Soybean".to_string(),
            harvest_date: "2024-10-01".to_string(),
            quantity: 5.0,
            digital_passport: DigitalPassport::compute(passport_of),
            qr_data_string: qr.to_string(),
        }
    }

    #[test]
    fn matching_passport_passes() {
        assert!(PassportValidity.validate(&harvest("qr-1", "qr-1")).is_ok());
    }

    #[test]
    fn mismatched_passport_is_rejected() {
        assert!(PassportValidity.validate(&harvest("qr-1", "qr-2")).is_err());
    }

    #[test]
    fn non_harvest_payloads_pass_through() {
        let shipment = Payload::ShipmentCreated {
            batch_id: BatchId::from("B1"),
            tracking_id: "T".to_string(),
            origin: "A".to_string(),
            destination: "B".to_string(),
        };
        assert!(PassportValidity.validate(&shipment).is_ok());
    }
}
