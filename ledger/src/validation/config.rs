/// Payload validation limits.
///
/// These bound what a single producer can put into one block. They are
/// implementation-level limits, not business rules.
#[derive(Clone, Debug)]
pub struct ValidationConfig {
    /// Maximum length in bytes of any single text field of a payload.
    pub max_field_len: usize,
    /// Soft limit on the canonical encoded size of a payload, in bytes.
    pub max_payload_bytes: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_field_len: 1_024,
            max_payload_bytes: 16 * 1_024,
        }
    }
}
