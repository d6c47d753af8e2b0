use thiserror::Error;

/// Failures raised by a homomorphic backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CryptoError {
    #[error("Multiplicative depth exhausted: operation needs depth {required} (max: {available})")]
    DepthExhausted { required: usize, available: usize },

    #[error("Slot overflow: {values} values (capacity: {capacity})")]
    SlotOverflow { values: usize, capacity: usize },

    #[error("Key mismatch: operands were produced under different key material")]
    KeyMismatch,

    #[error("Invalid crypto parameters: {0}")]
    InvalidParams(String),

    #[error("Backend failure: {0}")]
    Backend(String),
}
