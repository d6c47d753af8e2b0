// params.rs - crypto context configuration shared by every backend
use serde::{Deserialize, Serialize};

use super::CryptoError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoParams {
    /// Polynomial ring dimension (power of two)
    pub ring_dimension: usize,
    /// Bit size of the scaling modulus; bounds the approximation error
    pub scaling_mod_size: u32,
    /// Number of sequential multiplications a fresh ciphertext can absorb
    pub multiplicative_depth: usize,
    /// Packed slots per ciphertext; defaults to half the ring dimension
    pub slot_capacity: Option<usize>,
}

impl CryptoParams {
    pub fn new(ring_dimension: usize, scaling_mod_size: u32, multiplicative_depth: usize) -> Self {
        Self {
            ring_dimension,
            scaling_mod_size,
            multiplicative_depth,
            slot_capacity: None,
        }
    }

    /// Same parameters with an explicit batch size instead of `ring_dimension / 2`.
    pub fn with_slot_capacity(mut self, slots: usize) -> Self {
        self.slot_capacity = Some(slots);
        self
    }

    pub fn slots(&self) -> usize {
        self.slot_capacity.unwrap_or(self.ring_dimension / 2)
    }

    pub fn validate(&self) -> Result<(), CryptoError> {
        if self.ring_dimension < 8 || !self.ring_dimension.is_power_of_two() {
            return Err(CryptoError::InvalidParams(format!(
                "ring_dimension must be a power of two >= 8, got {}",
                self.ring_dimension
            )));
        }

        if !(20..=60).contains(&self.scaling_mod_size) {
            return Err(CryptoError::InvalidParams(format!(
                "scaling_mod_size must be within 20..=60 bits, got {}",
                self.scaling_mod_size
            )));
        }

        let max_slots = self.ring_dimension / 2;
        match self.slot_capacity {
            Some(0) => Err(CryptoError::InvalidParams(
                "slot_capacity must be greater than 0".to_string(),
            )),
            Some(slots) if slots > max_slots => Err(CryptoError::InvalidParams(format!(
                "slot_capacity {} exceeds ring_dimension / 2 = {}",
                slots, max_slots
            ))),
            _ => Ok(()),
        }
    }
}

impl Default for CryptoParams {
    /// Ring 2^14, 50-bit scaling, depth 3: enough for the mean and one clustering round.
    fn default() -> Self {
        Self::new(16_384, 50, 3)
    }
}
