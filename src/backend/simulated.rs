//! In-process stand-in for a CKKS backend.
//!
//! Ciphertexts carry their slot values in the clear, perturbed by noise on the
//! order of `2^-(scaling_mod_size - 10)` at encryption and after every
//! rescale, and they track multiplicative depth exactly like a leveled scheme.
//! It provides NO confidentiality; it exists so the orchestration layer can be
//! run and tested without a native FHE library.

use std::fmt;
use std::sync::Mutex;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::{CryptoError, CryptoParams, HeBackend};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimPublicKey {
    key_id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimSecretKey {
    key_id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimEvalKey {
    key_id: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimPlaintext {
    values: Vec<f64>,
}

/// Opaque outside this module; slot contents are only reachable via `decrypt`.
#[derive(Clone)]
pub struct SimCiphertext {
    key_id: u64,
    slots: Vec<f64>,
    depth: usize,
}

impl fmt::Debug for SimCiphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimCiphertext")
            .field("key_id", &self.key_id)
            .field("populated", &self.slots.len())
            .field("depth", &self.depth)
            .finish()
    }
}

pub struct SimulatedCkks {
    params: CryptoParams,
    compare_tolerance: f64,
    rng: Mutex<ChaCha8Rng>,
}

impl SimulatedCkks {
    pub fn new(params: CryptoParams) -> Self {
        Self::with_seed(params, rand::random())
    }

    /// Deterministic noise and key ids, for reproducible runs.
    pub fn with_seed(params: CryptoParams, seed: u64) -> Self {
        Self {
            params,
            compare_tolerance: 2f64.powi(-(params.scaling_mod_size as i32 / 2)),
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    /// Width of the band inside which `compare` reports 0.5.
    pub fn compare_tolerance(mut self, tolerance: f64) -> Self {
        self.compare_tolerance = tolerance.abs();
        self
    }

    fn noise_bound(&self) -> f64 {
        2f64.powi(-(self.params.scaling_mod_size as i32 - 10))
    }

    fn perturb(&self, values: &mut [f64]) -> Result<(), CryptoError> {
        let bound = self.noise_bound();
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| CryptoError::Backend("noise source poisoned".to_string()))?;
        for v in values.iter_mut() {
            *v += rng.gen_range(-bound..bound);
        }
        Ok(())
    }

    fn next_key_id(&self) -> Result<u64, CryptoError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| CryptoError::Backend("noise source poisoned".to_string()))?;
        Ok(rng.gen())
    }

    fn check_depth(&self, required: usize) -> Result<usize, CryptoError> {
        let available = self.params.multiplicative_depth;
        if required > available {
            return Err(CryptoError::DepthExhausted {
                required,
                available,
            });
        }
        Ok(required)
    }

    fn shared_key(a: &SimCiphertext, b: &SimCiphertext) -> Result<u64, CryptoError> {
        if a.key_id != b.key_id {
            return Err(CryptoError::KeyMismatch);
        }
        Ok(a.key_id)
    }

    fn check_eval(eval: &SimEvalKey, a: &SimCiphertext) -> Result<(), CryptoError> {
        if eval.key_id != a.key_id {
            return Err(CryptoError::KeyMismatch);
        }
        Ok(())
    }
}

/// Slot-wise combination; missing trailing slots read as zero.
fn zip_slots(a: &[f64], b: &[f64], op: impl Fn(f64, f64) -> f64) -> Vec<f64> {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            op(
                a.get(i).copied().unwrap_or(0.0),
                b.get(i).copied().unwrap_or(0.0),
            )
        })
        .collect()
}

impl HeBackend for SimulatedCkks {
    type PublicKey = SimPublicKey;
    type SecretKey = SimSecretKey;
    type EvalKey = SimEvalKey;
    type Plaintext = SimPlaintext;
    type Ciphertext = SimCiphertext;

    fn name(&self) -> &'static str {
        "simulated-ckks"
    }

    fn params(&self) -> &CryptoParams {
        &self.params
    }

    fn key_gen(&self) -> Result<(SimPublicKey, SimSecretKey), CryptoError> {
        let key_id = self.next_key_id()?;
        Ok((SimPublicKey { key_id }, SimSecretKey { key_id }))
    }

    fn eval_key_gen(&self, secret: &SimSecretKey) -> Result<SimEvalKey, CryptoError> {
        Ok(SimEvalKey {
            key_id: secret.key_id,
        })
    }

    fn pack(&self, values: &[f64]) -> Result<SimPlaintext, CryptoError> {
        let capacity = self.slot_capacity();
        if values.len() > capacity {
            return Err(CryptoError::SlotOverflow {
                values: values.len(),
                capacity,
            });
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(CryptoError::Backend(format!("cannot encode {}", bad)));
        }

        Ok(SimPlaintext {
            values: values.to_vec(),
        })
    }

    fn unpack(&self, plaintext: &SimPlaintext) -> Vec<f64> {
        plaintext.values.clone()
    }

    fn encrypt(
        &self,
        public: &SimPublicKey,
        plaintext: &SimPlaintext,
    ) -> Result<SimCiphertext, CryptoError> {
        let mut slots = plaintext.values.clone();
        self.perturb(&mut slots)?;

        Ok(SimCiphertext {
            key_id: public.key_id,
            slots,
            depth: 0,
        })
    }

    fn decrypt(
        &self,
        secret: &SimSecretKey,
        ciphertext: &SimCiphertext,
    ) -> Result<SimPlaintext, CryptoError> {
        if secret.key_id != ciphertext.key_id {
            return Err(CryptoError::KeyMismatch);
        }

        Ok(SimPlaintext {
            values: ciphertext.slots.clone(),
        })
    }

    fn add(&self, a: &SimCiphertext, b: &SimCiphertext) -> Result<SimCiphertext, CryptoError> {
        let key_id = Self::shared_key(a, b)?;
        Ok(SimCiphertext {
            key_id,
            slots: zip_slots(&a.slots, &b.slots, |x, y| x + y),
            depth: a.depth.max(b.depth),
        })
    }

    fn add_plain(
        &self,
        a: &SimCiphertext,
        b: &SimPlaintext,
    ) -> Result<SimCiphertext, CryptoError> {
        Ok(SimCiphertext {
            key_id: a.key_id,
            slots: zip_slots(&a.slots, &b.values, |x, y| x + y),
            depth: a.depth,
        })
    }

    fn sub(&self, a: &SimCiphertext, b: &SimCiphertext) -> Result<SimCiphertext, CryptoError> {
        let key_id = Self::shared_key(a, b)?;
        Ok(SimCiphertext {
            key_id,
            slots: zip_slots(&a.slots, &b.slots, |x, y| x - y),
            depth: a.depth.max(b.depth),
        })
    }

    fn mult(
        &self,
        eval: &SimEvalKey,
        a: &SimCiphertext,
        b: &SimCiphertext,
    ) -> Result<SimCiphertext, CryptoError> {
        let key_id = Self::shared_key(a, b)?;
        Self::check_eval(eval, a)?;
        let depth = self.check_depth(a.depth.max(b.depth) + 1)?;

        let mut slots = zip_slots(&a.slots, &b.slots, |x, y| x * y);
        self.perturb(&mut slots)?;

        Ok(SimCiphertext {
            key_id,
            slots,
            depth,
        })
    }

    fn mult_plain(
        &self,
        a: &SimCiphertext,
        b: &SimPlaintext,
    ) -> Result<SimCiphertext, CryptoError> {
        let depth = self.check_depth(a.depth + 1)?;

        let mut slots = zip_slots(&a.slots, &b.values, |x, y| x * y);
        self.perturb(&mut slots)?;

        Ok(SimCiphertext {
            key_id: a.key_id,
            slots,
            depth,
        })
    }

    fn sum_slots(
        &self,
        eval: &SimEvalKey,
        a: &SimCiphertext,
        len: usize,
    ) -> Result<SimCiphertext, CryptoError> {
        Self::check_eval(eval, a)?;
        let capacity = self.slot_capacity();
        if len > capacity {
            return Err(CryptoError::SlotOverflow {
                values: len,
                capacity,
            });
        }

        let total = a.slots.iter().take(len).sum::<f64>();
        Ok(SimCiphertext {
            key_id: a.key_id,
            slots: vec![total],
            depth: a.depth,
        })
    }

    fn compare(
        &self,
        eval: &SimEvalKey,
        a: &SimCiphertext,
        b: &SimCiphertext,
    ) -> Result<SimCiphertext, CryptoError> {
        let key_id = Self::shared_key(a, b)?;
        Self::check_eval(eval, a)?;
        let depth = self.check_depth(a.depth.max(b.depth) + self.compare_depth())?;

        let tol = self.compare_tolerance;
        let slots = zip_slots(&a.slots, &b.slots, |x, y| {
            if x < y - tol {
                1.0
            } else if x > y + tol {
                0.0
            } else {
                0.5
            }
        });

        Ok(SimCiphertext {
            key_id,
            slots,
            depth,
        })
    }

    fn depth_of(&self, ciphertext: &SimCiphertext) -> usize {
        ciphertext.depth
    }

    fn compare_depth(&self) -> usize {
        1
    }
}
