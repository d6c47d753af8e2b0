//! Homomorphic backend seam.
//!
//! The pipeline only ever talks to [`HeBackend`]. Key material is generated
//! once by [`CryptoContext::new`] and borrowed immutably by every stage.

mod context;
mod error;
mod params;
pub mod simulated;


pub use context::CryptoContext;
pub use error::CryptoError;
pub use params::CryptoParams;
pub use simulated::SimulatedCkks;

/// Primitive operations of a leveled, approximate-arithmetic HE scheme.
///
/// Every operation that multiplies must refuse (with
/// [`CryptoError::DepthExhausted`]) once the result would exceed
/// `params().multiplicative_depth`.
pub trait HeBackend: Send + Sync {
    type PublicKey: Send + Sync;
    type SecretKey: Send + Sync;
    /// Relinearization and rotation-sum keys.
    type EvalKey: Send + Sync;
    type Plaintext;
    type Ciphertext: Clone + Send + Sync;

    fn name(&self) -> &'static str;

    fn params(&self) -> &CryptoParams;

    fn slot_capacity(&self) -> usize {
        self.params().slots()
    }

    fn key_gen(&self) -> Result<(Self::PublicKey, Self::SecretKey), CryptoError>;

    fn eval_key_gen(&self, secret: &Self::SecretKey) -> Result<Self::EvalKey, CryptoError>;

    /// Pack values into slots in positional order; unused slots are zero.
    fn pack(&self, values: &[f64]) -> Result<Self::Plaintext, CryptoError>;

    fn unpack(&self, plaintext: &Self::Plaintext) -> Vec<f64>;

    fn encrypt(
        &self,
        public: &Self::PublicKey,
        plaintext: &Self::Plaintext,
    ) -> Result<Self::Ciphertext, CryptoError>;

    fn decrypt(
        &self,
        secret: &Self::SecretKey,
        ciphertext: &Self::Ciphertext,
    ) -> Result<Self::Plaintext, CryptoError>;

    fn add(
        &self,
        a: &Self::Ciphertext,
        b: &Self::Ciphertext,
    ) -> Result<Self::Ciphertext, CryptoError>;

    fn add_plain(
        &self,
        a: &Self::Ciphertext,
        b: &Self::Plaintext,
    ) -> Result<Self::Ciphertext, CryptoError>;

    fn sub(
        &self,
        a: &Self::Ciphertext,
        b: &Self::Ciphertext,
    ) -> Result<Self::Ciphertext, CryptoError>;

    fn mult(
        &self,
        eval: &Self::EvalKey,
        a: &Self::Ciphertext,
        b: &Self::Ciphertext,
    ) -> Result<Self::Ciphertext, CryptoError>;

    fn mult_plain(
        &self,
        a: &Self::Ciphertext,
        b: &Self::Plaintext,
    ) -> Result<Self::Ciphertext, CryptoError>;

    /// Sum of the first `len` slots, left in slot 0. Consumes no depth.
    fn sum_slots(
        &self,
        eval: &Self::EvalKey,
        a: &Self::Ciphertext,
        len: usize,
    ) -> Result<Self::Ciphertext, CryptoError>;

    /// Approximate slot-wise `a < b` indicator: ~1.0 when `a` is smaller beyond
    /// the scheme tolerance, ~0.0 when larger, 0.5 inside the tolerance band.
    fn compare(
        &self,
        eval: &Self::EvalKey,
        a: &Self::Ciphertext,
        b: &Self::Ciphertext,
    ) -> Result<Self::Ciphertext, CryptoError>;

    /// Multiplicative depth already absorbed by this ciphertext.
    fn depth_of(&self, ciphertext: &Self::Ciphertext) -> usize;

    /// Depth units one `compare` call consumes.
    fn compare_depth(&self) -> usize;
}
