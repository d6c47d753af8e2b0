use tracing::info;

use super::{CryptoError, CryptoParams, HeBackend};

/// Backend plus its key material, built once and shared read-only.
pub struct CryptoContext<B: HeBackend> {
    backend: B,
    public: B::PublicKey,
    secret: B::SecretKey,
    eval: B::EvalKey,
}

impl<B: HeBackend> CryptoContext<B> {
    /// Validate parameters and generate the key pair and evaluation keys.
    pub fn new(backend: B) -> Result<Self, CryptoError> {
        backend.params().validate()?;

        let (public, secret) = backend.key_gen()?;
        let eval = backend.eval_key_gen(&secret)?;

        info!(
            backend = backend.name(),
            ring_dimension = backend.params().ring_dimension,
            slots = backend.slot_capacity(),
            depth = backend.params().multiplicative_depth,
            "crypto context ready"
        );

        Ok(Self {
            backend,
            public,
            secret,
            eval,
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn params(&self) -> &CryptoParams {
        self.backend.params()
    }

    pub fn slot_capacity(&self) -> usize {
        self.backend.slot_capacity()
    }

    pub fn max_depth(&self) -> usize {
        self.backend.params().multiplicative_depth
    }

    pub fn public_key(&self) -> &B::PublicKey {
        &self.public
    }

    pub fn secret_key(&self) -> &B::SecretKey {
        &self.secret
    }

    pub fn eval_key(&self) -> &B::EvalKey {
        &self.eval
    }
}
