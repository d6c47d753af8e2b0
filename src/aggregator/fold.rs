use crate::backend::HeBackend;
use crate::error::Result;

/// Left-to-right homomorphic sum. `None` when there is nothing to add.
pub(crate) fn fold_add<'c, B, I>(backend: &B, ciphertexts: I) -> Result<Option<B::Ciphertext>>
where
    B: HeBackend,
    B::Ciphertext: 'c,
    I: IntoIterator<Item = &'c B::Ciphertext>,
{
    let mut iter = ciphertexts.into_iter();
    let Some(first) = iter.next() else {
        return Ok(None);
    };

    let mut acc = first.clone();
    for ct in iter {
        acc = backend.add(&acc, ct)?;
    }

    Ok(Some(acc))
}
