pub mod batch;
pub mod packer;


pub use batch::{EncryptedBatch, EncryptedChunk, Layout};
pub use packer::EncryptionPipeline;
