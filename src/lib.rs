//! Meet-in-the-middle key recovery for a two-layer AES-128 ECB construction.
//!
//! The target encrypts each 16-byte block twice, `C = E_k2(E_k1(P))`, where
//! the high 13 bytes of both keys are known and only the low 3 bytes of each
//! are secret. One known plaintext/ciphertext block pair is enough to meet in
//! the middle: 2^24 encryptions forward build an index of intermediate
//! blocks, 2^24 decryptions backward probe it, and every join is a candidate
//! key pair. That replaces a 2^48 brute force with two 2^24 sweeps.

mod cipher;
mod error;
pub mod mitm;

pub use cipher::{Aes128Ecb, BlockCipher};
pub use error::Error;
pub use mitm::{
    build_index, probe_any, probe_index, Candidate, IndexMode, IntermediateIndex,
};
