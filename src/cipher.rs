use aes::cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit};
use aes::Aes128;

use crate::mitm::Block;

/// One ECB layer: a keyed permutation over a single 16-byte block. No
/// chaining, no padding; same key and block always give the same output.
pub trait BlockCipher: Sync {
    fn encrypt_block(&self, key: &[u8; 16], block: &Block) -> Block;
    fn decrypt_block(&self, key: &[u8; 16], block: &Block) -> Block;
}

/// AES-128, one block at a time. The key schedule is recomputed per call
/// since the attack changes the key on every iteration anyway.
pub struct Aes128Ecb;

impl BlockCipher for Aes128Ecb {
    fn encrypt_block(&self, key: &[u8; 16], block: &Block) -> Block {
        let cipher = Aes128::new(GenericArray::from_slice(key));
        let mut out = GenericArray::clone_from_slice(block);
        cipher.encrypt_block(&mut out);
        out.into()
    }

    fn decrypt_block(&self, key: &[u8; 16], block: &Block) -> Block {
        let cipher = Aes128::new(GenericArray::from_slice(key));
        let mut out = GenericArray::clone_from_slice(block);
        cipher.decrypt_block(&mut out);
        out.into()
    }
}
