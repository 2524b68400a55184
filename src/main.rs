use hex_literal::hex;
use indicatif::ProgressBar;

use ecb_mitm::mitm::{self, SUFFIX_SPACE};
use ecb_mitm::{Aes128Ecb, IndexMode};

// Known 13-byte prefixes of both layer keys.
const K1_PREFIX: [u8; 13] = hex!("a3f19c8d4e6b72f0e2377ecff7");
const K2_PREFIX: [u8; 13] = hex!("5e8b41c2d9f07a36e2377ecff7");

// Known plaintext and its double-encrypted ciphertext; the attack only
// needs the first block of each.
const PLAINTEXT: &[u8] = b"This is a top secret message. Do not share it with anyone!";
const CIPHERTEXT_HEX: &str = "3e40001d1bc6d179551288606d9404914c002383a158dbc45748957a845b3195eaf9ac3f1e34dc2ef8888c70399ec0acbed366b8e1fcc8b501f5763fe91862a3";

fn main() -> Result<(), ecb_mitm::Error> {
    let cipher = Aes128Ecb;
    let c_block = mitm::block_from_hex(&CIPHERTEXT_HEX[..32])?;

    let bar = ProgressBar::new(SUFFIX_SPACE as u64);
    let index = mitm::build_index(
        &cipher,
        &K1_PREFIX,
        &PLAINTEXT[..16],
        IndexMode::Exhaustive,
        &bar,
    )?;
    bar.finish();
    println!("indexed {} intermediate blocks", index.len());

    let bar = ProgressBar::new(SUFFIX_SPACE as u64);
    let candidates = mitm::probe_index(&cipher, &K2_PREFIX, &c_block, &index, &bar)?;
    bar.finish();

    if candidates.is_empty() {
        println!("no candidates");
        return Ok(());
    }

    for pair in &candidates {
        println!(
            "k1 suffix {:06x}  k2 suffix {:06x}",
            pair.k1_suffix, pair.k2_suffix
        );
    }

    // One surviving pair means the keys are pinned down.
    if let [pair] = candidates.as_slice() {
        let (k1, k2) = pair.full_keys(&K1_PREFIX, &K2_PREFIX);
        println!("k1 : {}", hex::encode(k1));
        println!("k2 : {}", hex::encode(k2));
    }

    Ok(())
}
