/// Errors raised while validating attack inputs. The search itself cannot
/// fail once inputs pass validation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("key prefix must be {expected} bytes, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },

    #[error("block must be {expected} bytes, got {got}")]
    InvalidBlockLength { expected: usize, got: usize },

    #[error("invalid hex encoding: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}
