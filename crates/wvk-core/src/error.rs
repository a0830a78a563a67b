use thiserror::Error;

/// Every fallible boundary this library exposes. The `wvk` binary matches
/// on this to pick an exit code; nothing in `wvk-core` panics on bad
/// input — only on the caller violating an internal invariant (e.g.
/// handing a zero-length batch size to the search driver).
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid public key encoding")]
    InvalidPublicKeyEncoding,

    #[error("public key is not a valid point on the curve")]
    PublicKeyNotOnCurve,

    #[error("prefix too long: {0} characters (max 10)")]
    PrefixTooLong(usize),

    #[error("invalid prefix encoding")]
    InvalidPrefixEncoding,

    #[error("invalid scalar encoding")]
    InvalidScalarEncoding,

    #[error("neither s + n*k nor s - n*k matches the prefix")]
    PrefixMismatch,
}
