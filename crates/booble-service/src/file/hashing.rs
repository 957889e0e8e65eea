//! SHA-256 content hashing.

use sha2::{Digest, Sha256};

use booble_core::error::AppError;

/// Lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Hash `data` on the blocking pool and hand the buffer back.
pub async fn sha256_hex_blocking(data: Vec<u8>) -> Result<(Vec<u8>, String), AppError> {
    tokio::task::spawn_blocking(move || {
        let hash = sha256_hex(&data);
        (data, hash)
    })
    .await
    .map_err(|e| AppError::internal(format!("Hashing task failed: {e}")))
}

/// Case-insensitive comparison of two hex digests.
pub fn hashes_match(expected: &str, actual: &str) -> bool {
    expected.trim().eq_ignore_ascii_case(actual.trim())
}
