//! ID generation for tasks.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Generate a unique ID from content + entropy.
/// Format: "tb-" + 16 hex chars of SHA256(title + timestamp + random)
pub fn generate_id(title: &str, created_at: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(created_at.as_bytes());
    // 8 random bytes keep ids apart when title and millisecond collide
    hasher.update(rand::rng().random::<[u8; 8]>());
    let hash = hasher.finalize();
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&hash[..8]);
    format!("tb-{:016x}", u64::from_be_bytes(prefix))
}
