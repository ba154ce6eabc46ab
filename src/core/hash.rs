//! Tracker State Digest
//!
//! Deterministic hashing of the active-threat set for:
//! - Replay validation (same inbound events, same digest)
//! - Comparing two tracker instances in tests

use sha2::{Sha256, Digest};
use super::vec2::Vec2;

/// Digest output type (256 bits / 32 bytes)
pub type StateDigest = [u8; 32];

/// Deterministic hasher for tracker state.
///
/// Wraps SHA-256 with helpers for world-space types.
/// Order of updates is critical for determinism.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for the active-threat set.
    pub fn for_tracker_state() -> Self {
        Self::new(b"SKILLSHOT_TRACKER_V1")
    }

    /// Update with raw bytes.
    #[inline]
    pub fn update_bytes(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a u64 value (little-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with an f32 value (bit pattern, little-endian).
    ///
    /// `-0.0` is folded into `0.0` so both hash the same.
    #[inline]
    pub fn update_f32(&mut self, value: f32) {
        let value = if value == 0.0 { 0.0 } else { value };
        self.hasher.update(value.to_bits().to_le_bytes());
    }

    /// Update with a Vec2.
    #[inline]
    pub fn update_vec2(&mut self, value: Vec2) {
        self.update_f32(value.x);
        self.update_f32(value.y);
    }

    /// Update with a length-prefixed string.
    #[inline]
    pub fn update_str(&mut self, value: &str) {
        self.update_u32(value.len() as u32);
        self.hasher.update(value.as_bytes());
    }

    /// Update with a boolean.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    /// Finalize and return the digest.
    pub fn finalize(self) -> StateDigest {
        self.hasher.finalize().into()
    }
}

/// Compute the tracker digest.
///
/// The closure adds per-entry data after the tick and entry count.
pub fn compute_state_digest<F>(tick: u64, entries: usize, add_state: F) -> StateDigest
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::for_tracker_state();

    // Always hash tick and entry count first
    hasher.update_u64(tick);
    hasher.update_u32(entries as u32);

    add_state(&mut hasher);

    hasher.finalize()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_hasher_determinism() {
        let make_hash = || {
            let mut hasher = StateHasher::for_tracker_state();
            hasher.update_u32(100);
            hasher.update_f32(5.5);
            hasher.update_vec2(Vec2::new(1.0, 2.0));
            hasher.update_str("LuxLightBinding");
            hasher.update_bool(true);
            hasher.finalize()
        };

        assert_eq!(make_hash(), make_hash());
    }

    #[test]
    fn test_hash_order_matters() {
        let hash1 = {
            let mut h = StateHasher::new(b"test");
            h.update_u32(1);
            h.update_u32(2);
            h.finalize()
        };

        let hash2 = {
            let mut h = StateHasher::new(b"test");
            h.update_u32(2);
            h.update_u32(1);
            h.finalize()
        };

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_negative_zero_folds() {
        let mut a = StateHasher::new(b"test");
        a.update_f32(0.0);
        let mut b = StateHasher::new(b"test");
        b.update_f32(-0.0);
        assert_eq!(a.finalize(), b.finalize());
    }

    #[test]
    fn test_compute_state_digest() {
        let digest = compute_state_digest(100, 1, |h| h.update_vec2(Vec2::new(5.0, 0.0)));
        let same = compute_state_digest(100, 1, |h| h.update_vec2(Vec2::new(5.0, 0.0)));
        assert_eq!(digest, same);

        // Different tick = different digest
        let other = compute_state_digest(101, 1, |h| h.update_vec2(Vec2::new(5.0, 0.0)));
        assert_ne!(digest, other);
    }
}
