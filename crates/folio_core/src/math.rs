//! Math utilities
//!
//! Re-exports glam with a seeded generator for scene placement

pub use glam::*;

/// Seeded pseudo-random generator (xorshift64*).
///
/// Placement of particles and fallback dots goes through this so a given
/// seed always yields the same layout.
#[derive(Debug, Clone)]
pub struct SeededRng {
    seed: u64,
    state: u64,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        // xorshift has a fixed point at zero
        let state = if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed };
        Self { seed, state }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        // top 24 bits fit the f32 mantissa exactly
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    /// Uniform in `[lo, hi)`.
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }

    /// Uniform in `[-half_extent, half_extent)`.
    pub fn centered(&mut self, extent: f32) -> f32 {
        (self.next_f32() - 0.5) * extent
    }
}
