//! RNG module - deterministic seeded randomness
//!
//! Grid layout and piece generation both draw from a `SimpleRng`, so the same
//! seed always produces the same blocked cells, start pipe and piece sequence.

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    /// Returns 0 when max is 0
    pub fn next_range(&mut self, max: u32) -> u32 {
        // Multiply-shift keeps the high bits; the low bits of an LCG cycle quickly
        ((u64::from(self.next_u32()) * u64::from(max)) >> 32) as u32
    }

    /// Generate a float in [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        // High bits of an LCG are the better distributed ones; 24 bits fill an f32 mantissa
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Pick a uniformly random element
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.next_range(items.len() as u32) as usize;
        items.get(idx)
    }

    /// Shuffle a slice using Fisher-Yates
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }

    /// Current internal state (re-seeding with it continues the sequence)
    pub fn state(&self) -> u32 {
        self.state
    }
}

impl Default for SimpleRng {
    fn default() -> Self {
        Self::new(1)
    }
}
