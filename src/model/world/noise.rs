// noise.rs - seeded 2D gradient noise and fractal fields built on top of it

use std::f64::consts::SQRT_2;

// ============================================================================
// PERMUTATION TABLE
// ============================================================================

/// Shuffled `0..256`, stored twice so lattice lookups never wrap
#[derive(Clone)]
pub struct PermutationTable {
    values: [u8; 512],
}

impl PermutationTable {
    /// Fisher-Yates shuffle driven by `seed`; equal seeds give equal tables.
    /// Draws are `u64` so wasm32 and native builds shuffle identically.
    pub fn new(seed: u64) -> Self {
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut perm: [u8; 256] = std::array::from_fn(|i| i as u8);
        for i in (1..perm.len()).rev() {
            let j = rng.u64(0..=i as u64) as usize;
            perm.swap(i, j);
        }

        let mut values = [0u8; 512];
        values[..256].copy_from_slice(&perm);
        values[256..].copy_from_slice(&perm);
        Self { values }
    }

    #[inline]
    fn get(&self, i: usize) -> usize {
        self.values[i] as usize
    }

    // ========================================================================
    // NOISE FUNCTIONS
    // ========================================================================

    /// Classic 2D gradient noise, in `[-√2, √2]`; zero on every lattice point
    pub fn gradient_noise(&self, x: f64, y: f64) -> f64 {
        let xi = (x.floor() as i64).rem_euclid(256) as usize;
        let yi = (y.floor() as i64).rem_euclid(256) as usize;
        let xf = x - x.floor();
        let yf = y - y.floor();

        let top_right = self.get(self.get(xi + 1) + yi + 1);
        let top_left = self.get(self.get(xi) + yi + 1);
        let bottom_right = self.get(self.get(xi + 1) + yi);
        let bottom_left = self.get(self.get(xi) + yi);

        let dot_tr = gradient_dot(top_right, xf - 1.0, yf - 1.0);
        let dot_tl = gradient_dot(top_left, xf, yf - 1.0);
        let dot_br = gradient_dot(bottom_right, xf - 1.0, yf);
        let dot_bl = gradient_dot(bottom_left, xf, yf);

        let u = fade(xf);
        let v = fade(yf);

        let left = lerp(v, dot_bl, dot_tl);
        let right = lerp(v, dot_br, dot_tr);
        lerp(u, left, right)
    }

    /// Sum of `octaves` gradient noise samples, doubling frequency and halving
    /// amplitude each octave
    pub fn fractal_noise(&self, x: f64, y: f64, octaves: u32, amplitude: f64, frequency: f64) -> f64 {
        let mut result = 0.0;
        let mut amplitude = amplitude;
        let mut frequency = frequency;

        for _ in 0..octaves {
            result += amplitude * self.gradient_noise(x * frequency, y * frequency);
            amplitude /= 2.0;
            frequency *= 2.0;
        }

        result
    }
}

/// One of four diagonal gradients picked by `hash`, dotted with the offset
fn gradient_dot(hash: usize, dx: f64, dy: f64) -> f64 {
    match hash % 4 {
        0 => dx + dy,
        1 => -dx + dy,
        2 => -dx - dy,
        _ => dx - dy,
    }
}

/// Quintic smoothstep 6t^5 - 15t^4 + 10t^3
fn fade(t: f64) -> f64 {
    ((6.0 * t - 15.0) * t + 10.0) * t * t * t
}

fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

// ============================================================================
// NOISE FIELDS
// ============================================================================

/// Fractal noise remapped from its theoretical range onto `[min, max]`.
/// The shift decorrelates fields that share one permutation table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseField {
    pub min: f64,
    pub max: f64,
    pub shift: [f64; 2],
    pub octaves: u32,
    pub amplitude: f64,
    pub frequency: f64,
}

impl NoiseField {
    pub fn new(min: f64, max: f64, shift: [f64; 2], octaves: u32, amplitude: f64, frequency: f64) -> Self {
        Self { min, max, shift, octaves, amplitude, frequency }
    }

    /// Largest absolute value the fractal sum can reach
    fn bound(&self) -> f64 {
        let mut total = 0.0;
        let mut amplitude = self.amplitude.abs();
        for _ in 0..self.octaves {
            total += amplitude;
            amplitude /= 2.0;
        }
        total * SQRT_2
    }

    pub fn sample(&self, table: &PermutationTable, x: f64, y: f64) -> f64 {
        let bound = self.bound();
        if bound == 0.0 {
            return (self.min + self.max) / 2.0;
        }
        let raw = table.fractal_noise(
            x + self.shift[0],
            y + self.shift[1],
            self.octaves,
            self.amplitude,
            self.frequency,
        );
        let t = ((raw + bound) / (2.0 * bound)).clamp(0.0, 1.0);
        self.min + t * (self.max - self.min)
    }
}
