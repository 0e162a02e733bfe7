//! Seeded coherent gradient noise.
//!
//! A 2D gradient noise built on a shuffled 256-entry permutation table, plus
//! fractal (multi-octave) composition. For a fixed seed every sampling method
//! is a pure function of its arguments.

/// Table size before duplication.
const PERM_SIZE: usize = 256;

/// LCG multiplier used for the permutation shuffle.
const LCG_MULTIPLIER: u64 = 6_364_136_223_846_793_005;

/// Deterministic 2D coherent noise generator.
#[derive(Debug, Clone)]
pub struct CoherentNoise {
    /// Seed the permutation table was built from.
    seed: u64,
    /// Permutation table, duplicated so corner lookups never wrap.
    perm: [u8; PERM_SIZE * 2],
}

impl CoherentNoise {
    /// Creates a noise generator from a 64-bit seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let mut p: [u8; PERM_SIZE] = std::array::from_fn(|i| i as u8);

        // Fisher-Yates shuffle driven by a seeded LCG
        let mut rng_state = seed;
        for i in (1..PERM_SIZE).rev() {
            rng_state = rng_state.wrapping_mul(LCG_MULTIPLIER).wrapping_add(1);
            let j = ((rng_state >> 32) as usize) % (i + 1);
            p.swap(i, j);
        }

        let mut perm = [0u8; PERM_SIZE * 2];
        perm[..PERM_SIZE].copy_from_slice(&p);
        perm[PERM_SIZE..].copy_from_slice(&p);

        Self { seed, perm }
    }

    /// Returns the seed this generator was built from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Samples the noise field at `(x, y)`.
    ///
    /// Returns a value in `[-1, 1]`.
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let x_floor = x.floor();
        let y_floor = y.floor();

        let xi = (x_floor as i64 & 255) as usize;
        let yi = (y_floor as i64 & 255) as usize;

        let xf = x - x_floor;
        let yf = y - y_floor;

        let u = fade(xf);
        let v = fade(yf);

        let a = self.perm[xi] as usize;
        let b = self.perm[xi + 1] as usize;
        let aa = self.perm[a + yi];
        let ab = self.perm[a + yi + 1];
        let ba = self.perm[b + yi];
        let bb = self.perm[b + yi + 1];

        let x1 = lerp(gradient(aa, xf, yf), gradient(ba, xf - 1.0, yf), u);
        let x2 = lerp(
            gradient(ab, xf, yf - 1.0),
            gradient(bb, xf - 1.0, yf - 1.0),
            u,
        );

        lerp(x1, x2, v).clamp(-1.0, 1.0)
    }

    /// Sums `octaves` layers of noise, each at `lacunarity` times the previous
    /// frequency and `persistence` times the previous amplitude, normalized by
    /// the total amplitude.
    ///
    /// Returns a value in `[-1, 1]`. Zero octaves yields a flat field (0.0).
    #[must_use]
    pub fn sample_fractal(
        &self,
        x: f64,
        y: f64,
        octaves: u32,
        persistence: f64,
        lacunarity: f64,
    ) -> f64 {
        let mut total = 0.0;
        let mut frequency = 1.0;
        let mut amplitude = 1.0;
        let mut max_value = 0.0;

        for _ in 0..octaves {
            total += self.sample(x * frequency, y * frequency) * amplitude;
            max_value += amplitude;

            amplitude *= persistence;
            frequency *= lacunarity;
        }

        if max_value == 0.0 {
            return 0.0;
        }
        (total / max_value).clamp(-1.0, 1.0)
    }

    /// Fractal noise remapped to `[0, 1]`.
    #[must_use]
    pub fn sample_normalized(
        &self,
        x: f64,
        y: f64,
        octaves: u32,
        persistence: f64,
        lacunarity: f64,
    ) -> f64 {
        (self.sample_fractal(x, y, octaves, persistence, lacunarity) + 1.0) * 0.5
    }
}

/// Quintic easing curve `6t^5 - 15t^4 + 10t^3`.
#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Dot product with one of 8 gradient directions picked by the low 3 bits.
#[inline]
fn gradient(hash: u8, x: f64, y: f64) -> f64 {
    let h = hash & 7;
    let (u, v) = if h < 4 { (x, y) } else { (y, x) };
    (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}
