use serde::{Deserialize, Serialize};

use crate::complex::Complex;
use crate::error::CoreError;

/// Squared escape radius: a point whose orbit reaches `|z|² >= 4.0`
/// (modulus 2.0) is diverging and will never return.
pub const ESCAPE_RADIUS_SQ: f64 = 4.0;

/// Count the iterations of `z ← z² + c` (from `z₀ = 0`) before divergence.
///
/// Returns the first `n` at which either `|zₙ|² >= 4.0` or `n` reaches
/// `max_iterations`. Points inside the set therefore return the full
/// iteration budget; divergent points return something smaller. The raw
/// count is the dataset the color mapper consumes.
///
/// The comparison is strictly `< 4.0`, so `c = -2` — whose orbit lands
/// exactly on `|z|² = 4` — reports `n = 1` despite being in the set.
/// That quirk is part of the established output and is kept as-is.
///
/// `max_iterations == 0` returns `0` without iterating.
#[inline]
pub fn escape_time(c: Complex, max_iterations: u32) -> u32 {
    let mut z = Complex::ZERO;
    let mut n = 0;
    while n < max_iterations {
        z = z.sqr() + c;
        n += 1;
        if z.norm_sq() >= ESCAPE_RADIUS_SQ {
            break;
        }
    }
    n
}

/// A validated iteration budget.
///
/// The UI boundary may hand us anything; values above [`IterationLimit::MAX`]
/// are rejected here so the engine never sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct IterationLimit(u32);

impl IterationLimit {
    /// Upper bound on the iteration budget, matching the range the host's
    /// spinner control exposes.
    pub const MAX: u32 = 65536;

    /// Default budget for the initial view.
    pub const DEFAULT: Self = Self(64);

    pub fn new(value: u32) -> crate::Result<Self> {
        if value > Self::MAX {
            return Err(CoreError::InvalidMaxIterations(value));
        }
        Ok(Self(value))
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for IterationLimit {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for IterationLimit {
    type Error = CoreError;

    fn try_from(value: u32) -> crate::Result<Self> {
        Self::new(value)
    }
}

impl From<IterationLimit> for u32 {
    fn from(limit: IterationLimit) -> u32 {
        limit.0
    }
}
