use std::f64::consts::FRAC_PI_2;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;
use crate::grid::IterationGrid;

/// How fast the palette cycles as the escape count grows.
const PHASE_STEP: f64 = 0.1;

/// Per-channel phase offsets, ≈ 0°/120°/240° in radians.
const CHANNEL_PHASES: [f64; 3] = [0.0, 2.094, 4.188];

/// Per-channel offsets for the triangle-wave modes (thirds of the period 2).
const TRIANGLE_PHASES: [f64; 3] = [0.0, 0.66, 1.33];

/// The periodic shading function applied to raw escape counts.
///
/// All variants are pure `count → color` maps; switching between them never
/// requires recomputing the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorMode {
    /// Triangle-wave approximation of a raised sine (the classic look).
    SineApprox,
    /// Same waves without the quarter-turn phase shift.
    CosineApprox,
    /// Remainder-based palette; periodic without any trig calls.
    ModuloPhase,
    /// Sum of sine and cosine per channel.
    SineCosineSum,
    /// Alias of [`ModuloPhase`](Self::ModuloPhase), kept as a distinct
    /// selector for compatibility with persisted mode choices.
    ModuloPhaseCheap,
}

impl ColorMode {
    pub const ALL: [ColorMode; 5] = [
        ColorMode::SineApprox,
        ColorMode::CosineApprox,
        ColorMode::ModuloPhase,
        ColorMode::SineCosineSum,
        ColorMode::ModuloPhaseCheap,
    ];

    /// Display name for mode selectors.
    pub fn label(self) -> &'static str {
        match self {
            Self::SineApprox => "Sine",
            Self::CosineApprox => "Cosine",
            Self::ModuloPhase => "Division rest",
            Self::SineCosineSum => "Sine plus cosine",
            Self::ModuloPhaseCheap => "Division rest (cheap)",
        }
    }
}

/// Pack three `[0, 1]`-ish channel values into opaque ARGB8888.
///
/// Channels are scaled by 255 and converted with Rust's saturating
/// float→int cast: in-range values truncate (no rounding), anything the
/// formulas push outside `[0, 255]` clamps. Alpha is always 255.
#[inline]
fn pack(r: f64, g: f64, b: f64) -> u32 {
    let r = (255.0 * r) as u8;
    let g = (255.0 * g) as u8;
    let b = (255.0 * b) as u8;
    0xFF00_0000 | (r as u32) << 16 | (g as u32) << 8 | b as u32
}

/// Triangle wave with period 2, folded into `[0, 1]`.
#[inline]
fn triangle(q: f64) -> f64 {
    ((q % 2.0) - 1.0).abs()
}

/// Smoothstep cubic `t²(3 − 2t)`, approximating `(cos + 1)/2` over one fold.
#[inline]
fn smoothed(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

/// Three phase-shifted triangle waves rounded off by the smoothstep cubic.
fn triangle_wave_color(n: u32, phase_shift: f64) -> u32 {
    let q = n as f64 * PHASE_STEP + phase_shift;
    let [p0, p1, p2] = TRIANGLE_PHASES;
    pack(
        smoothed(triangle(q + p0)),
        smoothed(triangle(q + p1)),
        smoothed(triangle(q + p2)),
    )
}

/// Remainder-based periodic palette: `(0.5·(0.1n + φ)) mod 3 + 0.5`.
fn modulo_phase_color(n: u32) -> u32 {
    let t = n as f64 * PHASE_STEP;
    let channel = |phase: f64| (0.5 * (t + phase)) % 3.0 + 0.5;
    let [p0, p1, p2] = CHANNEL_PHASES;
    pack(channel(p0), channel(p1), channel(p2))
}

/// Per-channel `(sin θ + cos θ)/2 + 1/2`, θ phase-shifted by thirds.
fn sine_cosine_color(n: u32) -> u32 {
    let t = n as f64 * PHASE_STEP;
    let channel = |phase: f64| {
        let theta = t + phase;
        0.5 * (theta.sin() + theta.cos()) + 0.5
    };
    let [p0, p1, p2] = CHANNEL_PHASES;
    pack(channel(p0), channel(p1), channel(p2))
}

/// Map one escape count to an opaque ARGB pixel.
///
/// Pure and stateless: the same `(n, mode)` always yields the same color.
#[inline]
pub fn color_of(n: u32, mode: ColorMode) -> u32 {
    match mode {
        ColorMode::SineApprox => triangle_wave_color(n, FRAC_PI_2),
        ColorMode::CosineApprox => triangle_wave_color(n, 0.0),
        ColorMode::ModuloPhase | ColorMode::ModuloPhaseCheap => modulo_phase_color(n),
        ColorMode::SineCosineSum => sine_cosine_color(n),
    }
}

/// Colorize an entire iteration grid into the pixel buffer.
///
/// Must only run once every tile of the frame has completed; the grid and
/// buffer have identical dimensions by construction.
pub fn colorize(grid: &IterationGrid, mode: ColorMode, buffer: &mut PixelBuffer) {
    buffer
        .data
        .par_iter_mut()
        .zip(grid.as_slice().par_iter())
        .for_each(|(pixel, &n)| *pixel = color_of(n, mode));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha(argb: u32) -> u8 {
        (argb >> 24) as u8
    }

    fn rgb(argb: u32) -> (u8, u8, u8) {
        ((argb >> 16) as u8, (argb >> 8) as u8, argb as u8)
    }

    #[test]
    fn always_opaque() {
        for mode in ColorMode::ALL {
            for n in [0, 1, 17, 64, 1000, 65536] {
                assert_eq!(alpha(color_of(n, mode)), 255, "{mode:?} n={n}");
            }
        }
    }

    #[test]
    fn pure_function() {
        for mode in ColorMode::ALL {
            for n in 0..512 {
                assert_eq!(color_of(n, mode), color_of(n, mode));
            }
        }
    }

    // Regression baselines: the color of n = 0 under each mode is part of
    // the established output.
    #[test]
    fn zero_count_baselines() {
        assert_eq!(rgb(color_of(0, ColorMode::SineApprox)), (154, 220, 7));
        assert_eq!(rgb(color_of(0, ColorMode::CosineApprox)), (255, 68, 64));
        assert_eq!(rgb(color_of(0, ColorMode::ModuloPhase)), (127, 255, 255));
        assert_eq!(rgb(color_of(0, ColorMode::SineCosineSum)), (255, 174, 0));
        assert_eq!(
            color_of(0, ColorMode::ModuloPhaseCheap),
            color_of(0, ColorMode::ModuloPhase)
        );
    }

    #[test]
    fn cheap_variant_matches_modulo_everywhere() {
        for n in 0..2048 {
            assert_eq!(
                color_of(n, ColorMode::ModuloPhase),
                color_of(n, ColorMode::ModuloPhaseCheap)
            );
        }
    }

    #[test]
    fn modes_disagree_somewhere() {
        // Sanity: the selectors are not all the same palette.
        let sample: Vec<u32> = (0..64).map(|n| color_of(n, ColorMode::SineApprox)).collect();
        for mode in [
            ColorMode::CosineApprox,
            ColorMode::ModuloPhase,
            ColorMode::SineCosineSum,
        ] {
            let other: Vec<u32> = (0..64).map(|n| color_of(n, mode)).collect();
            assert_ne!(sample, other, "{mode:?} should differ from SineApprox");
        }
    }

    #[test]
    fn colorize_fills_whole_buffer() {
        let mut grid = IterationGrid::new(8, 4);
        for (i, cell) in grid.as_mut_slice().iter_mut().enumerate() {
            *cell = i as u32;
        }
        let mut buffer = PixelBuffer::new(8, 4);
        colorize(&grid, ColorMode::ModuloPhase, &mut buffer);

        for (i, &px) in buffer.as_argb().iter().enumerate() {
            assert_eq!(px, color_of(i as u32, ColorMode::ModuloPhase));
        }
    }
}
