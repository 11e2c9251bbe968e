//! Spectrum band levels and bass-triggered impulses.

use crate::config::Rgb;
use crate::impulse::Impulse;
use cgmath::vec2;
use rand::Rng;
use std::f64::consts::PI;
use std::ops::Range;

/// Low-frequency bins averaged into [`BandLevels::bass`].
pub const BASS_BINS: Range<usize> = 1..10;
/// Low-mid bins averaged into [`BandLevels::mid`].
pub const MID_BINS: Range<usize> = 10..40;
/// Bass level above which an impulse fires.
pub const BASS_THRESHOLD: f64 = 0.4;

const SPAWN_RADIUS: f64 = 0.2;
const BASS_VELOCITY: f64 = 1000.0;
const BASS_INTENSITY: f64 = 10.0;

/// Pull-based source of byte frequency magnitudes, queried once per frame.
pub trait SpectrumSource {
    fn frequency_magnitudes(&mut self) -> &[u8];
}

/// Normalized band energies of one spectrum.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BandLevels {
    pub bass: f64,
    /// Computed every frame; nothing reacts to it yet.
    pub mid: f64,
}

fn band_mean(spectrum: &[u8], bins: Range<usize>) -> f64 {
    let count = bins.len();
    let sum: u32 = spectrum
        .iter()
        .skip(bins.start)
        .take(count)
        .map(|&m| m as u32)
        .sum();

    sum as f64 / count as f64 / 255.0
}

impl BandLevels {
    /// Missing bins of a short spectrum count as silence.
    pub fn from_spectrum(spectrum: &[u8]) -> Self {
        Self {
            bass: band_mean(spectrum, BASS_BINS),
            mid: band_mean(spectrum, MID_BINS),
        }
    }

    pub fn triggers(&self) -> bool {
        self.bass > BASS_THRESHOLD
    }
}

/// The impulse a loud enough bass level fires, if any.
///
/// It lands within 0.2 of the grid center (uniform angle and radius, so hits
/// cluster toward the middle) with a random velocity scaled by the bass
/// level and a random palette color brightened by ten times the bass level.
/// An empty palette paints white.
pub fn bass_impulse<R: Rng>(
    levels: &BandLevels,
    palette: &[Rgb],
    radius: f64,
    rng: &mut R,
) -> Option<Impulse> {
    if !levels.triggers() {
        return None;
    }

    let angle = rng.gen::<f64>() * PI * 2.0;
    let distance = rng.gen::<f64>() * SPAWN_RADIUS;
    let position = vec2(0.5 + angle.cos() * distance, 0.5 + angle.sin() * distance);

    let base = if palette.is_empty() {
        Rgb::WHITE
    } else {
        palette[rng.gen_range(0..palette.len())]
    };

    let velocity = vec2(
        (rng.gen::<f64>() - 0.5) * BASS_VELOCITY * levels.bass,
        (rng.gen::<f64>() - 0.5) * BASS_VELOCITY * levels.bass,
    );

    Some(Impulse {
        position,
        velocity,
        color: base.to_vec3() * (levels.bass * BASS_INTENSITY),
        radius,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    use cgmath::InnerSpace;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn spectrum(bass: u8, mid: u8) -> Vec<u8> {
        let mut s = vec![0u8; 1024];
        s[0] = 255;
        for m in &mut s[BASS_BINS] {
            *m = bass;
        }
        for m in &mut s[MID_BINS] {
            *m = mid;
        }
        s
    }

    #[test]
    fn test_band_levels() {
        let levels = BandLevels::from_spectrum(&spectrum(51, 255));
        assert_abs_diff_eq!(levels.bass, 0.2);
        assert_abs_diff_eq!(levels.mid, 1.0);
    }

    #[test]
    fn test_band_levels_ignore_dc_bin() {
        let mut s = vec![0u8; 64];
        s[0] = 255;
        let levels = BandLevels::from_spectrum(&s);
        assert_abs_diff_eq!(levels.bass, 0.0);
    }

    #[test]
    fn test_short_spectrum() {
        let levels = BandLevels::from_spectrum(&[0, 255, 255, 255]);
        assert_abs_diff_eq!(levels.bass, 3.0 / 9.0);
        assert_abs_diff_eq!(levels.mid, 0.0);

        let levels = BandLevels::from_spectrum(&[]);
        assert_eq!(levels, BandLevels::default());
    }

    #[test]
    fn test_threshold_boundary() {
        let mut rng = StdRng::seed_from_u64(1);
        let palette = [Rgb::hex(0x336699)];

        let below = BandLevels {
            bass: BASS_THRESHOLD - 1e-9,
            mid: 0.0,
        };
        assert!(bass_impulse(&below, &palette, 0.01, &mut rng).is_none());

        let at = BandLevels {
            bass: BASS_THRESHOLD,
            mid: 0.0,
        };
        assert!(bass_impulse(&at, &palette, 0.01, &mut rng).is_none());

        let above = BandLevels {
            bass: BASS_THRESHOLD + 1e-9,
            mid: 0.0,
        };
        let impulse = bass_impulse(&above, &palette, 0.01, &mut rng).unwrap();
        let expected = palette[0].to_vec3() * (above.bass * 10.0);
        assert_abs_diff_eq!(impulse.color.x, expected.x);
        assert_abs_diff_eq!(impulse.color.y, expected.y);
        assert_abs_diff_eq!(impulse.color.z, expected.z);
        assert_abs_diff_eq!(impulse.radius, 0.01);
    }

    #[test]
    fn test_spectrum_threshold() {
        // 102 / 255 is exactly the threshold.
        assert!(!BandLevels::from_spectrum(&spectrum(101, 0)).triggers());
        assert!(BandLevels::from_spectrum(&spectrum(103, 0)).triggers());
    }

    #[test]
    fn test_bass_impulse_placement_and_velocity() {
        let mut rng = StdRng::seed_from_u64(42);
        let levels = BandLevels {
            bass: 0.8,
            mid: 0.0,
        };

        for _ in 0..200 {
            let impulse = bass_impulse(&levels, &[], 0.01, &mut rng).unwrap();
            let offset = impulse.position - vec2(0.5, 0.5);
            assert!(offset.magnitude() <= SPAWN_RADIUS + 1e-12);
            assert!(impulse.velocity.x.abs() <= 400.0);
            assert!(impulse.velocity.y.abs() <= 400.0);
            // Empty palette paints white.
            assert_abs_diff_eq!(impulse.color.x, 8.0, epsilon = 1e-9);
            assert_abs_diff_eq!(impulse.color.z, 8.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_bass_impulse_is_seeded() {
        let levels = BandLevels {
            bass: 0.9,
            mid: 0.0,
        };
        let palette = [Rgb::hex(0xFF0000), Rgb::hex(0x00FF00), Rgb::hex(0x0000FF)];

        let a = bass_impulse(&levels, &palette, 0.01, &mut StdRng::seed_from_u64(3));
        let b = bass_impulse(&levels, &palette, 0.01, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }
}
