//! Tunable parameters and the built-in presets.

use cgmath::{vec3, Vector3};
use log::warn;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An opaque palette color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "String", into = "String"))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::hex(0xFFFFFF);

    /// Color from a `0xRRGGBB` literal.
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
        }
    }

    /// Parses `#RRGGBB` or `RRGGBB`, case-insensitive.
    pub fn from_hex(s: &str) -> Option<Self> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(Rgb::hex)
    }

    /// Like [`Rgb::from_hex`] but malformed input yields white.
    pub fn parse_or_white(s: &str) -> Self {
        Rgb::from_hex(s).unwrap_or_else(|| {
            warn!("malformed palette color {:?}, using white", s);
            Rgb::WHITE
        })
    }

    /// Channels scaled to `[0, 1]`.
    pub fn to_vec3(self) -> Vector3<f64> {
        vec3(self.r as f64, self.g as f64, self.b as f64) / 255.0
    }
}

impl From<String> for Rgb {
    fn from(s: String) -> Self {
        Rgb::parse_or_white(&s)
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        format!("#{:02X}{:02X}{:02X}", c.r, c.g, c.b)
    }
}

/// Live simulation parameters, read every frame.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Cells along the shorter grid side.
    pub sim_resolution: u32,
    pub density_dissipation: f64,
    pub velocity_dissipation: f64,
    /// Carried with presets; the solver seeds each solve with the previous
    /// pressure unchanged.
    pub pressure_dissipation: f64,
    pub pressure_iterations: u32,
    /// Vorticity confinement strength.
    pub curl: f64,
    pub splat_radius: f64,
    /// Carried with presets; impulse strength comes from the input.
    pub splat_force: f64,
    pub colors: Vec<Rgb>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sim_resolution: 512,
            density_dissipation: 0.98,
            velocity_dissipation: 0.99,
            pressure_dissipation: 0.8,
            pressure_iterations: 20,
            curl: 30.0,
            splat_radius: 0.005,
            splat_force: 6000.0,
            colors: KING_TUBBY.to_vec(),
        }
    }
}

/// A partial [`Config`]; `None` keys keep their current value.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConfigPatch {
    pub sim_resolution: Option<u32>,
    pub density_dissipation: Option<f64>,
    pub velocity_dissipation: Option<f64>,
    pub pressure_dissipation: Option<f64>,
    pub pressure_iterations: Option<u32>,
    pub curl: Option<f64>,
    pub splat_radius: Option<f64>,
    pub splat_force: Option<f64>,
    pub colors: Option<Vec<Rgb>>,
}

/// Smallest splat radius a merge accepts; the Gaussian divides by it.
pub const MIN_SPLAT_RADIUS: f64 = 1e-6;

fn non_negative(name: &str, v: f64) -> f64 {
    if v < 0.0 {
        warn!("{} must not be negative (got {}), using 0", name, v);
        0.0
    } else {
        v
    }
}

impl Config {
    /// Replaces every key set in `patch`.
    pub fn merge(&mut self, patch: &ConfigPatch) {
        if let Some(v) = patch.sim_resolution {
            self.sim_resolution = v;
        }
        if let Some(v) = patch.density_dissipation {
            self.density_dissipation = non_negative("density_dissipation", v);
        }
        if let Some(v) = patch.velocity_dissipation {
            self.velocity_dissipation = non_negative("velocity_dissipation", v);
        }
        if let Some(v) = patch.pressure_dissipation {
            self.pressure_dissipation = v;
        }
        if let Some(v) = patch.pressure_iterations {
            self.pressure_iterations = v;
        }
        if let Some(v) = patch.curl {
            self.curl = v;
        }
        if let Some(v) = patch.splat_radius {
            self.splat_radius = if v >= MIN_SPLAT_RADIUS {
                v
            } else {
                warn!(
                    "splat_radius must be at least {} (got {}), clamping",
                    MIN_SPLAT_RADIUS, v
                );
                MIN_SPLAT_RADIUS
            };
        }
        if let Some(v) = patch.splat_force {
            self.splat_force = v;
        }
        if let Some(v) = &patch.colors {
            self.colors = v.clone();
        }
    }

    /// `self` with `patch` merged in.
    pub fn merged(mut self, patch: &ConfigPatch) -> Self {
        self.merge(patch);
        self
    }
}

/// A named, fixed look.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preset {
    pub name: &'static str,
    pub density_dissipation: f64,
    pub velocity_dissipation: f64,
    pub pressure_dissipation: f64,
    pub curl: f64,
    pub splat_radius: f64,
    pub splat_force: f64,
    pub colors: [Rgb; 3],
}

impl Preset {
    pub fn patch(&self) -> ConfigPatch {
        ConfigPatch {
            density_dissipation: Some(self.density_dissipation),
            velocity_dissipation: Some(self.velocity_dissipation),
            pressure_dissipation: Some(self.pressure_dissipation),
            curl: Some(self.curl),
            splat_radius: Some(self.splat_radius),
            splat_force: Some(self.splat_force),
            colors: Some(self.colors.to_vec()),
            ..ConfigPatch::default()
        }
    }
}

// Gold, deep red, dark green.
const KING_TUBBY: [Rgb; 3] = [Rgb::hex(0xFFD700), Rgb::hex(0x8B0000), Rgb::hex(0x006400)];

pub static PRESETS: [Preset; 5] = [
    Preset {
        name: "King Tubby",
        density_dissipation: 0.96,
        velocity_dissipation: 0.99,
        pressure_dissipation: 0.8,
        curl: 45.0,
        splat_radius: 0.01,
        splat_force: 6000.0,
        colors: KING_TUBBY,
    },
    // Lingers longer, less swirl, bigger and softer hits.
    Preset {
        name: "Deep Roots",
        density_dissipation: 0.99,
        velocity_dissipation: 0.99,
        pressure_dissipation: 0.7,
        curl: 10.0,
        splat_radius: 0.02,
        splat_force: 4000.0,
        colors: [Rgb::hex(0x8B4513), Rgb::hex(0xD2691E), Rgb::hex(0x556B2F)],
    },
    // Fades and stops fast with sharp hits.
    Preset {
        name: "Steppers",
        density_dissipation: 0.90,
        velocity_dissipation: 0.95,
        pressure_dissipation: 0.9,
        curl: 50.0,
        splat_radius: 0.003,
        splat_force: 8000.0,
        colors: [Rgb::hex(0xFF0000), Rgb::hex(0xFFFF00), Rgb::hex(0xC0C0C0)],
    },
    Preset {
        name: "Smoke",
        density_dissipation: 0.995,
        velocity_dissipation: 0.98,
        pressure_dissipation: 0.5,
        curl: 60.0,
        splat_radius: 0.008,
        splat_force: 3000.0,
        colors: [Rgb::hex(0x696969), Rgb::hex(0x708090), Rgb::hex(0xF5F5F5)],
    },
    Preset {
        name: "Sound System",
        density_dissipation: 0.97,
        velocity_dissipation: 0.98,
        pressure_dissipation: 0.8,
        curl: 35.0,
        splat_radius: 0.015,
        splat_force: 10000.0,
        colors: [Rgb::hex(0x39FF14), Rgb::hex(0xBF00FF), Rgb::hex(0x00FFFF)],
    },
];

pub fn find_preset(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name == name)
}
