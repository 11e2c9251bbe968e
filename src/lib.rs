//! Audio-reactive 2D fluid simulation.
//!
//! The numerical core lives in [`d2`]: double-buffered grids, the fixed
//! stage sequence (curl, vorticity confinement, divergence, Jacobi pressure
//! solve, gradient subtraction, advection) and Gaussian splats. The other
//! modules turn pointer and spectrum input into impulses, hold the tunable
//! parameters and presets, and drive one frame at a time through
//! [`FluidVisualizer`].

pub mod audio;
pub mod config;
pub mod d2;
pub mod impulse;
pub mod present;
pub mod visualizer;

pub use audio::{BandLevels, SpectrumSource};
pub use config::{Config, ConfigPatch, Preset, Rgb, PRESETS};
pub use d2::field::{Capabilities, Filter, Format};
pub use impulse::Impulse;
pub use present::Surface;
pub use visualizer::FluidVisualizer;
