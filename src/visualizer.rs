use crate::audio::{bass_impulse, BandLevels, SpectrumSource};
use crate::config::{find_preset, Config, ConfigPatch, Preset, PRESETS};
use crate::d2::field::resolution;
use crate::d2::{Capabilities, FieldStore, Solver};
use crate::impulse::ImpulseSource;
use crate::present::{present, Surface};
use cgmath::Vector3;
use log::{debug, trace};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Drives the fluid one display frame at a time.
pub struct FluidVisualizer {
    config: Config,
    surface: (u32, u32),
    fields: FieldStore,
    solver: Solver,
    impulses: ImpulseSource,
    levels: BandLevels,
    rng: StdRng,
}

impl FluidVisualizer {
    /// A visualizer for a `width` x `height` pixel surface.
    ///
    /// `seed` fixes every random draw; `None` seeds from entropy.
    pub fn new(
        config: Config,
        (width, height): (u32, u32),
        caps: Capabilities,
        seed: Option<u64>,
    ) -> Self {
        let surface = (width.max(1), height.max(1));
        let fields = FieldStore::new(resolution(config.sim_resolution, surface), caps);
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            config,
            surface,
            fields,
            solver: Solver::default(),
            impulses: ImpulseSource::new(surface),
            levels: BandLevels::default(),
            rng,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn fields(&self) -> &FieldStore {
        &self.fields
    }

    pub fn surface_size(&self) -> (u32, u32) {
        self.surface
    }

    /// Band levels of the last frame.
    pub fn band_levels(&self) -> BandLevels {
        self.levels
    }

    /// Impulses waiting for the next frame.
    pub fn pending_impulses(&self) -> usize {
        self.impulses.len()
    }

    fn aspect(&self) -> f64 {
        self.surface.0 as f64 / self.surface.1 as f64
    }

    fn reallocate(&mut self) {
        let dim = resolution(self.config.sim_resolution, self.surface);
        self.fields.allocate(dim);
    }

    /// Adapts to a new surface size. All field contents are lost; a call with
    /// the current size does nothing.
    pub fn resize(&mut self, width: u32, height: u32) {
        let surface = (width.max(1), height.max(1));
        if surface == self.surface {
            debug!("resize to current size {}x{} ignored", width, height);
            return;
        }

        self.surface = surface;
        self.impulses.set_surface(surface);
        self.reallocate();
    }

    /// Merges `patch` into the live configuration. Changing the resolution
    /// reallocates the grids.
    pub fn update_config(&mut self, patch: &ConfigPatch) {
        let resolution = self.config.sim_resolution;
        self.config.merge(patch);

        if self.config.sim_resolution != resolution {
            self.reallocate();
        }
    }

    pub fn presets(&self) -> &'static [Preset] {
        &PRESETS
    }

    /// Merges the preset called `name`; returns false if there is none.
    pub fn apply_preset(&mut self, name: &str) -> bool {
        match find_preset(name) {
            Some(preset) => {
                debug!("applying preset {}", preset.name);
                self.update_config(&preset.patch());
                true
            }
            None => false,
        }
    }

    pub fn on_pointer_move(&mut self, x: f64, y: f64, movement_x: f64, movement_y: f64) {
        let radius = self.config.splat_radius;
        self.impulses
            .pointer_move(x, y, movement_x, movement_y, radius);
    }

    pub fn on_pointer_click(&mut self, x: f64, y: f64) {
        let radius = self.config.splat_radius;
        self.impulses.pointer_click(x, y, radius, &mut self.rng);
    }

    /// Runs one frame with the spectrum pulled from `source`.
    pub fn frame<S: SpectrumSource + ?Sized>(&mut self, source: &mut S) {
        self.update(source.frequency_magnitudes());
    }

    /// Runs one frame: audio impulse, queued impulses, then the solver.
    pub fn update(&mut self, spectrum: &[u8]) {
        self.levels = BandLevels::from_spectrum(spectrum);

        if let Some(impulse) = bass_impulse(
            &self.levels,
            &self.config.colors,
            self.config.splat_radius,
            &mut self.rng,
        ) {
            self.impulses.push(impulse);
        }

        let aspect = self.aspect();
        let applied = self.impulses.len();
        for impulse in self.impulses.drain() {
            self.solver.apply_impulse(&mut self.fields, &impulse, aspect);
        }

        self.solver.step(&mut self.fields, &self.config);

        trace!("frame done, {} impulses applied", applied);
    }

    /// The dye grid to display.
    pub fn current_dye(&self) -> &Array2<Vector3<f64>> {
        self.fields.density()
    }

    /// Copies the dye onto `surface`.
    pub fn render(&self, surface: &mut Surface) {
        present(self.current_dye(), surface, self.fields.filter());
    }
}
