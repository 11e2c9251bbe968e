use dubflow::audio::BASS_BINS;
use dubflow::config::find_preset;
use dubflow::{
    Capabilities, Config, ConfigPatch, FluidVisualizer, Format, SpectrumSource, Surface,
};

struct KickDrum {
    frame: usize,
    bins: Vec<u8>,
}

impl KickDrum {
    fn new() -> Self {
        Self {
            frame: 0,
            bins: vec![0; 1024],
        }
    }
}

impl SpectrumSource for KickDrum {
    fn frequency_magnitudes(&mut self) -> &[u8] {
        let level = if self.frame % 8 == 0 { 230 } else { 20 };
        for m in &mut self.bins[BASS_BINS] {
            *m = level;
        }
        self.frame += 1;
        &self.bins
    }
}

fn visualizer(seed: u64) -> FluidVisualizer {
    let config = Config {
        sim_resolution: 24,
        pressure_iterations: 10,
        ..Config::default()
    };
    FluidVisualizer::new(config, (400, 300), Capabilities::default(), Some(seed))
}

fn total_dye(vis: &FluidVisualizer) -> f64 {
    vis.current_dye().iter().map(|c| c.x + c.y + c.z).sum()
}

fn peak_dye(vis: &FluidVisualizer) -> f64 {
    vis.current_dye()
        .iter()
        .fold(0.0f64, |a, c| a.max(c.x).max(c.y).max(c.z))
}

#[test]
fn silence_renders_black() {
    let mut vis = visualizer(1);
    for _ in 0..5 {
        vis.update(&[0; 1024]);
    }

    let mut surface = Surface::new(40, 30);
    vis.render(&mut surface);
    assert!(surface
        .pixels
        .chunks_exact(4)
        .all(|px| px == [0, 0, 0, 255]));
}

#[test]
fn kick_drum_paints_and_fades() {
    let mut vis = visualizer(2);
    let mut drum = KickDrum::new();

    vis.frame(&mut drum);
    assert!(vis.band_levels().bass > 0.4);
    assert!(total_dye(&vis) > 0.0);

    // Seven quiet frames: no new dye, so the brightest cell only fades.
    let mut prev = peak_dye(&vis);
    for _ in 0..7 {
        vis.frame(&mut drum);
        let now = peak_dye(&vis);
        assert!(now.is_finite());
        assert!(now < prev + 1e-9, "{} >= {}", now, prev);
        prev = now;
    }

    let mut surface = Surface::new(80, 60);
    vis.render(&mut surface);
    assert!(surface
        .pixels
        .chunks_exact(4)
        .any(|px| px[0] > 0 || px[1] > 0 || px[2] > 0));
}

#[test]
fn same_seed_same_frames() {
    let run = |seed| {
        let mut vis = visualizer(seed);
        let mut drum = KickDrum::new();
        vis.on_pointer_click(200.0, 150.0);
        for _ in 0..10 {
            vis.frame(&mut drum);
        }
        vis.current_dye().clone()
    };

    assert_eq!(run(7), run(7));
}

#[test]
fn preset_then_override() {
    let mut vis = visualizer(3);
    assert!(vis.apply_preset("Deep Roots"));
    vis.update_config(&ConfigPatch {
        curl: Some(99.0),
        ..ConfigPatch::default()
    });

    let preset = find_preset("Deep Roots").unwrap();
    let expected = Config {
        sim_resolution: 24,
        pressure_iterations: 10,
        ..Config::default()
    }
    .merged(&preset.patch())
    .merged(&ConfigPatch {
        curl: Some(99.0),
        ..ConfigPatch::default()
    });
    assert_eq!(vis.config(), &expected);
    assert_eq!(vis.config().colors, preset.colors.to_vec());
}

#[test]
fn no_pressure_iterations_still_renders() {
    let mut vis = visualizer(4);
    vis.update_config(&ConfigPatch {
        pressure_iterations: Some(0),
        ..ConfigPatch::default()
    });
    vis.on_pointer_move(200.0, 150.0, 10.0, 0.0);
    for _ in 0..3 {
        vis.update(&[0; 1024]);
    }

    assert!(vis.fields().pressure().iter().all(|p| *p == 0.0));
    assert!(total_dye(&vis) > 0.0);
}

#[test]
fn byte_fallback_keeps_running() {
    let caps = Capabilities {
        float_targets: false,
        float_linear_filtering: false,
    };
    let config = Config {
        sim_resolution: 32,
        ..Config::default()
    };
    let mut vis = FluidVisualizer::new(config, (64, 64), caps, Some(5));
    assert_eq!(vis.fields().format(), Format::Byte);

    vis.resize(0, 0);
    assert_eq!(vis.surface_size(), (1, 1));

    vis.on_pointer_click(0.5, 0.5);
    vis.update(&[255; 64]);
    assert!(vis
        .current_dye()
        .iter()
        .all(|c| c.x >= 0.0 && c.x <= 1.0 && c.y >= 0.0 && c.y <= 1.0));
}
