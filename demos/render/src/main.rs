use anyhow::{bail, Context};
use clap::Parser;
use dubflow::{Capabilities, Config, ConfigPatch, FluidVisualizer, SpectrumSource, Surface};
use log::info;
use std::f64::consts::PI;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "render", about = "Renders the audio-reactive fluid to numbered PNG frames")]
struct Args {
    #[arg(long, default_value_t = 640)]
    width: u32,

    #[arg(long, default_value_t = 360)]
    height: u32,

    #[arg(long, default_value_t = 128)]
    resolution: u32,

    #[arg(long, default_value_t = 120)]
    frames: usize,

    #[arg(long, default_value_t = 120.0)]
    bpm: f64,

    #[arg(long)]
    preset: Option<String>,

    /// JSON file holding a partial configuration, merged after the preset.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    seed: Option<u64>,

    /// Drag a pointer in a circle around the center.
    #[arg(long, default_value_t = false)]
    drag: bool,

    /// Also write curl and pressure grids.
    #[arg(long, default_value_t = false)]
    fields: bool,

    #[arg(long, default_value = "out")]
    out: PathBuf,
}

/// A kick on every beat over a low hum, at 60 frames per second.
struct SyntheticKick {
    frame: usize,
    frames_per_beat: f64,
    bins: Vec<u8>,
}

impl SyntheticKick {
    fn new(bpm: f64) -> Self {
        Self {
            frame: 0,
            frames_per_beat: 60.0 * 60.0 / bpm.max(1.0),
            bins: vec![0; 1024],
        }
    }
}

impl SpectrumSource for SyntheticKick {
    fn frequency_magnitudes(&mut self) -> &[u8] {
        let phase = (self.frame as f64 % self.frames_per_beat) / self.frames_per_beat;
        let kick = (-phase * 12.0).exp();

        for (n, m) in self.bins.iter_mut().enumerate() {
            let falloff = (-(n as f64) / 24.0).exp();
            *m = (255.0 * (0.15 + 0.85 * kick) * falloff).round() as u8;
        }

        self.frame += 1;
        &self.bins
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();

    let mut config = Config {
        sim_resolution: args.resolution,
        ..Config::default()
    };

    if let Some(name) = &args.preset {
        match dubflow::config::find_preset(name) {
            Some(preset) => config.merge(&preset.patch()),
            None => bail!("unknown preset {:?}", name),
        }
    }

    if let Some(path) = &args.config {
        let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let patch: ConfigPatch =
            serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))?;
        config.merge(&patch);
    }

    fs::create_dir_all(&args.out).with_context(|| format!("create {}", args.out.display()))?;

    let mut vis = FluidVisualizer::new(
        config,
        (args.width, args.height),
        Capabilities::default(),
        args.seed,
    );
    let mut audio = SyntheticKick::new(args.bpm);
    let mut surface = Surface::new(args.width, args.height);

    info!(
        "grid {:?}, {} frames to {}",
        vis.fields().dim(),
        args.frames,
        args.out.display()
    );

    let (cx, cy) = (args.width as f64 / 2.0, args.height as f64 / 2.0);
    let orbit = cx.min(cy) * 0.5;
    let mut last = (cx + orbit, cy);

    for f in 1..=args.frames {
        if args.drag {
            let angle = f as f64 / 60.0 * PI;
            let pos = (cx + orbit * angle.cos(), cy + orbit * angle.sin());
            vis.on_pointer_move(pos.0, pos.1, pos.0 - last.0, pos.1 - last.1);
            last = pos;
        }

        vis.frame(&mut audio);
        vis.render(&mut surface);
        image_util::save_surface(&args.out, "dye", f, &surface)?;

        if args.fields {
            image_util::save_signed(&args.out, "curl", f, vis.fields().curl(), 4.0)?;
            image_util::save_signed(&args.out, "pressure", f, vis.fields().pressure(), 16.0)?;
        }

        eprint!("\r {} / {}", f, args.frames);
    }
    eprintln!();

    Ok(())
}
