mod script;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use emu_core::logging::{LogConfig, LogLevel};
use emu_core::renderer::Renderer;
use emu_sega_vdp::{Variant, Vdp, VdpConfig};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Chip {
    /// SMS1 315-5124
    Sms1,
    /// SMS2 315-5246
    Sms2,
    /// Mega Drive 315-5313, mode 4 only
    Md,
    /// Game Gear 315-5377
    Gg,
}

impl From<Chip> for Variant {
    fn from(chip: Chip) -> Self {
        match chip {
            Chip::Sms1 => Variant::Sega315_5124,
            Chip::Sms2 => Variant::Sega315_5246,
            Chip::Md => Variant::Sega315_5313Mode4,
            Chip::Gg => Variant::Sega315_5377,
        }
    }
}

#[derive(Parser)]
struct Args {
    /// Chip to emulate
    #[arg(value_enum, default_value_t = Chip::Sms2)]
    chip: Chip,

    /// 313-line PAL timing
    #[arg(long, default_value_t = false)]
    pal: bool,

    /// Resume from a save-state JSON written by --save
    #[arg(long)]
    state: Option<PathBuf>,

    /// JSON port-write script replayed before running frames
    #[arg(long)]
    script: Option<PathBuf>,

    /// Number of frames to run after the script
    #[arg(long, default_value_t = 1)]
    frames: u32,

    /// Dump save-state to this file as JSON
    #[arg(long, default_value = "state.json")]
    save: PathBuf,

    /// Write the last frame, borders included, as a PNG
    #[arg(long)]
    png: Option<PathBuf>,

    /// Core log level for every category (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn write_png(path: &PathBuf, vdp: &Vdp) -> Result<()> {
    let frame = vdp.get_frame();
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), frame.width, frame.height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;

    let mut data = Vec::with_capacity(frame.pixels.len() * 3);
    for &argb in &frame.pixels {
        data.extend_from_slice(&[(argb >> 16) as u8, (argb >> 8) as u8, argb as u8]);
    }
    writer.write_image_data(&data)?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let level = LogLevel::from_str(&args.log_level)
        .with_context(|| format!("unknown log level '{}'", args.log_level))?;
    LogConfig::global().set_global_level(level);

    let variant = Variant::from(args.chip);
    let mut vdp = Vdp::new(VdpConfig::for_variant(variant).with_pal(args.pal));
    log::info!("{} ({})", variant.name(), if args.pal { "PAL" } else { "NTSC" });

    if let Some(path) = args.state.as_ref() {
        let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let state: serde_json::Value = serde_json::from_str(&text)?;
        vdp.load_state(&state)
            .with_context(|| format!("restoring {}", path.display()))?;
        log::info!("Resumed from {}", path.display());
    }

    if let Some(path) = args.script.as_ref() {
        let steps = script::load(path)?;
        let reads = script::apply(&mut vdp, &steps);
        for (i, status) in reads.iter().enumerate() {
            println!("status read {}: {:02X}", i, status);
        }
    }

    for _ in 0..args.frames {
        vdp.run_frame();
    }
    let (vpos, hpos) = vdp.beam_position();
    println!(
        "{}: mode {} at v{} h{}, irq {}",
        variant.name(),
        vdp.display_mode().number(),
        vpos,
        hpos,
        vdp.irq_state()
    );

    let state = vdp.save_state();
    let mut f = File::create(&args.save).with_context(|| format!("creating {}", args.save.display()))?;
    write!(f, "{}", serde_json::to_string_pretty(&state)?)?;

    if let Some(path) = args.png.as_ref() {
        write_png(path, &vdp)?;
        log::info!("Frame written to {}", path.display());
    }

    Ok(())
}
