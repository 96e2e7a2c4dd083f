use std::fs::{self, File};
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

mod ppm_writer;

use gifstream::Decoder;

/// Decode a GIF and dump every composited frame as a PPM image
#[derive(Parser)]
#[command(name = "gifstream")]
#[command(version)]
struct Cli {
    /// Input GIF file
    input: PathBuf,

    /// Directory the frame_N.ppm files are written to
    #[arg(short, long, default_value = "frames")]
    out_dir: PathBuf,

    /// Only print header and frame metadata
    #[arg(long)]
    info: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let file = File::open(&cli.input)
        .with_context(|| format!("failed to open {}", cli.input.display()))?;
    let mut decoder = Decoder::new(BufReader::new(file));

    let header = decoder.read_header().context("failed to read GIF header")?;
    let (width, height) = (header.width, header.height);
    println!(
        "{}: {}x{}, {:?}, loop count {}",
        cli.input.display(),
        width,
        height,
        header.version,
        header.loop_count
    );

    if !cli.info {
        fs::create_dir_all(&cli.out_dir)
            .with_context(|| format!("failed to create {}", cli.out_dir.display()))?;
    }

    for (i, frame) in decoder.frames().enumerate() {
        let frame = frame.with_context(|| format!("failed to decode frame {}", i))?;
        println!(
            "frame {}: {}x{} at ({}, {}), {} ms, {:?}{}",
            i,
            frame.width,
            frame.height,
            frame.left,
            frame.top,
            frame.delay_ms,
            frame.disposal,
            if frame.interlaced { ", interlaced" } else { "" }
        );

        if !cli.info {
            let path = cli.out_dir.join(format!("frame_{}.ppm", i));
            ppm_writer::write_ppm(&path, width, height, &frame.pixels)?;
            info!("wrote {}", path.display());
        }
    }

    Ok(())
}
