use std::io::{prelude::*, BufWriter};
use std::fs::File;
use std::path::Path;
use anyhow::Result;

const MAGIC_NUMBER: &[u8] = b"P3";

/// Writes ARGB8888 pixels as a plain text PPM, dropping alpha.
pub fn write_ppm(path: &Path, width: u16, height: u16, pixels: &[u8]) -> Result<()> {
    let file = File::create(path)?;

    let mut writer = BufWriter::new(&file);

    writer.write_all(MAGIC_NUMBER)?;
    writer.write_all(b"\n")?;
    writer.write_all(format!("{} {}", width, height).as_bytes())?;
    writer.write_all(b" 255")?;
    writer.write_all(b"\n")?;

    // chunks() panics on a zero size
    let stride = usize::from(width).max(1) * 4;

    for row in pixels.chunks(stride).take(height.into()) {
        row.chunks_exact(4).enumerate().try_for_each(|(i, argb)| -> Result<()> {
            let (red, green, blue) = (argb[1], argb[2], argb[3]);

            writer.write_all(format!("{: >3} {: >3} {: >3}", red, green, blue).as_bytes())?;
            if i + 1 != usize::from(width) {
                writer.write_all(b" ")?;
            }
            Ok(())
        })?;
        writer.write_all(b"\n")?;
    }

    writer.flush()?;
    Ok(())
}
