//! Image output.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::Framebuffer;

/// Write the framebuffer as an ASCII PPM (P3) image.
///
/// One `r g b` line per pixel, top row first.
pub fn write_ppm<W: Write>(framebuffer: &Framebuffer, mut writer: W) -> io::Result<()> {
    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", framebuffer.width(), framebuffer.height())?;
    writeln!(writer, "255")?;

    for pixel in framebuffer.pixels() {
        let [r, g, b] = pixel.channels();
        writeln!(writer, "{} {} {}", r, g, b)?;
    }

    writer.flush()
}

/// Save the framebuffer to a PPM file.
pub fn save_ppm<P: AsRef<Path>>(framebuffer: &Framebuffer, path: P) -> io::Result<()> {
    let file = File::create(path)?;
    write_ppm(framebuffer, BufWriter::new(file))
}
