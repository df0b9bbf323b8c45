use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use byteorder::{ByteOrder as _, LittleEndian};

use velo_core::pointcloud::point::Point;

const POINT_BYTES: usize = 4 * 4;

/// Whether a beam export replaces the destination file or accumulates
/// onto it. Appending lets a sequence of captures build up one stream,
/// but rerunning a conversion then duplicates points, so the caller must
/// opt into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Truncate,
    Append,
}

/// Writes each point as four raw little-endian f32 values
/// (x, y, z, intensity), no header.
pub fn write_beam<W: Write>(writer: &mut W, points: &[Point]) -> io::Result<()> {
    let mut buffer = [0u8; POINT_BYTES];
    for point in points {
        LittleEndian::write_f32_into(
            &[point.x, point.y, point.z, point.intensity],
            &mut buffer,
        );
        writer.write_all(&buffer)?;
    }
    Ok(())
}

/// Opens `path` in the given mode and writes the cloud as a beam stream.
pub fn export_beam_file(path: &Path, points: &[Point], mode: WriteMode) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.create(true).write(true);
    match mode {
        WriteMode::Truncate => options.truncate(true),
        WriteMode::Append => options.append(true),
    };
    let file = options.open(path)?;

    let mut writer = BufWriter::new(file);
    write_beam(&mut writer, points)?;
    writer.flush()
}
