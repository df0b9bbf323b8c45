use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use velo_core::pointcloud::point::Point;

/// Decimal places used for coordinate and intensity values when the
/// caller does not override it.
pub const DEFAULT_PRECISION: usize = 6;

/// Writes the fixed PCD v.7 header followed by one ASCII line per point.
///
/// WIDTH and POINTS always equal the number of points written; HEIGHT is
/// 1 because the cloud is unorganized.
pub fn write_pcd<W: Write>(writer: &mut W, points: &[Point], precision: usize) -> io::Result<()> {
    writeln!(writer, "# .PCD v.7 - Point Cloud Data file format")?;
    writeln!(writer, "VERSION .7")?;
    writeln!(writer, "FIELDS x y z intensity")?;
    writeln!(writer, "SIZE 4 4 4 4")?;
    writeln!(writer, "TYPE F F F F")?;
    writeln!(writer, "COUNT 1 1 1 1")?;
    writeln!(writer, "WIDTH {}", points.len())?;
    writeln!(writer, "HEIGHT 1")?;
    writeln!(writer, "POINTS {}", points.len())?;
    writeln!(writer, "DATA ASCII")?;

    for point in points {
        writeln!(
            writer,
            "{:.prec$} {:.prec$} {:.prec$} {:.prec$}",
            point.x,
            point.y,
            point.z,
            point.intensity,
            prec = precision,
        )?;
    }

    Ok(())
}

/// Creates (or truncates) `path` and writes the cloud as ASCII PCD.
pub fn export_pcd_file(path: &Path, points: &[Point], precision: usize) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_pcd(&mut writer, points, precision)?;
    writer.flush()
}
