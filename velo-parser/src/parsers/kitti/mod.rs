use std::{error::Error, fs, path::PathBuf};

use byteorder::{ByteOrder as _, LittleEndian};

use velo_core::pointcloud::point::{Point, PointCloud};

use super::{Parser, ParserProvider};

/// Floats per record in a KITTI velodyne capture. The first four are
/// x, y, z and intensity; the fifth is carried by the format but has no
/// decoded meaning here.
pub const RECORD_STRIDE: usize = 5;

/// Decodes a raw capture buffer with the given record stride.
///
/// The buffer is read as consecutive little-endian f32 values; a trailing
/// partial float is ignored. A point is emitted for every stride step
/// that still has the four meaningful floats available, so an incomplete
/// trailing record is silently dropped rather than reported.
pub fn decode_points_with_stride(bytes: &[u8], stride: usize) -> Vec<Point> {
    debug_assert!(stride >= 4);

    let num_values = bytes.len() / 4;
    let mut values = vec![0.0f32; num_values];
    LittleEndian::read_f32_into(&bytes[..num_values * 4], &mut values);

    let mut points = Vec::with_capacity(num_values / stride + 1);
    let mut i = 0;
    while i + 4 <= values.len() {
        points.push(Point {
            x: values[i],
            y: values[i + 1],
            z: values[i + 2],
            intensity: values[i + 3],
        });
        i += stride;
    }
    points
}

/// Decodes a KITTI capture buffer (stride 5, fifth float discarded).
pub fn decode_points(bytes: &[u8]) -> Vec<Point> {
    decode_points_with_stride(bytes, RECORD_STRIDE)
}

pub struct KittiParserProvider {
    pub filenames: Vec<PathBuf>,
}

impl ParserProvider for KittiParserProvider {
    fn get_parser(&self) -> Box<dyn Parser> {
        Box::new(KittiParser {
            filenames: self.filenames.clone(),
        })
    }
}

pub struct KittiParser {
    pub filenames: Vec<PathBuf>,
}

impl Parser for KittiParser {
    fn parse(&self) -> Result<PointCloud, Box<dyn Error>> {
        let mut points = Vec::new();
        for filename in &self.filenames {
            let bytes = fs::read(filename)?;
            points.extend(decode_points(&bytes));
        }
        Ok(PointCloud::new(points))
    }
}
