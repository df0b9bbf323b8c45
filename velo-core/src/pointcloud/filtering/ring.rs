use itertools::Itertools as _;

use crate::pointcloud::point::Point;

pub trait PointCloudFilter {
    fn filter(&self, points: &[Point]) -> Vec<Point>;
}

/// Elevation angle of a point over the sensor's horizontal plane, in
/// degrees, in the range (-90, 90].
pub fn elevation_angle_deg(point: &Point) -> f32 {
    point.z.atan2(point.distance_xy()).to_degrees()
}

/// An open interval of elevation angles, in degrees. Containment is
/// strict on both ends; the unbounded lower band uses NEG_INFINITY.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleBand {
    pub min_deg: f32,
    pub max_deg: f32,
}

impl AngleBand {
    pub fn contains(&self, angle_deg: f32) -> bool {
        angle_deg > self.min_deg && angle_deg < self.max_deg
    }
}

/// Dead-zones of the KITTI velodyne capture: everything below the lowest
/// usable ring, plus the gaps between the rings that survive in the
/// reduced configuration.
pub const KITTI_RING_GAPS: [AngleBand; 10] = [
    AngleBand { min_deg: f32::NEG_INFINITY, max_deg: -15.1 },
    AngleBand { min_deg: -12.5, max_deg: -11.5 },
    AngleBand { min_deg: -10.5, max_deg: -9.5 },
    AngleBand { min_deg: -8.5, max_deg: -7.5 },
    AngleBand { min_deg: -6.5, max_deg: -5.2 },
    AngleBand { min_deg: -4.8, max_deg: -3.2 },
    AngleBand { min_deg: -2.8, max_deg: -1.2 },
    AngleBand { min_deg: -0.8, max_deg: -0.2 },
    AngleBand { min_deg: 0.1, max_deg: 0.8 },
    AngleBand { min_deg: 1.2, max_deg: 1.8 },
];

/// Drops every point whose elevation angle falls inside one of the
/// configured bands. Order of the surviving points is preserved.
pub struct RingGapFilter {
    bands: Vec<AngleBand>,
}

impl RingGapFilter {
    pub fn new(bands: Vec<AngleBand>) -> Self {
        Self { bands }
    }

    pub fn kitti() -> Self {
        Self::new(KITTI_RING_GAPS.to_vec())
    }

    pub fn keep(&self, point: &Point) -> bool {
        let angle_deg = elevation_angle_deg(point);
        !self.bands.iter().any(|band| band.contains(angle_deg))
    }
}

impl PointCloudFilter for RingGapFilter {
    fn filter(&self, points: &[Point]) -> Vec<Point> {
        points
            .iter()
            .filter(|point| self.keep(point))
            .cloned()
            .collect()
    }
}

/// Distinct elevation angles of a point set, quantized toward zero into
/// 1/50-degree buckets and sorted ascending. Observational: the app
/// reports these at debug level to show which rings survived a capture.
pub fn distinct_kept_angles(points: &[Point]) -> Vec<f32> {
    points
        .iter()
        .map(|point| (elevation_angle_deg(point) * 50.0) as i32)
        .sorted()
        .dedup()
        .map(|bucket| bucket as f32 / 50.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_point(x: f32, y: f32, z: f32) -> Point {
        Point::new(x, y, z, 0.5)
    }

    /// A point whose elevation angle is close to `angle_deg`, one meter
    /// out on the x axis.
    fn point_at_angle(angle_deg: f32) -> Point {
        make_point(1.0, 0.0, angle_deg.to_radians().tan())
    }

    #[test]
    fn elevation_angle_on_horizontal_plane_is_zero() {
        assert_eq!(elevation_angle_deg(&make_point(1.0, 0.0, 0.0)), 0.0);
        assert_eq!(elevation_angle_deg(&make_point(3.0, 4.0, 0.0)), 0.0);
    }

    #[test]
    fn elevation_angle_straight_up_is_ninety() {
        let angle = elevation_angle_deg(&make_point(0.0, 0.0, 2.0));
        assert!((angle - 90.0).abs() < 1e-4);
    }

    #[test]
    fn elevation_angle_diagonal() {
        // dist_xy = 5, z = 5
        let angle = elevation_angle_deg(&make_point(3.0, 4.0, 5.0));
        assert!((angle - 45.0).abs() < 1e-4);
    }

    #[test]
    fn band_containment_is_strict() {
        let band = AngleBand { min_deg: -12.5, max_deg: -11.5 };
        assert!(band.contains(-12.0));
        assert!(!band.contains(-12.5));
        assert!(!band.contains(-11.5));
    }

    #[test]
    fn lowest_band_is_open_below() {
        let band = KITTI_RING_GAPS[0];
        assert!(!band.contains(-15.1));
        assert!(band.contains(-15.2));
        assert!(band.contains(-89.0));
        assert!(!band.contains(-15.0));
    }

    #[test]
    fn every_gap_excludes_its_interior_and_keeps_its_bounds() {
        for band in &KITTI_RING_GAPS[1..] {
            let mid = (band.min_deg + band.max_deg) / 2.0;
            assert!(band.contains(mid), "midpoint of {:?} should be inside", band);
            assert!(!band.contains(band.min_deg));
            assert!(!band.contains(band.max_deg));
        }
    }

    #[test]
    fn keep_ignores_intensity() {
        let filter = RingGapFilter::kitti();
        let dim = Point::new(1.0, 2.0, -0.1, 0.0);
        let bright = Point::new(1.0, 2.0, -0.1, 1.0);
        assert_eq!(filter.keep(&dim), filter.keep(&bright));
    }

    #[test]
    fn vertical_point_is_kept() {
        // angle = atan2(2, 0) = 90 degrees, outside every band
        let filter = RingGapFilter::kitti();
        assert!(filter.keep(&Point::new(0.0, 0.0, 2.0, 0.5)));
    }

    #[test]
    fn horizontal_point_is_kept() {
        // angle = 0, between the -0.8..-0.2 and 0.1..0.8 gaps
        let filter = RingGapFilter::kitti();
        assert!(filter.keep(&Point::new(1.0, 0.0, 0.0, 0.5)));
    }

    #[test]
    fn point_below_lowest_ring_is_dropped() {
        let filter = RingGapFilter::kitti();
        assert!(!filter.keep(&point_at_angle(-20.0)));
    }

    #[test]
    fn point_in_inter_ring_gap_is_dropped() {
        let filter = RingGapFilter::kitti();
        assert!(!filter.keep(&point_at_angle(-12.0)));
        assert!(!filter.keep(&point_at_angle(-4.0)));
        assert!(!filter.keep(&point_at_angle(0.5)));
        assert!(!filter.keep(&point_at_angle(1.5)));
    }

    #[test]
    fn point_on_surviving_ring_is_kept() {
        let filter = RingGapFilter::kitti();
        assert!(filter.keep(&point_at_angle(-11.0)));
        assert!(filter.keep(&point_at_angle(-5.0)));
        assert!(filter.keep(&point_at_angle(1.0)));
        assert!(filter.keep(&point_at_angle(5.0)));
    }

    #[test]
    fn filter_preserves_order() {
        let filter = RingGapFilter::kitti();
        let points = vec![
            point_at_angle(3.0),
            point_at_angle(-20.0),
            point_at_angle(10.0),
            point_at_angle(0.5),
            point_at_angle(-11.0),
        ];
        let kept = filter.filter(&points);
        assert_eq!(kept.len(), 3);
        assert_eq!(kept[0], points[0]);
        assert_eq!(kept[1], points[2]);
        assert_eq!(kept[2], points[4]);
    }

    #[test]
    fn custom_band_table() {
        let filter = RingGapFilter::new(vec![AngleBand { min_deg: 40.0, max_deg: 50.0 }]);
        assert!(!filter.keep(&point_at_angle(45.0)));
        assert!(filter.keep(&point_at_angle(-20.0)));
    }

    #[test]
    fn census_collapses_same_bucket_angles() {
        let points = vec![
            point_at_angle(5.31),
            point_at_angle(5.312),
            point_at_angle(45.31),
        ];
        let angles = distinct_kept_angles(&points);
        assert_eq!(angles.len(), 2);
        assert!(angles[0] < angles[1]);
    }

    #[test]
    fn census_of_empty_set_is_empty() {
        assert!(distinct_kept_angles(&[]).is_empty());
    }
}
