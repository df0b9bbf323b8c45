use std::error::Error;

use velo_core::pointcloud::point::PointCloud;

pub mod kitti;

pub trait ParserProvider {
    fn get_parser(&self) -> Box<dyn Parser>;
}

pub trait Parser {
    fn parse(&self) -> Result<PointCloud, Box<dyn Error>>;
}
