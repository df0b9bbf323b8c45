use std::path::PathBuf;

use thiserror::Error;

/// Failure modes of a conversion run. Path-level problems are fatal to
/// the process; file-level problems abort one file and let a tree walk
/// carry on.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("source path '{0}' does not exist")]
    SourceNotFound(PathBuf),

    #[error("could not read point cloud file '{path}': {reason}")]
    SourceNotReadable { path: PathBuf, reason: String },

    #[error("could not open output file '{path}': {reason}")]
    DestinationNotWritable { path: PathBuf, reason: String },

    #[error("destination '{0}' exists but is not a directory")]
    DestinationIsWrongType(PathBuf),
}
