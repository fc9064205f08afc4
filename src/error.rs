//! Package-level error taxonomy

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PackageError {
    /// Malformed or invalid source package content.
    #[error("invalid package: {0}")]
    InvalidPackage(String),

    #[error("missing file in package: {}", .0.display())]
    MissingFile(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}
