mod flate2;
mod plain;
mod zstd;

use std::path::Path;
use std::str::FromStr;

use anyhow::Result;

use crate::codec::Problem;

pub use crate::loader::flate2::ProblemGzFileLoader;
pub use crate::loader::plain::{ProblemFileLoader, ProblemTextLoader};
pub use crate::loader::zstd::ProblemZstdFileLoader;

/// Loader for a refrain problem.
pub trait ProblemSource {
    /// Reads and decodes the whole problem.
    fn load(&self) -> Result<Problem>;
}

/// File formats supported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputFormat {
    Plain,
    Gzip,
    Zstd,
}

impl InputFormat {
    /// Guess the format of a file from its extension.
    pub fn infer<P: AsRef<Path>>(path: P) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "gz" | "gzip" => Self::Gzip,
            "zst" | "zstd" => Self::Zstd,
            _ => Self::Plain,
        }
    }

    /// A loader reading `path` in this format.
    pub fn loader<P: AsRef<Path>>(self, path: P) -> Box<dyn ProblemSource + Send + Sync> {
        match self {
            Self::Plain => Box::new(ProblemFileLoader::new(path)),
            Self::Gzip => Box::new(ProblemGzFileLoader::new(path)),
            Self::Zstd => Box::new(ProblemZstdFileLoader::new(path)),
        }
    }
}

impl FromStr for InputFormat {
    type Err = &'static str;

    fn from_str(fmt: &str) -> Result<Self, Self::Err> {
        match fmt {
            "plain" => Ok(Self::Plain),
            "gzip" => Ok(Self::Gzip),
            "zstd" => Ok(Self::Zstd),
            _ => Err("Invalid format"),
        }
    }
}
