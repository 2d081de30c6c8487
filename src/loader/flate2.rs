use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;

use crate::codec::{decode, Problem};
use crate::loader::ProblemSource;

pub struct ProblemGzFileLoader {
    filepath: PathBuf,
}

impl ProblemGzFileLoader {
    pub fn new<P>(filepath: P) -> Self
    where
        P: AsRef<Path>,
    {
        Self {
            filepath: PathBuf::from(filepath.as_ref()),
        }
    }
}

impl ProblemSource for ProblemGzFileLoader {
    fn load(&self) -> Result<Problem> {
        let file = File::open(&self.filepath)
            .with_context(|| format!("Failed to open {}", self.filepath.display()))?;
        let reader = MultiGzDecoder::new(BufReader::new(file));
        decode(reader).with_context(|| format!("In {}", self.filepath.display()))
    }
}
