//! Job output directories.
//!
//! Each job writes one directory (`<base><suffix>`) holding one
//! tab-separated part file per reduce partition. An existing directory is
//! replaced: every run starts from a clean slate, so a rerun never mixes old
//! and new part files.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crunchcrab_core::error::Result;

/// The output directory for one job: the caller-supplied base path with the
/// job's fixed suffix appended.
pub fn job_output_dir(base: &Path, suffix: &str) -> PathBuf {
    PathBuf::from(format!("{}{}", base.display(), suffix))
}

/// Write one part file per reduce partition, replacing any previous output.
pub fn write_partitions(dir: &Path, partitions: &[Vec<String>]) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)?;

    for (index, lines) in partitions.iter().enumerate() {
        let path = dir.join(format!("part-{:05}.tsv", index));
        let mut writer = BufWriter::new(File::create(&path)?);
        for line in lines {
            writeln!(writer, "{}", line)?;
        }
        writer.flush()?;
    }

    tracing::info!(dir = %dir.display(), partitions = partitions.len(), "job output written");
    Ok(())
}
