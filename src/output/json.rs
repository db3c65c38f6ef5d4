use crate::output::{DomainResult, OutputResult, ResultSink};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes all results as one pretty-printed JSON array
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultSink for JsonFileSink {
    fn write(&self, results: &[DomainResult]) -> OutputResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut writer, results)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        tracing::info!(
            "Wrote {} domain results to {}",
            results.len(),
            self.path.display()
        );
        Ok(())
    }
}
