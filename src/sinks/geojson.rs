use anyhow::{Context, Result, anyhow};
use geojson::FeatureCollection;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Writes one FeatureCollection document to a file that must not exist yet.
pub struct GeoJsonSink {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl GeoJsonSink {
    pub fn create_new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|err| {
                if err.kind() == ErrorKind::AlreadyExists {
                    anyhow!("Sink: {:?} already exists, refusing to overwrite", path)
                } else {
                    anyhow::Error::new(err).context(format!("Sink: failed to create {:?}", path))
                }
            })?;

        Ok(Self {
            writer: BufWriter::new(file),
            path: path.to_path_buf(),
        })
    }

    pub fn write_collection(mut self, collection: &FeatureCollection) -> Result<()> {
        serde_json::to_writer(&mut self.writer, collection)
            .with_context(|| format!("Sink: failed to serialize {:?}", self.path))?;
        writeln!(self.writer)?;
        self.writer
            .flush()
            .with_context(|| format!("Sink: failed to flush {:?}", self.path))?;
        tracing::debug!(
            "Sink: {} features written to {:?}",
            collection.features.len(),
            self.path
        );
        Ok(())
    }
}
