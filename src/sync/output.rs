//! Output sinks receiving pulled secret values.

use super::Properties;
use crate::config::Mapping;
use crate::errors::{Result, SyncError};
use crate::store::SecretData;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Destination for values resolved during a pull.
///
/// Called once per mapping, after the engine has checked that the mapping's
/// secret key is present in `secrets`.
pub trait OutputSink: Send {
    fn flush(
        &mut self,
        properties: &mut Properties,
        secrets: &SecretData,
        mapping: &Mapping,
    ) -> Result<()>;
}

/// Stores each value in the property set under the mapping's property key.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertiesSink;

impl OutputSink for PropertiesSink {
    fn flush(
        &mut self,
        properties: &mut Properties,
        secrets: &SecretData,
        mapping: &Mapping,
    ) -> Result<()> {
        if let Some(value) = secrets.get(&mapping.secret_key) {
            properties.insert(mapping.property_key.clone(), value.clone());
        }
        Ok(())
    }
}

/// Writes `NAME="value"` lines to a dotenv file as well as filling the
/// property set. Names are derived with [`env_var_name`].
pub struct EnvFileSink<W: Write + Send> {
    writer: W,
}

impl EnvFileSink<StagedFile> {
    /// Stage a dotenv file that replaces `path` once [`commit`](Self::commit) succeeds.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(StagedFile::create(path)?))
    }

    /// Flush and move the staged file into place.
    ///
    /// A sink dropped without committing leaves any existing file at the
    /// target path untouched.
    pub fn commit(self) -> Result<()> {
        self.finish()?.persist()
    }
}

impl<W: Write + Send> EnvFileSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Flush buffered output and return the writer.
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush().map_err(|e| SyncError::io(e, "Failed to flush env file"))?;
        Ok(self.writer)
    }
}

impl<W: Write + Send> OutputSink for EnvFileSink<W> {
    fn flush(
        &mut self,
        properties: &mut Properties,
        secrets: &SecretData,
        mapping: &Mapping,
    ) -> Result<()> {
        let Some(value) = secrets.get(&mapping.secret_key) else {
            return Ok(());
        };
        writeln!(self.writer, "{}={}", env_var_name(&mapping.property_key), quote(value))
            .map_err(|e| SyncError::io(e, "Failed to write env file"))?;
        properties.insert(mapping.property_key.clone(), value.clone());
        Ok(())
    }
}

/// Temporary file in the target's directory, renamed over the target on
/// [`persist`](Self::persist) and removed if dropped before that.
pub struct StagedFile {
    writer: BufWriter<NamedTempFile>,
    target: PathBuf,
}

impl StagedFile {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let target = path.as_ref().to_path_buf();
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let file = NamedTempFile::new_in(dir).map_err(|e| {
            SyncError::io(e, format!("Failed to create env file {}", target.display()))
        })?;
        Ok(Self { writer: BufWriter::new(file), target })
    }

    pub fn persist(self) -> Result<()> {
        let target = self.target;
        let file = self.writer.into_inner().map_err(|e| {
            SyncError::io(e.into_error(), format!("Failed to flush env file {}", target.display()))
        })?;
        file.persist(&target).map_err(|e| {
            SyncError::io(e.error, format!("Failed to write env file {}", target.display()))
        })?;
        Ok(())
    }
}

impl Write for StagedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Environment-variable form of a property key: `db.user-name` becomes `DB_USER_NAME`.
pub fn env_var_name(property_key: &str) -> String {
    property_key
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect()
}

fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '$' => quoted.push_str("\\$"),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}
