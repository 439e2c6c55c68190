use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

use rand::Rng;

use cork_types::CorkError;

use crate::generator::SeededGenerator;

/// Offsets tried before giving up on a file with no usable lines.
pub const MAX_LINE_ATTEMPTS: usize = 256;

impl SeededGenerator {
    /// Pick a non-empty line from `path` without reading the whole file.
    ///
    /// Seeks to a random byte offset, throws away the line containing it, and
    /// returns the following line with trailing whitespace trimmed. Running
    /// off the end or landing on an empty line triggers another draw.
    ///
    /// This is not uniform over lines: a line is picked with probability
    /// proportional to the length of the line before it, and the first line
    /// is never picked. Reproducibility depends on keeping it that way.
    ///
    /// Blocks on file I/O.
    pub fn random_line(&mut self, path: impl AsRef<Path>) -> Result<String, CorkError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| CorkError::io(path, e))?;
        let len = file.metadata().map_err(|e| CorkError::io(path, e))?.len();
        if len == 0 {
            return Err(CorkError::NoLine(path.to_path_buf()));
        }

        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();
        for _ in 0..MAX_LINE_ATTEMPTS {
            let offset = self.rng.random_range(0..len);
            reader.seek(SeekFrom::Start(offset)).map_err(|e| CorkError::io(path, e))?;

            buf.clear();
            reader.read_until(b'\n', &mut buf).map_err(|e| CorkError::io(path, e))?;

            buf.clear();
            if reader.read_until(b'\n', &mut buf).map_err(|e| CorkError::io(path, e))? == 0 {
                continue;
            }

            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_end();
            if !line.is_empty() {
                return Ok(line.to_string());
            }
        }

        tracing::warn!(path = %path.display(), attempts = MAX_LINE_ATTEMPTS, "no non-empty line found");
        Err(CorkError::NoLine(path.to_path_buf()))
    }
}
