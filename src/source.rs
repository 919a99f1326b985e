//! Loading program text, either inline or from a file.

use std::borrow::Cow;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Errors raised while loading program text. Execution never starts when one occurs.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be opened or read.
    #[error("Cannot open file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Memory for the file contents could not be reserved.
    #[error("Memory allocation failed while reading '{}' ({size} bytes)", path.display())]
    Allocation { path: PathBuf, size: u64 },
}

/// Immutable program text.
///
/// Inline code is borrowed as-is; file contents are owned. Either way the
/// engine sees a plain byte slice with an explicit length.
#[derive(Debug, Clone)]
pub struct Program<'a> {
    text: Cow<'a, [u8]>,
}

impl<'a> Program<'a> {
    /// Use `code` verbatim.
    pub fn inline(code: &'a str) -> Self {
        Self {
            text: Cow::Borrowed(code.as_bytes()),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl Program<'static> {
    /// Read the whole file at `path` into memory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let io_err = |source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut file = File::open(path).map_err(io_err)?;
        let size = file.metadata().map_err(io_err)?.len();

        let mut text = buffer_for(path, size)?;
        file.read_to_end(&mut text).map_err(io_err)?;

        debug!(path = %path.display(), bytes = text.len(), "loaded program");
        Ok(Self::from(text))
    }
}

/// Empty buffer with room for `size` bytes.
fn buffer_for(path: &Path, size: u64) -> Result<Vec<u8>, LoadError> {
    let alloc_err = || LoadError::Allocation {
        path: path.to_path_buf(),
        size,
    };
    let len = usize::try_from(size).map_err(|_| alloc_err())?;
    let mut text = Vec::new();
    text.try_reserve_exact(len).map_err(|_| alloc_err())?;
    Ok(text)
}

impl From<Vec<u8>> for Program<'static> {
    fn from(text: Vec<u8>) -> Self {
        Self {
            text: Cow::Owned(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn inline_is_borrowed_verbatim() {
        let code = "+a[-]";
        let program = Program::inline(code);
        assert_eq!(program.as_bytes(), b"+a[-]");
        assert_eq!(program.len(), 5);
        assert!(matches!(program.text, Cow::Borrowed(_)));
    }

    #[test]
    fn file_contents_are_read_whole() {
        let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
        write!(tf, "++\n[>+<-]\n").unwrap();

        let program = Program::from_file(tf.path()).expect("load");
        assert_eq!(program.as_bytes(), b"++\n[>+<-]\n");
    }

    #[test]
    fn empty_file_yields_empty_program() {
        let tf = tempfile::NamedTempFile::new().expect("tempfile");
        let program = Program::from_file(tf.path()).expect("load");
        assert!(program.is_empty());
    }

    #[test]
    fn unreservable_size_is_allocation_error() {
        let err = buffer_for(Path::new("huge.bf"), u64::MAX).unwrap_err();
        assert!(matches!(err, LoadError::Allocation { size: u64::MAX, .. }));
        assert!(err.to_string().contains("Memory allocation failed"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing.bf");

        let err = Program::from_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("missing.bf"));
    }
}
