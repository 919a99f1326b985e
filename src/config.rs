use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use cross_xdg::BaseDirs;
use serde::Deserialize;
use tracing::debug;

/// Default number of tape cells.
pub const DEFAULT_TAPE_SIZE: usize = 30_000;

/// Default maximum number of simultaneously open loops.
pub const DEFAULT_STACK_DEPTH: usize = 1_000;

/// Largest accepted tape, 256 MiB of cells.
pub const MAX_TAPE_SIZE: usize = 1 << 28;

/// File name looked up under the XDG config home.
pub const CONFIG_FILE_NAME: &str = "bf.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Interpreter limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub tape_size: usize,
    pub stack_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tape_size: DEFAULT_TAPE_SIZE,
            stack_depth: DEFAULT_STACK_DEPTH,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    interpreter: Config,
}

impl Config {
    /// Resolve limits: explicit overrides -> config file -> defaults.
    ///
    /// Overrides come from the command line (or its environment fallbacks).
    pub fn resolve(
        tape_size: Option<usize>,
        stack_depth: Option<usize>,
    ) -> Result<Self, ConfigError> {
        let base = match default_path() {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        base.with_overrides(tape_size, stack_depth).validate()
    }

    /// Load the `[interpreter]` table of a TOML file. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let file: ConfigFile = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), config = ?file.interpreter, "loaded config file");
        Ok(file.interpreter)
    }

    pub fn with_overrides(mut self, tape_size: Option<usize>, stack_depth: Option<usize>) -> Self {
        if let Some(n) = tape_size {
            self.tape_size = n;
        }
        if let Some(n) = stack_depth {
            self.stack_depth = n;
        }
        self
    }

    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.tape_size == 0 {
            return Err(ConfigError::Invalid("tape_size must be at least 1".into()));
        }
        if self.tape_size > MAX_TAPE_SIZE {
            return Err(ConfigError::Invalid(format!(
                "tape_size must be at most {MAX_TAPE_SIZE}"
            )));
        }
        if self.stack_depth == 0 {
            return Err(ConfigError::Invalid("stack_depth must be at least 1".into()));
        }
        Ok(self)
    }
}

fn default_path() -> Option<PathBuf> {
    // On Linux: resolves to /home/<user>/.config
    // On Windows: resolves to C:\Users\<user>\.config
    // On macOS: resolves to /Users/<user>/.config
    let base_dirs = BaseDirs::new().ok()?;
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push(CONFIG_FILE_NAME);
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, content).expect("write config");
        (dir, path)
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = Config::load_from(&dir.path().join("nope.toml")).expect("defaults");
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn partial_interpreter_table_keeps_other_defaults() {
        let (_dir, path) = write_config("[interpreter]\ntape_size = 64\n");
        let cfg = Config::load_from(&path).expect("parse");
        assert_eq!(cfg.tape_size, 64);
        assert_eq!(cfg.stack_depth, DEFAULT_STACK_DEPTH);
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let (_dir, path) = write_config("[interpreter]\ntape_size = \"lots\"\n");
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn overrides_win_over_file_values() {
        let (_dir, path) = write_config("[interpreter]\ntape_size = 64\nstack_depth = 8\n");
        let cfg = Config::load_from(&path)
            .unwrap()
            .with_overrides(Some(10), None);
        assert_eq!(cfg, Config { tape_size: 10, stack_depth: 8 });
    }

    #[test]
    fn zero_sizes_are_rejected() {
        let zero_tape = Config::default().with_overrides(Some(0), None).validate();
        assert!(matches!(zero_tape, Err(ConfigError::Invalid(_))));

        let zero_stack = Config::default().with_overrides(None, Some(0)).validate();
        assert!(matches!(zero_stack, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn oversized_tape_is_rejected() {
        let at_limit = Config::default().with_overrides(Some(MAX_TAPE_SIZE), None).validate();
        assert!(at_limit.is_ok());

        let huge = Config::default().with_overrides(Some(usize::MAX), None).validate();
        assert!(matches!(huge, Err(ConfigError::Invalid(msg)) if msg.contains("at most")));
    }

    #[test]
    fn huge_stack_depth_is_accepted() {
        let cfg = Config::default().with_overrides(None, Some(usize::MAX)).validate();
        assert!(cfg.is_ok());
    }
}
