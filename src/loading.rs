//! Tree loading through a pluggable filesystem.
//!
//! The engine never opens files itself. Callers implement [`FileSystem`]
//! over real storage or a mock, and hand it to [`load_tree`] or
//! [`TreeRegistry::load_dir`]. Directory loading keeps going past bad files
//! so that every problem is reported at once.

use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::BuildError;
use crate::node::Tree;
use crate::registry::{RegistryError, TreeRegistry};

/// Abstraction for filesystem operations.
///
/// This trait enables testing with mock filesystems and
/// supports different storage backends.
pub trait FileSystem: Send + Sync {
    /// The error type for filesystem operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Reads the contents of a file as a string.
    fn read_file(&self, path: &Path) -> Result<String, Self::Error>;

    /// Lists all entries in a directory.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>, Self::Error>;
}

/// Errors that can occur while loading trees.
#[derive(Debug, thiserror::Error)]
pub enum TreeLoadError {
    /// IO error reading a file
    #[error("IO error reading {0}: {1}")]
    Io(PathBuf, Box<dyn std::error::Error + Send + Sync>),

    /// JSON parsing error
    #[error("Parse error in {0}: {1}")]
    Parse(PathBuf, serde_json::Error),

    /// The fragment does not compile
    #[error("Schema error in {0}: {1}")]
    Build(PathBuf, BuildError),

    /// Invalid filename
    #[error("Invalid filename: {0}")]
    InvalidFileName(PathBuf),

    /// Registry error
    #[error("Registry error in {0}: {1}")]
    Registry(PathBuf, RegistryError),

    /// Multiple errors occurred
    #[error("Multiple errors: {0:?}")]
    Multiple(Vec<TreeLoadError>),
}

/// Reads and compiles one tree.
///
/// A fragment without `__name__` is named after the file stem.
pub fn load_tree<Fs: FileSystem>(path: impl AsRef<Path>, fs: &Fs) -> Result<Tree, TreeLoadError> {
    let path = path.as_ref();
    let content = fs
        .read_file(path)
        .map_err(|e| TreeLoadError::Io(path.to_path_buf(), Box::new(e)))?;

    let json: Value = serde_json::from_str(&content)
        .map_err(|e| TreeLoadError::Parse(path.to_path_buf(), e))?;

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| TreeLoadError::InvalidFileName(path.to_path_buf()))?;

    let tree = Tree::from_value_or_named(&json, stem)
        .map_err(|e| TreeLoadError::Build(path.to_path_buf(), e))?;
    debug!(path = %path.display(), tree = %tree.name(), "loaded tree");
    Ok(tree)
}

impl TreeRegistry {
    /// Loads and registers every `.json` file in a directory.
    ///
    /// Files that load are registered even when others fail; the failures
    /// are returned together as `TreeLoadError::Multiple`.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use formnode::TreeRegistry;
    ///
    /// let registry = TreeRegistry::new();
    /// registry.load_dir("./schemas", &MyFs::new())?;
    /// ```
    pub fn load_dir<Fs: FileSystem>(
        &self,
        path: impl AsRef<Path>,
        fs: &Fs,
    ) -> Result<(), TreeLoadError> {
        let path = path.as_ref();
        let mut files = fs
            .read_dir(path)
            .map_err(|e| TreeLoadError::Io(path.to_path_buf(), Box::new(e)))?;
        files.sort();

        let mut errors = Vec::new();

        for file in files {
            if file.extension().and_then(|s| s.to_str()) == Some("json") {
                if let Err(e) = self.load_tree_file(&file, fs) {
                    errors.push(e);
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(TreeLoadError::Multiple(errors))
        }
    }

    fn load_tree_file<Fs: FileSystem>(&self, path: &Path, fs: &Fs) -> Result<(), TreeLoadError> {
        let tree = load_tree(path, fs)?;
        self.register(tree)
            .map_err(|e| TreeLoadError::Registry(path.to_path_buf(), e))
    }
}
