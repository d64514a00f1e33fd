//! Source files and the set of files one compile sees.
//!
//! ## Targets and imports
//!
//! A [`SourceSet`] holds every loaded file keyed by its normalized path.
//! Files added as targets are emitted into the IR in insertion order. Files
//! added only because a target imports them, directly or not, follow the
//! targets with their types and errors; their services are left out.

pub mod raw;
pub mod type_expr;

pub use raw::RawDefinition;
pub use type_expr::TypeExpr;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::ConjureError;

/// One parsed definition file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub definition: RawDefinition,
}

impl SourceFile {
    pub fn new(path: impl AsRef<Path>, definition: RawDefinition) -> Self {
        Self {
            path: normalize_path(path.as_ref()),
            definition,
        }
    }

    /// Parse a definition from a YAML string.
    pub fn from_yaml(path: impl AsRef<Path>, yaml: &str) -> Result<Self, ConjureError> {
        let definition: RawDefinition = serde_yaml::from_str(yaml)?;
        Ok(Self::new(path, definition))
    }

    /// Load a definition from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConjureError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(path, &content)
    }

    /// Path an import declared by this file refers to.
    pub fn import_path(&self, relative: &str) -> PathBuf {
        let base = self.path.parent().unwrap_or_else(|| Path::new(""));
        normalize_path(&base.join(relative))
    }

    /// Declared `conjure-imports`, as (namespace, resolved path).
    pub fn imports(&self) -> impl Iterator<Item = (&str, PathBuf)> + '_ {
        self.definition
            .types
            .conjure_imports
            .iter()
            .map(move |(namespace, relative)| (namespace.as_str(), self.import_path(relative)))
    }
}

/// Every file a compile can see, with the subset to emit.
#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    targets: Vec<PathBuf>,
    files: BTreeMap<PathBuf, SourceFile>,
}

impl SourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set where every file is a compile target.
    pub fn from_targets(files: impl IntoIterator<Item = SourceFile>) -> Self {
        let mut set = Self::new();
        for file in files {
            set.add_target(file);
        }
        set
    }

    /// Add a file whose definitions are emitted.
    pub fn add_target(&mut self, file: SourceFile) {
        if !self.targets.contains(&file.path) {
            self.targets.push(file.path.clone());
        }
        self.files.insert(file.path.clone(), file);
    }

    /// Add a file reached through imports. Its services are not emitted.
    pub fn add_import(&mut self, file: SourceFile) {
        self.files.entry(file.path.clone()).or_insert(file);
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains_key(&normalize_path(path))
    }

    pub fn get(&self, path: &Path) -> Option<&SourceFile> {
        self.files.get(&normalize_path(path))
    }

    /// Compile targets in insertion order.
    pub fn targets(&self) -> impl Iterator<Item = &SourceFile> {
        self.targets.iter().filter_map(|path| self.files.get(path))
    }

    /// Every loaded file, in path order.
    pub fn files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.values()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Lexically normalize a path, folding `.` and `..` components.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
