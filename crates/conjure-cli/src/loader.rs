//! Input discovery and import loading.

use anyhow::{bail, Context, Result};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use conjure_core::{SourceFile, SourceSet};

use crate::config::SourcesConfig;

/// Definition files named by `inputs`, with directories expanded.
///
/// Directory entries are sorted so the compile order does not depend on the
/// file system.
pub fn discover(inputs: &[PathBuf], config: &SourcesConfig) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut entries = Vec::new();
            collect_dir(input, config, &mut entries)?;
            entries.sort();
            files.extend(entries);
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            bail!("Input {:?} does not exist", input);
        }
    }
    Ok(files)
}

fn collect_dir(dir: &Path, config: &SourcesConfig, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir).with_context(|| format!("Failed to read directory {:?}", dir))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            collect_dir(&path, config, out)?;
        } else if config.accepts(&path) {
            out.push(path);
        }
    }
    Ok(())
}

/// Parse `targets` and, if configured, every file they import.
pub fn load(targets: &[PathBuf], config: &SourcesConfig) -> Result<SourceSet> {
    let mut sources = SourceSet::new();
    let mut imports = VecDeque::new();

    for path in targets {
        let file = SourceFile::from_yaml_file(path)
            .with_context(|| format!("Failed to load definitions from {:?}", path))?;
        debug!(path = %file.path.display(), "Loaded target");
        imports.extend(file.imports().map(|(_, import)| import));
        sources.add_target(file);
    }

    if !config.follow_imports {
        return Ok(sources);
    }

    while let Some(path) = imports.pop_front() {
        if sources.contains(&path) {
            continue;
        }
        let file = SourceFile::from_yaml_file(&path)
            .with_context(|| format!("Failed to load imported definitions from {:?}", path))?;
        debug!(path = %file.path.display(), "Loaded import");
        imports.extend(file.imports().map(|(_, import)| import));
        sources.add_import(file);
    }
    Ok(sources)
}
