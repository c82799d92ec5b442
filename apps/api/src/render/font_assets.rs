//! One-time, best-effort provisioning of font metric files.
//!
//! The renderer reads AFM metrics from a runtime directory. When that
//! directory does not already hold them, the files are linked (or copied, if
//! linking is unsupported) from the configured source directory. Failure only
//! means the built-in metric tables are used.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info;

use crate::layout::FontFace;
use crate::render::error::ResourceInitializationError;

#[derive(Debug)]
pub struct FontAssets {
    source_dir: Option<PathBuf>,
    runtime_dir: PathBuf,
    /// Set by the first call. A presence flag, not a lock: a concurrent first
    /// caller returns straight away and reads whatever metrics are on disk.
    attempted: AtomicBool,
}

impl FontAssets {
    pub fn new(source_dir: Option<PathBuf>, runtime_dir: PathBuf) -> Self {
        Self {
            source_dir,
            runtime_dir,
            attempted: AtomicBool::new(false),
        }
    }

    pub fn runtime_dir(&self) -> &Path {
        &self.runtime_dir
    }

    /// Makes sure the runtime directory contains every AFM file the renderer reads.
    ///
    /// The work runs once per instance. Only the first call can report a
    /// failure; later calls return `Ok` after a single atomic swap.
    pub fn ensure_available(&self) -> Result<(), ResourceInitializationError> {
        if self.attempted.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let missing: Vec<&'static str> = FontFace::ALL
            .iter()
            .map(FontFace::afm_file_name)
            .filter(|name| !self.runtime_dir.join(name).exists())
            .collect();

        if !missing.is_empty() {
            let Some(source_dir) = &self.source_dir else {
                return Err(ResourceInitializationError::NoSource {
                    runtime_dir: self.runtime_dir.clone(),
                    missing: missing.join(", "),
                });
            };

            std::fs::create_dir_all(&self.runtime_dir).map_err(|source| {
                ResourceInitializationError::Io {
                    path: self.runtime_dir.clone(),
                    source,
                }
            })?;

            for name in missing {
                let target = self.runtime_dir.join(name);
                link_or_copy(&source_dir.join(name), &target)?;
                info!(file = %target.display(), "font resource provisioned");
            }
        }

        Ok(())
    }
}

fn link_or_copy(source: &Path, target: &Path) -> Result<(), ResourceInitializationError> {
    let source = source
        .canonicalize()
        .map_err(|e| ResourceInitializationError::Io {
            path: source.to_path_buf(),
            source: e,
        })?;

    #[cfg(unix)]
    if std::os::unix::fs::symlink(&source, target).is_ok() {
        return Ok(());
    }

    std::fs::copy(&source, target)
        .map(|_| ())
        .map_err(|e| ResourceInitializationError::Io {
            path: target.to_path_buf(),
            source: e,
        })
}
