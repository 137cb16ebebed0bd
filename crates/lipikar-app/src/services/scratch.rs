// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-run scratch storage for rendered and enhanced page images.

use std::path::Path;

use lipikar_core::error::Result;
use tempfile::TempDir;
use tracing::{debug, warn};

/// A private temporary directory, removed when the run ends.
#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Create `lipikar-XXXXXX` under `root`, or under the system temp dir.
    pub fn create(root: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("lipikar-");
        let dir = match root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }?;
        debug!(path = %dir.path().display(), "Scratch directory created");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the directory. Failure is logged, never raised.
    pub fn close(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(err) = self.dir.close() {
            warn!(path = %path.display(), error = %err, "could not remove scratch directory");
        }
    }
}
