use std::path::{Path, PathBuf};

use log::{debug, info};
use walkdir::WalkDir;

use crate::error::WorkerError;
use crate::worker::job::RunRequest;

/// One-shot scan of an input directory into run requests.
pub struct DirectoryScanner {
    input_directory: PathBuf,
}

impl DirectoryScanner {
    pub fn new<P: AsRef<Path>>(input_directory: P) -> Self {
        Self {
            input_directory: input_directory.as_ref().to_path_buf(),
        }
    }

    pub fn input_directory(&self) -> &Path {
        &self.input_directory
    }

    /// Collects every top-level document in the input directory.
    ///
    /// Hidden files are skipped; subdirectories are not descended into.
    pub fn scan(&self) -> Result<Vec<RunRequest>, WorkerError> {
        if !self.input_directory.is_dir() {
            return Err(WorkerError::Scan {
                path: self.input_directory.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "not a directory",
                ),
            });
        }

        let mut requests = Vec::new();

        for entry in WalkDir::new(&self.input_directory)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();

            if path.is_dir() {
                continue;
            }

            let hidden = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with('.'))
                .unwrap_or(false);
            if hidden {
                continue;
            }

            debug!("Found document: {}", path.display());
            requests.push(RunRequest::new(path.to_path_buf()));
        }

        info!(
            "Scanned {} documents in {}",
            requests.len(),
            self.input_directory.display()
        );
        Ok(requests)
    }
}
