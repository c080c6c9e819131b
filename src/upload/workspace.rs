use log::debug;
use std::io;
use std::path::PathBuf;
use tempfile::TempDir;

/// Owner of the ephemeral working directory for one job.
pub trait WorkspaceProvider: Send {
    fn allocate(&mut self) -> io::Result<PathBuf>;

    /// Recursively removes the allocated directory. Does nothing if none
    /// was allocated.
    fn release(&mut self) -> io::Result<()>;
}

/// Working directories created with `tempfile` under the system temp dir
/// or a chosen base directory.
#[derive(Debug, Default)]
pub struct TempWorkspace {
    base: Option<PathBuf>,
    current: Option<TempDir>,
}

impl TempWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_dir<P: Into<PathBuf>>(base: P) -> Self {
        Self {
            base: Some(base.into()),
            current: None,
        }
    }
}

impl WorkspaceProvider for TempWorkspace {
    fn allocate(&mut self) -> io::Result<PathBuf> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("autogit-");

        let dir = match self.base {
            Some(ref base) => builder.tempdir_in(base)?,
            None => builder.tempdir()?,
        };

        let path = dir.path().to_path_buf();
        debug!("Allocated working directory {}", path.display());
        self.current = Some(dir);
        Ok(path)
    }

    fn release(&mut self) -> io::Result<()> {
        match self.current.take() {
            Some(dir) => {
                let path = dir.path().to_path_buf();
                dir.close()?;
                debug!("Removed working directory {}", path.display());
                Ok(())
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_allocate_and_release() {
        let mut workspace = TempWorkspace::new();
        let path = workspace.allocate().unwrap();
        fs::create_dir_all(path.join("nested/deeper")).unwrap();
        fs::write(path.join("nested/deeper/file.txt"), "x").unwrap();

        workspace.release().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_release_without_allocation() {
        let mut workspace = TempWorkspace::new();
        assert!(workspace.release().is_ok());
    }

    #[test]
    fn test_allocate_in_base_dir() {
        let base = TempDir::new().unwrap();
        let mut workspace = TempWorkspace::in_dir(base.path());

        let path = workspace.allocate().unwrap();
        assert!(path.starts_with(base.path()));
        assert!(path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("autogit-")));

        workspace.release().unwrap();
        assert!(!path.exists());
    }
}
