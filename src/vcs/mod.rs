pub mod git_backend;

pub use git_backend::Git2Backend;

use crate::error::Result;
use std::path::Path;

/// The local repository operations an upload needs.
///
/// Calls arrive in a fixed order on one worker thread: `init` first, then
/// `add_all`, `commit`, `add_remote` and `push`.
pub trait VersionControl: Send {
    fn init(&mut self, workdir: &Path) -> Result<()>;
    fn add_all(&mut self) -> Result<()>;
    fn commit(&mut self, message: &str) -> Result<()>;
    fn add_remote(&mut self, name: &str, url: &str) -> Result<()>;
    fn push(&mut self, remote: &str, branch: &str) -> Result<()>;
}
