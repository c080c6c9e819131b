use crate::error::{AutoGitError, Result};
use flate2::read::GzDecoder;
use log::debug;
use regex::Regex;
use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use zip::ZipArchive;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

const ARCHIVE_SUFFIXES: [&str; 5] = [".tar.gz", ".tgz", ".tar", ".zip", ".gz"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    /// Plain or gzip-compressed tar; compression is sniffed from the stream.
    Tar,
}

impl ArchiveFormat {
    /// Picks a format from the final suffix only, so `a.tar.gz` is judged by `.gz`.
    pub fn from_path(path: &Path) -> Option<Self> {
        match suffix_of(path)?.as_str() {
            ".zip" => Some(ArchiveFormat::Zip),
            ".tar" | ".gz" | ".tgz" => Some(ArchiveFormat::Tar),
            _ => None,
        }
    }

    /// Like [`ArchiveFormat::from_path`], failing with the offending suffix.
    pub fn detect(path: &Path) -> Result<Self> {
        Self::from_path(path).ok_or_else(|| AutoGitError::UnsupportedFormat {
            extension: suffix_of(path).unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub files: usize,
    pub directories: usize,
    pub bytes: u64,
}

impl ExtractionSummary {
    pub fn display_summary(&self) -> String {
        format!(
            "{} files, {} directories, {} bytes",
            self.files, self.directories, self.bytes
        )
    }
}

fn suffix_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_lowercase()))
}

/// Unpacks `archive_path` into `destination`.
///
/// The format is decided before the archive is opened, so an unsupported
/// suffix never touches the filesystem. Any decompression failure aborts the
/// whole extraction; whatever was already written is left for the caller to
/// discard together with the destination.
pub fn extract(archive_path: &Path, destination: &Path) -> Result<ExtractionSummary> {
    let format = ArchiveFormat::detect(archive_path)?;

    let file = File::open(archive_path).map_err(|e| AutoGitError::Extraction {
        message: format!("Failed to open {}: {}", archive_path.display(), e),
    })?;

    fs::create_dir_all(destination).map_err(|e| AutoGitError::Extraction {
        message: format!("Failed to create {}: {}", destination.display(), e),
    })?;

    let summary = match format {
        ArchiveFormat::Zip => extract_zip(file, destination)?,
        ArchiveFormat::Tar => extract_tar(file, destination)?,
    };

    debug!(
        "Extracted {} into {}: {}",
        archive_path.display(),
        destination.display(),
        summary.display_summary()
    );

    Ok(summary)
}

fn extract_zip(file: File, destination: &Path) -> Result<ExtractionSummary> {
    let mut archive = ZipArchive::new(BufReader::new(file))?;
    let mut summary = ExtractionSummary::default();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;

        let relative = entry
            .enclosed_name()
            .map(|p| p.to_path_buf())
            .ok_or_else(|| AutoGitError::Extraction {
                message: format!("Refusing to extract unsafe path: {}", entry.name()),
            })?;
        let dest_path = destination.join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&dest_path).map_err(|e| entry_error(&relative, e))?;
            summary.directories += 1;
            continue;
        }

        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent).map_err(|e| entry_error(&relative, e))?;
        }

        let mut out = File::create(&dest_path).map_err(|e| entry_error(&relative, e))?;
        let written = io::copy(&mut entry, &mut out).map_err(|e| entry_error(&relative, e))?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            // Permission bits only, and the owner can always read and write.
            let mode = (mode & 0o777) | 0o600;
            fs::set_permissions(&dest_path, fs::Permissions::from_mode(mode))
                .map_err(|e| entry_error(&relative, e))?;
        }

        summary.files += 1;
        summary.bytes += written;
    }

    Ok(summary)
}

fn extract_tar(mut file: File, destination: &Path) -> Result<ExtractionSummary> {
    let mut magic = [0u8; 2];
    let compressed = match file.read_exact(&mut magic) {
        Ok(()) => magic == GZIP_MAGIC,
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => false,
        Err(e) => {
            return Err(AutoGitError::Extraction {
                message: e.to_string(),
            })
        }
    };
    file.seek(SeekFrom::Start(0))
        .map_err(|e| AutoGitError::Extraction {
            message: e.to_string(),
        })?;

    let reader = BufReader::new(file);
    if compressed {
        unpack_tar(tar::Archive::new(GzDecoder::new(reader)), destination)
    } else {
        unpack_tar(tar::Archive::new(reader), destination)
    }
}

/// Directories are unpacked after everything else, deepest first, so a
/// read-only directory does not block writing its own children.
fn unpack_tar<R: Read>(mut archive: tar::Archive<R>, destination: &Path) -> Result<ExtractionSummary> {
    let mut summary = ExtractionSummary::default();
    let mut directories = Vec::new();
    let entries = archive.entries().map_err(|e| AutoGitError::Extraction {
        message: e.to_string(),
    })?;

    for entry in entries {
        let mut entry = entry.map_err(|e| AutoGitError::Extraction {
            message: e.to_string(),
        })?;

        let relative = entry
            .path()
            .map_err(|e| AutoGitError::Extraction {
                message: e.to_string(),
            })?
            .into_owned();
        let entry_type = entry.header().entry_type();

        if entry_type.is_dir() {
            directories.push((relative, entry));
            continue;
        }

        let size = entry.size();
        unpack_entry(&mut entry, &relative, destination)?;

        if entry_type.is_file() {
            summary.files += 1;
            summary.bytes += size;
        }
    }

    directories.sort_by(|(a, _), (b, _)| b.cmp(a));
    for (relative, mut entry) in directories {
        unpack_entry(&mut entry, &relative, destination)?;
        summary.directories += 1;
    }

    Ok(summary)
}

fn unpack_entry<R: Read>(
    entry: &mut tar::Entry<'_, R>,
    relative: &Path,
    destination: &Path,
) -> Result<()> {
    // unpack_in refuses entries that would land outside the destination
    let unpacked = entry
        .unpack_in(destination)
        .map_err(|e| entry_error(relative, e))?;
    if !unpacked {
        return Err(AutoGitError::Extraction {
            message: format!("Refusing to extract unsafe path: {}", relative.display()),
        });
    }
    Ok(())
}

fn entry_error(relative: &Path, error: io::Error) -> AutoGitError {
    AutoGitError::Extraction {
        message: format!("{}: {}", relative.display(), error),
    }
}

/// Derives a repository name from an archive file name.
///
/// Archive suffixes are stripped (`project.tar.gz` becomes `project`) and
/// characters GitHub would not accept are replaced with `-`.
pub fn default_repository_name(archive_path: &Path) -> Option<String> {
    let file_name = archive_path.file_name()?.to_str()?;
    let stem_len = ARCHIVE_SUFFIXES
        .iter()
        .find_map(|suffix| {
            let start = file_name.len().checked_sub(suffix.len())?;
            file_name
                .get(start..)
                .filter(|tail| tail.eq_ignore_ascii_case(suffix))
                .map(|_| start)
        })
        .unwrap_or(file_name.len());
    let stem = &file_name[..stem_len];

    let invalid = Regex::new(r"[^A-Za-z0-9._-]+").ok()?;
    let name = invalid.replace_all(stem, "-");
    let name = name.trim_matches('-');

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
