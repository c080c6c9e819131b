#![allow(dead_code)]

use autogit::{
    AutoGitError, CreateRepositoryRequest, CreatedRepository, RemoteHost, Result, TempWorkspace,
    UploadJob, UploadRequest, VersionControl, WorkspaceProvider,
};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub const PROJECT_FILES: &[(&str, &[u8])] = &[
    ("a.txt", b"alpha\n"),
    ("sub/b.txt", b"bravo\n"),
];

pub fn build_zip(path: &Path, entries: &[(&str, &[u8])]) -> PathBuf {
    let file = File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    for (name, data) in entries {
        writer
            .start_file(*name, zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap();
    path.to_path_buf()
}

pub fn build_tar(path: &Path, entries: &[(&str, &[u8])], gzip: bool) -> PathBuf {
    let file = File::create(path).unwrap();
    if gzip {
        let encoder = GzEncoder::new(file, Compression::default());
        let builder = append_entries(tar::Builder::new(encoder), entries);
        builder.into_inner().unwrap().finish().unwrap();
    } else {
        let builder = append_entries(tar::Builder::new(file), entries);
        builder.into_inner().unwrap();
    }
    path.to_path_buf()
}

fn append_entries<W: Write>(mut builder: tar::Builder<W>, entries: &[(&str, &[u8])]) -> tar::Builder<W> {
    for (name, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, *data).unwrap();
    }
    builder
}

pub fn job_for(archive: &Path, name: &str) -> UploadJob {
    UploadRequest {
        archive_path: Some(archive.to_path_buf()),
        repository_name: name.to_string(),
        username: "octocat".to_string(),
        token: "token".to_string(),
        private: false,
    }
    .validate()
    .unwrap()
}

/// Records calls instead of touching git; optionally fails one step.
#[derive(Clone, Default)]
pub struct FakeVcs {
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_on: Option<&'static str>,
}

impl FakeVcs {
    pub fn failing_on(step: &'static str) -> Self {
        Self {
            fail_on: Some(step),
            ..Self::default()
        }
    }

    fn record(&self, call: &str) -> Result<()> {
        self.calls.lock().unwrap().push(call.to_string());
        if self.fail_on == Some(call) {
            return Err(AutoGitError::from(git2::Error::from_str(&format!(
                "{} refused",
                call
            ))));
        }
        Ok(())
    }
}

impl VersionControl for FakeVcs {
    fn init(&mut self, _workdir: &Path) -> Result<()> {
        self.record("init")
    }

    fn add_all(&mut self) -> Result<()> {
        self.record("add_all")
    }

    fn commit(&mut self, _message: &str) -> Result<()> {
        self.record("commit")
    }

    fn add_remote(&mut self, _name: &str, _url: &str) -> Result<()> {
        self.record("add_remote")
    }

    fn push(&mut self, _remote: &str, _branch: &str) -> Result<()> {
        self.record("push")
    }
}

pub struct FakeHost {
    pub html_url: String,
}

impl RemoteHost for FakeHost {
    fn create_repository(&self, _request: &CreateRepositoryRequest) -> Result<CreatedRepository> {
        Ok(CreatedRepository {
            html_url: self.html_url.clone(),
        })
    }
}

/// Removes the directory like [`TempWorkspace`] but reports a failure.
pub struct StubbornWorkspace {
    inner: TempWorkspace,
}

impl StubbornWorkspace {
    pub fn in_dir(base: &Path) -> Self {
        Self {
            inner: TempWorkspace::in_dir(base),
        }
    }
}

impl WorkspaceProvider for StubbornWorkspace {
    fn allocate(&mut self) -> io::Result<PathBuf> {
        self.inner.allocate()
    }

    fn release(&mut self) -> io::Result<()> {
        self.inner.release()?;
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "directory is busy"))
    }
}
