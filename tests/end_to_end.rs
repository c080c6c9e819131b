mod common;

use autogit::{
    Git2Backend, GithubClient, ProgressReporter, TempWorkspace, UploadEvent, UploadPipeline,
};
use common::{build_zip, job_for, PROJECT_FILES};
use git2::Repository;
use mockito::Matcher;
use tempfile::TempDir;
use tokio::sync::mpsc;

/// Real extraction, libgit2 and HTTP; the "hosted" repository is a local
/// bare repository whose path the mocked API hands back.
#[test]
fn test_archive_lands_in_remote_repository() {
    let temp = TempDir::new().unwrap();
    let archive = build_zip(&temp.path().join("project.zip"), PROJECT_FILES);
    let remote_path = temp.path().join("myproj.git");
    Repository::init_bare(&remote_path).unwrap();

    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/user/repos")
        .match_header("authorization", "Bearer token")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "name": "myproj",
            "private": false
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(serde_json::json!({ "html_url": remote_path.to_str().unwrap() }).to_string())
        .create();

    let workspace_base = temp.path().join("work");
    std::fs::create_dir_all(&workspace_base).unwrap();

    let pipeline = UploadPipeline::new(
        Box::new(Git2Backend::new("octocat", "token").with_author("Test", "test@example.test")),
        Box::new(GithubClient::with_options(&server.url(), "token", None).unwrap()),
        Box::new(TempWorkspace::in_dir(&workspace_base)),
    );

    let (tx, mut rx) = mpsc::unbounded_channel();
    let outcome = pipeline.run(&job_for(&archive, "myproj"), &ProgressReporter::new(tx));

    mock.assert();
    assert!(outcome.is_success(), "{}", outcome.message());
    assert_eq!(
        outcome.message(),
        format!("Successfully uploaded to {}", remote_path.display())
    );

    let mut last_progress = 0;
    while let Ok(event) = rx.try_recv() {
        if let UploadEvent::Progress(percent) = event {
            last_progress = percent;
        }
    }
    assert_eq!(last_progress, 100);
    assert_eq!(std::fs::read_dir(&workspace_base).unwrap().count(), 0);

    let remote = Repository::open_bare(&remote_path).unwrap();
    let commit = remote
        .find_reference("refs/heads/master")
        .unwrap()
        .peel_to_commit()
        .unwrap();
    assert_eq!(commit.message(), Some("Initial commit"));
    assert_eq!(commit.parent_count(), 0);

    let tree = commit.tree().unwrap();
    let a = tree.get_path(std::path::Path::new("a.txt")).unwrap();
    let b = tree.get_path(std::path::Path::new("sub/b.txt")).unwrap();
    assert_eq!(remote.find_blob(a.id()).unwrap().content(), b"alpha\n");
    assert_eq!(remote.find_blob(b.id()).unwrap().content(), b"bravo\n");
}
