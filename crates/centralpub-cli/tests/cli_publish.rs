use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[allow(deprecated)]
fn centralpub_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("centralpub").unwrap();
    cmd.env("HOME", home)
        .env_remove("CENTRALPUB_URL")
        .env_remove("CENTRALPUB_SNAPSHOT_URL")
        .env_remove("CENTRAL_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn project_with_artifacts(manifest: &str) -> TempDir {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "Central.toml", manifest);
    write(
        tmp.path(),
        "target/staging/com/example/demo/1.0.0/demo-1.0.0.jar",
        "jar",
    );
    write(
        tmp.path(),
        "target/staging/com/example/demo/1.0.0/demo-1.0.0.pom",
        "<project/>",
    );
    tmp
}

fn manifest_for(server: &MockServer) -> String {
    format!(
        "[publish]\nurl = \"{}/api/v1/\"\ntoken = \"${{env:CENTRAL_TOKEN}}\"\npoll-interval-secs = 1\n",
        server.uri()
    )
}

#[test]
fn test_help_lists_commands() {
    let tmp = TempDir::new().unwrap();
    centralpub_cmd(tmp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("bundle"))
        .stdout(predicate::str::contains("publish"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("release"));
}

#[test]
fn test_bundle_writes_archive() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "repo/com/example/demo/1.0.0/demo-1.0.0.jar", "jar");

    centralpub_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["bundle", "repo", "-o", "out/bundle.zip"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Bundled"))
        .stderr(predicate::str::contains("1 artifacts"));

    assert!(tmp.path().join("out/bundle.zip").is_file());
    assert!(tmp
        .path()
        .join("repo/com/example/demo/1.0.0/demo-1.0.0.jar.sha1")
        .is_file());
}

#[test]
fn test_bundle_missing_repository_fails() {
    let tmp = TempDir::new().unwrap();

    centralpub_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["bundle", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a directory"));
}

#[test]
fn test_publish_without_manifest_fails() {
    let tmp = TempDir::new().unwrap();

    centralpub_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["publish", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No Central.toml found"));
}

#[test]
fn test_publish_dry_run() {
    let tmp = project_with_artifacts("[publish]\n");

    centralpub_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["publish", "--dry-run"])
        .assert()
        .success()
        .stderr(predicate::str::contains("dry run, 2 artifacts"));
}

#[test]
fn test_publish_rejects_unknown_publishing_type() {
    let tmp = project_with_artifacts("[publish]\n");

    centralpub_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["publish", "--publishing-type", "sometimes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown publishing type"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_publish_no_wait_prints_deployment_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/publisher/upload"))
        .respond_with(ResponseTemplate::new(201).set_body_string("dep-123"))
        .expect(1)
        .mount(&server)
        .await;
    let tmp = project_with_artifacts(&manifest_for(&server));
    write(tmp.path(), ".central.env", "CENTRAL_TOKEN=secret\n");

    centralpub_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["publish", "--no-wait", "--name", "demo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dep-123"));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(
        requests[0]
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok()),
        Some("Bearer secret")
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_prints_state_and_purls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/publisher/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "deploymentId": "dep-1",
            "deploymentName": "demo",
            "deploymentState": "PUBLISHED",
            "purls": ["pkg:maven/com.example/demo@1.0.0"]
        })))
        .mount(&server)
        .await;
    let tmp = project_with_artifacts(&manifest_for(&server));

    centralpub_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["status", "dep-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dep-1: PUBLISHED"))
        .stdout(predicate::str::contains("pkg:maven/com.example/demo@1.0.0"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_status_exits_non_zero() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/publisher/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "deploymentId": "dep-1",
            "deploymentState": "FAILED",
            "errors": { "pkg:maven/com.example/demo@1.0.0": ["Invalid POM"] }
        })))
        .mount(&server)
        .await;
    let tmp = project_with_artifacts(&manifest_for(&server));

    centralpub_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["status", "dep-1"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("dep-1: FAILED"))
        .stderr(predicate::str::contains("Invalid POM"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_publish_deploys_snapshots_to_snapshot_url() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "Central.toml", &manifest_for(&server));
    write(
        tmp.path(),
        "target/staging/com/example/demo/1.1-SNAPSHOT/demo-1.1-SNAPSHOT.jar",
        "jar",
    );

    centralpub_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["publish", "--snapshot-url"])
        .arg(format!("{}/snapshots/", server.uri()))
        .assert()
        .success()
        .stderr(predicate::str::contains("3 snapshot files"));

    let requests = server.received_requests().await.unwrap();
    assert!(requests
        .iter()
        .all(|r| r.url.path().starts_with("/snapshots/com/example/demo/1.1-SNAPSHOT/")));
    assert_eq!(requests.len(), 3);
}
