//! End-to-end CLI tests for the crawler binary.

use std::path::Path;

use assert_cmd::Command;
use crawler_core::{Database, JobStore, Page, PageStatus, PageStore};
use predicates::prelude::*;
use tempfile::TempDir;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Seeds a database file with one completed job and two recorded pages,
/// returning the job id. The pool is closed before the binary opens the
/// same file.
fn seed_database(db_path: &Path) -> Uuid {
    tokio_test::block_on(async {
        let db = Database::new(db_path)
            .await
            .expect("failed to create database");
        let job_id = Uuid::new_v4();

        let jobs = JobStore::new(db.clone());
        jobs.create_job(job_id, "https://example.com")
            .await
            .expect("failed to create job");
        jobs.mark_in_progress(job_id)
            .await
            .expect("failed to start job");

        let pages = PageStore::new(db.clone());
        let records = vec![
            Page::new(
                "https://example.com",
                "example.com",
                0,
                vec!["https://example.com/about".to_string()],
                PageStatus::Ok,
                job_id,
            ),
            Page::new(
                "https://example.com/about",
                "example.com",
                1,
                vec![],
                PageStatus::NoLinksFound,
                job_id,
            ),
        ];
        pages
            .insert_pages(job_id, &records)
            .await
            .expect("failed to insert pages");

        jobs.mark_completed(job_id)
            .await
            .expect("failed to complete job");
        db.close().await;
        job_id
    })
}

// ==================== Binary Surface ====================

/// Test that invoking the binary without a subcommand fails with usage.
#[test]
fn test_binary_requires_subcommand() {
    let mut cmd = Command::cargo_bin("crawler").unwrap();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

/// Test that --help lists the subcommands and exits with code 0.
#[test]
fn test_binary_help_displays_subcommands() {
    let mut cmd = Command::cargo_bin("crawler").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Map a website"))
        .stdout(predicate::str::contains("crawl"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("sitemap"));
}

/// Test that --version displays version and exits with code 0.
#[test]
fn test_binary_version_displays_version() {
    let mut cmd = Command::cargo_bin("crawler").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("crawler"));
}

/// Test that invalid flags cause non-zero exit.
#[test]
fn test_binary_invalid_flag_returns_error() {
    let mut cmd = Command::cargo_bin("crawler").unwrap();
    cmd.arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

/// Test that out-of-range option values are rejected before any crawl.
#[test]
fn test_binary_rejects_out_of_range_depth() {
    let mut cmd = Command::cargo_bin("crawler").unwrap();
    cmd.args(["crawl", "https://example.com", "-d", "99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

/// Test that a malformed job id is rejected during parsing.
#[test]
fn test_binary_rejects_malformed_job_id() {
    let mut cmd = Command::cargo_bin("crawler").unwrap();
    cmd.args(["status", "not-a-uuid"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

// ==================== Status Subcommand ====================

/// Test `status` against a seeded database.
#[test]
fn test_status_reports_seeded_job() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("crawler.db");
    let job_id = seed_database(&db_path);

    let mut cmd = Command::cargo_bin("crawler").unwrap();
    cmd.args([
        "status",
        &job_id.to_string(),
        "--db",
        db_path.to_str().unwrap(),
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains(job_id.to_string()))
    .stdout(predicate::str::contains("completed"))
    .stdout(predicate::str::contains("https://example.com"));
}

/// Test `status` with an id the database has never seen.
#[test]
fn test_status_unknown_job_fails() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("crawler.db");
    seed_database(&db_path);

    let mut cmd = Command::cargo_bin("crawler").unwrap();
    cmd.args([
        "status",
        &Uuid::new_v4().to_string(),
        "--db",
        db_path.to_str().unwrap(),
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("no job found"));
}

/// Test `status` without an id lists the seeded job.
#[test]
fn test_status_without_id_lists_recent_jobs() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("crawler.db");
    let job_id = seed_database(&db_path);

    let mut cmd = Command::cargo_bin("crawler").unwrap();
    cmd.args(["status", "--db", db_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains(job_id.to_string()))
        .stdout(predicate::str::contains("https://example.com"));
}

/// Test the job listing against a database with no jobs.
#[test]
fn test_status_without_id_on_empty_database() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("crawler.db");

    let mut cmd = Command::cargo_bin("crawler").unwrap();
    cmd.args(["status", "--db", db_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("No crawl jobs recorded yet."));
}

// ==================== Sitemap Subcommand ====================

/// Test `sitemap` text output against a seeded database.
#[test]
fn test_sitemap_lists_seeded_pages() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("crawler.db");
    let job_id = seed_database(&db_path);

    let mut cmd = Command::cargo_bin("crawler").unwrap();
    cmd.args([
        "sitemap",
        &job_id.to_string(),
        "--db",
        db_path.to_str().unwrap(),
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("https://example.com/about"))
    .stdout(predicate::str::contains("no_links_found"));
}

/// Test `sitemap --json` emits the page fields as JSON.
#[test]
fn test_sitemap_json_output() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("crawler.db");
    let job_id = seed_database(&db_path);

    let mut cmd = Command::cargo_bin("crawler").unwrap();
    cmd.args([
        "sitemap",
        &job_id.to_string(),
        "--json",
        "--db",
        db_path.to_str().unwrap(),
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains(r#""page_url""#))
    .stdout(predicate::str::contains(r#""status": "ok""#));
}

/// Test that a status filter matching nothing reports an empty page list.
#[test]
fn test_sitemap_status_filter_can_match_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("crawler.db");
    let job_id = seed_database(&db_path);

    let mut cmd = Command::cargo_bin("crawler").unwrap();
    cmd.args([
        "sitemap",
        &job_id.to_string(),
        "--status",
        "disallowed",
        "--db",
        db_path.to_str().unwrap(),
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("No pages recorded"));
}

// ==================== Crawl Subcommand ====================

/// Test a full crawl through the binary: mock site in, database rows out.
#[test]
fn test_crawl_subcommand_end_to_end() {
    // the runtime stays alive so the mock server keeps serving while the
    // binary runs
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let server = runtime.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<html><body><a href="/about">About</a></body></html>"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/about"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<html><body></body></html>"),
            )
            .mount(&server)
            .await;
        server
    });

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("crawl.db");

    let mut cmd = Command::cargo_bin("crawler").unwrap();
    cmd.args([
        "crawl",
        &server.uri(),
        "--no-render",
        "--db",
        db_path.to_str().unwrap(),
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("Job "))
    .stdout(predicate::str::contains("2 pages"));

    drop(server);
}
