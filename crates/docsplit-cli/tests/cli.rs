use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const SPLIT: &str = r#"{
    "split_id": "s1",
    "client_id": "c1",
    "documents": [
        {"id": "d1", "name": "W2", "classification": "W-2", "file_name": "w2.pdf",
         "page_urls": ["page_1.png", "page_2.png"]}
    ]
}"#;

fn docsplit(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_docsplit"))
        .arg("--config")
        .arg(dir.join("config.toml"))
        .arg("--database")
        .arg(dir.join("docsplit.db"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .unwrap()
}

fn stdout_json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_ingest_show_finalize_download() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    let input = dir.join("split.json");
    std::fs::write(&input, SPLIT).unwrap();

    let init = stdout_json(&docsplit(dir, &["init"]));
    assert_eq!(init["schema_version"], 1);

    let ingested = stdout_json(&docsplit(dir, &["ingest", input.to_str().unwrap()]));
    assert_eq!(ingested["id"], "s1");

    let shown = stdout_json(&docsplit(dir, &["show", "s1"]));
    assert_eq!(shown["status"], "draft");
    assert_eq!(shown["documents"][0]["start_page"], "page_1.png");

    let renamed = stdout_json(&docsplit(dir, &["rename", "d1", "--name", "John's W-2"]));
    assert_eq!(renamed["name"], "John's W-2");

    let finalized = stdout_json(&docsplit(dir, &["finalize", "s1"]));
    assert_eq!(finalized["status"], "finalized");

    let out = dir.join("out.pdf");
    let downloaded = stdout_json(&docsplit(
        dir,
        &["download", "d1", "--out", out.to_str().unwrap()],
    ));
    assert_eq!(downloaded["filename"], "w2.pdf");
    assert!(std::fs::read(&out).unwrap().starts_with(b"%PDF"));

    let listed = stdout_json(&docsplit(dir, &["list", "c1"]));
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[test]
fn test_errors_exit_non_zero() {
    let temp_dir = TempDir::new().unwrap();
    let output = docsplit(temp_dir.path(), &["show", "missing"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not_found"));
}
