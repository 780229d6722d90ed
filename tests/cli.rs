use axum::{extract::Multipart, routing::post, Json, Router};
use serde_json::{json, Value};
use std::fs;
use std::io::Write;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;

fn dqa_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("dqa");
    path
}

fn setup_test_env(base_url: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let files_dir = root.join("files");
    fs::create_dir_all(&files_dir).unwrap();
    fs::write(
        files_dir.join("notes.pdf"),
        "%PDF-1.4 pretend this is a document about X and Y.",
    )
    .unwrap();

    let config_path = root.join("dqa.toml");
    fs::write(
        &config_path,
        format!("[server]\nbase_url = \"{}\"\n\n[http]\ntimeout_secs = 10\n", base_url),
    )
    .unwrap();

    (tmp, config_path)
}

fn run_dqa(config_path: &Path, args: &[&str], stdin: Option<&str>) -> (String, String, Option<i32>) {
    let binary = dqa_binary();
    let mut child = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap_or_else(|e| panic!("Failed to run dqa binary at {:?}: {}", binary, e));

    {
        let mut pipe = child.stdin.take().unwrap();
        if let Some(input) = stdin {
            pipe.write_all(input.as_bytes()).unwrap();
        }
    }

    let output = child.wait_with_output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.code())
}

async fn upload(mut multipart: Multipart) -> Json<Value> {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("").to_string();
            return Json(json!({ "filename": filename, "chunks": 3 }));
        }
    }
    Json(json!({ "error": "No file provided" }))
}

async fn ask(Json(body): Json<Value>) -> Json<Value> {
    if body["question"] == "boom" {
        return Json(json!({ "error": "model unavailable" }));
    }
    Json(json!({ "answer": "X is Y.", "sources": ["notes.pdf"] }))
}

async fn start_stub() -> SocketAddr {
    let app = Router::new()
        .route("/upload", post(upload))
        .route("/ask", post(ask));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Runs the binary off the async runtime so the stub keeps serving.
async fn run_dqa_async(
    config_path: PathBuf,
    args: Vec<String>,
    stdin: Option<String>,
) -> (String, String, Option<i32>) {
    tokio::task::spawn_blocking(move || {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        run_dqa(&config_path, &args, stdin.as_deref())
    })
    .await
    .unwrap()
}

#[test]
fn blank_question_is_rejected_locally() {
    // Nothing listens on port 9; the command must fail before connecting.
    let (_tmp, config_path) = setup_test_env("http://127.0.0.1:9");

    let (stdout, stderr, code) = run_dqa(&config_path, &["ask", "   "], None);
    assert_eq!(code, Some(2), "stdout={}, stderr={}", stdout, stderr);
    assert!(stderr.contains("Please enter a question first."));
    assert!(!stdout.contains("Processing"));
}

#[test]
fn unreadable_file_fails_with_context() {
    let (tmp, config_path) = setup_test_env("http://127.0.0.1:9");
    let missing = tmp.path().join("files/missing.pdf");

    let (_, stderr, code) = run_dqa(&config_path, &["upload", missing.to_str().unwrap()], None);
    assert_ne!(code, Some(0));
    assert!(stderr.contains("Failed to read"), "stderr={}", stderr);
}

#[test]
fn unreachable_server_reports_connectivity_error() {
    let (_tmp, config_path) = setup_test_env("http://127.0.0.1:9");

    let (stdout, _stderr, code) = run_dqa(&config_path, &["ask", "What is X?"], None);
    assert_ne!(code, Some(0));
    assert!(stdout.contains("Error connecting to server. Please try again."));
}

#[test]
fn session_help_and_empty_list() {
    let (_tmp, config_path) = setup_test_env("http://127.0.0.1:9");

    let (stdout, stderr, code) =
        run_dqa(&config_path, &["session"], Some("help\nlist\nquit\n"));
    assert_eq!(code, Some(0), "stderr={}", stderr);
    assert!(stdout.contains("Commands:"));
    assert!(stdout.contains("No documents uploaded"));
}

#[test]
fn missing_config_uses_defaults() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("nope.toml");

    let (_, stderr, code) = run_dqa(&config_path, &["ask", ""], None);
    assert_eq!(code, Some(2));
    assert!(stderr.contains("Please enter a question first."));
}

#[tokio::test(flavor = "multi_thread")]
async fn upload_and_ask_against_server() {
    let addr = start_stub().await;
    let (tmp, config_path) = setup_test_env(&format!("http://{}", addr));
    let file = tmp.path().join("files/notes.pdf");

    let (stdout, stderr, code) = run_dqa_async(
        config_path.clone(),
        args(&["upload", file.to_str().unwrap()]),
        None,
    )
    .await;
    assert_eq!(code, Some(0), "stdout={}, stderr={}", stdout, stderr);
    assert!(stderr.contains("File notes.pdf uploaded successfully! Processed 3 chunks."));
    assert!(stdout.contains("notes.pdf"));

    let (stdout, stderr, code) =
        run_dqa_async(config_path.clone(), args(&["ask", "What is X?"]), None).await;
    assert_eq!(code, Some(0), "stderr={}", stderr);
    assert!(stdout.contains("X is Y."));
    assert!(stdout.contains("notes.pdf (relevant section)"));

    let (stdout, _stderr, code) =
        run_dqa_async(config_path, args(&["ask", "boom"]), None).await;
    assert_ne!(code, Some(0));
    assert!(stdout.contains("Error: model unavailable"));
}

#[tokio::test(flavor = "multi_thread")]
async fn upload_skips_unreadable_and_sends_the_rest() {
    let addr = start_stub().await;
    let (tmp, config_path) = setup_test_env(&format!("http://{}", addr));
    let good = tmp.path().join("files/good.txt");
    fs::write(&good, "readable contents").unwrap();
    let missing = tmp.path().join("files/missing.pdf");

    let (stdout, stderr, code) = run_dqa_async(
        config_path,
        args(&["upload", good.to_str().unwrap(), missing.to_str().unwrap()]),
        None,
    )
    .await;
    assert_eq!(code, Some(1), "stdout={}, stderr={}", stdout, stderr);
    assert!(stderr.contains("Failed to read"), "stderr={}", stderr);
    assert!(stderr.contains("File good.txt uploaded successfully! Processed 3 chunks."));
    assert!(stderr.contains("1 of 2 uploads failed"));
    assert!(stdout.contains("--- Documents (1) ---"));
    assert!(stdout.contains("good.txt"));
}

#[tokio::test(flavor = "multi_thread")]
async fn session_upload_remove_ask() {
    let addr = start_stub().await;
    let (tmp, config_path) = setup_test_env(&format!("http://{}", addr));
    let file = tmp.path().join("files/notes.pdf");
    let script = format!(
        "upload {}\nlist\nrm notes.pdf\nlist\nWhat is \\\nX?\nquit\n",
        file.display()
    );

    let (stdout, stderr, code) =
        run_dqa_async(config_path, args(&["--yes", "session"]), Some(script)).await;
    assert_eq!(code, Some(0), "stderr={}", stderr);
    assert!(stderr.contains("uploaded successfully"));
    assert!(stdout.contains("--- Documents (1) ---"));
    assert!(stdout.contains("No documents uploaded"));
    assert!(stdout.contains("X is Y."));
}

#[tokio::test(flavor = "multi_thread")]
async fn json_mode_emits_json_lines() {
    let addr = start_stub().await;
    let (_tmp, config_path) = setup_test_env(&format!("http://{}", addr));

    let (stdout, _stderr, code) =
        run_dqa_async(config_path, args(&["--json", "ask", "What is X?"]), None).await;
    assert_eq!(code, Some(0));

    let events: Vec<Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["event"], "query_started");
    assert_eq!(events[1]["panel"]["answer"], "X is Y.");
    assert_eq!(
        events[1]["panel"]["references"],
        json!(["notes.pdf (relevant section)"])
    );
}
