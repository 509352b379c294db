//! Common test utilities for epicgrid integration tests.
//!
//! Provides `TestEnv` for runs that never read the user's real
//! `~/.config/epicgrid/report.kdl`, and `FakeJira`, a local HTTP endpoint
//! that answers search requests with canned JSON.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;

use assert_cmd::Command;
use serde_json::{Value, json};
pub use tempfile::TempDir;

/// A test environment with an isolated home directory.
pub struct TestEnv {
    pub home: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            home: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the epicgrid binary with isolated config lookup.
    pub fn epicgrid(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_epicgrid"));
        cmd.current_dir(self.home.path());
        cmd.env("HOME", self.home.path());
        cmd.env("XDG_CONFIG_HOME", self.home.path().join(".config"));
        cmd.env_remove("EPICGRID_JIRA_URL");
        cmd.env_remove("RUST_LOG");
        cmd
    }

    /// Write a report.kdl into the environment and return its path.
    pub fn write_config(&self, contents: &str) -> PathBuf {
        let path = self.home.path().join("report.kdl");
        std::fs::write(&path, contents).unwrap();
        path
    }

    pub fn path(&self) -> &std::path::Path {
        self.home.path()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Config used by most integration tests: two WBS rows, two fiscal years,
/// and queries the fake server can route on.
pub const TEST_CONFIG: &str = r#"
title "Test grid"
epic-query "epics"
milestone-query "milestones"
fiscal-years "FY16" "FY17"
wbs "A.01" "Storage"
wbs "A.02" "Queries"
"#;

fn epic(key: &str, summary: &str, status: &str, wbs: Option<&str>, points: Option<u32>) -> Value {
    json!({
        "key": key,
        "fields": {
            "summary": summary,
            "status": {"name": status},
            "customfield_10500": wbs,
            "customfield_10202": points,
            "issuelinks": []
        }
    })
}

/// Epics exercising every classification path.
pub fn sample_epics() -> Value {
    let mut blocked = epic("DM-3", "S17Query engine", "In Progress", Some("A.02"), Some(40));
    blocked["fields"]["issuelinks"] = json!([
        {
            "type": {"name": "Blocks", "inward": "is blocked by", "outward": "blocks"},
            "inwardIssue": {"key": "DM-1", "fields": {"summary": "W17Storage layer"}}
        },
        {
            "type": {"name": "Blocks", "inward": "is blocked by", "outward": "blocks"},
            "inwardIssue": {"key": "EXT-9", "fields": {"summary": "External dependency"}}
        }
    ]);

    json!({
        "total": 7,
        "issues": [
            epic("DM-1", "W17Storage layer", "To Do", Some("A.01"), Some(26)),
            epic("DM-2", "FY16Finished prototype", "Done", Some("A.01"), Some(79)),
            blocked,
            epic("DM-4", "Loose end", "To Do", Some("A.01"), None),
            epic("DM-5", "FY17Wrong area", "To Do", Some("Z.99"), Some(5)),
            epic("DM-6", "FY17 KPM Measurement", "To Do", Some("A.01"), Some(5)),
            epic("DM-7", "W30Too far out", "To Do", Some("A.02"), Some(5))
        ]
    })
}

pub fn sample_milestones() -> Value {
    json!({
        "issues": [
            {
                "key": "DLP-1",
                "fields": {
                    "summary": "Prototype release",
                    "status": {"name": "To Do"},
                    "fixVersions": [{"name": "W16"}]
                }
            }
        ]
    })
}

/// A canned HTTP response.
#[derive(Clone)]
struct Canned {
    status: u16,
    body: String,
}

/// Local stand-in for the Jira search endpoint.
///
/// Requests whose query string contains `jql=milestones` get the milestone
/// body; every other request gets the epic body.
pub struct FakeJira {
    pub url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeJira {
    pub fn start(epics: Value, milestones: Value) -> Self {
        Self::serve(
            Canned {
                status: 200,
                body: epics.to_string(),
            },
            Canned {
                status: 200,
                body: milestones.to_string(),
            },
        )
    }

    /// Answer every request with the given status and body.
    pub fn failing(status: u16, body: &str) -> Self {
        let canned = Canned {
            status,
            body: body.to_string(),
        };
        Self::serve(canned.clone(), canned)
    }

    /// Request lines received so far (e.g., `GET /rest/api/2/search?... HTTP/1.1`).
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn serve(epics: Canned, milestones: Canned) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                handle(stream, &seen, &epics, &milestones);
            }
        });

        Self { url, requests }
    }
}

/// Answer one request. The request line is recorded before the response is
/// written, so it is visible once the client has its answer.
fn handle(
    mut stream: TcpStream,
    seen: &Mutex<Vec<String>>,
    epics: &Canned,
    milestones: &Canned,
) -> Option<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let request = String::from_utf8_lossy(&buf);
    let request_line = request.lines().next()?.to_string();
    let canned = if request_line.contains("jql=milestones") {
        milestones
    } else {
        epics
    };
    seen.lock().unwrap().push(request_line);

    let response = format!(
        "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        canned.status,
        canned.body.len(),
        canned.body
    );
    stream.write_all(response.as_bytes()).ok()?;
    stream.flush().ok()
}
