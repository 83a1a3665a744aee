use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::{Arc, Mutex};
use std::thread;

pub fn render_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_catalog-render"))
}

pub fn fetch_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_catalog-fetch"))
}

/// Run a helper binary from `cwd` so no stray `catalogmd.json` is picked up.
pub fn run_binary(binary: &Path, cwd: &Path, args: &[&str]) -> Result<Output> {
    let mut cmd = Command::new(binary);
    cmd.args(args).current_dir(cwd).env_remove("CATALOGMD_LOG");
    cmd.output()
        .with_context(|| format!("failed to run command: {:?}", cmd))
}

pub fn write_json(dir: &Path, name: &str, value: &Value) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{name}.json"));
    fs::write(&path, serde_json::to_string_pretty(value)?)?;
    Ok(path)
}

/// Canned HTTP response.
#[derive(Clone, Debug)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn json(value: &Value) -> Self {
        Self {
            status: 200,
            body: value.to_string(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: String::from("{\"error\":true}"),
        }
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

/// Minimal HTTP/1.1 server answering scripted replies per path.
///
/// Each path pops its replies in order and repeats the last one once the
/// script runs out. Unknown paths get a 404.
pub struct StubServer {
    base_url: String,
    hits: Arc<Mutex<BTreeMap<String, usize>>>,
}

impl StubServer {
    pub fn start(routes: Vec<(&str, Vec<Reply>)>) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").context("binding stub server")?;
        let base_url = format!("http://{}", listener.local_addr()?);
        let scripts: BTreeMap<String, VecDeque<Reply>> = routes
            .into_iter()
            .map(|(path, replies)| (path.to_string(), replies.into_iter().collect()))
            .collect();
        let scripts = Arc::new(Mutex::new(scripts));
        let hits = Arc::new(Mutex::new(BTreeMap::new()));

        let thread_hits = Arc::clone(&hits);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                let _ = handle(stream, &scripts, &thread_hits);
            }
        });

        Ok(Self { base_url, hits })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn hits(&self, path: &str) -> usize {
        let hits = self.hits.lock().unwrap_or_else(|err| err.into_inner());
        hits.get(path).copied().unwrap_or(0)
    }
}

fn handle(
    stream: TcpStream,
    scripts: &Mutex<BTreeMap<String, VecDeque<Reply>>>,
    hits: &Mutex<BTreeMap<String, usize>>,
) -> Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header)? == 0 || header == "\r\n" || header == "\n" {
            break;
        }
    }

    let path = request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or("/")
        .to_string();
    *hits
        .lock()
        .unwrap_or_else(|err| err.into_inner())
        .entry(path.clone())
        .or_insert(0) += 1;

    let mut scripts = scripts.lock().unwrap_or_else(|err| err.into_inner());
    let scripted = match scripts.get_mut(&path) {
        Some(queue) if queue.len() > 1 => queue.pop_front(),
        Some(queue) => queue.front().cloned(),
        None => None,
    };
    drop(scripts);
    let reply = scripted.unwrap_or_else(|| Reply::status(404));

    let mut stream = stream;
    write!(
        stream,
        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        reply.status,
        reply.body.len(),
        reply.body
    )?;
    stream.flush()?;
    Ok(())
}
