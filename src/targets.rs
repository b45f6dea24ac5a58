// src/targets.rs
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// One watched band. `uid` is the Weibo account id for UID-keyed sources;
/// the name doubles as the search phrase for keyword-keyed sources.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    pub uid: Option<String>,
}

/// Reads the band list. A missing or unreadable file is a warning, not an
/// error: the run continues with zero targets and does nothing.
pub fn load(path: &Path) -> Vec<Target> {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "band list unreadable; no targets");
            return Vec::new();
        }
    };
    let targets = parse(&text);
    info!(count = targets.len(), path = %path.display(), "loaded band list");
    targets
}

/// Line format: `name` or `name,uid`. Blank lines and `#` comments skipped.
/// No uid validation, no duplicate detection.
fn parse(text: &str) -> Vec<Target> {
    let mut out = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.splitn(2, ',');
        let name = parts.next().unwrap_or("").trim();
        if name.is_empty() {
            continue;
        }
        let uid = parts
            .next()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string);
        out.push(Target { name: name.to_string(), uid });
    }
    out
}
