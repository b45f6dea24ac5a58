// src/notify.rs
use reqwest::blocking::Client;
use tracing::{info, warn};

pub const KEY_ENV: &str = "SC_KEY";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PushOutcome {
    Delivered,
    Skipped,
    Failed,
}

fn push_url(key: &str) -> String {
    format!("https://sctapi.ftqq.com/{key}.send")
}

fn usable_key(key: Option<&str>) -> Option<&str> {
    key.map(str::trim).filter(|k| !k.is_empty())
}

/// ServerChan push: one form POST with title + Markdown body. Without a
/// key the payload goes to the log instead; delivery failures are logged
/// and swallowed so the run still exits clean.
pub fn push(client: &Client, key: Option<&str>, title: &str, body: &str) -> PushOutcome {
    let key = match usable_key(key) {
        Some(k) => k,
        None => {
            info!("{KEY_ENV} not set; skipping push");
            info!("would send: {title}\n{body}");
            return PushOutcome::Skipped;
        }
    };

    let result = client
        .post(push_url(key))
        .form(&[("title", title), ("desp", body)])
        .send();

    match result {
        Ok(resp) if resp.status().is_success() => {
            info!(status = %resp.status(), "push delivered");
            PushOutcome::Delivered
        }
        Ok(resp) => {
            warn!(status = %resp.status(), "push endpoint rejected request");
            PushOutcome::Failed
        }
        Err(e) => {
            warn!(error = %e, "push failed");
            PushOutcome::Failed
        }
    }
}
