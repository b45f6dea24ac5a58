// src/entry.rs
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    RsshubWeibo,
    MobileWeibo,
    GoogleNews,
    BingNews,
}

impl Source {
    pub fn label(&self) -> &'static str {
        match self {
            Source::RsshubWeibo => "rsshub",
            Source::MobileWeibo => "mweibo",
            Source::GoogleNews => "gnews",
            Source::BingNews => "bing",
        }
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rsshub" => Ok(Source::RsshubWeibo),
            "mweibo" => Ok(Source::MobileWeibo),
            "gnews" => Ok(Source::GoogleNews),
            "bing" => Ok(Source::BingNews),
            other => Err(format!("unknown source '{other}' (expected rsshub|mweibo|gnews|bing)")),
        }
    }
}

/// One normalized feed item, whatever the source shape was.
#[derive(Clone, Debug)]
pub struct FeedEntry {
    pub source: Source,
    pub title: String,
    pub body: Option<String>, // may still carry HTML, stripped at render time
    pub link: String,
    pub published: Option<DateTime<Utc>>,
}

impl fmt::Display for FeedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = self
            .published
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".into());
        write!(f, "[{}] {} | {} | {}", self.label(), date, self.title, self.link)
    }
}

impl FeedEntry {
    fn label(&self) -> &'static str {
        self.source.label()
    }
}
