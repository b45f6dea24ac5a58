// src/filter.rs
use chrono::{DateTime, Duration, Utc};
use std::str::FromStr;

use crate::entry::FeedEntry;

// 演出/票务类关键词 (全部小写)
pub const SPECTACLE_KEYWORDS: &[&str] = &[
    "巡演", "演出", "门票", "开票", "售票", "音乐节", "专场", "livehouse",
    "tour", "live", "ticket", "festival", "show",
];

/// How freshness and keyword hits combine into acceptance. The source
/// variants disagreed here; the rule is explicit and picked once per run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AcceptRule {
    FreshOnly,
    KeywordOnly,
    FreshOrKeyword,
    FreshAndKeyword,
}

impl FromStr for AcceptRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fresh-only" => Ok(AcceptRule::FreshOnly),
            "keyword-only" => Ok(AcceptRule::KeywordOnly),
            "fresh-or-keyword" => Ok(AcceptRule::FreshOrKeyword),
            "fresh-and-keyword" => Ok(AcceptRule::FreshAndKeyword),
            other => Err(format!(
                "unknown accept rule '{other}' (expected fresh-only|keyword-only|fresh-or-keyword|fresh-and-keyword)"
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale,
    Unknown,
}

/// Outcome for one entry; freshness and keyword hit are kept so the
/// formatter can pick an icon.
#[derive(Clone, Copy, Debug)]
pub struct Verdict {
    pub accepted: bool,
    pub freshness: Freshness,
    pub keyword_hit: bool,
}

#[derive(Clone, Debug)]
pub struct FilterPolicy {
    /// Matched against the lowercased title; run `normalized` after
    /// construction so the terms are lowercase too.
    pub whitelist: Vec<String>,
    pub blacklist: Vec<String>,
    pub require_name: bool,
    pub fresh_days: i64,
    pub unknown_date_is_fresh: bool,
    pub accept: AcceptRule,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        FilterPolicy {
            whitelist: Vec::new(),
            blacklist: Vec::new(),
            require_name: false,
            fresh_days: 2,
            unknown_date_is_fresh: false,
            accept: AcceptRule::FreshOrKeyword,
        }
    }
}

impl FilterPolicy {
    /// Lowercases the term tables once, up front, so `evaluate` does no
    /// per-entry term normalization.
    pub fn normalized(mut self) -> Self {
        for w in &mut self.whitelist {
            *w = w.to_lowercase();
        }
        for b in &mut self.blacklist {
            *b = b.to_lowercase();
        }
        self
    }

    /// Decision order: whitelist → blacklist → band name → accept rule.
    /// All substring checks are case-insensitive.
    pub fn evaluate(&self, entry: &FeedEntry, band: &str, now: DateTime<Utc>) -> Verdict {
        let title = entry.title.to_lowercase();
        let freshness = self.freshness_of(entry, now);
        let keyword_hit = has_spectacle_keyword(entry);

        let rejected = (!self.whitelist.is_empty()
            && !self.whitelist.iter().any(|w| title.contains(w.as_str())))
            || self.blacklist.iter().any(|b| title.contains(b.as_str()))
            || (self.require_name && !title.contains(&band.to_lowercase()));
        if rejected {
            return Verdict { accepted: false, freshness, keyword_hit };
        }

        let is_fresh = match freshness {
            Freshness::Fresh => true,
            Freshness::Stale => false,
            Freshness::Unknown => self.unknown_date_is_fresh,
        };
        let accepted = match self.accept {
            AcceptRule::FreshOnly => is_fresh,
            AcceptRule::KeywordOnly => keyword_hit,
            AcceptRule::FreshOrKeyword => is_fresh || keyword_hit,
            AcceptRule::FreshAndKeyword => is_fresh && keyword_hit,
        };
        Verdict { accepted, freshness, keyword_hit }
    }

    // ≤N days is fresh, boundary inclusive
    fn freshness_of(&self, entry: &FeedEntry, now: DateTime<Utc>) -> Freshness {
        match entry.published {
            Some(ts) => {
                if now.signed_duration_since(ts) <= Duration::days(self.fresh_days) {
                    Freshness::Fresh
                } else {
                    Freshness::Stale
                }
            }
            None => Freshness::Unknown,
        }
    }
}

fn has_spectacle_keyword(entry: &FeedEntry) -> bool {
    let mut hay = entry.title.to_lowercase();
    if let Some(body) = &entry.body {
        hay.push(' ');
        hay.push_str(&body.to_lowercase());
    }
    SPECTACLE_KEYWORDS.iter().any(|k| hay.contains(k))
}
