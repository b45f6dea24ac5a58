// src/digest.rs
use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::entry::FeedEntry;
use crate::filter::{Freshness, Verdict};
use crate::targets::Target;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new("<[^>]*>").unwrap());

pub const DEFAULT_BODY_CAP: usize = 120;

/// Drops HTML tags and collapses blank lines; the feed bodies carry raw
/// weibo/article markup.
pub fn strip_tags(raw: &str) -> String {
    let text = TAG_RE.replace_all(raw, "");
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Caps at `cap` characters, appending `...` only when something was cut.
pub fn truncate_chars(s: &str, cap: usize) -> String {
    if s.chars().count() <= cap {
        return s.to_string();
    }
    let mut out: String = s.chars().take(cap).collect();
    out.push_str("...");
    out
}

pub fn digest_title(now: DateTime<Local>) -> String {
    format!("🎸 乐队动态日报 ({})", now.format("%Y-%m-%d"))
}

/// One Markdown block for one band. Only called for targets with accepted
/// entries; the caller omits empty ones.
pub fn render_section(target: &Target, entries: &[(FeedEntry, Verdict)], body_cap: usize) -> String {
    let mut out = format!("### 🎸 {}\n", target.name);
    for (entry, verdict) in entries {
        let icon = entry_icon(verdict);
        let date = entry
            .published
            .map(|d| d.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "未知时间".into());
        out.push_str(&format!("{icon} `{date}`\n"));

        if let Some(body) = &entry.body {
            let text = strip_tags(body);
            if !text.is_empty() {
                out.push_str(&format!("📝 {}\n", truncate_chars(&text, body_cap)));
            }
        }
        out.push_str(&format!("🔗 [{}]({})\n\n", entry.title, entry.link));
    }
    out.push_str("---\n");
    out
}

fn entry_icon(v: &Verdict) -> &'static str {
    if v.freshness == Freshness::Fresh {
        "🆕"
    } else if v.keyword_hit {
        "🎫"
    } else {
        "📌"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Source;

    fn entry(title: &str, body: Option<&str>) -> FeedEntry {
        FeedEntry {
            source: Source::RsshubWeibo,
            title: title.into(),
            body: body.map(str::to_string),
            link: "https://weibo.com/1".into(),
            published: None,
        }
    }

    fn verdict(freshness: Freshness, keyword_hit: bool) -> Verdict {
        Verdict { accepted: true, freshness, keyword_hit }
    }

    #[test]
    fn strips_tags_before_truncating() {
        let cleaned = strip_tags("<p>Tour announced for <b>City</b></p>");
        assert_eq!(truncate_chars(&cleaned, 10), "Tour annou...");
    }

    #[test]
    fn truncation_counts_chars_not_bytes() {
        assert_eq!(truncate_chars("巡演信息公布了", 4), "巡演信息...");
        assert_eq!(truncate_chars("short", 10), "short");
    }

    #[test]
    fn strip_collapses_blank_lines() {
        let got = strip_tags("<div>第一行</div>\n\n  \n<div>第二行</div>");
        assert_eq!(got, "第一行\n第二行");
    }

    #[test]
    fn section_uses_unknown_date_fallback_and_icons() {
        let target = Target { name: "刺猬".into(), uid: None };
        let kept = vec![
            (entry("巡演开票", Some("<b>门票</b>已上架")), verdict(Freshness::Stale, true)),
            (entry("日常", None), verdict(Freshness::Fresh, false)),
        ];
        let got = render_section(&target, &kept, 120);
        assert!(got.starts_with("### 🎸 刺猬\n"));
        assert!(got.contains("🎫 `未知时间`"));
        assert!(got.contains("📝 门票已上架"));
        assert!(got.contains("🔗 [巡演开票](https://weibo.com/1)"));
        assert!(got.contains("🆕"));
        assert!(got.ends_with("---\n"));
    }

    #[test]
    fn empty_body_emits_no_body_line() {
        let target = Target { name: "海朋森".into(), uid: None };
        let kept = vec![(entry("标题", Some("<img src=\"x\">")), verdict(Freshness::Fresh, false))];
        let got = render_section(&target, &kept, 120);
        assert!(!got.contains("📝"));
    }
}
