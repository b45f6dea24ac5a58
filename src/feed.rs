// src/feed.rs
use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use rss::Channel;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::entry::{FeedEntry, Source};
use crate::targets::Target;

const UA: &str = "band-watch/0.1 (+you@example.com)";

pub const DEFAULT_RSSHUB_BASE: &str = "https://rsshub.app";
const GNEWS_BASE: &str = "https://news.google.com/rss/search";
const BING_BASE: &str = "https://www.bing.com/news/search";

/// Everything that can go wrong for one target. Failures stay scoped to the
/// target; the caller logs and moves on.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
    #[error("feed parse failed: {0}")]
    Feed(#[from] rss::Error),
    #[error("bad url: {0}")]
    Url(#[from] url::ParseError),
    #[error("target '{0}' has no uid")]
    MissingUid(String),
    #[error("unrecognized response schema: {0}")]
    UnrecognizedSchema(String),
}

pub fn build_client(connect: Duration, total: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(UA)
        .connect_timeout(connect)
        .timeout(total)
        .build()
}

/// Builds the request URL for a target on an RSS-style source.
pub fn feed_url(source: Source, target: &Target, rsshub_base: &str) -> Result<Url, FetchError> {
    match source {
        Source::RsshubWeibo => {
            let uid = target
                .uid
                .as_deref()
                .ok_or_else(|| FetchError::MissingUid(target.name.clone()))?;
            let base = rsshub_base.trim_end_matches('/');
            Ok(Url::parse(&format!("{base}/weibo/user/{uid}"))?)
        }
        Source::GoogleNews => Ok(Url::parse_with_params(
            GNEWS_BASE,
            &[
                ("q", target.name.as_str()),
                ("hl", "zh-CN"),
                ("gl", "CN"),
                ("ceid", "CN:zh-Hans"),
            ],
        )?),
        Source::BingNews => Ok(Url::parse_with_params(
            BING_BASE,
            &[("q", target.name.as_str()), ("format", "rss")],
        )?),
        // JSON source, handled by the mweibo adapter
        Source::MobileWeibo => Err(FetchError::UnrecognizedSchema(
            "mobile weibo is not an RSS source".into(),
        )),
    }
}

/// One blocking fetch for one target, normalized to `FeedEntry`. Only the
/// first `limit` raw items are considered.
pub fn fetch_entries(
    client: &Client,
    source: Source,
    target: &Target,
    rsshub_base: &str,
    limit: usize,
) -> Result<Vec<FeedEntry>, FetchError> {
    if source == Source::MobileWeibo {
        return crate::mweibo::fetch(client, target, limit);
    }

    let url = feed_url(source, target, rsshub_base)?;
    let resp = client.get(url).send()?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }
    let body = resp.text()?;
    let channel = body.parse::<Channel>()?;

    Ok(channel
        .items()
        .iter()
        .take(limit)
        .map(|item| adapt_item(source, item))
        .collect())
}

fn adapt_item(source: Source, item: &rss::Item) -> FeedEntry {
    FeedEntry {
        source,
        title: item.title().unwrap_or("(无标题)").trim().to_string(),
        body: item.description().map(str::to_string),
        link: item.link().unwrap_or("").to_string(),
        published: item.pub_date().and_then(parse_rfc2822),
    }
}

fn parse_rfc2822(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(s)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rss::ItemBuilder;

    fn target(name: &str, uid: Option<&str>) -> Target {
        Target { name: name.into(), uid: uid.map(str::to_string) }
    }

    #[test]
    fn rsshub_url_uses_uid() {
        let u = feed_url(Source::RsshubWeibo, &target("刺猬", Some("1234")), DEFAULT_RSSHUB_BASE)
            .unwrap();
        assert_eq!(u.as_str(), "https://rsshub.app/weibo/user/1234");
    }

    #[test]
    fn rsshub_url_without_uid_fails() {
        let err = feed_url(Source::RsshubWeibo, &target("刺猬", None), DEFAULT_RSSHUB_BASE)
            .unwrap_err();
        assert!(matches!(err, FetchError::MissingUid(_)));
    }

    #[test]
    fn gnews_url_encodes_band_name() {
        let u = feed_url(Source::GoogleNews, &target("万能青年旅店", None), DEFAULT_RSSHUB_BASE)
            .unwrap();
        assert!(u.as_str().starts_with("https://news.google.com/rss/search?q="));
        assert!(u.query().unwrap().contains("ceid=CN%3Azh-Hans"));
    }

    #[test]
    fn adapt_item_parses_pub_date() {
        let item = ItemBuilder::default()
            .title(Some("刺猬 巡演官宣".into()))
            .link(Some("https://weibo.com/123".into()))
            .description(Some("<p>开票了</p>".into()))
            .pub_date(Some("Wed, 19 Aug 2026 08:00:00 +0800".into()))
            .build();
        let e = adapt_item(Source::RsshubWeibo, &item);
        assert_eq!(e.title, "刺猬 巡演官宣");
        assert_eq!(e.link, "https://weibo.com/123");
        let ts = e.published.unwrap();
        assert_eq!(ts.format("%Y-%m-%d %H:%M").to_string(), "2026-08-19 00:00");
    }

    #[test]
    fn adapt_item_tolerates_missing_fields() {
        let item = ItemBuilder::default().build();
        let e = adapt_item(Source::BingNews, &item);
        assert_eq!(e.title, "(无标题)");
        assert!(e.published.is_none());
        assert!(e.body.is_none());
    }
}
