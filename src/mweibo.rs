// src/mweibo.rs
//
// Mobile Weibo JSON adapter. The m.weibo.cn container API wraps the
// timeline in {"ok":1,"data":{"cards":[{"mblog":{...}}]}}; anything else
// is reported as an unrecognized schema instead of defaulting fields.
use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::digest::{strip_tags, truncate_chars};
use crate::entry::{FeedEntry, Source};
use crate::feed::FetchError;
use crate::targets::Target;

const BASE: &str = "https://m.weibo.cn/api/container/getIndex";

// created_at comes back like "Tue Aug 19 16:03:48 +0800 2025"
const CREATED_AT_FMT: &str = "%a %b %d %H:%M:%S %z %Y";

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    ok: i64,
    data: Option<Data>,
}

#[derive(Debug, Deserialize)]
struct Data {
    #[serde(default)]
    cards: Vec<Card>,
}

#[derive(Debug, Deserialize)]
struct Card {
    mblog: Option<Mblog>,
}

#[derive(Debug, Deserialize)]
struct Mblog {
    #[serde(default)]
    text: String,
    #[serde(default)]
    created_at: String,
    #[serde(default)]
    bid: String,
    #[serde(default)]
    id: String,
}

pub fn fetch(client: &Client, target: &Target, limit: usize) -> Result<Vec<FeedEntry>, FetchError> {
    let uid = target
        .uid
        .as_deref()
        .ok_or_else(|| FetchError::MissingUid(target.name.clone()))?;

    let containerid = format!("107603{uid}");
    let url = Url::parse_with_params(
        BASE,
        &[
            ("type", "uid"),
            ("value", uid),
            ("containerid", containerid.as_str()),
        ],
    )?;

    let resp = client.get(url).send()?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }
    let val: Value = resp.json()?;
    let entries = adapt_envelope(&val, limit)?;
    Ok(entries)
}

fn adapt_envelope(val: &Value, limit: usize) -> Result<Vec<FeedEntry>, FetchError> {
    let env: Envelope = serde_json::from_value(val.clone())
        .map_err(|e| FetchError::UnrecognizedSchema(format!("envelope: {e}")))?;
    if env.ok != 1 {
        return Err(FetchError::UnrecognizedSchema(format!("ok={}", env.ok)));
    }
    let data = env
        .data
        .ok_or_else(|| FetchError::UnrecognizedSchema("missing data".into()))?;

    Ok(data
        .cards
        .iter()
        .filter_map(|c| c.mblog.as_ref())
        .take(limit)
        .map(to_entry)
        .collect())
}

// Weibo posts have no separate headline; the first line stands in for one.
const TITLE_CAP: usize = 40;

fn to_entry(m: &Mblog) -> FeedEntry {
    let id = if m.bid.is_empty() { &m.id } else { &m.bid };
    FeedEntry {
        source: Source::MobileWeibo,
        title: headline(&m.text),
        body: Some(m.text.clone()),
        link: format!("https://m.weibo.cn/status/{id}"),
        published: parse_created_at(&m.created_at),
    }
}

fn headline(raw: &str) -> String {
    let text = strip_tags(raw);
    let first = text.lines().find(|l| !l.is_empty()).unwrap_or("(无标题)");
    truncate_chars(first, TITLE_CAP)
}

fn parse_created_at(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(s, CREATED_AT_FMT)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn adapts_well_formed_envelope() {
        let val = json!({
            "ok": 1,
            "data": { "cards": [
                { "mblog": {
                    "text": "巡演来了 <a href=\"x\">全文</a>",
                    "created_at": "Tue Aug 18 16:03:48 +0800 2026",
                    "bid": "NqLxyAbCd",
                    "id": "500123"
                }},
                { "card_type": 9 }
            ]}
        });
        let got = adapt_envelope(&val, 5).unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].title, "巡演来了 全文");
        assert_eq!(got[0].link, "https://m.weibo.cn/status/NqLxyAbCd");
        assert!(got[0].published.is_some());
    }

    #[test]
    fn headline_is_single_line_and_capped() {
        let got = headline("<p>十月巡演日程公布</p>\n<p>北京 上海 成都</p>");
        assert_eq!(got, "十月巡演日程公布");
        assert!(!got.contains('\n'));

        let long = "一".repeat(60);
        let capped = headline(&long);
        assert_eq!(capped.chars().count(), TITLE_CAP + 3);
        assert!(capped.ends_with("..."));

        assert_eq!(headline("<img src=\"x\">"), "(无标题)");
    }

    #[test]
    fn not_ok_envelope_is_schema_error() {
        let val = json!({ "ok": 0, "msg": "这里还没有内容" });
        let err = adapt_envelope(&val, 5).unwrap_err();
        assert!(matches!(err, FetchError::UnrecognizedSchema(_)));
    }

    #[test]
    fn limit_caps_cards() {
        let card = json!({ "mblog": { "text": "t", "created_at": "", "bid": "b", "id": "1" } });
        let cards = vec![card.clone(), card.clone(), card];
        let val = json!({ "ok": 1, "data": { "cards": cards } });
        assert_eq!(adapt_envelope(&val, 2).unwrap().len(), 2);
    }

    #[test]
    fn unparseable_created_at_is_none() {
        assert!(parse_created_at("昨天 12:00").is_none());
        assert!(parse_created_at("").is_none());
    }
}
