// API client module: a small blocking HTTP client for the pinboard.in v1
// API. Every call is a single GET carrying the auth token and
// `format=json`; responses are decoded with serde into the wire types
// below. The network itself sits behind `Transport` so tests can replay
// canned responses.

use std::collections::BTreeMap;

use log::debug;
use reqwest::blocking::Client;
use reqwest::Url;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ApiError;

/// Fixed endpoint every method path is appended to.
pub const API_BASE: &str = "https://api.pinboard.in/v1/";

/// The service rejects `posts/recent` with more tags than this.
pub const MAX_RECENT_TAGS: usize = 3;

/// Upper bound for `posts/recent?count=`.
pub const MAX_RECENT_COUNT: u8 = 100;

/// Executes a prepared GET request and hands back the body of a
/// successful response. Non-success statuses become `ApiError::Status`.
pub trait Transport {
    fn get(&self, method: &str, url: &Url) -> Result<String, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, method: &str, url: &Url) -> Result<String, ApiError> {
        (**self).get(method, url)
    }
}

/// `Transport` backed by a reqwest blocking client.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(concat!("pinboard-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Client)?;
        Ok(HttpTransport { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, method: &str, url: &Url) -> Result<String, ApiError> {
        let transport = |source: reqwest::Error| ApiError::Transport {
            method: method.to_string(),
            source,
        };
        let res = self.client.get(url.clone()).send().map_err(transport)?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().unwrap_or_default();
            return Err(ApiError::Status {
                method: method.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        res.text().map_err(transport)
    }
}

/// Wire encoding for every boolean the service exchanges.
pub fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

mod yes_no_flag {
    use serde::de::{Error as _, Unexpected};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(super::yes_no(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.as_str() {
            "yes" => Ok(true),
            "no" | "" => Ok(false),
            other => Err(D::Error::invalid_value(
                Unexpected::Str(other),
                &"\"yes\" or \"no\"",
            )),
        }
    }
}

/// Counts arrive either as JSON numbers or as numeric strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum LenientCount {
    Number(u64),
    Text(String),
}

fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    match LenientCount::deserialize(deserializer)? {
        LenientCount::Number(n) => Ok(n),
        LenientCount::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("expected a non-negative integer, got {s:?}"))),
    }
}

/// A bookmark ("post") as returned by `posts/all` and `posts/recent`.
///
/// Identity is the `href`: two bookmarks compare equal when their URLs do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bookmark {
    pub href: String,
    /// The bookmark title.
    pub description: String,
    /// Long-form notes attached to the bookmark.
    #[serde(default)]
    pub extended: String,
    #[serde(default)]
    pub meta: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub time: String,
    #[serde(default, with = "yes_no_flag")]
    pub shared: bool,
    #[serde(default, with = "yes_no_flag")]
    pub toread: bool,
    /// Whitespace-separated tag list, case preserved.
    #[serde(default)]
    pub tags: String,
}

impl Bookmark {
    pub fn tag_list(&self) -> impl Iterator<Item = &str> {
        self.tags.split_whitespace()
    }
}

impl PartialEq for Bookmark {
    fn eq(&self, other: &Self) -> bool {
        self.href == other.href
    }
}

impl Eq for Bookmark {}

/// Reply of `posts/recent`.
#[derive(Debug, Clone, Deserialize)]
pub struct RecentBookmarks {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub posts: Vec<Bookmark>,
}

/// A note. `text` is only present when fetched through `notes/<id>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Note {
    pub id: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub length: u64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NoteList {
    #[serde(default)]
    notes: Vec<Note>,
}

#[derive(Debug, Deserialize)]
struct LastUpdate {
    update_time: String,
}

#[derive(Deserialize)]
struct TagCount(#[serde(deserialize_with = "lenient_u64")] u64);

/// Status string returned by mutating calls (`posts/add`, `posts/delete`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResultCode {
    pub result_code: String,
}

impl ResultCode {
    pub const DONE: &'static str = "done";
    pub const NOT_FOUND: &'static str = "item not found";

    pub fn is_done(&self) -> bool {
        self.result_code == Self::DONE
    }
}

/// Outcome of deleting a single bookmark. `NotFound` is an ordinary value
/// so bulk deletes can keep going.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Done,
    NotFound,
    Other(String),
}

impl From<ResultCode> for DeleteOutcome {
    fn from(code: ResultCode) -> Self {
        match code.result_code.as_str() {
            ResultCode::DONE => DeleteOutcome::Done,
            ResultCode::NOT_FOUND => DeleteOutcome::NotFound,
            _ => DeleteOutcome::Other(code.result_code),
        }
    }
}

/// Parameters for `posts/add`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewBookmark {
    pub url: String,
    pub title: String,
    pub extended: Option<String>,
    pub tags: Vec<String>,
    /// Overwrite an existing bookmark for the same URL.
    pub replace: bool,
    /// Publicly visible.
    pub shared: bool,
    /// Put on the reading list.
    pub toread: bool,
}

impl NewBookmark {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        NewBookmark {
            url: url.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    fn params(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("url", Some(self.url.clone())),
            ("description", Some(self.title.clone())),
            ("extended", self.extended.clone()),
            ("tags", join_tags(&self.tags)),
            ("replace", Some(yes_no(self.replace).to_string())),
            ("shared", Some(yes_no(self.shared).to_string())),
            ("toread", Some(yes_no(self.toread).to_string())),
        ]
    }
}

/// Tags travel as one space-separated parameter, never repeated keys.
fn join_tags(tags: &[String]) -> Option<String> {
    let joined = tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!joined.is_empty()).then_some(joined)
}

fn redacted(url: &Url) -> Url {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "auth_token" {
                "***".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();
    let mut shown = url.clone();
    shown.query_pairs_mut().clear().extend_pairs(pairs);
    shown
}

/// Client for the pinboard.in API. Holds the base query (auth token and
/// response format) that every call is merged into.
pub struct PinboardApi<T = HttpTransport> {
    transport: T,
    query: Vec<(&'static str, String)>,
}

impl PinboardApi<HttpTransport> {
    /// Create a client that talks to the real service.
    pub fn new(auth_token: &str) -> Result<Self, ApiError> {
        Ok(Self::with_transport(auth_token, HttpTransport::new()?))
    }
}

impl<T: Transport> PinboardApi<T> {
    pub fn with_transport(auth_token: &str, transport: T) -> Self {
        PinboardApi {
            transport,
            query: vec![
                ("auth_token", auth_token.to_string()),
                ("format", "json".to_string()),
            ],
        }
    }

    /// Build the full request URL for `method`. Parameters that are `None`
    /// or empty are left out.
    pub fn build_url(
        &self,
        method: &str,
        params: &[(&str, Option<String>)],
    ) -> Result<Url, ApiError> {
        let extra = params.iter().filter_map(|(key, value)| match value {
            Some(v) if !v.is_empty() => Some((*key, v.as_str())),
            _ => None,
        });
        let query = self
            .query
            .iter()
            .map(|(key, value)| (*key, value.as_str()))
            .chain(extra);
        Url::parse_with_params(&format!("{API_BASE}{method}"), query)
            .map_err(|e| ApiError::InvalidArgument(format!("cannot build URL for {method}: {e}")))
    }

    /// Issue one GET for `method` and decode the JSON reply. No retries.
    pub fn call_method<R: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, Option<String>)],
    ) -> Result<R, ApiError> {
        let url = self.build_url(method, params)?;
        debug!("call_method {} url={}", method, redacted(&url));
        let body = self.transport.get(method, &url)?;
        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            method: method.to_string(),
            source,
        })
    }

    /// Every bookmark in the account, in whatever order the service returns.
    pub fn get_all_bookmarks(&self) -> Result<Vec<Bookmark>, ApiError> {
        self.call_method("posts/all", &[])
    }

    /// Most recent bookmarks, optionally limited to those carrying all of
    /// `tags` (at most three) and to `count` entries (1..=100).
    pub fn get_recent_bookmarks(
        &self,
        tags: &[String],
        count: Option<u8>,
    ) -> Result<RecentBookmarks, ApiError> {
        if tags.len() > MAX_RECENT_TAGS {
            return Err(ApiError::InvalidArgument(format!(
                "at most {MAX_RECENT_TAGS} tags may be given, got {}",
                tags.len()
            )));
        }
        if let Some(count) = count {
            if !(1..=MAX_RECENT_COUNT).contains(&count) {
                return Err(ApiError::InvalidArgument(format!(
                    "count must be between 1 and {MAX_RECENT_COUNT}, got {count}"
                )));
            }
        }
        self.call_method(
            "posts/recent",
            &[
                ("tag", join_tags(tags)),
                ("count", count.map(|c| c.to_string())),
            ],
        )
    }

    pub fn delete_bookmark(&self, url: &str) -> Result<DeleteOutcome, ApiError> {
        let code: ResultCode = self.call_method("posts/delete", &[("url", Some(url.to_string()))])?;
        debug!("posts/delete {} -> {}", url, code.result_code);
        Ok(code.into())
    }

    /// Create a bookmark, or update it when `replace` is set.
    pub fn add_bookmark(&self, bookmark: &NewBookmark) -> Result<ResultCode, ApiError> {
        self.call_method("posts/add", &bookmark.params())
    }

    /// Tag cloud: tag name to usage count, ordered by name. Names are
    /// HTML-entity unescaped.
    pub fn get_tags(&self) -> Result<BTreeMap<String, u64>, ApiError> {
        let reply: serde_json::Value = self.call_method("tags/get", &[])?;
        let mut tags = BTreeMap::new();
        // An account without tags gets `[]` instead of `{}`.
        if matches!(&reply, serde_json::Value::Array(items) if items.is_empty()) {
            return Ok(tags);
        }
        let counts: BTreeMap<String, TagCount> =
            serde_json::from_value(reply).map_err(|source| ApiError::Decode {
                method: "tags/get".to_string(),
                source,
            })?;
        for (name, TagCount(count)) in counts {
            let name = html_escape::decode_html_entities(&name).into_owned();
            *tags.entry(name).or_insert(0) += count;
        }
        Ok(tags)
    }

    pub fn rename_tag(&self, old: &str, new: &str) -> Result<(), ApiError> {
        let _: serde_json::Value = self.call_method(
            "tags/rename",
            &[("old", Some(old.to_string())), ("new", Some(new.to_string()))],
        )?;
        Ok(())
    }

    /// Remove a tag from every bookmark. The bookmarks themselves stay.
    pub fn delete_tag(&self, tag: &str) -> Result<(), ApiError> {
        let _: serde_json::Value = self.call_method("tags/delete", &[("tag", Some(tag.to_string()))])?;
        Ok(())
    }

    /// Metadata of every note. Bodies are not included.
    pub fn get_all_notes(&self) -> Result<Vec<Note>, ApiError> {
        let list: NoteList = self.call_method("notes/list", &[])?;
        Ok(list.notes)
    }

    /// A single note including its text, or `None` when the service
    /// answers 404.
    pub fn get_note(&self, id: &str) -> Result<Option<Note>, ApiError> {
        // Note IDs are hex digests; anything else could rewrite the path.
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ApiError::InvalidArgument(format!("invalid note id {id:?}")));
        }
        match self.call_method(&format!("notes/{id}"), &[]) {
            Ok(note) => Ok(Some(note)),
            Err(e) if e.status() == Some(404) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Fetch only the body of a note. One request per call, nothing cached.
    pub fn fetch_note_text(&self, id: &str) -> Result<Option<String>, ApiError> {
        Ok(self.get_note(id)?.map(|note| note.text.unwrap_or_default()))
    }

    /// Timestamp of the most recent change to any bookmark.
    pub fn get_last_update(&self) -> Result<String, ApiError> {
        let update: LastUpdate = self.call_method("posts/update", &[])?;
        Ok(update.update_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unused;

    impl Transport for Unused {
        fn get(&self, _method: &str, url: &Url) -> Result<String, ApiError> {
            panic!("unexpected request to {url}");
        }
    }

    #[test]
    fn logged_urls_hide_the_token() {
        let api = PinboardApi::with_transport("joe:SECRET", Unused);
        let url = api
            .build_url("posts/delete", &[("url", Some("https://example.com/?a=1".into()))])
            .unwrap();
        let shown = redacted(&url);

        assert!(!shown.as_str().contains("SECRET"));
        let pairs: Vec<(String, String)> = shown
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("auth_token".to_string(), "***".to_string()),
                ("format".to_string(), "json".to_string()),
                ("url".to_string(), "https://example.com/?a=1".to_string()),
            ]
        );
        assert_eq!(shown.path(), "/v1/posts/delete");
    }

    #[test]
    fn bad_tag_count_keeps_the_detail() {
        struct Reply;
        impl Transport for Reply {
            fn get(&self, _method: &str, _url: &Url) -> Result<String, ApiError> {
                Ok(r#"{"python": "many"}"#.to_string())
            }
        }
        let err = PinboardApi::with_transport("joe:SECRET", Reply)
            .get_tags()
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
        assert!(err.to_string().contains("non-negative integer"), "{err}");
    }
}
