//! Records persisted between pipeline steps

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entry of the channel listing, exactly as yt-dlp emitted it.
///
/// The full JSON object is kept so that every metadata file written from it
/// reads back field-for-field; typed accessors cover the fields the pipeline
/// actually looks at.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingRecord {
    fields: Map<String, Value>,
}

impl ListingRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn id(&self) -> Option<&str> {
        self.str_field("id")
    }

    pub fn title(&self) -> Option<&str> {
        self.str_field("title")
    }

    /// Canonical page URL, falling back to the flat-playlist `url` field
    pub fn url(&self) -> Option<&str> {
        self.str_field("webpage_url").or_else(|| self.str_field("url"))
    }

    pub fn duration_string(&self) -> Option<&str> {
        self.str_field("duration_string")
    }

    pub fn view_count(&self) -> Option<u64> {
        self.fields.get("view_count").and_then(Value::as_u64)
    }

    pub fn description(&self) -> Option<&str> {
        self.str_field("description")
    }
}

/// Outcome of checking one expected video against its download directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub id: Option<String>,
    pub title: Option<String>,
    pub verified: bool,
    pub issues: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_file: Option<String>,
}

impl VerificationRecord {
    pub fn new(id: Option<&str>, title: Option<&str>) -> Self {
        Self {
            id: id.map(String::from),
            title: title.map(String::from),
            verified: false,
            issues: Vec::new(),
            video_file: None,
        }
    }

    pub fn issue(&mut self, issue: impl Into<String>) {
        self.issues.push(issue.into());
    }

    /// Mark verified iff no issue was recorded
    pub fn finish(mut self) -> Self {
        self.verified = self.issues.is_empty();
        self
    }
}
