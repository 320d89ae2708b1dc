use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One ordered group of tags, edited as a single line of the settings form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagGroup(pub Vec<String>);

impl TagGroup {
    pub fn new(tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(tags.into_iter().map(Into::into).collect())
    }

    /// Line representation: tags joined with ", ".
    pub fn to_line(&self) -> String {
        self.0.join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub post_interval_minutes: u32,
    pub filter_id: Option<i64>,
    pub tags: Vec<TagGroup>,
    /// Server-owned; present on reads, never submitted back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_run_at: Option<DateTime<Utc>>,
}

impl Settings {
    /// Multi-line text representation: one group per line.
    pub fn tags_text(&self) -> String {
        self.tags
            .iter()
            .map(TagGroup::to_line)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Parses the newline/comma text representation back into ordered groups.
/// Commas delimit tags within a line; surrounding whitespace is trimmed and
/// empty pieces and empty lines are dropped. There is no escaping, so a tag
/// cannot contain a literal comma or newline.
pub fn parse_tag_lines(raw: &str) -> Vec<TagGroup> {
    raw.lines()
        .filter_map(|line| {
            let tags: Vec<String> = line
                .split(',')
                .map(str::trim)
                .filter(|piece| !piece.is_empty())
                .map(str::to_string)
                .collect();
            (!tags.is_empty()).then_some(TagGroup(tags))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_at: Option<DateTime<Utc>>,
}
