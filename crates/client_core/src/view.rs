//! View models: pure functions of last-known data, renderable without a
//! real display.

use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use shared::{
    domain::{ImageRecord, Settings},
    protocol::{ToastLevel, UpdateSettingsRequest},
};
use tokio::time::Instant;

use crate::error::FormError;

/// Cards never show more than this many tags.
pub const MAX_CARD_TAGS: usize = 6;

/// Placeholder for timestamps the server has not provided.
pub const MISSING_TIMESTAMP: &str = "—";

/// Local-timezone rendering of a server timestamp.
pub fn format_timestamp(timestamp: Option<DateTime<Utc>>) -> String {
    match timestamp {
        Some(ts) => ts
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        None => MISSING_TIMESTAMP.to_string(),
    }
}

pub fn next_run_label(next_run_at: Option<DateTime<Utc>>) -> String {
    format!("Next post: {}", format_timestamp(next_run_at))
}

/// Editable state of the settings page, bound from loaded [`Settings`] and
/// parsed back into a save request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsForm {
    pub interval_text: String,
    /// Blank when the server has no filter configured.
    pub filter_text: String,
    pub tags_text: String,
    pub next_run_text: String,
}

impl SettingsForm {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            interval_text: settings.post_interval_minutes.to_string(),
            filter_text: settings
                .filter_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            tags_text: settings.tags_text(),
            next_run_text: next_run_label(settings.next_run_at),
        }
    }

    /// Builds the save request. The tag text goes out raw; the server parses
    /// and normalizes it, and the follow-up reload shows the result.
    pub fn to_request(&self) -> Result<UpdateSettingsRequest, FormError> {
        let interval: u32 = self
            .interval_text
            .trim()
            .parse()
            .map_err(|_| FormError::InvalidInterval)?;
        if interval == 0 {
            return Err(FormError::InvalidInterval);
        }

        let filter_id = match self.filter_text.trim() {
            "" => None,
            raw => Some(raw.parse::<i64>().map_err(|_| FormError::InvalidFilterId)?),
        };

        Ok(UpdateSettingsRequest {
            post_interval_minutes: interval,
            filter_id,
            tags_raw: self.tags_text.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageCard {
    pub image_url: String,
    /// Click-through target: `source` when present, the image itself
    /// otherwise.
    pub link_url: String,
    pub author: Option<String>,
    pub posted_text: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GalleryView {
    pub cards: Vec<ImageCard>,
}

impl GalleryView {
    pub fn from_images(images: &[ImageRecord]) -> Self {
        let cards = images
            .iter()
            .map(|image| ImageCard {
                image_url: image.url.clone(),
                link_url: image.source.clone().unwrap_or_else(|| image.url.clone()),
                author: image.author.clone(),
                posted_text: format_timestamp(image.posted_at),
                tags: image.tags.iter().take(MAX_CARD_TAGS).cloned().collect(),
            })
            .collect();
        Self { cards }
    }

    /// Badge count; equals the number of loaded images.
    pub fn count(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Transient notification with a dismissal deadline.
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
    deadline: Instant,
}

impl Toast {
    pub fn new(level: ToastLevel, message: impl Into<String>, ttl: Duration) -> Self {
        Self {
            level,
            message: message.into(),
            deadline: Instant::now() + ttl,
        }
    }

    pub fn expired(&self) -> bool {
        Instant::now() >= self.deadline
    }
}
