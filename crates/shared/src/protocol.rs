use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ImageRecord, Settings};

/// Default number of gallery entries requested on load. The server caps the
/// effective limit at 200.
pub const DEFAULT_IMAGE_LIMIT: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToastLevel {
    #[default]
    Ok,
    Warn,
    Error,
}

impl ToastLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ToastLevel::Ok => "ok",
            ToastLevel::Warn => "warn",
            ToastLevel::Error => "error",
        }
    }
}

/// One message on the live channel. The wire envelope is
/// `{"event": "...", "data": {...}}`, server to client only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum LiveEvent {
    Status {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        next_run_at: Option<DateTime<Utc>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        interval_minutes: Option<u32>,
    },
    Toast {
        #[serde(default, rename = "type")]
        level: ToastLevel,
        message: String,
    },
    /// Refetch hint. The attached record mirrors what the server just
    /// posted; the image list is still fetched fresh, never patched from it.
    NewImage {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        record: Option<ImageRecord>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub ok: bool,
    pub settings: Settings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesResponse {
    pub ok: bool,
    #[serde(default)]
    pub images: Vec<ImageRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_run_at: Option<DateTime<Utc>>,
    pub interval_minutes: u32,
}

/// Body of `POST /api/settings`. `tags_raw` carries the multi-line text
/// representation; the server parses and normalizes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateSettingsRequest {
    pub post_interval_minutes: u32,
    pub filter_id: Option<i64>,
    pub tags_raw: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckResponse {
    pub ok: bool,
}
