//! Page controllers: one per dashboard surface, each a single-task event
//! consumer. Loads and pushed events mutate the view model; rendering reads
//! it. In-flight requests are never cancelled, so when two reloads overlap
//! the later response wins.

use std::sync::Arc;
use std::time::Duration;

use shared::protocol::{LiveEvent, ToastLevel};

use crate::{
    error::ClientError,
    live::ChannelEvent,
    view::{next_run_label, GalleryView, SettingsForm, Toast},
    ApiHandle,
};

pub const SETTINGS_TOAST_TTL: Duration = Duration::from_secs(3);
pub const GALLERY_TOAST_TTL: Duration = Duration::from_millis(3500);

/// Redundant full reload of the gallery, independent of push events.
pub const GALLERY_RELOAD_INTERVAL: Duration = Duration::from_secs(60);

pub const SAVED_TOAST: &str = "Settings saved";
pub const POST_NOW_TOAST: &str = "Post command accepted";

pub const LIVE_CONNECTING: &str = "live: connecting…";
pub const LIVE_CONNECTED: &str = "live: connected";
pub const LIVE_RECONNECTING: &str = "live: reconnecting…";
pub const WAITING_LABEL: &str = "Waiting…";

pub struct SettingsController {
    api: Arc<dyn ApiHandle>,
    pub form: SettingsForm,
    pub toast: Option<Toast>,
}

impl SettingsController {
    pub fn new(api: Arc<dyn ApiHandle>) -> Self {
        Self {
            api,
            form: SettingsForm::default(),
            toast: None,
        }
    }

    /// Fetches current settings and rebuilds the form. On any failure,
    /// `Unauthorized` included, the form keeps its previous contents.
    pub async fn load(&mut self) -> Result<(), ClientError> {
        let settings = self.api.fetch_settings().await?;
        self.form = SettingsForm::from_settings(&settings);
        Ok(())
    }

    /// Submits the edited form, then reloads: the server's normalized
    /// settings become the display state, never the submitted values.
    pub async fn save(&mut self) -> Result<(), ClientError> {
        let request = self.form.to_request()?;
        self.api.update_settings(request).await?;
        self.toast = Some(Toast::new(ToastLevel::Ok, SAVED_TOAST, SETTINGS_TOAST_TTL));
        self.load().await
    }

    /// One-shot trigger. Whether or when the post completes is not
    /// observable here; success only means the command was accepted.
    pub async fn post_now(&mut self) -> Result<(), ClientError> {
        self.api.post_now().await?;
        self.toast = Some(Toast::new(
            ToastLevel::Ok,
            POST_NOW_TOAST,
            SETTINGS_TOAST_TTL,
        ));
        Ok(())
    }

    pub fn apply_event(&mut self, event: LiveEvent) {
        match event {
            LiveEvent::Status { next_run_at, .. } => {
                self.form.next_run_text = next_run_label(next_run_at);
            }
            LiveEvent::Toast { level, message } => {
                self.toast = Some(Toast::new(level, message, SETTINGS_TOAST_TTL));
            }
            // This page has no image list to refresh.
            LiveEvent::NewImage { .. } => {}
        }
    }

    pub fn prune_toast(&mut self) {
        if self.toast.as_ref().is_some_and(Toast::expired) {
            self.toast = None;
        }
    }
}

pub struct GalleryController {
    api: Arc<dyn ApiHandle>,
    limit: u32,
    pub view: GalleryView,
    pub live_status: String,
    pub next_run_text: String,
    pub toast: Option<Toast>,
}

impl GalleryController {
    pub fn new(api: Arc<dyn ApiHandle>, limit: u32) -> Self {
        Self {
            api,
            limit,
            view: GalleryView::default(),
            live_status: LIVE_CONNECTING.to_string(),
            next_run_text: WAITING_LABEL.to_string(),
            toast: None,
        }
    }

    /// Full reload of the image list, bounded to the configured limit.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let images = self.api.fetch_images(self.limit).await?;
        self.view = GalleryView::from_images(&images);
        Ok(())
    }

    pub async fn apply_event(&mut self, event: ChannelEvent) -> Result<(), ClientError> {
        match event {
            ChannelEvent::Connected => self.live_status = LIVE_CONNECTED.to_string(),
            ChannelEvent::Reconnecting => self.live_status = LIVE_RECONNECTING.to_string(),
            ChannelEvent::Event(LiveEvent::Status { next_run_at, .. }) => {
                self.next_run_text = match next_run_at {
                    Some(at) => next_run_label(Some(at)),
                    None => WAITING_LABEL.to_string(),
                };
            }
            ChannelEvent::Event(LiveEvent::Toast { level, message }) => {
                self.toast = Some(Toast::new(level, message, GALLERY_TOAST_TTL));
            }
            // The pushed record is only a hint; refetch so server-side
            // ordering and the limit stay authoritative.
            ChannelEvent::Event(LiveEvent::NewImage { .. }) => self.refresh().await?,
        }
        Ok(())
    }

    pub fn prune_toast(&mut self) {
        if self.toast.as_ref().is_some_and(Toast::expired) {
            self.toast = None;
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
