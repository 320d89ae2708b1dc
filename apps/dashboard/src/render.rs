//! Plain-text rendering of the view models for the terminal.

use client_core::view::{GalleryView, SettingsForm, Toast};

pub const EMPTY_GALLERY: &str = "No images posted yet.";

pub fn settings_form(form: &SettingsForm) -> String {
    let mut out = String::new();
    out.push_str(&format!("Interval (minutes): {}\n", form.interval_text));
    let filter = if form.filter_text.is_empty() {
        "(none)"
    } else {
        form.filter_text.as_str()
    };
    out.push_str(&format!("Filter id: {filter}\n"));
    out.push_str("Tags (one group per line):\n");
    for line in form.tags_text.lines() {
        out.push_str(&format!("  {line}\n"));
    }
    out.push_str(&form.next_run_text);
    out.push('\n');
    out
}

pub fn gallery(view: &GalleryView) -> String {
    if view.is_empty() {
        return format!("{} images | {EMPTY_GALLERY}\n", view.count());
    }

    let mut out = format!("{} images\n", view.count());
    for card in &view.cards {
        out.push_str(&format!("- {} {}\n", card.posted_text, card.link_url));
        if let Some(author) = &card.author {
            out.push_str(&format!("  by {author}\n"));
        }
        if !card.tags.is_empty() {
            out.push_str(&format!("  [{}]\n", card.tags.join(", ")));
        }
    }
    out
}

pub fn toast_line(toast: &Toast) -> String {
    format!("[{}] {}", toast.level.as_str(), toast.message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::ImageRecord;

    #[test]
    fn empty_gallery_renders_the_empty_state() {
        let rendered = gallery(&GalleryView::default());
        assert!(rendered.contains("0 images"));
        assert!(rendered.contains(EMPTY_GALLERY));
    }

    #[test]
    fn gallery_renders_count_author_and_tags() {
        let images = vec![ImageRecord {
            url: "https://example.org/a.png".into(),
            author: Some("pencils".into()),
            source: Some("https://example.org/post/1".into()),
            tags: vec!["safe".into(), "forest".into()],
            posted_at: None,
        }];
        let rendered = gallery(&GalleryView::from_images(&images));
        assert!(rendered.starts_with("1 images"));
        assert!(rendered.contains("https://example.org/post/1"));
        assert!(rendered.contains("by pencils"));
        assert!(rendered.contains("[safe, forest]"));
    }

    #[test]
    fn settings_form_shows_blank_filter_as_none() {
        let form = SettingsForm {
            interval_text: "45".into(),
            filter_text: String::new(),
            tags_text: "safe, cute\nnight".into(),
            next_run_text: "Next post: —".into(),
        };
        let rendered = settings_form(&form);
        assert!(rendered.contains("Interval (minutes): 45"));
        assert!(rendered.contains("Filter id: (none)"));
        assert!(rendered.contains("  safe, cute\n"));
        assert!(rendered.ends_with("Next post: —\n"));
    }
}
