// UI layer: turns records into terminal text. Formatting functions return
// strings so they can be tested; the few interactive helpers (spinner,
// confirmation) wrap `indicatif` and `dialoguer`.

use std::collections::BTreeMap;
use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::style::{style, Color, Stylize};
use crossterm::tty::IsTty;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};

use crate::api::{Bookmark, Note};
use crate::cli::{NoteFormat, TagSort};

const TITLE_COLOR: Color = Color::AnsiValue(227);
const META_COLOR: Color = Color::DarkGrey;
const ERROR_COLOR: Color = Color::Red;

fn colors_enabled(stream_is_tty: bool) -> bool {
    stream_is_tty && std::env::var_os("NO_COLOR").is_none()
}

fn paint(text: &str, color: Color, stream_is_tty: bool) -> String {
    if colors_enabled(stream_is_tty) {
        style(text).with(color).to_string()
    } else {
        text.to_string()
    }
}

fn title(text: &str) -> String {
    paint(text, TITLE_COLOR, io::stdout().is_tty())
}

fn meta(text: &str) -> String {
    paint(text, META_COLOR, io::stdout().is_tty())
}

/// Error text destined for stderr.
pub fn error(text: &str) -> String {
    paint(text, ERROR_COLOR, io::stderr().is_tty())
}

/// Title, extended description, tags and URL, followed by a blank line.
pub fn format_bookmark(bookmark: &Bookmark) -> String {
    let mut out = format!("{}\n", title(&bookmark.description));
    if !bookmark.extended.is_empty() {
        out.push_str(&bookmark.extended);
        out.push('\n');
    }
    if !bookmark.tags.is_empty() {
        out.push_str(&format!("Tags: {}\n", bookmark.tags));
    }
    out.push_str(&bookmark.href);
    out.push_str("\n\n");
    out
}

/// Web address of a note; only known when the user name is configured.
pub fn note_url(user: &str, id: &str) -> String {
    format!("https://pinboard.in/u:{user}/notes/{id}")
}

/// One entry of the `notes` listing.
pub fn format_note_summary(note: &Note, user: Option<&str>) -> String {
    let mut out = format!("{}\n  ID: {}\n", title(&note.title), note.id);
    if let Some(user) = user {
        out.push_str(&format!("  URL: {}\n", note_url(user, &note.id)));
    }
    out
}

pub fn format_note(note: &Note, format: NoteFormat) -> Result<String, serde_json::Error> {
    let mut out = String::new();
    match format {
        NoteFormat::Full => {
            out.push_str(&format!("{}\n", title(&note.title)));
            out.push_str(&format!("{}\n", meta(&format!("ID: {}", note.id))));
            out.push_str(&format!("{}\n", meta(&format!("Length: {}", note.length))));
            if let Some(text) = note.text.as_deref().filter(|t| !t.is_empty()) {
                out.push_str("---\n");
                out.push_str(text);
                out.push('\n');
            }
        }
        NoteFormat::Content => {
            if let Some(text) = note.text.as_deref().filter(|t| !t.is_empty()) {
                out.push_str(text);
                out.push('\n');
            }
        }
        NoteFormat::Json => {
            out.push_str(&serde_json::to_string_pretty(note)?);
            out.push('\n');
        }
    }
    out.push('\n');
    Ok(out)
}

/// `name(count)` cells in the requested order.
pub fn tag_cells(tags: &BTreeMap<String, u64>, sort: TagSort) -> Vec<String> {
    let mut entries: Vec<(&String, &u64)> = tags.iter().collect();
    match sort {
        TagSort::Name => entries.sort_by_cached_key(|(name, _)| (name.to_lowercase(), name.to_string())),
        TagSort::Count => entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0))),
    }
    entries
        .into_iter()
        .map(|(name, count)| format!("{name}({count})"))
        .collect()
}

/// Lay `cells` out row by row in equal-width columns that fit `total_width`.
pub fn columnize(cells: &[String], total_width: usize) -> Vec<String> {
    let Some(widest) = cells.iter().map(|c| c.chars().count()).max() else {
        return Vec::new();
    };
    let cell_width = widest + 2;
    let columns = (total_width / cell_width).max(1);
    cells
        .chunks(columns)
        .map(|row| {
            row.iter()
                .map(|cell| format!("{cell:<cell_width$}"))
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect()
}

pub fn terminal_width() -> usize {
    crossterm::terminal::size()
        .map(|(columns, _)| usize::from(columns))
        .unwrap_or(80)
        .saturating_sub(1)
}

/// Run `work` while a spinner with `message` is shown on stderr.
pub fn with_spinner<R>(message: &str, work: impl FnOnce() -> R) -> R {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = work();
    spinner.finish_and_clear();
    result
}

/// Yes/no prompt defaulting to no.
pub fn confirm(prompt: &str) -> Result<bool> {
    Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(text: Option<&str>) -> Note {
        Note {
            id: "b7247b606fcb7f20b562".to_string(),
            hash: "64b7a23f090a39abcd22".to_string(),
            title: "First Task".to_string(),
            length: 157,
            created_at: "2021-09-06 18:37:03".to_string(),
            updated_at: "2025-01-31 20:26:07".to_string(),
            text: text.map(str::to_string),
        }
    }

    #[test]
    fn columnize_fits_width() {
        let cells: Vec<String> = ["a(1)", "bb(2)", "ccc(3)", "d(4)"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        // widest is 6, so cells are 8 wide and 2 fit in 17 columns.
        let rows = columnize(&cells, 17);
        assert_eq!(rows, vec!["a(1)    bb(2)", "ccc(3)  d(4)"]);
    }

    #[test]
    fn columnize_always_uses_one_column() {
        let cells = vec!["a-very-long-tag(10)".to_string(), "b(1)".to_string()];
        assert_eq!(columnize(&cells, 5).len(), 2);
        assert!(columnize(&[], 80).is_empty());
    }

    #[test]
    fn tag_cells_sort_by_name_or_count() {
        let tags: BTreeMap<String, u64> =
            [("python".to_string(), 5), ("Go".to_string(), 3), ("rust".to_string(), 9)]
                .into_iter()
                .collect();
        assert_eq!(tag_cells(&tags, TagSort::Name), vec!["Go(3)", "python(5)", "rust(9)"]);
        assert_eq!(tag_cells(&tags, TagSort::Count), vec!["rust(9)", "python(5)", "Go(3)"]);
    }

    #[test]
    fn bookmark_block_skips_empty_fields() {
        let bookmark = Bookmark {
            href: "https://example.com".to_string(),
            description: "Example".to_string(),
            extended: String::new(),
            meta: String::new(),
            hash: String::new(),
            time: String::new(),
            shared: false,
            toread: false,
            tags: "a b".to_string(),
        };
        let text = format_bookmark(&bookmark);
        assert!(text.contains("Example"));
        assert!(text.contains("Tags: a b\n"));
        assert!(text.ends_with("https://example.com\n\n"));
    }

    #[test]
    fn note_formats() {
        let full = format_note(&note(Some("body")), NoteFormat::Full).unwrap();
        assert!(full.contains("Length: 157"));
        assert!(full.contains("---\nbody\n"));

        let content = format_note(&note(Some("body")), NoteFormat::Content).unwrap();
        assert_eq!(content, "body\n\n");

        let json = format_note(&note(None), NoteFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["id"], "b7247b606fcb7f20b562");
        assert!(value.get("text").is_none());
    }

    #[test]
    fn note_summary_includes_url_only_with_user() {
        let with_user = format_note_summary(&note(None), Some("joe"));
        assert!(with_user.contains("https://pinboard.in/u:joe/notes/b7247b606fcb7f20b562"));
        let without = format_note_summary(&note(None), None);
        assert!(!without.contains("URL:"));
    }
}
