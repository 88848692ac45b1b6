// Command layer: one function per subcommand. Each takes the API client,
// performs its calls in order and prints through `ui`. Errors propagate to
// `main` as `anyhow::Error` with context attached.

use anyhow::{bail, Context, Result};

use crate::api::{DeleteOutcome, NewBookmark, PinboardApi, Transport};
use crate::cli::{Command, NoteFormat, SearchArgs, TagSort};
use crate::config::Config;
use crate::error::ApiError;
use crate::filter::{Bookmarks, SearchCriteria};
use crate::ui;

pub fn run<T: Transport>(api: &PinboardApi<T>, config: &Config, command: Command) -> Result<()> {
    match command {
        Command::Ls(args) => list_bookmarks(api, args),
        Command::Add(args) => add_bookmark(api, args.into()),
        Command::Rm { urls } => remove_bookmarks(api, &urls),
        Command::Export => export_bookmarks(api),
        Command::Tags { sort, long } => list_tags(api, sort, long),
        Command::Rmtag { tag, yes } => delete_tag(api, &tag, yes),
        Command::Mvtag { old, new } => rename_tag(api, &old, &new),
        Command::Notes { ids, format } => {
            if ids.is_empty() {
                list_notes(api, config.user.as_deref())
            } else {
                show_notes(api, &ids, format)
            }
        }
        Command::Recent { tags, count } => recent_bookmarks(api, &tags, count),
        Command::Stat => show_stats(api),
    }
}

fn fetch_bookmarks<T: Transport>(api: &PinboardApi<T>) -> Result<Bookmarks> {
    ui::with_spinner("Fetching bookmarks...", || Bookmarks::fetch(api))
        .context("Failed to fetch bookmarks")
}

pub fn list_bookmarks<T: Transport>(api: &PinboardApi<T>, args: SearchArgs) -> Result<()> {
    let bookmarks = fetch_bookmarks(api)?;
    let criteria = SearchCriteria::from(args);
    for bookmark in bookmarks.search(&criteria) {
        print!("{}", ui::format_bookmark(bookmark));
    }
    Ok(())
}

pub fn add_bookmark<T: Transport>(api: &PinboardApi<T>, bookmark: NewBookmark) -> Result<()> {
    let code = api
        .add_bookmark(&bookmark)
        .with_context(|| format!("Failed to add {}", bookmark.url))?;
    if !code.is_done() {
        bail!("Could not add {}: {}", bookmark.url, code.result_code);
    }
    println!("Saved {}", bookmark.url);
    Ok(())
}

/// Delete every URL in turn. A failure for one URL never stops the rest;
/// each outcome is reported in input order.
pub fn delete_urls<T: Transport>(
    api: &PinboardApi<T>,
    urls: &[String],
) -> Vec<(String, Result<DeleteOutcome, ApiError>)> {
    urls.iter()
        .map(|url| (url.clone(), api.delete_bookmark(url)))
        .collect()
}

pub fn remove_bookmarks<T: Transport>(api: &PinboardApi<T>, urls: &[String]) -> Result<()> {
    let mut failures = 0;
    for (url, outcome) in delete_urls(api, urls) {
        match outcome {
            Ok(DeleteOutcome::Done) => println!("Deleted {url}"),
            Ok(DeleteOutcome::NotFound) => eprintln!("{}", ui::error(&format!("{url} not found"))),
            Ok(DeleteOutcome::Other(code)) => {
                failures += 1;
                eprintln!("{}", ui::error(&format!("{url}: {code}")));
            }
            Err(e) => {
                failures += 1;
                eprintln!("{}", ui::error(&format!("{url}: {e}")));
            }
        }
    }
    if failures > 0 {
        bail!("{failures} of {} deletions failed", urls.len());
    }
    Ok(())
}

pub fn export_bookmarks<T: Transport>(api: &PinboardApi<T>) -> Result<()> {
    let bookmarks = fetch_bookmarks(api)?;
    let json = serde_json::to_string_pretty(bookmarks.as_slice())?;
    println!("{json}");
    Ok(())
}

pub fn list_tags<T: Transport>(api: &PinboardApi<T>, sort: TagSort, long: bool) -> Result<()> {
    let tags = api.get_tags().context("Failed to fetch tags")?;
    let cells = ui::tag_cells(&tags, sort);
    let lines = if long {
        cells
    } else {
        ui::columnize(&cells, ui::terminal_width())
    };
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

pub fn delete_tag<T: Transport>(api: &PinboardApi<T>, tag: &str, assume_yes: bool) -> Result<()> {
    if !assume_yes && !ui::confirm(&format!("Remove tag '{tag}' from all bookmarks?"))? {
        println!("Aborted");
        return Ok(());
    }
    api.delete_tag(tag)
        .with_context(|| format!("Failed to delete tag {tag}"))?;
    println!("Deleted tag {tag}");
    Ok(())
}

pub fn rename_tag<T: Transport>(api: &PinboardApi<T>, old: &str, new: &str) -> Result<()> {
    api.rename_tag(old, new)
        .with_context(|| format!("Failed to rename tag {old}"))?;
    println!("Renamed {old} to {new}");
    Ok(())
}

pub fn list_notes<T: Transport>(api: &PinboardApi<T>, user: Option<&str>) -> Result<()> {
    let notes = api.get_all_notes().context("Failed to fetch notes")?;
    for note in &notes {
        print!("{}", ui::format_note_summary(note, user));
    }
    Ok(())
}

/// Show each requested note. Missing IDs are reported and skipped; the
/// command fails at the end if any were missing.
pub fn show_notes<T: Transport>(
    api: &PinboardApi<T>,
    ids: &[String],
    format: NoteFormat,
) -> Result<()> {
    let mut missing = Vec::new();
    for id in ids {
        match api
            .get_note(id)
            .with_context(|| format!("Failed to fetch note {id}"))?
        {
            Some(note) => print!("{}", ui::format_note(&note, format)?),
            None => {
                eprintln!("{}", ui::error(&format!("Note ID not found: {id}")));
                missing.push(id.as_str());
            }
        }
    }
    if !missing.is_empty() {
        bail!("Note ID not found: {}", missing.join(", "));
    }
    Ok(())
}

pub fn recent_bookmarks<T: Transport>(
    api: &PinboardApi<T>,
    tags: &[String],
    count: u8,
) -> Result<()> {
    let tags = crate::cli::split_tags(tags);
    let recent = api.get_recent_bookmarks(&tags, Some(count))?;
    for bookmark in &recent.posts {
        print!("{}", ui::format_bookmark(bookmark));
    }
    Ok(())
}

pub fn show_stats<T: Transport>(api: &PinboardApi<T>) -> Result<()> {
    let last_update = api
        .get_last_update()
        .context("Failed to fetch last update time")?;
    let bookmarks = fetch_bookmarks(api)?;
    let tags = api.get_tags().context("Failed to fetch tags")?;
    println!("Last update: {last_update}");
    println!("Bookmarks:   {}", bookmarks.len());
    println!("Tags:        {}", tags.len());
    Ok(())
}
