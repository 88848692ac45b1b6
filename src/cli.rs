// Command-line surface. Each subcommand maps onto one function in
// `commands`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::api::NewBookmark;
use crate::config::CONFIG_ENV;
use crate::filter::SearchCriteria;

#[derive(Parser, Debug)]
#[command(name = "pinboard", version)]
#[command(about = "Manage pinboard.in bookmarks and notes from the terminal", long_about = None)]
pub struct Cli {
    /// Configuration file (default: ~/.config/pinboard-cli.toml)
    #[arg(long, global = true, env = CONFIG_ENV)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List bookmarks, optionally filtered
    Ls(SearchArgs),
    /// Create a bookmark, or update one with --force
    #[command(alias = "new")]
    Add(AddArgs),
    /// Delete bookmarks by URL
    Rm {
        #[arg(required = true, num_args = 1..)]
        urls: Vec<String>,
    },
    /// Dump every bookmark as JSON
    Export,
    /// Show the tag cloud
    Tags {
        #[arg(short, long, value_enum, default_value_t = TagSort::Name)]
        sort: TagSort,
        /// One tag per line instead of columns
        #[arg(short, long)]
        long: bool,
    },
    /// Remove a tag from every bookmark
    Rmtag {
        tag: String,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Rename a tag
    Mvtag { old: String, new: String },
    /// List notes, or show the notes with the given IDs
    Notes {
        ids: Vec<String>,
        #[arg(short, long, value_enum, default_value_t = NoteFormat::Full)]
        format: NoteFormat,
    },
    /// Show the most recent bookmarks
    Recent {
        /// Filter by tag; up to three
        #[arg(short, long = "tag")]
        tags: Vec<String>,
        #[arg(short, long, default_value_t = 15, value_parser = clap::value_parser!(u8).range(1..=100))]
        count: u8,
    },
    /// Show account statistics
    Stat,
}

#[derive(Args, Debug, Default, Clone)]
pub struct SearchArgs {
    /// Title contains (case-insensitive)
    #[arg(short, long)]
    pub description: Option<String>,
    /// Extended description contains (case-insensitive)
    #[arg(short, long)]
    pub extended: Option<String>,
    /// Bookmark must carry this tag; repeat for several
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,
    /// URL contains (case-insensitive)
    #[arg(short, long)]
    pub url: Option<String>,
}

impl From<SearchArgs> for SearchCriteria {
    fn from(args: SearchArgs) -> Self {
        SearchCriteria {
            description: args.description,
            extended: args.extended,
            url: args.url,
            tags: split_tags(&args.tags),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    pub url: String,
    pub title: String,
    /// Long-form description
    #[arg(short, long)]
    pub extended: Option<String>,
    /// Tag to attach; repeat, or quote several separated by spaces
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,
    /// Overwrite an existing bookmark for the same URL
    #[arg(short, long)]
    pub force: bool,
    /// Make the bookmark public
    #[arg(short, long)]
    pub shared: bool,
    /// Add to the reading list
    #[arg(short = 'r', long)]
    pub toread: bool,
}

impl From<AddArgs> for NewBookmark {
    fn from(args: AddArgs) -> Self {
        NewBookmark {
            url: args.url,
            title: args.title,
            extended: args.extended,
            tags: split_tags(&args.tags),
            replace: args.force,
            shared: args.shared,
            toread: args.toread,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagSort {
    Name,
    Count,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteFormat {
    Full,
    Content,
    Json,
}

/// `-t "a b" -t c` and `-t a -t b -t c` mean the same thing.
pub fn split_tags(raw: &[String]) -> Vec<String> {
    raw.iter()
        .flat_map(|t| t.split_whitespace())
        .map(str::to_string)
        .collect()
}
