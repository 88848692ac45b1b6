// Local search over fetched bookmarks. Nothing here touches the network
// except `Bookmarks::fetch` / `Bookmarks::delete`, which go through the
// API client.

use std::collections::HashSet;

use crate::api::{Bookmark, DeleteOutcome, PinboardApi, Transport};
use crate::error::ApiError;

fn fold(text: &str) -> String {
    text.to_lowercase()
}

fn contains_folded(
    term: Option<&str>,
    field: fn(&Bookmark) -> &str,
) -> impl Fn(&Bookmark) -> bool {
    let term = term.map(fold);
    move |bookmark| match &term {
        None => true,
        Some(term) => fold(field(bookmark)).contains(term.as_str()),
    }
}

/// Case-insensitive substring match on the title. `None` matches all.
pub fn by_description(term: Option<&str>) -> impl Fn(&Bookmark) -> bool {
    contains_folded(term, |b| b.description.as_str())
}

/// Case-insensitive substring match on the long-form notes.
pub fn by_extended(term: Option<&str>) -> impl Fn(&Bookmark) -> bool {
    contains_folded(term, |b| b.extended.as_str())
}

/// Case-insensitive substring match on the URL.
pub fn by_url(term: Option<&str>) -> impl Fn(&Bookmark) -> bool {
    contains_folded(term, |b| b.href.as_str())
}

/// Passes bookmarks whose tags include every tag in `target`, ignoring case.
/// An empty target matches all.
pub fn by_tags(target: &[String]) -> impl Fn(&Bookmark) -> bool {
    let target: HashSet<String> = target
        .iter()
        .flat_map(|t| t.split_whitespace())
        .map(fold)
        .collect();
    move |bookmark| {
        if target.is_empty() {
            return true;
        }
        let own: HashSet<String> = bookmark.tag_list().map(fold).collect();
        own.is_superset(&target)
    }
}

/// Zero or more search criteria, combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    pub description: Option<String>,
    pub extended: Option<String>,
    pub url: Option<String>,
    pub tags: Vec<String>,
}

impl SearchCriteria {
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.extended.is_none()
            && self.url.is_none()
            && self.tags.is_empty()
    }

    /// Conjunction of the per-field predicates.
    pub fn predicate(&self) -> impl Fn(&Bookmark) -> bool {
        let description = by_description(self.description.as_deref());
        let extended = by_extended(self.extended.as_deref());
        let url = by_url(self.url.as_deref());
        let tags = by_tags(&self.tags);
        move |b| description(b) && extended(b) && url(b) && tags(b)
    }

    pub fn matches(&self, bookmark: &Bookmark) -> bool {
        self.predicate()(bookmark)
    }
}

/// Snapshot of the account's bookmarks taken by one `posts/all` call.
#[derive(Debug, Clone, Default)]
pub struct Bookmarks {
    items: Vec<Bookmark>,
}

impl Bookmarks {
    pub fn new(items: Vec<Bookmark>) -> Self {
        Bookmarks { items }
    }

    pub fn fetch<T: Transport>(api: &PinboardApi<T>) -> Result<Self, ApiError> {
        Ok(Self::new(api.get_all_bookmarks()?))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bookmark> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Bookmark] {
        &self.items
    }

    /// Bookmarks passing `criteria`, ordered by title ignoring case.
    pub fn search(&self, criteria: &SearchCriteria) -> Vec<&Bookmark> {
        let predicate = criteria.predicate();
        let mut found: Vec<&Bookmark> = self.items.iter().filter(|b| predicate(b)).collect();
        found.sort_by_cached_key(|b| fold(&b.description));
        found
    }

    /// Drop the entry for `url` from the snapshot. Returns whether one was
    /// present.
    pub fn remove_by_url(&mut self, url: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|b| b.href != url);
        self.items.len() != before
    }

    /// Delete `url` remotely and, when the service confirms, locally too.
    pub fn delete<T: Transport>(
        &mut self,
        api: &PinboardApi<T>,
        url: &str,
    ) -> Result<DeleteOutcome, ApiError> {
        let outcome = api.delete_bookmark(url)?;
        if outcome == DeleteOutcome::Done {
            self.remove_by_url(url);
        }
        Ok(outcome)
    }
}

impl<'a> IntoIterator for &'a Bookmarks {
    type Item = &'a Bookmark;
    type IntoIter = std::slice::Iter<'a, Bookmark>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
