use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::models::{CandidateBook, Genre};

/// Books shown at once on a genre shelf
pub const WINDOW_SIZE: usize = 2;

/// Paging position and hidden books for one genre
///
/// Only changed through [`RecommendationWindows`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowState {
    cursor: usize,
    hidden_ids: HashSet<String>,
}

impl WindowState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn hidden_ids(&self) -> &HashSet<String> {
        &self.hidden_ids
    }

    pub fn is_hidden(&self, id: &str) -> bool {
        self.hidden_ids.contains(id)
    }

    /// Moves forward a full window when a later starting point exists.
    /// Hidden books still count toward the step.
    fn advance(&mut self, list_len: usize) {
        if self.cursor + WINDOW_SIZE < list_len {
            self.cursor += WINDOW_SIZE;
        }
    }

    fn retreat(&mut self) {
        self.cursor = self.cursor.saturating_sub(WINDOW_SIZE);
    }

    fn hide(&mut self, id: String) {
        self.hidden_ids.insert(id);
    }
}

/// What a genre shelf should render
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibleSlice<'a> {
    pub items: Vec<&'a CandidateBook>,
    pub has_more: bool,
    pub has_prev: bool,
}

impl VisibleSlice<'_> {
    fn empty() -> Self {
        Self {
            items: Vec::new(),
            has_more: false,
            has_prev: false,
        }
    }
}

/// Collects up to [`WINDOW_SIZE`] visible books starting at the cursor,
/// skipping hidden ones so the window backfills from later in the list.
pub fn visible_slice<'a>(list: &'a [CandidateBook], state: &WindowState) -> VisibleSlice<'a> {
    let mut items = Vec::with_capacity(WINDOW_SIZE);
    let mut scan = state.cursor;

    while items.len() < WINDOW_SIZE && scan < list.len() {
        let book = &list[scan];
        if let Some(id) = book.identifier() {
            if !state.is_hidden(id) {
                items.push(book);
            }
        }
        scan += 1;
    }

    VisibleSlice {
        items,
        has_more: scan < list.len(),
        has_prev: state.cursor > 0,
    }
}

#[derive(Debug, Default)]
struct GenreWindow {
    list: Vec<CandidateBook>,
    state: WindowState,
}

/// Per-genre recommendation lists and their carousel state for one session
///
/// Operations on a genre that was never refreshed do nothing.
#[derive(Debug, Default)]
pub struct RecommendationWindows {
    windows: HashMap<Genre, GenreWindow>,
}

impl RecommendationWindows {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces a genre's list and starts its window over
    ///
    /// A spelling variant of an existing genre reuses that genre's entry and
    /// keeps its original label.
    pub fn refresh(&mut self, genre: Genre, list: Vec<CandidateBook>) {
        tracing::debug!(genre = %genre, books = list.len(), "Refreshing recommendation window");
        self.windows.insert(
            genre,
            GenreWindow {
                list,
                state: WindowState::new(),
            },
        );
    }

    pub fn next(&mut self, genre: &Genre) {
        if let Some(window) = self.windows.get_mut(genre) {
            let len = window.list.len();
            window.state.advance(len);
        }
    }

    pub fn prev(&mut self, genre: &Genre) {
        if let Some(window) = self.windows.get_mut(genre) {
            window.state.retreat();
        }
    }

    pub fn hide(&mut self, genre: &Genre, id: impl Into<String>) {
        if let Some(window) = self.windows.get_mut(genre) {
            window.state.hide(id.into());
        }
    }

    pub fn visible_slice(&self, genre: &Genre) -> VisibleSlice<'_> {
        match self.windows.get(genre) {
            Some(window) => visible_slice(&window.list, &window.state),
            None => VisibleSlice::empty(),
        }
    }

    pub fn state(&self, genre: &Genre) -> Option<&WindowState> {
        self.windows.get(genre).map(|window| &window.state)
    }

    pub fn list(&self, genre: &Genre) -> Option<&[CandidateBook]> {
        self.windows.get(genre).map(|window| window.list.as_slice())
    }

    /// The label a genre was first refreshed under
    pub fn label(&self, genre: &Genre) -> Option<&Genre> {
        self.windows.get_key_value(genre).map(|(label, _)| label)
    }

    pub fn contains(&self, genre: &Genre) -> bool {
        self.windows.contains_key(genre)
    }

    /// Drops every genre, e.g. before a full refresh
    pub fn clear(&mut self) {
        self.windows.clear();
    }
}
