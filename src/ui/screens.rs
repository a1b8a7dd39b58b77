use crate::models::SongDetails;

/// State for the library screen: the whole catalog plus an optional
/// incremental filter and the details pane for the highlighted song.
pub(crate) struct LibraryScreen {
    pub(crate) songs: Vec<String>,
    pub(crate) filtered: Vec<String>,
    pub(crate) filter: Option<String>,
    pub(crate) selected: usize,
    pub(crate) details: Option<SongDetails>,
}

impl LibraryScreen {
    pub(crate) fn new(songs: Vec<String>) -> Self {
        let mut screen = Self {
            filtered: Vec::new(),
            songs,
            filter: None,
            selected: 0,
            details: None,
        };
        screen.apply_filter();
        screen
    }

    /// Swap in a freshly synced catalog, keeping the active filter.
    pub(crate) fn reload(&mut self, songs: Vec<String>) {
        self.songs = songs;
        self.apply_filter();
    }

    pub(crate) fn set_filter(&mut self, filter: Option<String>) {
        self.filter = filter;
        self.apply_filter();
    }

    /// Case-insensitive substring match against the raw filename, which is
    /// also the only metadata there is.
    pub(crate) fn apply_filter(&mut self) {
        self.filtered = match &self.filter {
            Some(query) if !query.trim().is_empty() => {
                let query = query.to_lowercase();
                self.songs
                    .iter()
                    .filter(|song| song.to_lowercase().contains(&query))
                    .cloned()
                    .collect()
            }
            _ => self.songs.clone(),
        };
        self.ensure_in_bounds();
    }

    pub(crate) fn current_song(&self) -> Option<&String> {
        self.filtered.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, delta: i64) {
        move_within(&mut self.selected, delta, self.filtered.len());
    }

    fn ensure_in_bounds(&mut self) {
        if self.selected >= self.filtered.len() {
            self.selected = self.filtered.len().saturating_sub(1);
        }
    }
}

/// State for the "Your Playlists" screen. `error` is the verbatim store
/// message when the listing failed (which includes the owns-nothing case).
pub(crate) struct PlaylistsScreen {
    pub(crate) names: Vec<String>,
    pub(crate) selected: usize,
    pub(crate) error: Option<String>,
}

impl PlaylistsScreen {
    pub(crate) fn new(names: Vec<String>, error: Option<String>) -> Self {
        Self {
            names,
            selected: 0,
            error,
        }
    }

    pub(crate) fn current_name(&self) -> Option<&String> {
        self.names.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, delta: i64) {
        move_within(&mut self.selected, delta, self.names.len());
    }
}

/// State for one opened playlist: its membership in stored order.
pub(crate) struct PlaylistDetailScreen {
    pub(crate) name: String,
    pub(crate) songs: Vec<String>,
    pub(crate) selected: usize,
}

impl PlaylistDetailScreen {
    pub(crate) fn new(name: String, songs: Vec<String>) -> Self {
        Self {
            name,
            songs,
            selected: 0,
        }
    }

    pub(crate) fn current_song(&self) -> Option<&String> {
        self.songs.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, delta: i64) {
        move_within(&mut self.selected, delta, self.songs.len());
    }
}

/// Checkbox picker over the whole catalog, seeded from the playlist's current
/// membership. Confirming persists the checked set verbatim (in catalog
/// order) through the replace operation.
pub(crate) struct MembershipPicker {
    pub(crate) playlist: String,
    pub(crate) entries: Vec<PickEntry>,
    pub(crate) selected: usize,
}

pub(crate) struct PickEntry {
    pub(crate) filename: String,
    pub(crate) checked: bool,
}

impl MembershipPicker {
    pub(crate) fn new(playlist: String, catalog: Vec<String>, members: &[String]) -> Self {
        let entries = catalog
            .into_iter()
            .map(|filename| PickEntry {
                checked: members.contains(&filename),
                filename,
            })
            .collect();
        Self {
            playlist,
            entries,
            selected: 0,
        }
    }

    pub(crate) fn toggle_current(&mut self) {
        if let Some(entry) = self.entries.get_mut(self.selected) {
            entry.checked = !entry.checked;
        }
    }

    pub(crate) fn move_selection(&mut self, delta: i64) {
        move_within(&mut self.selected, delta, self.entries.len());
    }

    /// The checkbox-derived selection, already duplicate-free.
    pub(crate) fn chosen(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|entry| entry.checked)
            .map(|entry| entry.filename.clone())
            .collect()
    }
}

/// Clamp-move a selection index within `len` items.
fn move_within(selected: &mut usize, delta: i64, len: usize) {
    if len == 0 {
        *selected = 0;
        return;
    }
    let next = (*selected as i64 + delta).clamp(0, len as i64 - 1);
    *selected = next as usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn songs(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn filter_narrows_and_clamps_the_selection() {
        let mut screen = LibraryScreen::new(songs(&["A, X.mp3", "B, Y.mp3", "C, X.mp3"]));
        screen.selected = 2;
        screen.set_filter(Some("x.mp3".to_string()));

        assert_eq!(screen.filtered, songs(&["A, X.mp3", "C, X.mp3"]));
        assert_eq!(screen.selected, 1);
        screen.set_filter(None);
        assert_eq!(screen.filtered.len(), 3);
    }

    #[test]
    fn picker_seeds_checks_from_membership_and_reports_chosen_in_catalog_order() {
        let mut picker = MembershipPicker::new(
            "L".to_string(),
            songs(&["a.mp3", "b.mp3", "c.mp3"]),
            &songs(&["c.mp3", "a.mp3"]),
        );
        assert_eq!(picker.chosen(), songs(&["a.mp3", "c.mp3"]));

        picker.selected = 1;
        picker.toggle_current();
        assert_eq!(picker.chosen(), songs(&["a.mp3", "b.mp3", "c.mp3"]));
    }

    #[test]
    fn selection_moves_clamp_at_the_edges() {
        let mut screen = PlaylistDetailScreen::new("L".to_string(), songs(&["a.mp3", "b.mp3"]));
        screen.move_selection(-1);
        assert_eq!(screen.selected, 0);
        screen.move_selection(5);
        assert_eq!(screen.selected, 1);
    }
}
