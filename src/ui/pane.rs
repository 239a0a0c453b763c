use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};
use std::collections::BTreeMap;
use std::ops::Range;
use tracing::debug;

use crate::config::DEFAULT_VIEWPORT_HEIGHT;
use crate::error::{Capability, PaneError, PaneResult};
use crate::fs::{path, sort_entries, Backend, BackendCapabilities, Entry};

/// One side of the browser: a location, its sorted listing, a cursor with a
/// fixed-height viewport, and a multi-selection.
///
/// Selection is keyed by index into the current listing, so every listing
/// change clears it.
pub struct Pane {
    label: String,
    location: String,
    entries: Vec<Entry>,
    cursor: usize,
    viewport_top: usize,
    viewport_height: usize,
    selected: BTreeMap<usize, String>,
    backend: Box<dyn Backend>,
    pub is_active: bool,
}

impl Pane {
    /// Build a pane and list `location`. A failed listing aborts construction.
    pub async fn new(
        label: impl Into<String>,
        location: &str,
        backend: Box<dyn Backend>,
    ) -> PaneResult<Self> {
        Self::with_viewport_height(label, location, backend, DEFAULT_VIEWPORT_HEIGHT).await
    }

    pub async fn with_viewport_height(
        label: impl Into<String>,
        location: &str,
        backend: Box<dyn Backend>,
        viewport_height: usize,
    ) -> PaneResult<Self> {
        let mut pane = Self {
            label: label.into(),
            location: String::new(),
            entries: Vec::new(),
            cursor: 0,
            viewport_top: 0,
            viewport_height: viewport_height.max(1),
            selected: BTreeMap::new(),
            backend,
            is_active: false,
        };
        pane.move_to(path::clean(location)).await?;
        Ok(pane)
    }

    // ========== Cursor ==========

    pub fn up(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        if self.cursor < self.viewport_top {
            self.viewport_top = self.cursor;
        }
    }

    pub fn down(&mut self) {
        if self.cursor + 1 >= self.entries.len() {
            return;
        }
        self.cursor += 1;
        if self.cursor > self.viewport_top + self.viewport_height - 1 {
            self.viewport_top = self.cursor + 1 - self.viewport_height;
        }
    }

    // ========== Selection ==========

    pub fn toggle_selection(&mut self) {
        let Some(entry) = self.entries.get(self.cursor) else {
            return;
        };
        if self.selected.remove(&self.cursor).is_none() {
            self.selected.insert(self.cursor, entry.name.clone());
        }
    }

    pub fn deselect_all(&mut self) {
        self.selected.clear();
    }

    pub fn selection_count(&self) -> usize {
        self.selected.len()
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains_key(&index)
    }

    /// Names of the selected entries, in listing order.
    pub fn selected_names(&self) -> Vec<&str> {
        self.selected.values().map(String::as_str).collect()
    }

    /// Selected entries, in listing order.
    pub fn selected_entries(&self) -> Vec<Entry> {
        self.selected
            .keys()
            .filter_map(|&i| self.entries.get(i).cloned())
            .collect()
    }

    /// Absolute locations of the selected entries.
    pub fn selected_paths(&self) -> Vec<String> {
        self.selected
            .values()
            .map(|name| path::join(&self.location, name))
            .collect()
    }

    // ========== Navigation ==========

    /// Descend into the entry under the cursor. Whether that entry can be
    /// listed is up to the backend; on failure nothing changes.
    pub async fn enter(&mut self) -> PaneResult<()> {
        let Some(entry) = self.entries.get(self.cursor) else {
            return Ok(());
        };
        let target = path::join(&self.location, &entry.name);
        self.move_to(target).await
    }

    /// Go to the parent location.
    pub async fn leave(&mut self) -> PaneResult<()> {
        self.move_to(path::parent(&self.location)).await
    }

    /// Re-list the current location.
    pub async fn refresh(&mut self) -> PaneResult<()> {
        self.move_to(self.location.clone()).await
    }

    /// List `location` and, only if that succeeds, make it current with the
    /// cursor, viewport and selection reset.
    async fn move_to(&mut self, location: String) -> PaneResult<()> {
        let mut entries = self
            .backend
            .list(&location)
            .await
            .map_err(|source| PaneError::ListingFailed {
                location: location.clone(),
                source,
            })?;
        sort_entries(&mut entries);

        debug!(pane = %self.label, location = %location, entries = entries.len(), "listed");

        self.entries = entries;
        self.location = location;
        self.cursor = 0;
        self.viewport_top = 0;
        self.selected.clear();
        Ok(())
    }

    // ========== Operations ==========

    /// Copy the selection into `destination_root` through the transfer
    /// capability. Refreshing the destination and deselecting on success is
    /// the caller's job.
    pub async fn transfer(&self, destination_root: &str) -> PaneResult<()> {
        if !self.backend.capabilities().transfer {
            return Err(PaneError::CapabilityNotConfigured(Capability::Transfer));
        }
        if self.selected.is_empty() {
            return Ok(());
        }

        let selected = self.selected_entries();
        debug!(pane = %self.label, from = %self.location, to = destination_root, count = selected.len(), "transfer");
        self.backend
            .transfer(&self.location, &selected, destination_root)
            .await
            .map_err(PaneError::TransferFailed)
    }

    /// Remove the selection, then re-list the current location.
    pub async fn delete(&mut self) -> PaneResult<()> {
        if !self.backend.capabilities().delete {
            return Err(PaneError::CapabilityNotConfigured(Capability::Delete));
        }
        if self.selected.is_empty() {
            return Ok(());
        }

        let selected = self.selected_entries();
        debug!(pane = %self.label, location = %self.location, count = selected.len(), "delete");
        self.backend
            .delete(&self.location, &selected)
            .await
            .map_err(PaneError::DeleteFailed)?;
        self.refresh().await
    }

    // ========== Accessors ==========

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn viewport_top(&self) -> usize {
        self.viewport_top
    }

    pub fn viewport_height(&self) -> usize {
        self.viewport_height
    }

    pub fn current_entry(&self) -> Option<&Entry> {
        self.entries.get(self.cursor)
    }

    /// Indices of the entries inside the viewport.
    pub fn visible_range(&self) -> Range<usize> {
        let end = (self.viewport_top + self.viewport_height).min(self.entries.len());
        self.viewport_top.min(end)..end
    }

    pub fn capabilities(&self) -> BackendCapabilities {
        self.backend.capabilities()
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    // ========== Rendering ==========

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let inner_width = area.width.saturating_sub(2) as usize;
        let prefix_width = 2 + 4 + 2; // cursor, "[x] ", kind
        let size_width = 10;
        let name_width = inner_width.saturating_sub(prefix_width + size_width + 2);

        let items: Vec<ListItem> = self
            .visible_range()
            .map(|i| {
                let entry = &self.entries[i];
                let is_cursor = self.is_active && i == self.cursor;
                let marker = if is_cursor { "> " } else { "  " };
                let check = if self.is_selected(i) { "[x] " } else { "[ ] " };

                let name = truncate_name(&entry.name, name_width);
                let name_style = if entry.is_dir() {
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };

                let line = Line::from(vec![
                    Span::raw(marker),
                    Span::styled(check, Style::default().fg(Color::Yellow)),
                    Span::styled(format!("{} ", entry.label()), Style::default().fg(Color::DarkGray)),
                    Span::styled(
                        format!("{:>width$}", entry.format_size(), width = size_width),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::raw("  "),
                    Span::styled(name, name_style),
                ]);

                let item = ListItem::new(line);
                if is_cursor {
                    item.style(Style::default().bg(Color::DarkGray))
                } else {
                    item
                }
            })
            .collect();

        let border_style = if self.is_active {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::Gray)
        };

        let title = format!(" {}:{} ", self.label, self.location);
        let footer = format!(
            " [{}-{}]/{} ",
            self.viewport_top + 1,
            self.viewport_top + self.viewport_height,
            self.entries.len()
        );

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_bottom(footer)
                .border_style(border_style),
        );

        f.render_widget(list, area);
    }
}

/// Shorten `name` to `width` characters, marking the cut with "...".
fn truncate_name(name: &str, width: usize) -> String {
    let count = name.chars().count();
    if count <= width || width <= 3 {
        return name.to_string();
    }
    let kept: String = name.chars().take(width - 3).collect();
    format!("{}...", kept)
}
