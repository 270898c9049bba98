#![forbid(unsafe_code)]

//! Searchable, virtualized dropdown select.
//!
//! A [`SearchableSelect`] shows a one-line display box. Opening it reveals a
//! search field and a fixed-height list of options. Typing edits the query
//! immediately, but the list only refilters once the query has been quiet
//! for the configured debounce delay. The list is virtualized, so only the
//! rows in view are ever drawn. A click on a row, or Enter on the highlighted
//! row, commits that option and closes the dropdown.
//!
//! # Host obligations
//!
//! - Deliver input through [`SearchableSelect::handle_event`].
//! - Deliver a tick once [`SearchableSelect::next_deadline`] elapses, through
//!   [`SearchableSelect::tick`] or an [`Event::Tick`].
//! - Route pointer presses through an [`OutsideClickHub`] the select is
//!   [mounted](SearchableSelect::mount) on, and call
//!   [`SearchableSelect::dismiss`] for the message it produces.
//!
//! # Layout
//!
//! ```text
//! ╭──────────────────────╮
//! │ Option 42          ▴ │   display box
//! ├──────────────────────┤
//! │Search...             │   search field
//! ├──────────────────────┤
//! │ ◆ Option 1          █│   viewport_rows × row_height
//! │ ◆ Option 2          ││
//! ╰──────────────────────╯
//! ```

use std::cell::{Cell, RefCell};
use std::ops::Range;
use std::sync::Arc;
use std::time::{Duration, Instant};

use sift_core::event::{Event, KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use sift_core::geometry::Rect;
use sift_render::cell::Cell as BufferCell;
use sift_render::frame::{Frame, HitId, HitRegion};
use sift_style::{SelectTheme, Style};

use crate::block::{Block, BorderType};
use crate::click_outside::{Bounds, OutsideClickGuard, OutsideClickHub};
use crate::debounce::{DebounceStats, Debounced, Ticket};
use crate::filter::{SelectOption, filter_indices};
use crate::input::TextInput;
use crate::scrollbar::ScrollbarState;
use crate::virtualized::{RowSlot, VirtualizedList, VirtualizedListState};
use crate::{StatefulWidget, Widget, apply_style, draw_text_span};

/// Rows scrolled per mouse wheel notch.
const WHEEL_STEP: isize = 3;

/// Rows used by the closed display box.
const DISPLAY_HEIGHT: u16 = 3;

/// Dropdown rows that are not list rows: the search row, the separator and
/// the bottom border. The dropdown's top edge overlaps the display box.
const DROPDOWN_CHROME: u16 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectConfig {
    /// Quiet period before the query is applied.
    pub debounce: Duration,
    /// Height of one list row, in terminal rows.
    pub row_height: u16,
    /// Rows of the list viewport, each `row_height` tall.
    pub viewport_rows: u16,
    /// Display text while nothing is selected.
    pub placeholder: String,
    pub search_placeholder: String,
    /// Shown instead of the list when nothing matches.
    pub empty_message: String,
    /// Glyph drawn before each option's text.
    pub icon: char,
}

impl Default for SelectConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            row_height: 1,
            viewport_rows: 6,
            placeholder: "Select an option".into(),
            search_placeholder: "Search...".into(),
            empty_message: "Not found!".into(),
            icon: '◆',
        }
    }
}

/// What a call to [`SearchableSelect::handle_event`] did, when it matters to
/// the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectAction {
    Opened,
    /// Closed without a selection.
    Closed,
    /// An option was committed and the dropdown closed.
    Selected { index: usize, text: String },
}

/// Screen areas from the last render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct SelectLayout {
    display: Rect,
    dropdown: Rect,
    search: Rect,
    list: Rect,
}

#[derive(Debug)]
pub struct SearchableSelect {
    options: Arc<[SelectOption]>,
    config: SelectConfig,
    theme: SelectTheme,
    /// Index into `options`.
    selected: Option<usize>,
    open: bool,
    /// Keyboard focus on the closed widget.
    focused: bool,
    input: TextInput,
    query: Debounced<String>,
    /// Ticket of the last query edit handed to `query`.
    search_ticket: Option<Ticket>,
    /// Indices into `options` matching the settled query.
    filtered: Vec<usize>,
    /// The settled query `filtered` was computed for.
    filtered_for: Option<String>,
    list: RefCell<VirtualizedListState>,
    layout: Cell<SelectLayout>,
    bounds: Bounds,
    outside_click: Option<OutsideClickGuard>,
    hit_id: HitId,
}

impl SearchableSelect {
    pub fn new(options: impl Into<Arc<[SelectOption]>>) -> Self {
        let config = SelectConfig::default();
        let theme = SelectTheme::default();
        let mut select = Self {
            options: options.into(),
            input: search_input(&config, &theme),
            query: Debounced::new(String::new(), config.debounce),
            search_ticket: None,
            config,
            theme,
            selected: None,
            open: false,
            focused: false,
            filtered: Vec::new(),
            filtered_for: None,
            list: RefCell::new(VirtualizedListState::new()),
            layout: Cell::new(SelectLayout::default()),
            bounds: Bounds::default(),
            outside_click: None,
            hit_id: HitId::new(1),
        };
        select.sync_filter();
        select
    }

    /// Build from anything yielding option texts.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            texts
                .into_iter()
                .map(SelectOption::new)
                .collect::<Arc<[SelectOption]>>(),
        )
    }

    #[must_use]
    pub fn with_config(mut self, config: SelectConfig) -> Self {
        self.query = Debounced::new(String::new(), config.debounce);
        self.search_ticket = None;
        self.input = search_input(&config, &self.theme);
        self.config = config;
        self.filtered_for = None;
        self.sync_filter();
        self
    }

    #[must_use]
    pub fn with_theme(mut self, theme: SelectTheme) -> Self {
        self.input = search_input(&self.config, &theme);
        self.theme = theme;
        self
    }

    /// Id used for the hit regions this widget registers.
    #[must_use]
    pub fn with_hit_id(mut self, id: HitId) -> Self {
        self.hit_id = id;
        self
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn config(&self) -> &SelectConfig {
        &self.config
    }

    pub fn hit_id(&self) -> HitId {
        self.hit_id
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_option(&self) -> Option<&SelectOption> {
        self.selected.and_then(|i| self.options.get(i))
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// The search text as typed.
    pub fn query(&self) -> &str {
        self.input.value()
    }

    /// The search text the list is currently filtered by.
    pub fn debounced_query(&self) -> &str {
        self.query.settled()
    }

    /// Whether the last query edit is still waiting to settle.
    pub fn is_search_pending(&self) -> bool {
        self.search_ticket.is_some_and(|ticket| self.query.is_live(ticket))
    }

    /// Debounce counters for the search query.
    pub fn search_stats(&self) -> DebounceStats {
        self.query.stats()
    }

    /// Indices into [`options`](Self::options) that pass the current filter.
    pub fn filtered(&self) -> &[usize] {
        &self.filtered
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    /// Filtered positions drawn by the last render.
    pub fn mounted_rows(&self) -> Range<usize> {
        self.list.borrow().mounted()
    }

    /// Filtered position of the highlighted row.
    pub fn highlighted(&self) -> Option<usize> {
        self.list.borrow().highlighted()
    }

    /// Area covered by the last render, box and dropdown.
    pub fn bounds(&self) -> Rect {
        self.bounds.get()
    }

    pub fn is_mounted(&self) -> bool {
        self.outside_click.is_some()
    }

    /// Subscribe to presses outside this widget. `make_msg` builds the
    /// message the host should answer with [`dismiss`](Self::dismiss).
    /// Replaces any earlier subscription.
    pub fn mount<M: 'static>(
        &mut self,
        hub: &OutsideClickHub<M>,
        make_msg: impl Fn() -> M + 'static,
    ) {
        self.outside_click = Some(hub.subscribe(self.bounds.clone(), make_msg));
    }

    pub fn unmount(&mut self) {
        self.outside_click = None;
    }

    /// Replace the option collection.
    ///
    /// Closes the dropdown. The selection survives only when the new
    /// collection has the same text at the same index.
    pub fn set_options(&mut self, options: impl Into<Arc<[SelectOption]>>) {
        let options = options.into();
        self.close();
        if let Some(index) = self.selected {
            let same = self.options.get(index).map(|o| &o.text)
                == options.get(index).map(|o| &o.text);
            if !same {
                self.selected = None;
            }
        }
        self.options = options;
        self.filtered_for = None;
        self.sync_filter();
    }

    /// Open the dropdown with focus in an empty search field.
    ///
    /// Returns `false` when it was already open.
    pub fn open(&mut self) -> bool {
        if self.open {
            return false;
        }
        self.open = true;
        self.focused = true;
        self.input.clear();
        self.input.set_focused(true);
        self.query.reset(String::new());
        self.sync_filter();

        let list = self.list.get_mut();
        list.reset();
        if let Some(selected) = self.selected
            && let Ok(position) = self.filtered.binary_search(&selected)
        {
            list.highlight(Some(position));
        }
        sift_core::debug!(options = self.options.len(), "select opened");
        true
    }

    /// Close the dropdown, clearing the query and any pending debounce.
    ///
    /// Returns `false` when it was already closed.
    pub fn close(&mut self) -> bool {
        if !self.open {
            return false;
        }
        self.open = false;
        self.input.clear();
        self.input.set_focused(false);
        self.query.reset(String::new());
        self.sync_filter();
        sift_core::debug!("select closed");
        true
    }

    pub fn toggle(&mut self) -> SelectAction {
        if self.open {
            self.close();
            SelectAction::Closed
        } else {
            self.open();
            SelectAction::Opened
        }
    }

    /// Answer to an outside press: close and drop keyboard focus.
    pub fn dismiss(&mut self) -> Option<SelectAction> {
        self.focused = false;
        self.close().then_some(SelectAction::Closed)
    }

    /// How long until a tick is needed to apply the typed query.
    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        self.query.time_until_fire(now)
    }

    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    /// Apply the typed query if it has been quiet long enough. Returns `true`
    /// when the filtered rows changed.
    pub fn tick_at(&mut self, now: Instant) -> bool {
        if self.query.poll_at(now).is_none() {
            return false;
        }
        self.search_ticket = None;
        sift_core::debug!(
            query = %self.query.settled(),
            superseded = self.query.stats().superseded,
            fired = self.query.stats().fired,
            "search query settled"
        );
        self.sync_filter()
    }

    pub fn handle_event(&mut self, event: &Event) -> Option<SelectAction> {
        self.handle_event_at(event, Instant::now())
    }

    /// Apply one input event with `now` as the current time.
    pub fn handle_event_at(&mut self, event: &Event, now: Instant) -> Option<SelectAction> {
        match event {
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Key(key) if key.is_actionable() => self.handle_key(event, key, now),
            Event::Paste(_) if self.open => {
                self.edit_query(event, now);
                None
            }
            Event::Tick => {
                self.tick_at(now);
                None
            }
            _ => None,
        }
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent) -> Option<SelectAction> {
        let layout = self.layout.get();
        let (x, y) = mouse.position();
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if layout.display.contains(x, y) {
                    self.focused = true;
                    return Some(self.toggle());
                }
                if !self.open {
                    return None;
                }
                let total = self.filtered.len();
                let list = self.list.get_mut();
                if let Some(row) = list.index_at(x, y) {
                    return self.commit(row);
                }
                if let Some((cell, track)) = list.scrollbar_cell_at(x, y) {
                    let position =
                        ScrollbarState::new(total, list.scroll_offset(), list.visible_count())
                            .position_for_track_cell(cell, track);
                    list.scroll_to(position, total);
                }
                None
            }
            MouseEventKind::ScrollDown if self.open && layout.list.contains(x, y) => {
                let total = self.filtered.len();
                self.list.get_mut().scroll(WHEEL_STEP, total);
                None
            }
            MouseEventKind::ScrollUp if self.open && layout.list.contains(x, y) => {
                let total = self.filtered.len();
                self.list.get_mut().scroll(-WHEEL_STEP, total);
                None
            }
            _ => None,
        }
    }

    fn handle_key(&mut self, event: &Event, key: &KeyEvent, now: Instant) -> Option<SelectAction> {
        if !self.open {
            let opens = matches!(key.code, KeyCode::Enter | KeyCode::Down | KeyCode::Char(' '));
            if self.focused && opens && !key.ctrl() && !key.alt() {
                self.open();
                return Some(SelectAction::Opened);
            }
            return None;
        }

        let total = self.filtered.len();
        match key.code {
            KeyCode::Escape => {
                self.close();
                return Some(SelectAction::Closed);
            }
            KeyCode::Enter => {
                let highlighted = self.list.get_mut().highlighted();
                return highlighted.and_then(|row| self.commit(row));
            }
            KeyCode::Up => self.list.get_mut().highlight_previous(total),
            KeyCode::Down => self.list.get_mut().highlight_next(total),
            KeyCode::PageUp => self.list.get_mut().page_up(total),
            KeyCode::PageDown => self.list.get_mut().page_down(total),
            KeyCode::Home if key.ctrl() => self.list.get_mut().highlight_first(total),
            KeyCode::End if key.ctrl() => self.list.get_mut().highlight_last(total),
            _ => self.edit_query(event, now),
        }
        None
    }

    /// Feed an event to the search field and reschedule the debounced query
    /// if the text changed.
    fn edit_query(&mut self, event: &Event, now: Instant) {
        if !self.input.handle_event(event) || self.input.value() == self.query.latest() {
            return;
        }
        self.search_ticket = Some(self.query.schedule_at(self.input.value().to_owned(), now));
        // A zero delay settles inside `schedule_at`.
        self.sync_filter();
    }

    /// Select the option shown at filtered position `row` and close.
    fn commit(&mut self, row: usize) -> Option<SelectAction> {
        let index = *self.filtered.get(row)?;
        let text = self.options.get(index)?.text.clone();
        self.selected = Some(index);
        self.close();
        sift_core::debug!(index, text = %text, "option selected");
        Some(SelectAction::Selected { index, text })
    }

    /// Recompute `filtered` if the settled query changed since the last pass.
    fn sync_filter(&mut self) -> bool {
        let settled = self.query.settled();
        if self.filtered_for.as_deref() == Some(settled.as_str()) {
            return false;
        }
        self.filtered = filter_indices(&self.options, settled);
        self.filtered_for = Some(settled.clone());
        self.list.get_mut().reset();
        sift_core::trace!(query = %settled, matches = self.filtered.len(), "filtered options");
        true
    }

    fn compute_layout(&self, area: Rect) -> SelectLayout {
        let display = Rect::new(area.x, area.y, area.width, DISPLAY_HEIGHT).intersection(&area);
        if !self.open {
            return SelectLayout {
                display,
                ..SelectLayout::default()
            };
        }
        let list_height = self.config.viewport_rows.saturating_mul(self.config.row_height.max(1));
        let dropdown = Rect::new(
            area.x,
            area.y.saturating_add(DISPLAY_HEIGHT - 1),
            area.width,
            list_height.saturating_add(DROPDOWN_CHROME),
        )
        .intersection(&area);
        let inner_width = dropdown.width.saturating_sub(2);
        let search = Rect::new(dropdown.x + 1, dropdown.y.saturating_add(1), inner_width, 1)
            .intersection(&dropdown);
        let list = Rect::new(dropdown.x + 1, dropdown.y.saturating_add(3), inner_width, list_height)
            .intersection(&Block::bordered().inner(dropdown));
        SelectLayout {
            display,
            dropdown,
            search,
            list,
        }
    }

    fn render_display(&self, area: Rect, frame: &mut Frame) {
        let border = if self.open {
            self.theme.border_focused
        } else {
            self.theme.border
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border);
        block.render(area, frame);
        frame.register_hit(area, self.hit_id, HitRegion::Button, 0);

        let inner = block.inner(area);
        if inner.is_empty() {
            return;
        }
        let (text, style) = match self.selected_option() {
            Some(option) => (option.text.as_str(), self.theme.display),
            None => (self.config.placeholder.as_str(), self.theme.placeholder),
        };
        let chevron_x = inner.right().saturating_sub(2);
        draw_text_span(
            &mut frame.buffer,
            inner.x + 1,
            inner.y,
            text,
            style,
            chevron_x.saturating_sub(1),
        );
        if inner.width >= 4 {
            let mut cell = BufferCell::from_char(if self.open { '▴' } else { '▾' });
            apply_style(&mut cell, border);
            frame.buffer.set(chevron_x, inner.y, cell);
        }
    }

    fn render_dropdown(&self, layout: &SelectLayout, frame: &mut Frame) {
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(self.theme.border_focused)
            .joined_top(true);
        block.render(layout.dropdown, frame);

        // Separator between the search field and the list.
        let separator_y = layout.search.bottom();
        if layout.dropdown.width >= 2 && separator_y < layout.dropdown.bottom().saturating_sub(1) {
            let set = BorderType::Rounded.set();
            let right = layout.dropdown.right() - 1;
            for x in layout.dropdown.x..=right {
                let glyph = if x == layout.dropdown.x {
                    set.left_tee
                } else if x == right {
                    set.right_tee
                } else {
                    set.horizontal
                };
                let mut cell = BufferCell::from_char(glyph);
                apply_style(&mut cell, self.theme.border_focused);
                frame.buffer.set(x, separator_y, cell);
            }
        }

        self.input.render(layout.search, frame);
        self.render_list(layout.list, frame);
    }

    fn render_list(&self, area: Rect, frame: &mut Frame) {
        let theme = &self.theme;
        let icon = self.config.icon;
        let row_height = self.config.row_height.max(1);
        let list = VirtualizedList::new(self.filtered.len(), |slot: RowSlot, frame: &mut Frame| {
            let Some(option) = self.filtered.get(slot.index).and_then(|&i| self.options.get(i))
            else {
                return;
            };
            let mut style = theme.item;
            if self.selected == self.filtered.get(slot.index).copied() {
                style = style.patch(theme.item_selected);
            }
            if slot.highlighted {
                style = style.patch(theme.item_highlighted);
            }
            let y = slot.area.y + (slot.area.height.saturating_sub(1)) / 2;
            let max_x = slot.area.right();
            let mut icon_cell = BufferCell::from_char(icon);
            apply_style(&mut icon_cell, style.patch(icon_style(theme.icon, slot.highlighted)));
            frame.buffer.set(slot.area.x + 1, y, icon_cell);
            draw_text_span(&mut frame.buffer, slot.area.x + 3, y, &option.text, style, max_x);
        })
        .row_height(row_height)
        .highlight_style(theme.item_highlighted)
        .scrollbar_styles(theme.scrollbar_track, theme.scrollbar_thumb)
        .hit_id(self.hit_id);

        let mut state = self.list.borrow_mut();
        list.render(area, frame, &mut state);

        if self.filtered.is_empty() && !area.is_empty() {
            draw_text_span(
                &mut frame.buffer,
                area.x + 1,
                area.y,
                &self.config.empty_message,
                theme.empty,
                area.right(),
            );
        }
    }
}

/// The icon keeps its own color except on the highlighted row, where it
/// takes the row's.
fn icon_style(icon: Style, highlighted: bool) -> Style {
    if highlighted { Style::default() } else { icon }
}

fn search_input(config: &SelectConfig, theme: &SelectTheme) -> TextInput {
    TextInput::new()
        .with_placeholder(config.search_placeholder.clone())
        .with_style(theme.input)
        .with_placeholder_style(theme.input_placeholder)
}

impl Widget for SearchableSelect {
    fn render(&self, area: Rect, frame: &mut Frame) {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "widget_render",
            widget = "SearchableSelect",
            x = area.x,
            y = area.y,
            w = area.width,
            h = area.height,
            open = self.open,
            matches = self.filtered.len()
        )
        .entered();

        let layout = self.compute_layout(area);
        self.layout.set(layout);
        self.bounds.set(layout.display.union(&layout.dropdown));

        self.render_display(layout.display, frame);
        if self.open {
            self.render_dropdown(&layout, frame);
        }
    }
}
