#![forbid(unsafe_code)]

//! The `sift` application model.
//!
//! Hosts one [`SearchableSelect`] on an otherwise empty screen. Pointer
//! presses go through an [`OutsideClickHub`] before the select sees them,
//! and a tick is requested whenever the select has a query waiting to
//! settle.

use std::time::Instant;

use sift_core::event::{Event, KeyCode};
use sift_core::geometry::Rect;
use sift_render::cell::Cell;
use sift_render::frame::Frame;
use sift_runtime::{Clock, Cmd, Model};
use sift_style::{SelectTheme, Style};
use sift_widgets::{
    OutsideClickHub, SearchableSelect, SelectAction, SelectConfig, SelectOption, Widget,
};
use tracing::debug;

/// Columns between the screen edge and the select.
const MARGIN_X: u16 = 2;
/// Rows above the select: the header and a blank row.
const MARGIN_TOP: u16 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppMsg {
    Input(Event),
    /// A press landed outside the select.
    Dismiss,
}

impl From<Event> for AppMsg {
    fn from(event: Event) -> Self {
        Self::Input(event)
    }
}

pub struct AppModel {
    clock: Clock,
    outside_click: OutsideClickHub<AppMsg>,
    select: SearchableSelect,
    theme: SelectTheme,
    select_width: u16,
    status: String,
}

impl AppModel {
    /// A focused select over `options`. `clock` must be the clock the
    /// program delivers ticks against.
    pub fn new(
        options: Vec<SelectOption>,
        config: SelectConfig,
        select_width: u16,
        theme: SelectTheme,
        clock: Clock,
    ) -> Self {
        let outside_click = OutsideClickHub::new();
        let mut select = SearchableSelect::new(options)
            .with_config(config)
            .with_theme(theme);
        select.set_focused(true);
        select.mount(&outside_click, || AppMsg::Dismiss);
        Self {
            clock,
            outside_click,
            select,
            theme,
            select_width,
            status: String::from("Nothing selected"),
        }
    }

    pub fn select(&self) -> &SearchableSelect {
        &self.select
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Where the select is drawn on a screen of `screen` size.
    pub fn select_area(&self, screen: Rect) -> Rect {
        let width = self
            .select_width
            .min(screen.width.saturating_sub(MARGIN_X * 2));
        let height = screen.height.saturating_sub(MARGIN_TOP + 2);
        Rect::new(MARGIN_X, MARGIN_TOP, width, height).intersection(&screen)
    }

    fn handle_input(&mut self, event: Event, now: Instant) -> Cmd<AppMsg> {
        if let Event::Key(key) = &event
            && key.is_actionable()
        {
            if key.ctrl() && key.is_char('c') {
                return Cmd::quit();
            }
            let closed = !self.select.is_open();
            if closed && (key.is_char('q') || key.code == KeyCode::Escape) {
                return Cmd::quit();
            }
        }

        let mut cmds = Vec::new();
        if let Event::Mouse(mouse) = &event {
            for msg in self.outside_click.dispatch(mouse) {
                cmds.push(self.update(msg));
            }
        }
        if let Some(action) = self.select.handle_event_at(&event, now) {
            cmds.push(self.on_action(action));
        }
        if let Some(delay) = self.select.next_deadline(now) {
            cmds.push(Cmd::tick(delay));
        }
        Cmd::batch(cmds)
    }

    fn on_action(&mut self, action: SelectAction) -> Cmd<AppMsg> {
        debug!(?action, "select action");
        match action {
            SelectAction::Opened => {
                self.status = format!("Searching {} options", self.select.options().len());
                Cmd::none()
            }
            SelectAction::Closed => {
                self.status = match self.select.selected_option() {
                    Some(option) => format!("Selected: {}", option.text),
                    None => String::from("Nothing selected"),
                };
                Cmd::none()
            }
            SelectAction::Selected { index, text } => {
                self.status = format!("Selected: {text}");
                Cmd::log(format!("selected option {} ({text})", index + 1))
            }
        }
    }

    fn header(&self) -> String {
        format!("sift · {} options", self.select.options().len())
    }

    fn footer(&self) -> String {
        let hint = if self.select.is_search_pending() {
            "searching…"
        } else if self.select.is_open() {
            "Enter select · Esc close"
        } else if self.select.is_focused() {
            "Enter open · q quit"
        } else {
            "click the box to open · q quit"
        };
        format!("{}  ·  {hint}", self.status)
    }
}

impl Model for AppModel {
    type Message = AppMsg;

    fn update(&mut self, msg: AppMsg) -> Cmd<AppMsg> {
        match msg {
            AppMsg::Input(event) => {
                let now = self.clock.now();
                self.handle_input(event, now)
            }
            AppMsg::Dismiss => match self.select.dismiss() {
                Some(action) => self.on_action(action),
                None => Cmd::none(),
            },
        }
    }

    fn view(&self, frame: &mut Frame) {
        let screen = frame.bounds();
        if screen.is_empty() {
            return;
        }
        draw_line(frame, MARGIN_X, 0, &self.header(), self.theme.display);
        draw_line(
            frame,
            MARGIN_X,
            screen.bottom() - 1,
            &self.footer(),
            self.theme.placeholder,
        );
        self.select.render(self.select_area(screen), frame);
    }
}

/// Draw `text` from `(x, y)` to the right edge of the frame.
fn draw_line(frame: &mut Frame, mut x: u16, y: u16, text: &str, style: Style) {
    for c in text.chars() {
        if x >= frame.width() {
            break;
        }
        let mut cell = Cell::from_char(c);
        let width = cell.content.width() as u16;
        if width == 0 {
            continue;
        }
        style.apply_to(&mut cell);
        frame.buffer.set(x, y, cell);
        x = x.saturating_add(width);
    }
}
