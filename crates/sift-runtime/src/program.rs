#![forbid(unsafe_code)]

//! Elm-style runtime for terminal applications.
//!
//! The program runtime manages the update/view loop, handling events and
//! rendering frames. It separates state (Model) from rendering (View) and
//! provides a command pattern for side effects.
//!
//! # Example
//!
//! ```ignore
//! use sift_runtime::program::{Cmd, Model};
//! use sift_core::event::Event;
//! use sift_render::frame::Frame;
//!
//! struct Counter {
//!     count: i32,
//! }
//!
//! enum Msg {
//!     Increment,
//!     Quit,
//!     Ignore,
//! }
//!
//! impl From<Event> for Msg {
//!     fn from(event: Event) -> Self {
//!         match event {
//!             Event::Key(k) if k.is_char('q') => Msg::Quit,
//!             Event::Key(k) if k.is_char('+') => Msg::Increment,
//!             _ => Msg::Ignore,
//!         }
//!     }
//! }
//!
//! impl Model for Counter {
//!     type Message = Msg;
//!
//!     fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message> {
//!         match msg {
//!             Msg::Increment => { self.count += 1; Cmd::none() }
//!             Msg::Quit => Cmd::quit(),
//!             Msg::Ignore => Cmd::none(),
//!         }
//!     }
//!
//!     fn view(&self, frame: &mut Frame) {
//!         // Render counter value to frame
//!     }
//! }
//! ```

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use sift_core::event::Event;
use sift_core::terminal_session::{SessionOptions, TerminalSession};
use sift_render::frame::Frame;
use sift_render::presenter::Presenter;
use tracing::{debug, debug_span, info, info_span};

/// Application state and behavior.
pub trait Model: Sized {
    /// Messages are produced from terminal events and by commands.
    type Message: From<Event> + Send + 'static;

    /// Called once before the first render.
    fn init(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }

    /// The state transition function.
    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message>;

    /// Render the current state.
    fn view(&self, frame: &mut Frame);
}

/// Side effects requested by `init` and `update`.
#[derive(Default)]
pub enum Cmd<M> {
    #[default]
    None,
    Quit,
    /// Run each command in order (currently identical to `Sequence`).
    Batch(Vec<Cmd<M>>),
    Sequence(Vec<Cmd<M>>),
    /// Feed a message straight back into `update`.
    Msg(M),
    /// Deliver one [`Event::Tick`] after the duration. When several are
    /// outstanding the earliest wins.
    Tick(Duration),
    /// A line for the application log.
    Log(String),
}

impl<M: std::fmt::Debug> std::fmt::Debug for Cmd<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Quit => write!(f, "Quit"),
            Self::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Self::Sequence(cmds) => f.debug_tuple("Sequence").field(cmds).finish(),
            Self::Msg(m) => f.debug_tuple("Msg").field(m).finish(),
            Self::Tick(d) => f.debug_tuple("Tick").field(d).finish(),
            Self::Log(s) => f.debug_tuple("Log").field(s).finish(),
        }
    }
}

impl<M> Cmd<M> {
    #[inline]
    pub fn none() -> Self {
        Self::None
    }

    #[inline]
    pub fn quit() -> Self {
        Self::Quit
    }

    #[inline]
    pub fn msg(m: M) -> Self {
        Self::Msg(m)
    }

    #[inline]
    pub fn log(msg: impl Into<String>) -> Self {
        Self::Log(msg.into())
    }

    #[inline]
    pub fn tick(duration: Duration) -> Self {
        Self::Tick(duration)
    }

    /// A batch; collapses to the single command or to `None` when it can.
    pub fn batch(cmds: Vec<Self>) -> Self {
        Self::collapse(cmds).unwrap_or_else(Self::Batch)
    }

    /// A sequence; collapses like [`batch`](Self::batch).
    pub fn sequence(cmds: Vec<Self>) -> Self {
        Self::collapse(cmds).unwrap_or_else(Self::Sequence)
    }

    fn collapse(mut cmds: Vec<Self>) -> Result<Self, Vec<Self>> {
        match cmds.len() {
            0 => Ok(Self::None),
            1 => cmds.pop().ok_or(cmds),
            _ => Err(cmds),
        }
    }

    /// Stable name for tracing.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Quit => "Quit",
            Self::Batch(_) => "Batch",
            Self::Sequence(_) => "Sequence",
            Self::Msg(_) => "Msg",
            Self::Tick(_) => "Tick",
            Self::Log(_) => "Log",
        }
    }
}

/// The one outstanding tick request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSchedule {
    deadline: Option<Instant>,
}

impl TickSchedule {
    /// Ask for a tick `after` from `now`, keeping an earlier request.
    pub fn request(&mut self, after: Duration, now: Instant) {
        let deadline = now + after;
        self.deadline = Some(self.deadline.map_or(deadline, |d| d.min(deadline)));
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn time_until(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    /// Clear and return `true` if the tick is due.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProgramConfig {
    pub session: SessionOptions,
    /// Longest wait for input when no tick is scheduled.
    pub poll_timeout: Duration,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            session: SessionOptions {
                alternate_screen: true,
                mouse_capture: true,
                bracketed_paste: true,
                focus_events: false,
            },
            poll_timeout: Duration::from_millis(250),
        }
    }
}

/// Drives a [`Model`] against the real terminal.
pub struct Program<M: Model> {
    model: M,
    presenter: Presenter<Stdout>,
    // Dropped after the presenter so the last frame flushes before the
    // terminal modes are restored.
    session: TerminalSession,
    width: u16,
    height: u16,
    running: bool,
    dirty: bool,
    tick: TickSchedule,
    poll_timeout: Duration,
    frame_idx: u64,
}

impl<M: Model> Program<M> {
    /// Start a terminal session for `model`.
    ///
    /// # Errors
    ///
    /// Fails when the terminal cannot be put into raw mode or queried.
    pub fn new(model: M, config: ProgramConfig) -> io::Result<Self> {
        let session = TerminalSession::new(config.session)?;
        let (width, height) = session.size()?;
        info!(width, height, "program started");
        Ok(Self {
            model,
            presenter: Presenter::new(io::stdout()),
            session,
            width,
            height,
            running: true,
            dirty: true,
            tick: TickSchedule::default(),
            poll_timeout: config.poll_timeout,
            frame_idx: 0,
        })
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Run until the model returns [`Cmd::Quit`].
    pub fn run(&mut self) -> io::Result<()> {
        let cmd = {
            let _span = info_span!("sift.program.init").entered();
            self.model.init()
        };
        self.execute_cmd(cmd);
        self.render_frame()?;

        while self.running {
            let timeout = self.effective_timeout(Instant::now());
            if self.session.poll_event(timeout)? {
                loop {
                    if let Some(event) = self.session.read_event()? {
                        self.handle_event(event);
                    }
                    if !self.running || !self.session.poll_event(Duration::ZERO)? {
                        break;
                    }
                }
            }

            if self.running && self.tick.take_due(Instant::now()) {
                self.dispatch(Event::Tick);
            }

            if self.running && self.dirty {
                self.render_frame()?;
            }
        }
        info!(frames = self.frame_idx, "program finished");
        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Resize { width, height } = event {
            debug!(width, height, "resize");
            self.width = width;
            self.height = height;
            self.presenter.invalidate();
        }
        self.dispatch(event);
    }

    fn dispatch(&mut self, event: Event) {
        let msg = M::Message::from(event);
        let cmd = {
            let _span = debug_span!("sift.program.update").entered();
            self.model.update(msg)
        };
        self.dirty = true;
        self.execute_cmd(cmd);
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) {
        match cmd {
            Cmd::None => {}
            Cmd::Quit => self.running = false,
            Cmd::Msg(m) => {
                let cmd = self.model.update(m);
                self.dirty = true;
                self.execute_cmd(cmd);
            }
            Cmd::Batch(cmds) | Cmd::Sequence(cmds) => {
                for c in cmds {
                    self.execute_cmd(c);
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::Tick(duration) => self.tick.request(duration, Instant::now()),
            // The UI owns stdout; log lines go to the subscriber.
            Cmd::Log(text) => info!(target: "sift::app", "{}", text.trim_end()),
        }
    }

    fn render_frame(&mut self) -> io::Result<()> {
        self.frame_idx = self.frame_idx.wrapping_add(1);
        let _span = debug_span!("sift.program.render", frame = self.frame_idx).entered();
        let mut frame = Frame::with_hit_grid(self.width, self.height);
        self.model.view(&mut frame);
        let written = self.presenter.present(&frame)?;
        tracing::trace!(cells = written, "frame presented");
        self.dirty = false;
        Ok(())
    }

    fn effective_timeout(&self, now: Instant) -> Duration {
        self.tick
            .time_until(now)
            .map_or(self.poll_timeout, |t| t.min(self.poll_timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Msg {
        A,
        B,
    }

    #[test]
    fn batch_collapses() {
        assert!(matches!(Cmd::<Msg>::batch(vec![]), Cmd::None));
        assert!(matches!(Cmd::batch(vec![Cmd::msg(Msg::A)]), Cmd::Msg(Msg::A)));
        assert!(matches!(
            Cmd::batch(vec![Cmd::msg(Msg::A), Cmd::msg(Msg::B)]),
            Cmd::Batch(v) if v.len() == 2
        ));
        assert!(matches!(Cmd::<Msg>::sequence(vec![Cmd::quit()]), Cmd::Quit));
    }

    #[test]
    fn type_names() {
        assert_eq!(Cmd::<Msg>::tick(Duration::ZERO).type_name(), "Tick");
        assert_eq!(Cmd::<Msg>::log("x").type_name(), "Log");
        assert_eq!(Cmd::<Msg>::default().type_name(), "None");
    }

    #[test]
    fn debug_format() {
        assert_eq!(format!("{:?}", Cmd::msg(Msg::B)), "Msg(B)");
        assert_eq!(format!("{:?}", Cmd::<Msg>::log("hi")), "Log(\"hi\")");
    }

    #[test]
    fn earliest_tick_request_wins() {
        let t0 = Instant::now();
        let mut tick = TickSchedule::default();
        tick.request(Duration::from_millis(500), t0);
        tick.request(Duration::from_millis(800), t0);
        assert_eq!(tick.deadline(), Some(t0 + Duration::from_millis(500)));
        tick.request(Duration::from_millis(100), t0);
        assert_eq!(tick.time_until(t0), Some(Duration::from_millis(100)));
    }

    #[test]
    fn tick_fires_once() {
        let t0 = Instant::now();
        let mut tick = TickSchedule::default();
        assert!(!tick.take_due(t0));
        tick.request(Duration::from_millis(10), t0);
        assert!(!tick.take_due(t0 + Duration::from_millis(9)));
        assert!(tick.take_due(t0 + Duration::from_millis(10)));
        assert!(!tick.take_due(t0 + Duration::from_millis(20)));
        assert_eq!(tick.time_until(t0), None);
    }
}
