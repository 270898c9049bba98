#![forbid(unsafe_code)]

//! Deterministic program simulator for testing.
//!
//! `ProgramSimulator` runs a [`Model`] without a real terminal, enabling
//! deterministic snapshot testing, event injection, and frame capture.
//! Time only moves when the test calls [`advance`](ProgramSimulator::advance),
//! which also delivers any tick that came due.
//!
//! # Example
//!
//! ```ignore
//! use sift_runtime::simulator::ProgramSimulator;
//!
//! let mut sim = ProgramSimulator::new(Counter { value: 0 });
//! sim.init();
//! sim.send(Msg::Increment);
//! assert_eq!(sim.model().value, 1);
//!
//! let frame = sim.capture_frame(80, 24);
//! // Assert on buffer contents...
//! ```

use std::time::Duration;

use sift_core::event::Event;
use sift_render::buffer::Buffer;
use sift_render::frame::Frame;

use crate::clock::Clock;
use crate::program::{Cmd, Model, TickSchedule};

/// Record of a command that was executed during simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmdRecord {
    None,
    Quit,
    /// Message sent to the model (not stored, just noted).
    Msg,
    Batch(usize),
    Sequence(usize),
    Tick(Duration),
    Log(String),
}

pub struct ProgramSimulator<M: Model> {
    model: M,
    clock: Clock,
    /// Captured frames, oldest first.
    frames: Vec<Frame>,
    command_log: Vec<CmdRecord>,
    running: bool,
    tick: TickSchedule,
    ticks_delivered: usize,
    logs: Vec<String>,
}

impl<M: Model> ProgramSimulator<M> {
    /// A simulator with its own manual clock. The model is not initialized
    /// until [`init`](Self::init) is called.
    pub fn new(model: M) -> Self {
        Self::with_clock(model, Clock::manual(std::time::Instant::now()))
    }

    /// A simulator driving `clock`, which should be the clock the model reads.
    pub fn with_clock(model: M, clock: Clock) -> Self {
        Self {
            model,
            clock,
            frames: Vec::new(),
            command_log: Vec::new(),
            running: true,
            tick: TickSchedule::default(),
            ticks_delivered: 0,
            logs: Vec::new(),
        }
    }

    pub fn init(&mut self) {
        let cmd = self.model.init();
        self.execute_cmd(cmd);
    }

    /// Convert each event to a message and run it through `update`.
    pub fn inject_events(&mut self, events: &[Event]) {
        for event in events {
            if !self.running {
                break;
            }
            let msg = M::Message::from(event.clone());
            let cmd = self.model.update(msg);
            self.execute_cmd(cmd);
        }
    }

    pub fn inject_event(&mut self, event: Event) {
        self.inject_events(&[event]);
    }

    pub fn send(&mut self, msg: M::Message) {
        if !self.running {
            return;
        }
        let cmd = self.model.update(msg);
        self.execute_cmd(cmd);
    }

    /// Move the clock forward, delivering [`Event::Tick`] if one came due.
    ///
    /// A tick requested while handling that tick is delivered too, as long
    /// as it falls inside the advanced window.
    pub fn advance(&mut self, by: Duration) {
        self.clock.advance(by);
        while self.running && self.tick.take_due(self.clock.now()) {
            self.ticks_delivered += 1;
            self.inject_event(Event::Tick);
        }
    }

    /// Render the model into a fresh frame with a hit grid and keep it.
    pub fn capture_frame(&mut self, width: u16, height: u16) -> &Frame {
        let mut frame = Frame::with_hit_grid(width, height);
        self.model.view(&mut frame);
        self.frames.push(frame);
        &self.frames[self.frames.len() - 1]
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn last_buffer(&self) -> Option<&Buffer> {
        self.frames.last().map(|f| &f.buffer)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// `false` once a [`Cmd::Quit`] has run.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// When the outstanding tick is due, if any.
    pub fn pending_tick(&self) -> Option<Duration> {
        self.tick.time_until(self.clock.now())
    }

    pub fn ticks_delivered(&self) -> usize {
        self.ticks_delivered
    }

    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    pub fn command_log(&self) -> &[CmdRecord] {
        &self.command_log
    }

    pub fn clear_frames(&mut self) {
        self.frames.clear();
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) {
        match cmd {
            Cmd::None => self.command_log.push(CmdRecord::None),
            Cmd::Quit => {
                self.running = false;
                self.command_log.push(CmdRecord::Quit);
            }
            Cmd::Msg(m) => {
                self.command_log.push(CmdRecord::Msg);
                let cmd = self.model.update(m);
                self.execute_cmd(cmd);
            }
            Cmd::Batch(cmds) => {
                self.command_log.push(CmdRecord::Batch(cmds.len()));
                self.execute_all(cmds);
            }
            Cmd::Sequence(cmds) => {
                self.command_log.push(CmdRecord::Sequence(cmds.len()));
                self.execute_all(cmds);
            }
            Cmd::Tick(duration) => {
                self.tick.request(duration, self.clock.now());
                self.command_log.push(CmdRecord::Tick(duration));
            }
            Cmd::Log(text) => {
                self.command_log.push(CmdRecord::Log(text.clone()));
                self.logs.push(text);
            }
        }
    }

    fn execute_all(&mut self, cmds: Vec<Cmd<M::Message>>) {
        for c in cmds {
            self.execute_cmd(c);
            if !self.running {
                break;
            }
        }
    }
}
