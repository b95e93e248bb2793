//! Generation-guarded frame loop.
//!
//! The host owns a per-frame scheduling primitive (redraw requests, `requestAnimationFrame`,
//! a test queue). Each scheduled frame carries a [`FrameTicket`] naming the generation it was
//! scheduled for. Invalidating the loop bumps the generation; tickets of older generations
//! are not cancelled, they simply observe the mismatch on their next tick and stop.

use std::fmt;

use tracing::{debug, info};

/// Monotonic epoch of continuous rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(pub u64);

impl Generation {
    #[inline]
    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A pending frame callback, bound to the generation that scheduled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameTicket {
    pub generation: Generation,
}

/// Host scheduling primitive: run the ticket on the next frame tick.
pub trait FrameScheduler {
    fn schedule(&mut self, ticket: FrameTicket);
}

/// FIFO of tickets due on the next tick.
///
/// Tickets scheduled while draining run on the following tick, never the current one, so
/// frames of one generation cannot interleave.
#[derive(Debug, Default)]
pub struct FrameQueue {
    pending: Vec<FrameTicket>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns every ticket due this tick.
    pub fn take_due(&mut self) -> Vec<FrameTicket> {
        std::mem::take(&mut self.pending)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

impl FrameScheduler for FrameQueue {
    fn schedule(&mut self, ticket: FrameTicket) {
        self.pending.push(ticket);
    }
}

/// Per-callback timing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    pub generation: Generation,
    /// Frame index within the generation, starting at 0.
    pub frame: u64,
    pub timestamp_secs: f64,
    /// 0 on the first frame of a generation; never negative.
    pub delta_secs: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running(Generation),
}

/// Result of running one ticket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// The ticket's generation was superseded: nothing drawn, nothing rescheduled.
    Stale { ticket: Generation, current: Generation },
    /// Frame drawn and the ticket rescheduled for the next tick.
    Rendered(FrameContext),
}

#[derive(Debug, Default)]
pub struct RenderLoop {
    current: Generation,
    state: Option<Generation>,
    last_timestamp: Option<f64>,
    frame: u64,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn generation(&self) -> Generation {
        self.current
    }

    pub fn state(&self) -> LoopState {
        match self.state {
            Some(g) => LoopState::Running(g),
            None => LoopState::Idle,
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state.is_some()
    }

    /// Opens a new generation and schedules its first frame.
    pub fn start<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) -> Generation {
        let generation = self.current.next();
        self.current = generation;
        self.state = Some(generation);
        self.last_timestamp = None;
        self.frame = 0;
        scheduler.schedule(FrameTicket { generation });
        info!(%generation, "render loop started");
        generation
    }

    /// Supersedes the live generation (if any) and returns to Idle.
    ///
    /// In-flight tickets are left alone; they terminate on their next tick.
    pub fn invalidate(&mut self) -> Generation {
        let generation = self.current.next();
        if let Some(old) = self.state.take() {
            info!(%old, %generation, "render loop invalidated");
        }
        self.current = generation;
        self.last_timestamp = None;
        generation
    }

    /// Runs one scheduled frame.
    ///
    /// A live ticket computes the frame timing, calls `draw`, then reschedules itself.
    pub fn tick<S, F>(
        &mut self,
        ticket: FrameTicket,
        timestamp_secs: f64,
        scheduler: &mut S,
        draw: F,
    ) -> TickOutcome
    where
        S: FrameScheduler + ?Sized,
        F: FnOnce(&FrameContext),
    {
        if self.state != Some(ticket.generation) || ticket.generation != self.current {
            debug!(generation = %ticket.generation, "render loop {} has been finished", ticket.generation);
            return TickOutcome::Stale {
                ticket: ticket.generation,
                current: self.current,
            };
        }

        let delta_secs = match self.last_timestamp {
            Some(prev) => (timestamp_secs - prev).max(0.0),
            None => 0.0,
        };
        self.last_timestamp = Some(timestamp_secs);

        let ctx = FrameContext {
            generation: ticket.generation,
            frame: self.frame,
            timestamp_secs,
            delta_secs,
        };
        self.frame += 1;

        draw(&ctx);
        scheduler.schedule(ticket);
        TickOutcome::Rendered(ctx)
    }
}
