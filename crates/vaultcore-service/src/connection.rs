//! Transport connection lifecycle tracking.
//!
//! The transport itself is an external collaborator; this module only
//! tracks its lifecycle so the boundary knows when cached connection state
//! must be discarded. A pure state machine (no I/O) in the same style as a
//! session layer: events come in, observable state comes out.
//!
//! # State Machine
//!
//! ```text
//! ┌──────┐ established ┌───────┐ interrupted  ┌──────┐
//! │ Idle │────────────▶│ Ready │─────────────▶│ Idle │ (reconnect on next call)
//! └──────┘             └───────┘              └──────┘
//!                          │ invalidated
//!                          ▼
//!                    ┌─────────────┐ established ┌───────┐
//!                    │ Invalidated │────────────▶│ Ready │
//!                    └─────────────┘             └───────┘
//! ```
//!
//! Both interruption and invalidation clear the cached session, so the next
//! call re-establishes a connection. The monitor never retries on its own;
//! retry policy belongs to the caller.

/// Observable connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// No connection established yet, or the last one was interrupted
    Idle,
    /// Connection established and usable
    Ready,
    /// The transport reported the connection permanently invalid
    Invalidated,
}

/// Tracks the lifecycle of the underlying transport connection.
#[derive(Debug, Clone)]
pub struct ConnectionMonitor {
    state: LinkState,
    /// Session handle cached from the live connection, if any
    session: Option<u64>,
    /// Number of times a connection has been established
    generation: u64,
}

impl ConnectionMonitor {
    /// Create a monitor with no connection.
    pub fn new() -> Self {
        Self { state: LinkState::Idle, session: None, generation: 0 }
    }

    /// Current state.
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Cached session handle. `None` whenever a reconnect is needed.
    pub fn cached_session(&self) -> Option<u64> {
        self.session
    }

    /// How many connections have been established over this monitor's life.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True if the next call must establish a connection first.
    pub fn needs_reconnect(&self) -> bool {
        self.state != LinkState::Ready
    }

    /// The transport established a connection with this session handle.
    pub fn established(&mut self, session: u64) {
        self.state = LinkState::Ready;
        self.session = Some(session);
        self.generation += 1;
        tracing::debug!(session, generation = self.generation, "connection established");
    }

    /// The transport reported an interruption. Cached state is cleared;
    /// the connection may be re-established on the next call.
    pub fn interrupted(&mut self) {
        self.state = LinkState::Idle;
        self.session = None;
        tracing::warn!("connection interrupted, cached session cleared");
    }

    /// The transport reported the connection invalid. Cached state is
    /// cleared; a new connection object is required.
    pub fn invalidated(&mut self) {
        self.state = LinkState::Invalidated;
        self.session = None;
        tracing::warn!("connection invalidated, cached session cleared");
    }
}

impl Default for ConnectionMonitor {
    fn default() -> Self {
        Self::new()
    }
}
