//! Typed event registry for audio/UI consumers.
//!
//! Listeners are keyed by [`EventKind`] in a fixed-size table. A listener
//! that returns an error or panics is logged and skipped; the remaining
//! listeners for that event still run and the emitter never observes the
//! failure.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use rhythm_model::Pattern;
use rhythm_rule::{ClearType, GameStats, HitResult};

use crate::state::GameState;

/// Event category used for subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Hit,
    Miss,
    GameStateChanged,
    PatternLoaded,
    PatternStarted,
    PatternCompleted,
    StatsUpdated,
    Error,
}

impl EventKind {
    pub const ALL: [EventKind; 8] = [
        EventKind::Hit,
        EventKind::Miss,
        EventKind::GameStateChanged,
        EventKind::PatternLoaded,
        EventKind::PatternStarted,
        EventKind::PatternCompleted,
        EventKind::StatsUpdated,
        EventKind::Error,
    ];

    const COUNT: usize = Self::ALL.len();

    fn index(self) -> usize {
        self as usize
    }
}

/// An engine notification with its payload.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    Hit(HitResult),
    Miss(HitResult),
    GameStateChanged(GameState),
    PatternLoaded(Arc<Pattern>),
    PatternStarted(Arc<Pattern>),
    PatternCompleted {
        pattern: Arc<Pattern>,
        stats: GameStats,
        clear_type: ClearType,
    },
    StatsUpdated(GameStats),
    Error {
        message: String,
    },
}

impl EngineEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Hit(_) => EventKind::Hit,
            Self::Miss(_) => EventKind::Miss,
            Self::GameStateChanged(_) => EventKind::GameStateChanged,
            Self::PatternLoaded(_) => EventKind::PatternLoaded,
            Self::PatternStarted(_) => EventKind::PatternStarted,
            Self::PatternCompleted { .. } => EventKind::PatternCompleted,
            Self::StatsUpdated(_) => EventKind::StatsUpdated,
            Self::Error { .. } => EventKind::Error,
        }
    }
}

/// Callback invoked for each event of the subscribed kind.
pub type Listener = Box<dyn FnMut(&EngineEvent) -> anyhow::Result<()> + Send>;

/// Handle returned by [`EventBus::add_listener`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub struct EventBus {
    listeners: [Vec<(ListenerId, Listener)>; EventKind::COUNT],
    next_id: u64,
    disposed: bool,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: Vec<_> = EventKind::ALL
            .iter()
            .map(|&k| (k, self.listener_count(k)))
            .filter(|&(_, n)| n > 0)
            .collect();
        f.debug_struct("EventBus")
            .field("listeners", &counts)
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Default::default(),
            next_id: 0,
            disposed: false,
        }
    }

    /// Subscribe `listener` to events of `kind`.
    ///
    /// After [`dispose`](Self::dispose) the listener is dropped immediately.
    pub fn add_listener(&mut self, kind: EventKind, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        if self.disposed {
            log::debug!("Event bus disposed, ignoring {:?} listener", kind);
            return id;
        }
        self.listeners[kind.index()].push((id, listener));
        id
    }

    /// Returns true if the listener was registered for `kind`.
    pub fn remove_listener(&mut self, kind: EventKind, id: ListenerId) -> bool {
        let slot = &mut self.listeners[kind.index()];
        let before = slot.len();
        slot.retain(|(lid, _)| *lid != id);
        slot.len() != before
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners[kind.index()].len()
    }

    pub fn emit(&mut self, event: &EngineEvent) {
        if self.disposed {
            return;
        }
        let kind = event.kind();
        // The bus is exclusively borrowed for the whole dispatch, so the
        // listener list cannot change until every listener has run.
        for (id, listener) in self.listeners[kind.index()].iter_mut() {
            match panic::catch_unwind(AssertUnwindSafe(|| listener(event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    log::warn!("{:?} listener {:?} failed: {:#}", kind, id, e);
                }
                Err(payload) => {
                    log::error!(
                        "{:?} listener {:?} panicked: {}",
                        kind,
                        id,
                        panic_message(payload.as_ref())
                    );
                }
            }
        }
    }

    /// Drop every listener; no further events are delivered.
    pub fn dispose(&mut self) {
        for slot in &mut self.listeners {
            slot.clear();
        }
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic>"
    }
}
