use serde::{Deserialize, Serialize};

/// The timed activities a [`crate::Game`] owns.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimerKind {
    /// Repeating, counts down to the start of play.
    Countdown,
    /// Repeating, accumulates play time.
    Elapsed,
    /// One-shot, compares the two revealed cards.
    Resolution,
}

impl TimerKind {
    pub const ALL: [Self; 3] = [Self::Countdown, Self::Elapsed, Self::Resolution];

    const fn slot(self) -> usize {
        use TimerKind::*;
        match self {
            Countdown => 0,
            Elapsed => 1,
            Resolution => 2,
        }
    }
}

/// Identifies one arming of a timer. A fire carrying an older generation than the armed one is stale.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId {
    pub kind: TimerKind,
    pub generation: u32,
}

/// Instruction for whatever actually keeps time (browser timers, a virtual clock).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimerRequest {
    /// Schedule `id`, replacing any scheduled timer of the same kind.
    Start {
        id: TimerId,
        delay_ms: u32,
        repeating: bool,
    },
    Cancel { kind: TimerKind },
}

/// Bookkeeping for which timer of each kind is currently armed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Timers {
    armed: [Option<u32>; 3],
    next_generation: u32,
}

impl Timers {
    pub fn arm(&mut self, kind: TimerKind, delay_ms: u32, repeating: bool) -> TimerRequest {
        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);
        self.armed[kind.slot()] = Some(generation);
        let id = TimerId { kind, generation };
        log::trace!("arm {:?} every {} ms (repeating: {})", id, delay_ms, repeating);
        TimerRequest::Start {
            id,
            delay_ms,
            repeating,
        }
    }

    /// Returns a cancel request only when something was armed.
    pub fn disarm(&mut self, kind: TimerKind) -> Option<TimerRequest> {
        self.armed[kind.slot()].take().map(|generation| {
            log::trace!("disarm {:?} generation {}", kind, generation);
            TimerRequest::Cancel { kind }
        })
    }

    /// Forgets a one-shot timer that just fired, the host drops it on its own.
    pub fn complete(&mut self, id: TimerId) {
        if self.is_current(id) {
            self.armed[id.kind.slot()] = None;
        }
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.armed[kind.slot()].is_some()
    }

    pub fn is_current(&self, id: TimerId) -> bool {
        self.armed[id.kind.slot()] == Some(id.generation)
    }

    pub fn current(&self, kind: TimerKind) -> Option<TimerId> {
        self.armed[kind.slot()].map(|generation| TimerId { kind, generation })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Scheduled {
    id: TimerId,
    due_ms: u64,
    period_ms: Option<u32>,
    seq: u64,
}

/// Keeps virtual time for [`TimerRequest`]s, used by tests and native hosts instead of real timers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VirtualScheduler {
    now_ms: u64,
    next_seq: u64,
    scheduled: Vec<Scheduled>,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn apply(&mut self, request: TimerRequest) {
        match request {
            TimerRequest::Start {
                id,
                delay_ms,
                repeating,
            } => {
                self.cancel(id.kind);
                let seq = self.bump_seq();
                self.scheduled.push(Scheduled {
                    id,
                    due_ms: self.now_ms.saturating_add(delay_ms.into()),
                    period_ms: repeating.then_some(delay_ms.max(1)),
                    seq,
                });
            }
            TimerRequest::Cancel { kind } => self.cancel(kind),
        }
    }

    pub fn is_scheduled(&self, kind: TimerKind) -> bool {
        self.scheduled.iter().any(|timer| timer.id.kind == kind)
    }

    pub fn scheduled(&self, kind: TimerKind) -> Option<TimerId> {
        self.scheduled
            .iter()
            .find(|timer| timer.id.kind == kind)
            .map(|timer| timer.id)
    }

    /// Pops the earliest timer due no later than `until_ms` and moves the clock to its due time. Repeating timers are
    /// rescheduled one period later. Returns `None` and moves the clock to `until_ms` when nothing else is due.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<TimerId> {
        let index = self
            .scheduled
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due_ms <= until_ms)
            .min_by_key(|(_, timer)| (timer.due_ms, timer.seq))
            .map(|(index, _)| index);

        let Some(index) = index else {
            self.now_ms = self.now_ms.max(until_ms);
            return None;
        };

        let timer = self.scheduled.swap_remove(index);
        self.now_ms = self.now_ms.max(timer.due_ms);
        if let Some(period_ms) = timer.period_ms {
            let seq = self.bump_seq();
            self.scheduled.push(Scheduled {
                due_ms: timer.due_ms.saturating_add(period_ms.into()),
                seq,
                ..timer
            });
        }
        Some(timer.id)
    }

    fn cancel(&mut self, kind: TimerKind) {
        self.scheduled.retain(|timer| timer.id.kind != kind);
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}
