//! Latency instrumentation for the scenario widget
//!
//! One measurement cycle per answer: the participant submits, a loading
//! indicator appears, the indicator disappears and a non-empty response
//! is present. The two latencies recorded are submit-to-indicator and
//! indicator-to-response. A cycle that misses its deadline records a
//! timeout marker instead; latencies are never fabricated for timed-out
//! cycles.
//!
//! The instrument is an explicit state machine fed through an event
//! queue. Widget callbacks only enqueue; [`TimingInstrument::drain`]
//! applies events in arrival order and returns the effects to persist,
//! so every transition is observable and replayable in tests.

use sfk_record::ScenarioStage;
use std::collections::VecDeque;

/// Widget DOM nodes the instrument cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Pending-answer indicator bubble
    LoadingIndicator,
    /// Response message body
    MessageContent,
}

/// Raw observations delivered by the widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    SubmitClicked,
    NodeInserted(NodeKind),
    NodeRemoved(NodeKind),
    /// Current text of the response message body
    ResponseText(String),
    /// Periodic wake-up used to detect missed deadlines
    Tick,
}

/// Cycle state; transitions only happen inside [`TimingInstrument::drain`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingPhase {
    /// No cycle running
    Idle,
    /// Submitted, waiting for the loading indicator
    AwaitingIndicator { submitted_at_ms: i64 },
    /// Indicator seen, waiting for it to clear with a non-empty response
    AwaitingResponse {
        submitted_at_ms: i64,
        indicator_at_ms: i64,
        indicator_gone: bool,
        response_seen: bool,
    },
    /// Both latencies recorded for the current stage
    Recorded,
    /// Deadline passed mid-cycle
    TimedOut,
}

impl TimingPhase {
    /// A cycle is in flight
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            TimingPhase::AwaitingIndicator { .. } | TimingPhase::AwaitingResponse { .. }
        )
    }
}

/// What the caller must persist after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimingEffect {
    /// Submit-to-indicator latency, milliseconds
    RecordAppearLatency {
        stage: ScenarioStage,
        elapsed_ms: u64,
    },
    /// Indicator-to-response latency, milliseconds
    RecordResponseLatency {
        stage: ScenarioStage,
        elapsed_ms: u64,
    },
    /// Cycle aborted; `at_ms` is the wall-clock moment of the abort
    RecordTimeout { stage: ScenarioStage, at_ms: i64 },
}

/// Per-stage latency state machine with its event queue
#[derive(Debug)]
pub struct TimingInstrument {
    stage: ScenarioStage,
    phase: TimingPhase,
    deadline_ms: Option<i64>,
    timeout_ms: u64,
    queue: VecDeque<WidgetEvent>,
}

impl TimingInstrument {
    #[must_use]
    pub fn new(stage: ScenarioStage, timeout_ms: u64) -> Self {
        Self {
            stage,
            phase: TimingPhase::Idle,
            deadline_ms: None,
            timeout_ms,
            queue: VecDeque::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn stage(&self) -> ScenarioStage {
        self.stage
    }

    #[inline]
    #[must_use]
    pub fn phase(&self) -> TimingPhase {
        self.phase
    }

    /// Reset for the next scenario; any queued events belong to the old
    /// stage and are dropped with it.
    pub fn begin_stage(&mut self, stage: ScenarioStage) {
        if self.phase.is_pending() {
            tracing::warn!(stage = %self.stage, "stage advanced with a cycle still pending");
        }
        self.stage = stage;
        self.phase = TimingPhase::Idle;
        self.deadline_ms = None;
        self.queue.clear();
    }

    /// Enqueue one observation; no transition happens here
    pub fn push(&mut self, event: WidgetEvent) {
        self.queue.push_back(event);
    }

    /// Apply queued events in order, returning the effects to persist
    pub fn drain(&mut self, now_ms: i64) -> Vec<TimingEffect> {
        let mut effects = Vec::new();
        while let Some(event) = self.queue.pop_front() {
            if let Some(effect) = self.apply(event, now_ms) {
                effects.push(effect);
            }
        }
        effects
    }

    fn apply(&mut self, event: WidgetEvent, now_ms: i64) -> Option<TimingEffect> {
        // Deadline first: a late observation must not resurrect the cycle.
        if self.phase.is_pending() {
            if let Some(deadline) = self.deadline_ms {
                if now_ms >= deadline {
                    tracing::warn!(stage = %self.stage, "measurement cycle timed out");
                    self.phase = TimingPhase::TimedOut;
                    self.deadline_ms = None;
                    return Some(TimingEffect::RecordTimeout {
                        stage: self.stage,
                        at_ms: now_ms,
                    });
                }
            }
        }

        match (&self.phase, event) {
            (TimingPhase::Idle | TimingPhase::Recorded | TimingPhase::TimedOut, WidgetEvent::SubmitClicked) => {
                self.phase = TimingPhase::AwaitingIndicator {
                    submitted_at_ms: now_ms,
                };
                self.deadline_ms = Some(now_ms + self.timeout_ms as i64);
                tracing::debug!(stage = %self.stage, "measurement cycle started");
                None
            }
            (TimingPhase::AwaitingIndicator { .. } | TimingPhase::AwaitingResponse { .. }, WidgetEvent::SubmitClicked) => {
                // One cycle at a time; the duplicate click is dropped.
                tracing::warn!(stage = %self.stage, "submit ignored, cycle already pending");
                None
            }
            (
                &TimingPhase::AwaitingIndicator { submitted_at_ms },
                WidgetEvent::NodeInserted(NodeKind::LoadingIndicator),
            ) => {
                let elapsed_ms = now_ms.saturating_sub(submitted_at_ms).max(0) as u64;
                self.phase = TimingPhase::AwaitingResponse {
                    submitted_at_ms,
                    indicator_at_ms: now_ms,
                    indicator_gone: false,
                    response_seen: false,
                };
                Some(TimingEffect::RecordAppearLatency {
                    stage: self.stage,
                    elapsed_ms,
                })
            }
            (
                &TimingPhase::AwaitingResponse {
                    submitted_at_ms,
                    indicator_at_ms,
                    response_seen,
                    ..
                },
                WidgetEvent::NodeRemoved(NodeKind::LoadingIndicator),
            ) => self.response_progress(submitted_at_ms, indicator_at_ms, true, response_seen, now_ms),
            (
                &TimingPhase::AwaitingResponse {
                    submitted_at_ms,
                    indicator_at_ms,
                    indicator_gone,
                    ..
                },
                WidgetEvent::ResponseText(text),
            ) => {
                if text.trim().is_empty() {
                    return None;
                }
                self.response_progress(submitted_at_ms, indicator_at_ms, indicator_gone, true, now_ms)
            }
            // Ticks only matter for the deadline check above.
            (_, WidgetEvent::Tick) => None,
            (_, event) => {
                tracing::trace!(stage = %self.stage, ?event, "observation outside any cycle");
                None
            }
        }
    }

    fn response_progress(
        &mut self,
        submitted_at_ms: i64,
        indicator_at_ms: i64,
        indicator_gone: bool,
        response_seen: bool,
        now_ms: i64,
    ) -> Option<TimingEffect> {
        if indicator_gone && response_seen {
            let elapsed_ms = now_ms.saturating_sub(indicator_at_ms).max(0) as u64;
            self.phase = TimingPhase::Recorded;
            self.deadline_ms = None;
            tracing::debug!(stage = %self.stage, elapsed_ms, "response latency recorded");
            return Some(TimingEffect::RecordResponseLatency {
                stage: self.stage,
                elapsed_ms,
            });
        }
        self.phase = TimingPhase::AwaitingResponse {
            submitted_at_ms,
            indicator_at_ms,
            indicator_gone,
            response_seen,
        };
        None
    }
}
