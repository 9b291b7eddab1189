//! Scenario progression
//!
//! Four scenarios, advanced one at a time by the widget's next control.
//! The counter is monotone non-decreasing and clamps at the ceiling;
//! completion is a one-shot edge detected from the control itself.

use crate::config::FlowConfig;
use crate::texts;
use sfk_record::ScenarioStage;

/// Snapshot of the widget's next-scenario control at click time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextControl {
    /// The control carries the dedicated completion marker class
    pub completion_marker: bool,
    /// Visible label of the control
    pub label: String,
}

impl NextControl {
    #[must_use]
    pub fn advance() -> Self {
        Self {
            completion_marker: false,
            label: "Next scenario".to_string(),
        }
    }

    #[must_use]
    pub fn terminal() -> Self {
        Self {
            completion_marker: true,
            label: texts::COMPLETE_STUDY_LABEL.to_string(),
        }
    }

    /// The marker class is authoritative; the label match is kept only for
    /// widget builds that predate the marker.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.completion_marker
            || self
                .label
                .trim()
                .eq_ignore_ascii_case(texts::COMPLETE_STUDY_LABEL)
    }
}

/// Single source of the progression signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionSignal {
    /// Move on to this scenario
    Advance(ScenarioStage),
    /// All scenarios answered; leave the study page
    Complete,
}

/// Controller-owned progression state
#[derive(Debug)]
pub struct ScenarioProgression {
    stage: ScenarioStage,
    busy: bool,
    finished: bool,
}

impl ScenarioProgression {
    #[must_use]
    pub fn new() -> Self {
        Self::resume(None)
    }

    /// Resume from the stage persisted on a previous visit
    #[must_use]
    pub fn resume(last: Option<ScenarioStage>) -> Self {
        Self {
            stage: last.unwrap_or_else(ScenarioStage::first),
            busy: false,
            finished: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn stage(&self) -> ScenarioStage {
        self.stage
    }

    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[inline]
    #[must_use]
    pub fn progress_percent(&self, config: &FlowConfig) -> u8 {
        config.progress_percent(self.stage)
    }

    /// Interpret one click on the next control
    ///
    /// Returns `None` while a previous click is still being persisted
    /// (the busy guard) and after completion has fired once. A `Some`
    /// puts the progression into the busy state until [`settle`] is
    /// called.
    ///
    /// [`settle`]: ScenarioProgression::settle
    pub fn observe_next(&mut self, control: &NextControl) -> Option<CompletionSignal> {
        if self.busy {
            tracing::warn!(stage = %self.stage, "next control ignored, still processing");
            return None;
        }
        if self.finished {
            tracing::warn!("next control ignored, study already completed");
            return None;
        }
        self.busy = true;
        if control.is_terminal() {
            self.finished = true;
            tracing::info!(stage = %self.stage, "scenario run complete");
            Some(CompletionSignal::Complete)
        } else {
            self.stage = self.stage.next_clamped();
            tracing::info!(stage = %self.stage, "advanced to next scenario");
            Some(CompletionSignal::Advance(self.stage))
        }
    }

    /// Release the busy guard once the click's writes have settled
    pub fn settle(&mut self) {
        self.busy = false;
    }

    /// Re-arm completion after its writes failed, so the click can retry
    pub(crate) fn reopen(&mut self) {
        self.finished = false;
    }
}

impl Default for ScenarioProgression {
    fn default() -> Self {
        Self::new()
    }
}
