//! Property tests for the latency state machine

use proptest::prelude::*;
use sfk_core::timing::{NodeKind, TimingEffect, TimingInstrument, TimingPhase, WidgetEvent};
use sfk_record::ScenarioStage;

const TIMEOUT_MS: u64 = 30_000;

proptest! {
    /// Whatever the widget latencies, a cycle that fits inside the
    /// deadline records exactly the two observed gaps.
    #[test]
    fn in_time_cycles_record_the_observed_gaps(
        start in 0i64..2_000_000_000,
        appear in 0i64..14_000,
        respond in 0i64..14_000,
    ) {
        let mut timing = TimingInstrument::new(ScenarioStage::first(), TIMEOUT_MS);

        timing.push(WidgetEvent::SubmitClicked);
        prop_assert!(timing.drain(start).is_empty());

        timing.push(WidgetEvent::NodeInserted(NodeKind::LoadingIndicator));
        let effects = timing.drain(start + appear);
        prop_assert_eq!(effects, vec![TimingEffect::RecordAppearLatency {
            stage: ScenarioStage::first(),
            elapsed_ms: appear as u64,
        }]);

        timing.push(WidgetEvent::NodeRemoved(NodeKind::LoadingIndicator));
        timing.push(WidgetEvent::ResponseText("answer".into()));
        let effects = timing.drain(start + appear + respond);
        prop_assert_eq!(effects, vec![TimingEffect::RecordResponseLatency {
            stage: ScenarioStage::first(),
            elapsed_ms: respond as u64,
        }]);
        prop_assert_eq!(timing.phase(), TimingPhase::Recorded);
    }

    /// A cycle that overruns the deadline produces a timeout marker and
    /// never a response latency, no matter when the widget catches up.
    #[test]
    fn overrunning_cycles_only_ever_time_out(
        start in 0i64..2_000_000_000,
        overrun in 0i64..60_000,
        straggler_delay in 0i64..60_000,
    ) {
        let mut timing = TimingInstrument::new(ScenarioStage::first(), TIMEOUT_MS);
        timing.push(WidgetEvent::SubmitClicked);
        timing.drain(start);

        let deadline = start + TIMEOUT_MS as i64;
        timing.push(WidgetEvent::Tick);
        let effects = timing.drain(deadline + overrun);
        prop_assert_eq!(effects, vec![TimingEffect::RecordTimeout {
            stage: ScenarioStage::first(),
            at_ms: deadline + overrun,
        }]);

        // Whatever arrives afterwards cannot produce a latency.
        timing.push(WidgetEvent::NodeInserted(NodeKind::LoadingIndicator));
        timing.push(WidgetEvent::NodeRemoved(NodeKind::LoadingIndicator));
        timing.push(WidgetEvent::ResponseText("late".into()));
        prop_assert!(timing.drain(deadline + overrun + straggler_delay).is_empty());
        prop_assert_eq!(timing.phase(), TimingPhase::TimedOut);
    }

    /// Arbitrary event noise can never conjure a latency without a
    /// preceding submit.
    #[test]
    fn no_effects_without_a_submit(events in proptest::collection::vec(arb_event(), 0..40)) {
        let mut timing = TimingInstrument::new(ScenarioStage::first(), TIMEOUT_MS);
        let mut now = 0i64;
        for event in events {
            timing.push(event);
            now += 250;
            prop_assert!(timing.drain(now).is_empty());
        }
        prop_assert_eq!(timing.phase(), TimingPhase::Idle);
    }
}

/// Any widget event except a submit click
fn arb_event() -> impl Strategy<Value = WidgetEvent> {
    prop_oneof![
        Just(WidgetEvent::NodeInserted(NodeKind::LoadingIndicator)),
        Just(WidgetEvent::NodeInserted(NodeKind::MessageContent)),
        Just(WidgetEvent::NodeRemoved(NodeKind::LoadingIndicator)),
        Just(WidgetEvent::NodeRemoved(NodeKind::MessageContent)),
        Just(WidgetEvent::Tick),
        ".{0,12}".prop_map(WidgetEvent::ResponseText),
    ]
}
