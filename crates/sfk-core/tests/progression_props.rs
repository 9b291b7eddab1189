//! Property tests for scenario progression

use proptest::prelude::*;
use sfk_core::progression::{CompletionSignal, NextControl, ScenarioProgression};
use sfk_record::ScenarioStage;

#[derive(Debug, Clone)]
enum Click {
    Advance,
    Terminal,
    /// A second click landing before the first one settles
    DoubleClick,
}

fn arb_clicks() -> impl Strategy<Value = Vec<Click>> {
    proptest::collection::vec(
        prop_oneof![
            3 => Just(Click::Advance),
            1 => Just(Click::Terminal),
            1 => Just(Click::DoubleClick),
        ],
        0..24,
    )
}

proptest! {
    /// Under any click sequence the stage is monotone non-decreasing,
    /// never leaves 1..=4, and completion fires at most once.
    #[test]
    fn progression_invariants_hold(start in 1u8..=4, clicks in arb_clicks()) {
        let mut progression = ScenarioProgression::resume(ScenarioStage::new(start).ok());
        let mut previous = progression.stage().get();
        let mut completions = 0u32;

        for click in clicks {
            let control = match click {
                Click::Advance | Click::DoubleClick => NextControl::advance(),
                Click::Terminal => NextControl::terminal(),
            };
            let signal = progression.observe_next(&control);
            if matches!(click, Click::DoubleClick) {
                // Busy: the second click of the pair must be swallowed.
                prop_assert_eq!(progression.observe_next(&control), None);
            }
            progression.settle();

            match signal {
                Some(CompletionSignal::Complete) => completions += 1,
                Some(CompletionSignal::Advance(stage)) => {
                    prop_assert!(stage.get() >= previous);
                    prop_assert!((1..=4).contains(&stage.get()));
                }
                None => {}
            }
            prop_assert!(progression.stage().get() >= previous);
            previous = progression.stage().get();
        }

        prop_assert!(completions <= 1);
        prop_assert_eq!(completions > 0, progression.is_finished());
    }

    /// After completion every further click is inert.
    #[test]
    fn nothing_moves_after_completion(clicks in arb_clicks()) {
        let mut progression = ScenarioProgression::resume(ScenarioStage::new(4).ok());
        prop_assert_eq!(
            progression.observe_next(&NextControl::terminal()),
            Some(CompletionSignal::Complete)
        );
        progression.settle();

        for click in clicks {
            let control = match click {
                Click::Terminal => NextControl::terminal(),
                _ => NextControl::advance(),
            };
            prop_assert_eq!(progression.observe_next(&control), None);
            progression.settle();
        }
        prop_assert_eq!(progression.stage().get(), 4);
    }
}
