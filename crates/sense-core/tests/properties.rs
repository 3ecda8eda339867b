//! Property tests for decay, range scaling and selection.

use proptest::prelude::*;

use sense_core::{AcousticRegistry, Selection};
use sense_events::{AcousticEvent, BlockPos, Channel, Coord, PartitionId, PerceptionTarget, SoundCategory};

fn event(intensity: f32) -> AcousticEvent {
    AcousticEvent::new(BlockPos::new(0, 64, 0), intensity, 0, None, SoundCategory::Generic)
}

fn channel() -> impl Strategy<Value = Channel> {
    prop::sample::select(Channel::PRIORITY.to_vec())
}

proptest! {
    #[test]
    fn decay_is_monotone(intensity in 0.0f32..=1.0, window in 1u64..500, a in 0u64..600, b in 0u64..600) {
        let event = event(intensity);
        let (early, late) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(event.effective_volume(late, window) <= event.effective_volume(early, window));
        prop_assert_eq!(event.effective_volume(window, window), 0.0);
    }

    #[test]
    fn range_scales_with_intensity(intensity in -2.0f32..3.0, base in 0.0f64..128.0) {
        let range = event(intensity).effective_range(base);
        prop_assert!(range >= 0.0);
        prop_assert!(range <= base);

        let doubled = event(intensity * 2.0).effective_range(base);
        prop_assert!(doubled <= base);
        prop_assert!(doubled >= range);
    }

    #[test]
    fn swept_events_never_reappear(created in 0u64..1000, window in 1u64..200, extra in 0u64..200, query_offset in 0u64..400) {
        let registry = AcousticRegistry::with_settings(window, 32.0);
        let p = PartitionId::from("overworld");
        registry.insert(&p, BlockPos::new(0, 64, 0), 1.0, None, SoundCategory::Impact, created);

        registry.sweep(created + window + extra);
        let listener = BlockPos::new(0, 64, 0).center();
        prop_assert!(registry.query_in_range(&p, listener, 32.0, created + query_offset).is_empty());
    }

    #[test]
    fn selection_keeps_first_of_equal_scores(score in 0.001f32..1000.0, first in channel(), second in channel()) {
        let mut selection = Selection::new();
        selection.offer(PerceptionTarget::at_position(Coord::ORIGIN, first, score));
        selection.offer(PerceptionTarget::at_position(Coord::ORIGIN, second, score));
        prop_assert_eq!(selection.into_best().map(|t| t.channel), Some(first));
    }

    #[test]
    fn selection_holds_the_maximum(scores in prop::collection::vec(-10.0f32..10.0, 1..20)) {
        let mut selection = Selection::new();
        for score in &scores {
            selection.offer(PerceptionTarget::at_position(Coord::ORIGIN, Channel::Sound, *score));
        }
        let max = scores.iter().copied().fold(f32::MIN, f32::max);
        if max > 0.0 {
            prop_assert_eq!(selection.best_score(), Some(max));
        } else {
            prop_assert_eq!(selection.best_score(), None);
        }
    }
}
