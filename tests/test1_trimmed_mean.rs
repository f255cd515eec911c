use proptest::prelude::*;

use dialed::combine::aggregate::TRIM_THRESHOLD;
use dialed::combine::trimmed_mean;

#[test]
fn test_trimmed_mean_examples() {
    assert_eq!(trimmed_mean(&[]), 0);
    assert_eq!(trimmed_mean(&[101]), 101);
    assert_eq!(trimmed_mean(&[70, 80, 90, 100]), 85);
    // 5 shots: the 60 and the 200 are dropped
    assert_eq!(trimmed_mean(&[200, 70, 60, 90, 80]), 80);
    // only one copy of a repeated extreme is dropped
    assert_eq!(trimmed_mean(&[50, 50, 100, 100, 75]), 75);
}

fn shots() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(1u32..=200, 0..15)
}

proptest! {
    #[test]
    fn test_order_does_not_matter(mut distances in shots(), seed in any::<u64>()) {
        let before = trimmed_mean(&distances);
        // deterministic shuffle
        let len = distances.len();
        if len > 1 {
            let mut state = seed;
            for i in (1..len).rev() {
                state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
                let j = usize::try_from(state % (i as u64 + 1)).unwrap();
                distances.swap(i, j);
            }
        }
        prop_assert_eq!(trimmed_mean(&distances), before);
    }

    #[test]
    fn test_extremes_cannot_move_a_trimmed_mean(
        middle in prop::collection::vec(50u32..=150, 3..10),
        low in 1u32..50,
        high in 151u32..=200,
    ) {
        prop_assume!(middle.len() + 2 >= TRIM_THRESHOLD);
        let mut with_extremes = middle.clone();
        with_extremes.push(low);
        with_extremes.push(high);

        let mut lower = middle.clone();
        lower.push(1);
        lower.push(high);

        // the min and max are discarded, so which value they held is irrelevant
        prop_assert_eq!(trimmed_mean(&with_extremes), trimmed_mean(&lower));

        let mut higher = middle;
        higher.push(low);
        higher.push(200);
        prop_assert_eq!(trimmed_mean(&with_extremes), trimmed_mean(&higher));
    }

    #[test]
    fn test_mean_stays_within_range(distances in prop::collection::vec(1u32..=200, 1..15)) {
        let avg = trimmed_mean(&distances);
        let min = *distances.iter().min().unwrap();
        let max = *distances.iter().max().unwrap();
        prop_assert!(avg >= min && avg <= max);
    }
}
