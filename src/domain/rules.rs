/// Pure game rules: pattern size, pattern generation, rewards, level-up
/// thresholds and time formatting.
///
/// Nothing here owns state. The state machine in `sim::step` calls these
/// with the current grid / score and applies the results.

use std::collections::BTreeSet;

use rand::Rng;

pub const GRID_MIN: usize = 3;
pub const GRID_MAX: usize = 7;

/// Most tiles ever lit in one round.
pub const LIT_CAP: usize = 6;

pub const LIT_COUNT_MIN: u8 = 2;
pub const LIT_COUNT_MAX: u8 = 6;
pub const DEFAULT_LIT_COUNT: u8 = 3;

pub const BASE_POINTS: u32 = 10;
pub const BASE_DIAMONDS: u32 = 2;

/// Named score thresholds: (score, grid it unlocks).
const THRESHOLDS: [(u32, usize); 3] = [(50, 4), (120, 5), (200, 6)];

/// Past the last named threshold, every multiple of this advances the grid.
const LATE_STEP: u32 = 50;

/// Number of lit tiles for a grid. `starting` applies to the 3×3 grid only.
pub fn lit_count(grid: usize, starting: u8) -> usize {
    let count = if grid == GRID_MIN {
        starting as usize
    } else {
        grid.min(LIT_CAP)
    };
    count.min(grid * grid)
}

/// Draw `count` distinct tile indices uniformly from `[0, grid²)`.
///
/// Rejection sampling: fine here, `count` is at most 6 out of at least 9.
pub fn generate_pattern<R: Rng + ?Sized>(grid: usize, count: usize, rng: &mut R) -> BTreeSet<usize> {
    let total = grid * grid;
    let count = count.min(total);
    let mut seq = BTreeSet::new();
    while seq.len() < count {
        seq.insert(rng.gen_range(0..total));
    }
    seq
}

/// Score and diamonds earned for completing a round.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Reward {
    pub points: u32,
    pub diamonds: u32,
    pub doubled: bool,
}

pub fn round_reward(double_points: bool) -> Reward {
    let mult = if double_points { 2 } else { 1 };
    Reward {
        points: BASE_POINTS * mult,
        diamonds: BASE_DIAMONDS * mult,
        doubled: double_points,
    }
}

/// Grid for the next round, given the current grid and the new cumulative
/// score. Returns `Some(next)` only when the grid actually grows, and it
/// grows by at most one step.
pub fn next_grid(grid: usize, new_score: u32) -> Option<usize> {
    for (threshold, target) in THRESHOLDS {
        if new_score >= threshold && grid < target {
            return Some(grid + 1);
        }
    }
    let last = THRESHOLDS[THRESHOLDS.len() - 1].0;
    if new_score > last && new_score % LATE_STEP == 0 && grid < GRID_MAX {
        return Some(grid + 1);
    }
    None
}

/// `MM:SS`, minutes not wrapped at the hour.
pub fn format_time(total_seconds: u64) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    // ── Pattern size ──

    #[test]
    fn lit_count_per_grid() {
        assert_eq!(lit_count(3, 3), 3);
        assert_eq!(lit_count(3, 2), 2);
        assert_eq!(lit_count(3, 6), 6);
        assert_eq!(lit_count(4, 2), 4);
        assert_eq!(lit_count(5, 6), 5);
        assert_eq!(lit_count(6, 3), 6);
        assert_eq!(lit_count(7, 3), 6);
    }

    // ── Pattern generation ──

    #[test]
    fn patterns_are_distinct_and_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for grid in GRID_MIN..=GRID_MAX {
            for _ in 0..200 {
                let count = lit_count(grid, DEFAULT_LIT_COUNT);
                let seq = generate_pattern(grid, count, &mut rng);
                assert_eq!(seq.len(), count);
                assert!(seq.iter().all(|&i| i < grid * grid));
            }
        }
    }

    #[test]
    fn pattern_covers_every_tile_eventually() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = BTreeSet::new();
        for _ in 0..500 {
            seen.extend(generate_pattern(3, 3, &mut rng));
        }
        assert_eq!(seen.len(), 9);
    }

    // ── Rewards ──

    #[test]
    fn rewards() {
        assert_eq!(round_reward(false), Reward { points: 10, diamonds: 2, doubled: false });
        assert_eq!(round_reward(true), Reward { points: 20, diamonds: 4, doubled: true });
    }

    // ── Level-up thresholds ──

    #[test]
    fn named_thresholds() {
        assert_eq!(next_grid(3, 40), None);
        assert_eq!(next_grid(3, 50), Some(4));
        assert_eq!(next_grid(4, 60), None);
        assert_eq!(next_grid(4, 110), None);
        assert_eq!(next_grid(4, 120), Some(5));
        assert_eq!(next_grid(5, 190), None);
        assert_eq!(next_grid(5, 200), Some(6));
    }

    #[test]
    fn late_multiples_and_cap() {
        assert_eq!(next_grid(6, 210), None);
        assert_eq!(next_grid(6, 250), Some(7));
        assert_eq!(next_grid(7, 300), None);
        assert_eq!(next_grid(6, 260), None);
    }

    #[test]
    fn one_step_per_round_even_when_several_thresholds_crossed() {
        // A grid still at 3 with a large score grows one step only.
        assert_eq!(next_grid(3, 130), Some(4));
        assert_eq!(next_grid(4, 210), Some(5));
    }

    #[test]
    fn threshold_landed_on_with_doubled_points() {
        // 40 + 20 skips exactly 50 but still crosses it.
        assert_eq!(next_grid(3, 60), Some(4));
    }

    // ── Time ──

    #[test]
    fn time_format() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(5), "00:05");
        assert_eq!(format_time(65), "01:05");
        assert_eq!(format_time(3600), "60:00");
    }
}
