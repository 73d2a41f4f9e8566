/// Points for any match before bonuses.
pub const MATCH_POINTS: i32 = 10;

/// Time bonus at the start of a round, one point is lost per elapsed second.
pub const MAX_TIME_BONUS: i32 = 20;

/// Bonus per consecutive match made before the current one.
pub const STREAK_BONUS: i32 = 5;

pub const MISMATCH_PENALTY: i32 = -5;

/// Points awarded (or deducted) for resolving a pair. The result may be negative, clamping the running total is the
/// caller's job, see [`apply_delta`].
pub fn score_event(matched: bool, elapsed_ms: u64, streak_before: u32) -> i32 {
    if !matched {
        return MISMATCH_PENALTY;
    }

    let elapsed_secs = i32::try_from(elapsed_ms / 1000).unwrap_or(i32::MAX);
    let time_bonus = MAX_TIME_BONUS.saturating_sub(elapsed_secs).max(0);
    let streak_bonus = i32::try_from(streak_before)
        .unwrap_or(i32::MAX)
        .saturating_mul(STREAK_BONUS);

    MATCH_POINTS
        .saturating_add(time_bonus)
        .saturating_add(streak_bonus)
}

/// Adds `delta` to a running total that never drops below zero.
pub const fn apply_delta(score: u32, delta: i32) -> u32 {
    score.saturating_add_signed(delta)
}
