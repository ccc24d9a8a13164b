// Duplicate action suppression.
//
// A double tap fires the same logical action twice within a few
// milliseconds. Actions are compared by a coarse signature (no player, no
// timestamp); a repeat of the last accepted signature inside the window is
// dropped. Two genuinely separate actions of the same shape inside the
// window are merged as well. That imprecision is accepted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::scoreboard::{FoulType, Side};

/// Default suppression window in milliseconds.
pub const DEFAULT_DEDUP_WINDOW_MS: u64 = 90;

/// The shape of an action for duplicate detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signature {
    Score { side: Side, points: i32, period: u32 },
    Foul { side: Side, foul_type: FoulType, period: u32 },
}

/// Remembers the last accepted signature and when it was accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deduplicator {
    window_ms: u64,
    last: Option<(Signature, DateTime<Utc>)>,
}

impl Deduplicator {
    pub fn new(window_ms: u64) -> Self {
        Deduplicator {
            window_ms,
            last: None,
        }
    }

    /// Decide whether an action should be applied.
    ///
    /// With `enabled` false every action is accepted and nothing is
    /// remembered. Otherwise an action matching the last accepted signature
    /// within the window is rejected; anything else is accepted and becomes
    /// the new reference.
    pub fn should_accept(
        &mut self,
        signature: Signature,
        enabled: bool,
        now: DateTime<Utc>,
    ) -> bool {
        if !enabled {
            return true;
        }

        if let Some((last_sig, last_at)) = self.last {
            // A clock that stepped backwards counts as no time elapsed.
            let elapsed = u64::try_from((now - last_at).num_milliseconds()).unwrap_or(0);
            if last_sig == signature && elapsed < self.window_ms {
                return false;
            }
        }

        self.last = Some((signature, now));
        true
    }

    /// Forget the last accepted action.
    pub fn clear(&mut self) {
        self.last = None;
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }
}

impl Default for Deduplicator {
    fn default() -> Self {
        Deduplicator::new(DEFAULT_DEDUP_WINDOW_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000).unwrap() + Duration::milliseconds(ms)
    }

    fn two_for_home() -> Signature {
        Signature::Score {
            side: Side::Home,
            points: 2,
            period: 1,
        }
    }

    #[test]
    fn repeat_inside_window_is_rejected() {
        let mut dedup = Deduplicator::default();
        assert!(dedup.should_accept(two_for_home(), true, at(0)));
        assert!(!dedup.should_accept(two_for_home(), true, at(40)));
    }

    #[test]
    fn repeat_after_window_is_accepted() {
        let mut dedup = Deduplicator::default();
        assert!(dedup.should_accept(two_for_home(), true, at(0)));
        assert!(dedup.should_accept(two_for_home(), true, at(90)));
        assert!(dedup.should_accept(two_for_home(), true, at(500)));
    }

    #[test]
    fn rejection_does_not_slide_the_window() {
        let mut dedup = Deduplicator::default();
        assert!(dedup.should_accept(two_for_home(), true, at(0)));
        assert!(!dedup.should_accept(two_for_home(), true, at(60)));
        // Measured from the accepted action at 0, not the rejected one at 60.
        assert!(dedup.should_accept(two_for_home(), true, at(100)));
    }

    #[test]
    fn disabled_accepts_everything() {
        let mut dedup = Deduplicator::default();
        assert!(dedup.should_accept(two_for_home(), false, at(0)));
        assert!(dedup.should_accept(two_for_home(), false, at(1)));
        assert!(dedup.should_accept(two_for_home(), false, at(2)));
    }

    #[test]
    fn different_signatures_are_independent() {
        let mut dedup = Deduplicator::default();
        assert!(dedup.should_accept(two_for_home(), true, at(0)));
        let three = Signature::Score {
            side: Side::Home,
            points: 3,
            period: 1,
        };
        assert!(dedup.should_accept(three, true, at(10)));
        let away = Signature::Score {
            side: Side::Away,
            points: 2,
            period: 1,
        };
        assert!(dedup.should_accept(away, true, at(20)));
        let next_period = Signature::Score {
            side: Side::Away,
            points: 2,
            period: 2,
        };
        assert!(dedup.should_accept(next_period, true, at(30)));
    }

    #[test]
    fn foul_signature_ignores_player() {
        let mut dedup = Deduplicator::new(90);
        let foul = Signature::Foul {
            side: Side::Away,
            foul_type: FoulType::Personal,
            period: 3,
        };
        assert!(dedup.should_accept(foul, true, at(0)));
        assert!(!dedup.should_accept(foul, true, at(89)));
    }

    #[test]
    fn huge_window_still_suppresses() {
        let mut dedup = Deduplicator::new(u64::MAX);
        assert!(dedup.should_accept(two_for_home(), true, at(0)));
        assert!(!dedup.should_accept(two_for_home(), true, at(3_600_000)));
    }

    #[test]
    fn backwards_wall_clock_counts_as_no_time() {
        let mut dedup = Deduplicator::default();
        assert!(dedup.should_accept(two_for_home(), true, at(1_000)));
        assert!(!dedup.should_accept(two_for_home(), true, at(0)));
    }

    #[test]
    fn clear_forgets_last_action() {
        let mut dedup = Deduplicator::default();
        assert!(dedup.should_accept(two_for_home(), true, at(0)));
        dedup.clear();
        assert!(dedup.should_accept(two_for_home(), true, at(1)));
    }
}
