use crate::model::MAX_YARDAGE;

pub const MIN_SHOT_DISTANCE: u32 = 1;
pub const MAX_SHOT_DISTANCE: u32 = MAX_YARDAGE;

/// Parse the pending shot buffer. Anything but a whole number of yards in
/// `1..=200` is `None`; the add control stays disabled rather than erroring.
#[must_use]
pub fn parse_shot_entry(raw: &str) -> Option<u32> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|d| (MIN_SHOT_DISTANCE..=MAX_SHOT_DISTANCE).contains(d))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_whole_yards_in_range() {
        assert_eq!(parse_shot_entry("1"), Some(1));
        assert_eq!(parse_shot_entry(" 87 "), Some(87));
        assert_eq!(parse_shot_entry("200"), Some(200));
    }

    #[test]
    fn rejects_everything_else() {
        for raw in ["", "   ", "0", "201", "-5", "87.5", "87y", "eighty"] {
            assert_eq!(parse_shot_entry(raw), None, "{raw:?} should be rejected");
        }
    }
}
