use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::swing::SwingLength;
use super::wedge::{WedgeId, WedgePatch};

/// A single measured carry, only alive for the duration of one combine.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CombineShot {
    pub swing_length: SwingLength,
    pub distance: u32,
}

/// Result bundle of a finished combine, handed to persistence on save.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CombineSession {
    pub wedge_id: WedgeId,
    pub shots: Vec<CombineShot>,
    /// Only swing lengths with at least one shot have an entry.
    pub averages: BTreeMap<SwingLength, u32>,
}

impl CombineSession {
    /// The record update this session commits: exactly the non-zero averages.
    #[must_use]
    pub fn to_patch(&self) -> WedgePatch {
        WedgePatch::yardages(
            self.averages
                .iter()
                .filter(|(_, yards)| **yards > 0)
                .map(|(swing, yards)| (*swing, *yards))
                .collect(),
        )
    }
}

/// How many shots the user commits to per swing length before the combine starts.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum ShotTarget {
    #[default]
    Manual,
    Fixed(usize),
}

impl ShotTarget {
    pub const SUPPORTED: [usize; 4] = [3, 5, 7, 10];

    /// Accepts only the supported fixed counts.
    #[must_use]
    pub fn fixed(count: usize) -> Option<Self> {
        Self::SUPPORTED
            .contains(&count)
            .then_some(ShotTarget::Fixed(count))
    }

    #[must_use]
    pub fn count(self) -> Option<usize> {
        match self {
            ShotTarget::Manual => None,
            ShotTarget::Fixed(n) => Some(n),
        }
    }
}

impl fmt::Display for ShotTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShotTarget::Manual => write!(f, "manual"),
            ShotTarget::Fixed(n) => write!(f, "{n} shots"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_supported_targets() {
        assert_eq!(ShotTarget::fixed(5), Some(ShotTarget::Fixed(5)));
        assert_eq!(ShotTarget::fixed(4), None);
        assert_eq!(ShotTarget::Manual.count(), None);
    }

    #[test]
    fn patch_skips_zero_averages() {
        let mut averages = BTreeMap::new();
        averages.insert(SwingLength::FullSwing, 98);
        averages.insert(SwingLength::Half, 0);
        let session = CombineSession {
            wedge_id: WedgeId::from("w1"),
            shots: vec![],
            averages,
        };
        let patch = session.to_patch();
        assert_eq!(patch.yardages.len(), 1);
        assert_eq!(patch.yardages[&SwingLength::FullSwing], 98);
        assert!(patch.club.is_none());
        assert!(patch.loft.is_none());
    }
}
