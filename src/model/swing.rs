use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the four standardized backswing amplitudes a wedge is dialed in at.
///
/// Declaration order is the combine order and drives `Ord`, so a
/// `BTreeMap<SwingLength, _>` iterates full → three-quarter → half → quarter.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum SwingLength {
    FullSwing,
    ThreeQuarter,
    Half,
    Quarter,
}

impl SwingLength {
    pub const ALL: [SwingLength; 4] = [
        SwingLength::FullSwing,
        SwingLength::ThreeQuarter,
        SwingLength::Half,
        SwingLength::Quarter,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SwingLength::FullSwing => "Full",
            SwingLength::ThreeQuarter => "¾",
            SwingLength::Half => "½",
            SwingLength::Quarter => "¼",
        }
    }

    /// Clock-face position of the lead arm at the top of the backswing.
    #[must_use]
    pub fn clock(self) -> &'static str {
        match self {
            SwingLength::FullSwing => "12:00",
            SwingLength::ThreeQuarter => "9:00",
            SwingLength::Half => "7:30",
            SwingLength::Quarter => "6:00",
        }
    }

    /// Key used for this swing length in the persisted wedge record.
    #[must_use]
    pub fn field_name(self) -> &'static str {
        match self {
            SwingLength::FullSwing => "fullSwing",
            SwingLength::ThreeQuarter => "threeQuarter",
            SwingLength::Half => "half",
            SwingLength::Quarter => "quarter",
        }
    }

    /// Column holding this swing length in the sqlite `wedge` table.
    #[must_use]
    pub fn column_name(self) -> &'static str {
        match self {
            SwingLength::FullSwing => "full_swing",
            SwingLength::ThreeQuarter => "three_quarter",
            SwingLength::Half => "half",
            SwingLength::Quarter => "quarter",
        }
    }

    #[must_use]
    pub fn index(self) -> usize {
        match self {
            SwingLength::FullSwing => 0,
            SwingLength::ThreeQuarter => 1,
            SwingLength::Half => 2,
            SwingLength::Quarter => 3,
        }
    }

    #[must_use]
    pub fn next(self) -> Option<SwingLength> {
        Self::ALL.get(self.index() + 1).copied()
    }

    #[must_use]
    pub fn prev(self) -> Option<SwingLength> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }

    #[must_use]
    pub fn is_last(self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for SwingLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field_name())
    }
}

impl FromStr for SwingLength {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SwingLength::ALL
            .into_iter()
            .find(|swing| swing.field_name() == s.trim())
            .ok_or_else(|| format!("unknown swing length: {s}"))
    }
}
