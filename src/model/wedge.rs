use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use super::swing::SwingLength;
use super::user::UserId;

/// Largest yardage accepted anywhere in the app, manual or measured.
pub const MAX_YARDAGE: u32 = 200;

/// Current time at the millisecond precision records are persisted with.
#[must_use]
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct WedgeId(String);

impl WedgeId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WedgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for WedgeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for WedgeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A wedge in the user's bag, in the persisted record shape.
///
/// A yardage of 0 means "not dialed in yet".
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Wedge {
    pub id: WedgeId,
    pub user_id: UserId,
    pub club: String,
    pub loft: u32,
    pub full_swing: u32,
    pub three_quarter: u32,
    pub half: u32,
    pub quarter: u32,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl Wedge {
    #[must_use]
    pub fn new(user_id: UserId, input: WedgeInput, now: DateTime<Utc>) -> Self {
        Self {
            id: WedgeId::generate(),
            user_id,
            club: input.club,
            loft: input.loft,
            full_swing: input.full_swing,
            three_quarter: input.three_quarter,
            half: input.half,
            quarter: input.quarter,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn yardage(&self, swing: SwingLength) -> u32 {
        match swing {
            SwingLength::FullSwing => self.full_swing,
            SwingLength::ThreeQuarter => self.three_quarter,
            SwingLength::Half => self.half,
            SwingLength::Quarter => self.quarter,
        }
    }

    fn yardage_mut(&mut self, swing: SwingLength) -> &mut u32 {
        match swing {
            SwingLength::FullSwing => &mut self.full_swing,
            SwingLength::ThreeQuarter => &mut self.three_quarter,
            SwingLength::Half => &mut self.half,
            SwingLength::Quarter => &mut self.quarter,
        }
    }

    /// Merge `patch` into this record. Identity fields and `created_at` are never touched.
    pub fn apply(&mut self, patch: &WedgePatch, now: DateTime<Utc>) {
        if let Some(club) = &patch.club {
            self.club.clone_from(club);
        }
        if let Some(loft) = patch.loft {
            self.loft = loft;
        }
        for (swing, yards) in &patch.yardages {
            *self.yardage_mut(*swing) = *yards;
        }
        self.updated_at = now;
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please select or enter a club name")]
    EmptyClubName,
    #[error("{0} yards is out of range (0-{MAX_YARDAGE})")]
    YardageOutOfRange(u32),
    #[error("\"{0}\" is not a whole number of yards")]
    InvalidYardage(String),
}

/// Parse a yardage typed into a form. Blank means "not measured yet" (0).
///
/// # Errors
///
/// `InvalidYardage` when the text is not a whole number, `YardageOutOfRange`
/// above `MAX_YARDAGE`.
pub fn parse_yardage(raw: &str) -> Result<u32, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    let yards: u32 = raw
        .parse()
        .map_err(|_| ValidationError::InvalidYardage(raw.to_string()))?;
    if yards > MAX_YARDAGE {
        return Err(ValidationError::YardageOutOfRange(yards));
    }
    Ok(yards)
}

/// Fields the user fills in when adding a wedge to the bag.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WedgeInput {
    pub club: String,
    pub loft: u32,
    #[serde(default)]
    pub full_swing: u32,
    #[serde(default)]
    pub three_quarter: u32,
    #[serde(default)]
    pub half: u32,
    #[serde(default)]
    pub quarter: u32,
}

impl Default for WedgeInput {
    fn default() -> Self {
        Self {
            club: String::new(),
            loft: 50,
            full_swing: 0,
            three_quarter: 0,
            half: 0,
            quarter: 0,
        }
    }
}

impl WedgeInput {
    /// Trim the club name and check the yardages.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` when the club name is blank or a yardage exceeds `MAX_YARDAGE`.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        self.club = self.club.trim().to_string();
        if self.club.is_empty() {
            return Err(ValidationError::EmptyClubName);
        }
        for yards in [self.full_swing, self.three_quarter, self.half, self.quarter] {
            if yards > MAX_YARDAGE {
                return Err(ValidationError::YardageOutOfRange(yards));
            }
        }
        Ok(self)
    }
}

/// Partial update merged into a wedge by id.
///
/// Only the fields present are written; `updated_at` is always stamped by the store.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WedgePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loft: Option<u32>,
    #[serde(flatten)]
    pub yardages: BTreeMap<SwingLength, u32>,
}

impl WedgePatch {
    #[must_use]
    pub fn yardages(yardages: BTreeMap<SwingLength, u32>) -> Self {
        Self {
            club: None,
            loft: None,
            yardages,
        }
    }

    /// # Errors
    ///
    /// Returns `ValidationError` for a blank club name or an out-of-range yardage.
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        if let Some(club) = self.club.take() {
            let club = club.trim().to_string();
            if club.is_empty() {
                return Err(ValidationError::EmptyClubName);
            }
            self.club = Some(club);
        }
        if let Some(yards) = self.yardages.values().find(|y| **y > MAX_YARDAGE) {
            return Err(ValidationError::YardageOutOfRange(*yards));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Wedge {
        let created = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        Wedge::new(
            UserId::from("u1"),
            WedgeInput {
                club: "Titleist Vokey SM10".into(),
                loft: 56,
                full_swing: 95,
                three_quarter: 80,
                half: 0,
                quarter: 40,
            },
            created,
        )
    }

    #[test]
    fn apply_touches_only_present_fields() {
        let mut wedge = sample();
        let created = wedge.created_at;
        let later = created + chrono::Duration::minutes(3);

        let mut yardages = BTreeMap::new();
        yardages.insert(SwingLength::Half, 62);
        wedge.apply(&WedgePatch::yardages(yardages), later);

        assert_eq!(wedge.half, 62);
        assert_eq!(wedge.full_swing, 95);
        assert_eq!(wedge.quarter, 40);
        assert_eq!(wedge.club, "Titleist Vokey SM10");
        assert_eq!(wedge.created_at, created);
        assert_eq!(wedge.updated_at, later);
    }

    #[test]
    fn persisted_shape_uses_camel_case_and_millis() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["threeQuarter"], 80);
        assert_eq!(json["createdAt"], 1_700_000_000_000_i64);
    }

    #[test]
    fn patch_serializes_only_present_yardages() {
        let mut yardages = BTreeMap::new();
        yardages.insert(SwingLength::FullSwing, 101);
        let json = serde_json::to_value(WedgePatch::yardages(yardages)).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert_eq!(obj["fullSwing"], 101);
    }

    #[test]
    fn input_validation_trims_club() {
        let input = WedgeInput {
            club: "  Ping Glide 4.0 ".into(),
            ..WedgeInput::default()
        };
        assert_eq!(input.validate().unwrap().club, "Ping Glide 4.0");

        let blank = WedgeInput {
            club: "   ".into(),
            ..WedgeInput::default()
        };
        assert_eq!(blank.validate(), Err(ValidationError::EmptyClubName));
    }

    #[test]
    fn blank_yardage_is_unmeasured() {
        assert_eq!(parse_yardage(""), Ok(0));
        assert_eq!(parse_yardage(" 87 "), Ok(87));
        assert_eq!(parse_yardage("201"), Err(ValidationError::YardageOutOfRange(201)));
        assert_eq!(
            parse_yardage("far"),
            Err(ValidationError::InvalidYardage("far".into()))
        );
    }
}
