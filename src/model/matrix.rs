use serde::Serialize;

use super::swing::SwingLength;
use super::wedge::{Wedge, WedgeId};

pub const UNSET_YARDAGE: &str = "—";

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct MatrixRow {
    pub wedge_id: WedgeId,
    pub club: String,
    pub loft: u32,
    /// Yardages in `SwingLength::ALL` order; `None` where the wedge has no distance yet.
    pub yardages: [Option<u32>; 4],
}

impl MatrixRow {
    #[must_use]
    pub fn cell(&self, swing: SwingLength) -> String {
        format_yardage(self.yardages[swing.index()])
    }
}

#[must_use]
pub fn format_yardage(yards: Option<u32>) -> String {
    match yards {
        Some(y) => y.to_string(),
        None => UNSET_YARDAGE.to_string(),
    }
}

/// Sort a snapshot by loft, weakest loft first, the way the bag and matrix list wedges.
#[must_use]
pub fn sorted_by_loft(wedges: &[Wedge]) -> Vec<Wedge> {
    let mut sorted = wedges.to_vec();
    sorted.sort_by(|a, b| a.loft.cmp(&b.loft).then_with(|| a.club.cmp(&b.club)));
    sorted
}

#[must_use]
pub fn build_matrix(wedges: &[Wedge]) -> Vec<MatrixRow> {
    sorted_by_loft(wedges)
        .into_iter()
        .map(|wedge| {
            let yardages = SwingLength::ALL.map(|swing| match wedge.yardage(swing) {
                0 => None,
                y => Some(y),
            });
            MatrixRow {
                wedge_id: wedge.id,
                club: wedge.club,
                loft: wedge.loft,
                yardages,
            }
        })
        .collect()
}
