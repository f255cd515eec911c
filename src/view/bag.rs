use maud::{Markup, html};
use serde::Deserialize;
use std::collections::BTreeMap;

use super::layout::render_error;
use crate::model::catalog::{CLUB_MODELS, DEFAULT_LOFT, OTHER_CLUB, loft_options, resolve_club};
use crate::model::{
    MAX_YARDAGE, SwingLength, ValidationError, Wedge, WedgeInput, WedgePatch, parse_yardage,
    sorted_by_loft,
};

/// The add-wedge form as submitted. Kept as raw text so a rejected submission
/// can be rendered back unchanged.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WedgeForm {
    #[serde(default)]
    pub club: String,
    #[serde(default)]
    pub custom_club: String,
    #[serde(default = "default_loft")]
    pub loft: u32,
    #[serde(default)]
    pub full_swing: String,
    #[serde(default)]
    pub three_quarter: String,
    #[serde(default)]
    pub half: String,
    #[serde(default)]
    pub quarter: String,
}

fn default_loft() -> u32 {
    DEFAULT_LOFT
}

impl Default for WedgeForm {
    fn default() -> Self {
        Self {
            club: String::new(),
            custom_club: String::new(),
            loft: DEFAULT_LOFT,
            full_swing: String::new(),
            three_quarter: String::new(),
            half: String::new(),
            quarter: String::new(),
        }
    }
}

impl WedgeForm {
    /// # Errors
    ///
    /// Returns the first `ValidationError` found in the submitted fields.
    pub fn to_input(&self) -> Result<WedgeInput, ValidationError> {
        WedgeInput {
            club: resolve_club(&self.club, Some(&self.custom_club)),
            loft: self.loft,
            full_swing: parse_yardage(&self.full_swing)?,
            three_quarter: parse_yardage(&self.three_quarter)?,
            half: parse_yardage(&self.half)?,
            quarter: parse_yardage(&self.quarter)?,
        }
        .validate()
    }

    fn raw(&self, swing: SwingLength) -> &str {
        match swing {
            SwingLength::FullSwing => &self.full_swing,
            SwingLength::ThreeQuarter => &self.three_quarter,
            SwingLength::Half => &self.half,
            SwingLength::Quarter => &self.quarter,
        }
    }
}

/// Manual distance edit for one wedge. Blank clears a distance.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct DistancesForm {
    #[serde(default)]
    pub full_swing: String,
    #[serde(default)]
    pub three_quarter: String,
    #[serde(default)]
    pub half: String,
    #[serde(default)]
    pub quarter: String,
}

impl DistancesForm {
    /// # Errors
    ///
    /// Returns a `ValidationError` for text that is not a yardage.
    pub fn to_patch(&self) -> Result<WedgePatch, ValidationError> {
        let mut yardages = BTreeMap::new();
        for (swing, raw) in [
            (SwingLength::FullSwing, &self.full_swing),
            (SwingLength::ThreeQuarter, &self.three_quarter),
            (SwingLength::Half, &self.half),
            (SwingLength::Quarter, &self.quarter),
        ] {
            yardages.insert(swing, parse_yardage(raw)?);
        }
        Ok(WedgePatch::yardages(yardages))
    }
}

fn yardage_value(yards: u32) -> String {
    if yards == 0 { String::new() } else { yards.to_string() }
}

fn render_wedge(wedge: &Wedge) -> Markup {
    html! {
        li class="wedge" {
            div class="wedge-head" {
                span class="club" { (wedge.club) }
                span class="loft" { (wedge.loft) "°" }
            }
            div class="wedge-actions" {
                a class="button" href={ "/combine/" (wedge.id) } { "Combine" }
                form method="post" action={ "/bag/" (wedge.id) "/delete" } {
                    button type="submit" class="danger" { "Delete" }
                }
            }
            details {
                summary { "Edit distances" }
                form class="distances" method="post" action={ "/bag/" (wedge.id) "/distances" } {
                    @for swing in SwingLength::ALL {
                        label {
                            (swing.label())
                            input type="number" min="0" max=(MAX_YARDAGE) name=(swing.column_name())
                                value=(yardage_value(wedge.yardage(swing)));
                        }
                    }
                    button type="submit" { "Save distances" }
                }
            }
        }
    }
}

fn render_add_form(form: &WedgeForm) -> Markup {
    let known = CLUB_MODELS.contains(&form.club.as_str());
    html! {
        form class="add-wedge" method="post" action="/bag" {
            label {
                "Club"
                select name="club" {
                    option value="" selected[form.club.is_empty()] { "Select a club" }
                    @for model in CLUB_MODELS {
                        @let chosen = form.club == *model || (*model == OTHER_CLUB && !known && !form.club.is_empty());
                        option value=(model) selected[chosen] { (model) }
                    }
                }
            }
            label {
                "Custom club name"
                input type="text" name="custom_club" value=(form.custom_club) placeholder="Used when Other is selected";
            }
            label {
                "Loft"
                select name="loft" {
                    @for loft in loft_options() {
                        option value=(loft) selected[form.loft == loft] { (loft) "°" }
                    }
                }
            }
            fieldset {
                legend { "Distances (optional)" }
                @for swing in SwingLength::ALL {
                    label {
                        (swing.label())
                        input type="number" min="0" max=(MAX_YARDAGE) name=(swing.column_name()) value=(form.raw(swing));
                    }
                }
            }
            button type="submit" { "Add wedge" }
        }
    }
}

/// The bag page: wedges by loft, then the add form. `form` carries a rejected
/// submission back so nothing typed is lost.
#[must_use]
pub fn render_bag(wedges: &[Wedge], form: &WedgeForm, error: Option<&str>) -> Markup {
    let wedges = sorted_by_loft(wedges);
    html! {
        h2 { "The Bag" }
        @if wedges.is_empty() {
            p class="hint" { "No wedges yet. Add your first one below." }
        } @else {
            ul class="bag" {
                @for wedge in &wedges {
                    (render_wedge(wedge))
                }
            }
        }
        h3 { "Add a wedge" }
        @if let Some(error) = error {
            (render_error(error))
        }
        (render_add_form(form))
    }
}
