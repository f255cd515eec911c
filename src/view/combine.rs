use maud::{Markup, html};

use super::clock::render_clock;
use super::layout::render_error;
use crate::combine::entry::{MAX_SHOT_DISTANCE, MIN_SHOT_DISTANCE};
use crate::combine::{CombineModel, NextControl, Phase, parse_shot_entry};
use crate::model::{ShotTarget, SwingLength, Wedge, format_yardage, sorted_by_loft};

/// Seconds between refreshes while an auto-advance is pending.
pub const AUTO_ADVANCE_REFRESH_SECS: u64 = 1;

/// Wedge picker shown when no combine is running.
#[must_use]
pub fn render_combine_picker(wedges: &[Wedge]) -> Markup {
    let wedges = sorted_by_loft(wedges);
    html! {
        h2 { "Combine" }
        @if wedges.is_empty() {
            div class="empty" {
                p { "Add a wedge to your bag before running a combine." }
                a class="button" href="/bag" { "Go to The Bag" }
            }
        } @else {
            p class="hint" { "Hit shots at each swing length and log the carry. Averages drop the longest and shortest once you log five or more." }
            ul class="picker" {
                @for wedge in &wedges {
                    li {
                        a href={ "/combine/" (wedge.id) } {
                            span class="club" { (wedge.club) }
                            " "
                            span class="loft" { (wedge.loft) "°" }
                        }
                    }
                }
            }
        }
    }
}

/// Shown when the user tries to start a second combine.
#[must_use]
pub fn render_combine_busy(active: &Wedge) -> Markup {
    html! {
        h2 { "Combine in progress" }
        p { "You already have a combine running for " strong { (active.club) } ". Finish or cancel it first." }
        a class="button" href="/combine" { "Resume" }
    }
}

fn render_header(model: &CombineModel) -> Markup {
    let wedge = model.wedge();
    html! {
        div class="combine-head" {
            h2 { (wedge.club) " " span class="loft" { (wedge.loft) "°" } }
            form method="post" action="/combine/abort" {
                button type="submit" class="link" disabled[model.is_saving()] { "Cancel" }
            }
        }
    }
}

fn render_setup() -> Markup {
    html! {
        h3 { "How many shots per swing?" }
        div class="targets" {
            @for count in ShotTarget::SUPPORTED {
                form method="post" action="/combine/target" {
                    input type="hidden" name="target" value=(count);
                    button type="submit" { (count) " shots" }
                }
            }
            form method="post" action="/combine/target" {
                input type="hidden" name="target" value="manual";
                button type="submit" class="secondary" { "Manual" }
            }
        }
        p class="hint" { "With a target, the combine moves on by itself once each swing has enough shots." }
    }
}

fn next_label(control: NextControl) -> String {
    match control {
        NextControl::Skip { remaining: 1 } => "1 more shot · skip".to_string(),
        NextControl::Skip { remaining } => format!("{remaining} more shots · skip"),
        NextControl::Finish => "Finish".to_string(),
        NextControl::Next(next) => format!("Next: {}", next.label()),
        NextControl::Disabled => "Next".to_string(),
    }
}

fn render_progress(swing: SwingLength) -> Markup {
    let step = swing.index() + 1;
    let total = SwingLength::ALL.len();
    html! {
        div class="progress" {
            span { "Swing " (step) " of " (total) }
            progress max=(total) value=(step) {}
        }
    }
}

fn render_stage(model: &CombineModel, swing: SwingLength) -> Markup {
    let shots = model.shots(swing);
    let control = model.next_control();
    let full = model.stage_full(swing);
    let bad_entry = !model.entry().is_empty() && parse_shot_entry(model.entry()).is_none();
    html! {
        (render_progress(swing))
        div class="stage" {
            (render_clock(swing))
            h3 { (swing.label()) " swing" }
            @if let Some(target) = model.target().count() {
                p class="count" { (shots.len()) " / " (target) " shots" }
            }
        }
        form class="shot-entry" method="post" action="/combine/shot" {
            input type="number" name="distance" inputmode="numeric" min=(MIN_SHOT_DISTANCE) max=(MAX_SHOT_DISTANCE)
                value=(model.entry()) placeholder="Carry (yds)" autofocus disabled[full];
            button type="submit" disabled[full] { "Add" }
        }
        @if bad_entry {
            p class="hint" { "Enter a distance from " (MIN_SHOT_DISTANCE) " to " (MAX_SHOT_DISTANCE) " yards." }
        }
        @if model.auto_advance_pending() {
            p class="notice" { "Moving on…" }
        }
        ul class="shots" {
            @for (index, distance) in shots.iter().enumerate() {
                li class="chip" {
                    (distance)
                    form method="post" action={ "/combine/shot/" (index) "/remove" } {
                        button type="submit" class="link" aria-label="Remove shot" { "×" }
                    }
                }
            }
        }
        @if let Some(average) = model.current_average() {
            p class="average" {
                "Average " strong { (average) } " yds"
                span class="hint" { " (" (shots.len()) (if shots.len() == 1 { " shot" } else { " shots" }) ")" }
            }
        }
        div class="stage-nav" {
            form method="post" action="/combine/back" {
                button type="submit" class="secondary" disabled[swing.prev().is_none()] { "Back" }
            }
            @match control {
                NextControl::Skip { .. } => {
                    form method="post" action="/combine/skip" {
                        button type="submit" class="secondary" { (next_label(control)) }
                    }
                }
                _ => {
                    form method="post" action="/combine/next" {
                        button type="submit" disabled[!control.enabled()] { (next_label(control)) }
                    }
                }
            }
        }
    }
}

fn render_review(model: &CombineModel) -> Markup {
    let averages = model.averages();
    html! {
        h3 { "Results" }
        table class="review" {
            thead {
                tr {
                    th { "Swing" }
                    th { "Average" }
                    th { "Shots" }
                }
            }
            tbody {
                @for swing in SwingLength::ALL {
                    tr {
                        td { (swing.label()) " " span class="clock" { (swing.clock()) } }
                        td class="yards" { (format_yardage(averages.get(&swing).copied())) }
                        td { (model.shots(swing).len()) }
                    }
                }
            }
        }
        @if averages.is_empty() {
            p class="hint" { "No shots were logged, so saving leaves this wedge unchanged." }
        }
        @if let Some(error) = model.error() {
            (render_error(error))
        }
        form method="post" action="/combine/save" {
            button type="submit" disabled[model.is_saving()] {
                @if model.is_saving() { "Saving…" } @else if model.error().is_some() { "Try again" } @else { "Save to bag" }
            }
        }
    }
}

/// The running combine, whatever phase it is in.
#[must_use]
pub fn render_combine(model: &CombineModel) -> Markup {
    html! {
        div class="combine" {
            (render_header(model))
            @match model.phase() {
                Phase::Setup => { (render_setup()) }
                Phase::Stage(swing) => { (render_stage(model, swing)) }
                Phase::Review => { (render_review(model)) }
                Phase::Saved | Phase::Aborted => { p class="hint" { "This combine is closed." } }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combine::{Msg, update};
    use crate::model::{UserId, WedgeInput};
    use chrono::Utc;
    use std::time::Duration;

    fn model() -> CombineModel {
        let wedge = Wedge::new(
            UserId::from("u1"),
            WedgeInput {
                club: "Mizuno T24".into(),
                loft: 56,
                ..WedgeInput::default()
            },
            Utc::now(),
        );
        CombineModel::new(wedge, Duration::from_millis(400))
    }

    fn shoot(model: &mut CombineModel, distance: &str) {
        update(model, Msg::EditEntry(distance.into()));
        update(model, Msg::AddShot);
    }

    #[test]
    fn setup_offers_targets_and_manual() {
        let html = render_combine(&model()).into_string();
        for count in ShotTarget::SUPPORTED {
            assert!(html.contains(&format!(r#"value="{count}""#)));
        }
        assert!(html.contains("Manual"));
    }

    #[test]
    fn stage_shows_remaining_shots_on_skip() {
        let mut m = model();
        update(&mut m, Msg::ChooseTarget(ShotTarget::Fixed(5)));
        shoot(&mut m, "90");
        shoot(&mut m, "94");
        let html = render_combine(&m).into_string();
        assert!(html.contains("3 more shots · skip"));
        assert!(html.contains("Average <strong>92</strong>"));
        assert!(html.contains("2 / 5 shots"));
    }

    #[test]
    fn review_marks_skipped_swings() {
        let mut m = CombineModel::manual(model().wedge().clone());
        shoot(&mut m, "100");
        update(&mut m, Msg::Next);
        update(&mut m, Msg::Skip);
        update(&mut m, Msg::Skip);
        update(&mut m, Msg::Skip);
        assert_eq!(m.phase(), Phase::Review);
        let html = render_combine(&m).into_string();
        assert!(html.contains(">100<"));
        assert_eq!(html.matches(crate::model::UNSET_YARDAGE).count(), 3);
        assert!(html.contains("Save to bag"));
    }
}
