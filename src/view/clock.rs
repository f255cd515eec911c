use maud::{Markup, html};

use crate::model::SwingLength;

const CENTER: f64 = 50.0;
const FACE_RADIUS: f64 = 46.0;
const ARM_LENGTH: f64 = 38.0;

/// Backswing position in degrees clockwise from twelve o'clock.
#[must_use]
pub fn arm_angle(swing: SwingLength) -> f64 {
    match swing {
        SwingLength::FullSwing => 0.0,
        SwingLength::ThreeQuarter => 270.0,
        SwingLength::Half => 225.0,
        SwingLength::Quarter => 180.0,
    }
}

fn arm_end(degrees: f64) -> (f64, f64) {
    let radians = degrees.to_radians();
    (
        CENTER + ARM_LENGTH * radians.sin(),
        CENTER - ARM_LENGTH * radians.cos(),
    )
}

/// Clock face with the lead arm at the stage's backswing position.
#[must_use]
pub fn render_clock(swing: SwingLength) -> Markup {
    let (x, y) = arm_end(arm_angle(swing));
    html! {
        svg class="clock-face" viewBox="0 0 100 100" width="160" height="160" role="img" aria-label={ (swing.label()) " swing, " (swing.clock()) } {
            circle cx=(CENTER) cy=(CENTER) r=(FACE_RADIUS) fill="none" stroke="currentColor" stroke-width="2";
            @for hour in 0..12u8 {
                @let (tx, ty) = arm_end(f64::from(hour) * 30.0);
                circle cx=(format!("{tx:.1}")) cy=(format!("{ty:.1}")) r=(if hour % 3 == 0 { "2" } else { "1" }) fill="currentColor";
            }
            line x1=(CENTER) y1=(CENTER) x2=(format!("{x:.1}")) y2=(format!("{y:.1}")) stroke="currentColor" stroke-width="4" stroke-linecap="round";
            circle cx=(CENTER) cy=(CENTER) r="3" fill="currentColor";
            text x=(CENTER) y="70" text-anchor="middle" font-size="9" { (swing.clock()) }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arm_points_at_clock_position() {
        let (x, y) = arm_end(arm_angle(SwingLength::FullSwing));
        assert!((x - CENTER).abs() < 1e-9 && y < CENTER);
        let (x, _) = arm_end(arm_angle(SwingLength::ThreeQuarter));
        assert!(x < CENTER);
        let (_, y) = arm_end(arm_angle(SwingLength::Quarter));
        assert!(y > CENTER);
    }

    #[test]
    fn svg_names_the_stage() {
        let html = render_clock(SwingLength::Half).into_string();
        assert!(html.contains("7:30"));
        assert!(html.starts_with("<svg"));
    }
}
