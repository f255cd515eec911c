use maud::{Markup, html};
use serde::Deserialize;

use super::layout::{render_error, render_notice};
use crate::model::User;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ProfileForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub current_password: String,
}

/// Profile editor. The current password field only matters when the email changes.
#[must_use]
pub fn render_profile(user: &User, wedge_count: usize, error: Option<&str>, notice: Option<&str>) -> Markup {
    html! {
        h2 { "Profile" }
        p class="hint" { (wedge_count) (if wedge_count == 1 { " wedge" } else { " wedges" }) " in your bag" }
        @if let Some(error) = error {
            (render_error(error))
        }
        @if let Some(notice) = notice {
            (render_notice(notice))
        }
        form method="post" action="/profile" {
            label { "Name" input type="text" name="name" value=(user.name); }
            label { "Email" input type="email" name="email" value=(user.email) required; }
            label {
                "Current password"
                input type="password" name="current_password" placeholder="Required to change email";
            }
            button type="submit" { "Save" }
        }
        form method="post" action="/logout" {
            button type="submit" class="secondary" { "Sign out" }
        }
    }
}
