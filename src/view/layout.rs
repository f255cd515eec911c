use maud::{DOCTYPE, Markup, html};

use crate::model::User;

pub const APP_TITLE: &str = "Dialed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Matrix,
    Bag,
    Combine,
    Profile,
}

impl Nav {
    const ALL: [Nav; 4] = [Nav::Matrix, Nav::Bag, Nav::Combine, Nav::Profile];

    fn href(self) -> &'static str {
        match self {
            Nav::Matrix => "/",
            Nav::Bag => "/bag",
            Nav::Combine => "/combine",
            Nav::Profile => "/profile",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Nav::Matrix => "Matrix",
            Nav::Bag => "The Bag",
            Nav::Combine => "Combine",
            Nav::Profile => "Profile",
        }
    }
}

/// Page shell. `nav` of `None` hides the navigation, as during a combine.
#[must_use]
pub fn render_page(title: &str, user: Option<&User>, nav: Option<Nav>, refresh_secs: Option<u64>, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                @if let Some(secs) = refresh_secs {
                    meta http-equiv="refresh" content=(secs);
                }
                link rel="stylesheet" href="/static/dialed.css";
                title { (title) " · " (APP_TITLE) }
            }
            body {
                header class="topbar" {
                    span class="brand" { (APP_TITLE) }
                    @if let Some(user) = user {
                        span class="who" { (user.name) }
                    }
                }
                @if let (Some(active), Some(_)) = (nav, user) {
                    nav class="tabs" {
                        @for item in Nav::ALL {
                            a href=(item.href()) class=(if item == active { "tab active" } else { "tab" }) { (item.label()) }
                        }
                    }
                }
                main { (body) }
            }
        }
    }
}

#[must_use]
pub fn render_error(message: &str) -> Markup {
    html! {
        div class="error" role="alert" { (message) }
    }
}

#[must_use]
pub fn render_notice(message: &str) -> Markup {
    html! {
        div class="notice" role="status" { (message) }
    }
}
