use maud::{Markup, html};
use serde::Deserialize;

use super::layout::render_error;
use crate::identity::MIN_PASSWORD_LEN;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct SignupForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[must_use]
pub fn render_login(email: &str, error: Option<&str>) -> Markup {
    html! {
        div class="auth" {
            h2 { "Sign in" }
            @if let Some(error) = error {
                (render_error(error))
            }
            form method="post" action="/login" {
                label { "Email" input type="email" name="email" value=(email) required autofocus; }
                label { "Password" input type="password" name="password" required; }
                button type="submit" { "Sign in" }
            }
            p { "New here? " a href="/signup" { "Create an account" } }
        }
    }
}

#[must_use]
pub fn render_signup(form: &SignupForm, error: Option<&str>) -> Markup {
    html! {
        div class="auth" {
            h2 { "Create account" }
            @if let Some(error) = error {
                (render_error(error))
            }
            form method="post" action="/signup" {
                label { "Name" input type="text" name="name" value=(form.name) placeholder="Optional"; }
                label { "Email" input type="email" name="email" value=(form.email) required; }
                label { "Password" input type="password" name="password" minlength=(MIN_PASSWORD_LEN) required; }
                button type="submit" { "Sign up" }
            }
            p { "Already have an account? " a href="/login" { "Sign in" } }
        }
    }
}
