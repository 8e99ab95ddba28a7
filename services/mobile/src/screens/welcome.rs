//! Welcome screen

use std::fmt;

use crate::{
    components::{CustomButton, Loader},
    constants::images,
    context::AuthContext,
    routes::Route,
};

pub const HEADLINE: &str = "Discover Endless Possibilities with Aora";
pub const TAGLINE: &str =
    "Where Creativity Meets Innovation: Embark on a Journey of Limitless Exploration with Aora";

/// Landing content shown to signed-out visitors
#[derive(Debug, Clone, PartialEq)]
pub struct Landing {
    pub logo: &'static str,
    pub cards: &'static str,
    pub headline: &'static str,
    pub underline: &'static str,
    pub tagline: &'static str,
    pub loader: Loader,
    pub button: CustomButton,
}

impl Landing {
    fn new(loading: bool) -> Self {
        Self {
            logo: images::LOGO,
            cards: images::CARDS,
            headline: HEADLINE,
            underline: images::PATH,
            tagline: TAGLINE,
            loader: Loader {
                is_loading: loading,
            },
            button: CustomButton::new("Continue with Email", Route::SignIn),
        }
    }
}

/// What the welcome screen shows for a given authentication state
#[derive(Debug, Clone, PartialEq)]
pub enum WelcomeView {
    Loading,
    Redirect(Route),
    Landing(Landing),
}

pub fn welcome(auth: &AuthContext) -> WelcomeView {
    if auth.loading {
        WelcomeView::Loading
    } else if auth.is_logged {
        WelcomeView::Redirect(Route::Home)
    } else {
        WelcomeView::Landing(Landing::new(auth.loading))
    }
}

impl fmt::Display for WelcomeView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WelcomeView::Loading => writeln!(f, "Loading..."),
            WelcomeView::Redirect(route) => writeln!(f, "-> {}", route),
            WelcomeView::Landing(landing) => {
                let loader = landing.loader.to_string();
                if !loader.is_empty() {
                    writeln!(f, "{}", loader)?;
                }
                writeln!(f, "<{}>", landing.logo)?;
                writeln!(f, "<{}>", landing.cards)?;
                writeln!(f)?;
                writeln!(f, "{}", landing.headline)?;
                writeln!(f, "<{}>", landing.underline)?;
                writeln!(f)?;
                writeln!(f, "{}", landing.tagline)?;
                writeln!(f)?;
                writeln!(f, "{}", landing.button)
            }
        }
    }
}
