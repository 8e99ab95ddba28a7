use std::fmt;

use crate::routes::Route;

/// Call-to-action button navigating to `target` when pressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomButton {
    pub title: String,
    pub target: Route,
    pub is_loading: bool,
}

impl CustomButton {
    pub fn new(title: impl Into<String>, target: Route) -> Self {
        Self {
            title: title.into(),
            target,
            is_loading: false,
        }
    }

    /// Route to navigate to, or `None` while the button is disabled
    pub fn press(&self) -> Option<Route> {
        (!self.is_loading).then_some(self.target)
    }
}

impl fmt::Display for CustomButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_loading {
            write!(f, "[ {} (disabled) ]", self.title)
        } else {
            write!(f, "[ {} -> {} ]", self.title, self.target)
        }
    }
}
