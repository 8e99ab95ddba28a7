//! Presentation layer: routes, assets, the authentication context and the
//! welcome screen

pub mod components;
pub mod constants;
pub mod context;
pub mod logging;
pub mod routes;
pub mod screens;

pub use context::AuthContext;
pub use routes::Route;
pub use screens::welcome::{Landing, WelcomeView, welcome};
