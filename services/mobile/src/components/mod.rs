//! Reusable view components

mod custom_button;
mod loader;

pub use custom_button::CustomButton;
pub use loader::Loader;
