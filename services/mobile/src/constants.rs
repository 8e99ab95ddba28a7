//! Bundled asset locations

pub mod images {
    pub const LOGO: &str = "assets/images/logo.png";
    pub const CARDS: &str = "assets/images/cards.png";
    /// Underline stroke drawn beneath the headline
    pub const PATH: &str = "assets/images/path.png";
}
