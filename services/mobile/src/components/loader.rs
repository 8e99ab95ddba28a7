use std::fmt;

/// Full-screen activity indicator, drawn only while loading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Loader {
    pub is_loading: bool,
}

impl fmt::Display for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_loading {
            f.write_str("[ ... ]")?;
        }
        Ok(())
    }
}
