use std::fmt;

/// The screens the workflow can mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    /// Entry screen; the only one reachable without a session.
    Login,
    Invoice,
    Confirmation,
}

impl Screen {
    pub const ENTRY: Screen = Screen::Login;
    /// Where authenticated actors land when they ask for the entry screen.
    pub const HOME: Screen = Screen::Invoice;

    pub fn path(self) -> &'static str {
        match self {
            Screen::Login => "/",
            Screen::Invoice => "/invoice",
            Screen::Confirmation => "/success",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        match normalize_path(path) {
            "/" => Some(Screen::Login),
            "/invoice" => Some(Screen::Invoice),
            "/success" => Some(Screen::Confirmation),
            _ => None,
        }
    }

    pub fn is_entry(self) -> bool {
        self == Self::ENTRY
    }

    pub fn title(self) -> &'static str {
        match self {
            Screen::Login => "Login",
            Screen::Invoice => "Create New Invoice",
            Screen::Confirmation => "Invoice Submitted",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Strips query and fragment; an empty path is the root.
pub fn normalize_path(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim();
    if trimmed.is_empty() { "/" } else { trimmed }
}
