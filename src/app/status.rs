/// One-line message describing the outcome of the last action.
#[derive(Debug, Clone)]
pub struct StatusLine {
    message: String,
}

pub const READY_STATUS: &str = "Ready.";

impl Default for StatusLine {
    fn default() -> Self {
        Self {
            message: READY_STATUS.to_string(),
        }
    }
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn welcome(&mut self, actor: &str) {
        self.message = format!("Welcome, {actor}");
    }

    pub fn value_updated(&mut self, label: &str) {
        self.message = format!("{label} updated");
    }

    pub fn draft_saved(&mut self) {
        self.message = "Draft saved successfully!".to_string();
    }

    pub fn draft_loaded(&mut self) {
        self.message = "Draft loaded".to_string();
    }

    pub fn no_draft(&mut self) {
        self.message = "No draft saved yet".to_string();
    }

    pub fn file_selected(&mut self, name: &str) {
        self.message = format!("Uploaded: {name}");
    }

    pub fn submitted(&mut self) {
        self.message = "Invoice submitted".to_string();
    }

    pub fn issues_remaining(&mut self, count: usize) {
        self.message = format!("{count} issue(s) remaining");
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
