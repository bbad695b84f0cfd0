mod guard;
mod screen;

pub use guard::{DEFAULT_BYPASS_PATTERNS, Navigation, RouteGuard};
pub use screen::{Screen, normalize_path};
