//! Container settings.

/// Default limit on resolution nesting.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Tunables shared by both container front-ends.
///
/// # Examples
/// ```
/// use wiring_container::settings::Settings;
///
/// let settings = Settings::default().with_max_depth(32);
/// assert_eq!(settings.max_depth, 32);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// How many registrations one resolve may nest through before failing
    /// with `DepthExceeded`. Cycles are reported separately and earlier.
    pub max_depth: usize,
}

impl Settings {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
