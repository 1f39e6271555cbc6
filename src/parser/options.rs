//! Extraction options and configuration.

/// Options for extracting a page.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Page to extract (1-indexed)
    pub page: u32,

    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Whether to interpret form XObjects drawn by the page
    pub follow_forms: bool,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the page to extract (1-indexed).
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip undecodable form XObjects).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Enable or disable form XObject interpretation.
    pub fn with_forms(mut self, follow: bool) -> Self {
        self.follow_forms = follow;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            page: 1,
            error_mode: ErrorMode::Strict,
            follow_forms: true,
        }
    }
}

/// Error handling mode during extraction.
///
/// The page's own content stream must always decode; the mode only governs
/// nested form XObjects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any error
    #[default]
    Strict,
    /// Skip invalid nested content and continue
    Lenient,
}
