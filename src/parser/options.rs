//! Parsing options and configuration.

/// Options for reading page layouts out of a PDF.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Baseline tolerance for joining spans into one line, as a fraction of font size
    pub line_tolerance: f32,

    /// Line gap that starts a new block, as a multiple of the page's average line spacing
    pub block_gap_factor: f32,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (unreadable pages become empty pages).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Set the baseline tolerance used for line grouping.
    pub fn with_line_tolerance(mut self, tolerance: f32) -> Self {
        self.line_tolerance = tolerance.max(0.0);
        self
    }

    /// Set the line gap factor used for block grouping.
    pub fn with_block_gap_factor(mut self, factor: f32) -> Self {
        self.block_gap_factor = factor.max(1.0);
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            line_tolerance: 0.3,
            block_gap_factor: 1.5,
        }
    }
}

/// Error handling mode during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any error
    #[default]
    Strict,
    /// Skip invalid content and continue
    Lenient,
}
