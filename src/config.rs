use thiserror::Error;

pub const DEFAULT_BYTES_PER_LINE: usize = 16;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("bytes per line must be positive, got {0}")]
    ZeroBytesPerLine(usize),
}

/// How zero-valued bytes show up in the hex column.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ZeroStyle {
    /// Every zero byte is blanked, real data or padding alike.
    Blank,
    /// Zero bytes inside the valid range print as `00`; only padding is blank.
    Strict,
}

impl Default for ZeroStyle {
    fn default() -> Self {
        ZeroStyle::Blank
    }
}

/// Validated dump layout, passed explicitly to the chunker, formatter and painter.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct DumpConfig {
    bytes_per_line: usize,
    zero_style: ZeroStyle,
}

impl DumpConfig {
    pub fn new(bytes_per_line: usize) -> Result<Self, ConfigError> {
        if bytes_per_line == 0 {
            return Err(ConfigError::ZeroBytesPerLine(bytes_per_line));
        }

        Ok(Self {
            bytes_per_line,
            zero_style: ZeroStyle::default(),
        })
    }

    pub fn with_zero_style(mut self, zero_style: ZeroStyle) -> Self {
        self.zero_style = zero_style;
        self
    }

    pub fn bytes_per_line(&self) -> usize {
        self.bytes_per_line
    }

    pub fn zero_style(&self) -> ZeroStyle {
        self.zero_style
    }
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            bytes_per_line: DEFAULT_BYTES_PER_LINE,
            zero_style: ZeroStyle::default(),
        }
    }
}
