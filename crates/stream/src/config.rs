//! Stream configuration

/// Default cap on a single event line: 16 MiB
pub const DEFAULT_MAX_LINE_BYTES: usize = 16 * 1024 * 1024;

/// Stream options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    /// Lines longer than this are reported as protocol errors; the source
    /// keeps at most one byte more of such a line
    pub max_line_bytes: usize,
    /// Close the stream once the source reports end of input
    ///
    /// When false, end of input is reported as a transient error event and
    /// later pumps read again.
    pub close_on_eof: bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        StreamConfig {
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            close_on_eof: false,
        }
    }
}

impl StreamConfig {
    /// Start from the defaults
    pub fn builder() -> StreamConfigBuilder {
        StreamConfigBuilder::default()
    }
}

/// Builder for [`StreamConfig`]
///
/// ```
/// use faunadb_stream::StreamConfig;
///
/// let config = StreamConfig::builder()
///     .max_line_bytes(1024)
///     .close_on_eof(true)
///     .build();
/// assert_eq!(config.max_line_bytes, 1024);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StreamConfigBuilder {
    config: StreamConfig,
}

impl StreamConfigBuilder {
    /// Set the longest accepted line, in bytes
    pub fn max_line_bytes(mut self, bytes: usize) -> Self {
        self.config.max_line_bytes = bytes;
        self
    }

    /// Close instead of reporting a transient error at end of input
    pub fn close_on_eof(mut self, close: bool) -> Self {
        self.config.close_on_eof = close;
        self
    }

    /// Finish the configuration
    pub fn build(self) -> StreamConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StreamConfig::default();
        assert_eq!(config.max_line_bytes, 16 * 1024 * 1024);
        assert!(!config.close_on_eof);
        assert_eq!(StreamConfig::builder().build(), config);
    }
}
