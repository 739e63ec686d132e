use std::env;
use std::path::PathBuf;

use crate::executor::DEFAULT_TABLE_PREFIX;

/// Environment variable overriding the default case root.
pub const ROOT_ENV: &str = "SQLCASE_ROOT";

const DEFAULT_ROOT: &str = "cases";

/// Configuration for loading, dispatching and reporting.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Directory fixture paths resolve against.
    pub case_root: PathBuf,
    /// Lowercase substring a case name must contain to run.
    pub filter: Option<String>,
    pub use_colors: bool,
    pub table_prefix: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            case_root: env::var_os(ROOT_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT)),
            filter: None,
            use_colors: atty::is(atty::Stream::Stdout),
            table_prefix: DEFAULT_TABLE_PREFIX.to_string(),
        }
    }
}

impl HarnessConfig {
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.case_root = root.into();
        self
    }

    pub fn with_filter(mut self, filter: Option<&str>) -> Self {
        self.filter = filter.map(str::to_lowercase);
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_override_defaults() {
        let config = HarnessConfig::default()
            .with_root("fixtures")
            .with_filter(Some("Sample"))
            .with_colors(false);
        assert_eq!(config.case_root, PathBuf::from("fixtures"));
        assert_eq!(config.filter.as_deref(), Some("sample"));
        assert!(!config.use_colors);
        assert_eq!(config.table_prefix, "auto_");
    }
}
