//! Expansion options.

use serde::{Deserialize, Serialize};

/// Options recognized by the expansion pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Keep parametrized definitions (fully substituted) in the output.
    pub keep_poly: bool,
    /// Prefix for standardized names of synthesized definitions.
    pub prefix: String,
    /// Skip name standardization, leaving canonical `@(...)` names visible.
    pub debug: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            keep_poly: false,
            prefix: "_".to_string(),
            debug: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = Options::default();
        assert!(!opts.keep_poly);
        assert!(!opts.debug);
        assert_eq!(opts.prefix, "_");
    }

    #[test]
    fn partial_json_fills_defaults() {
        let opts: Options = serde_json::from_str(r#"{"keep_poly": true}"#).unwrap();
        assert!(opts.keep_poly);
        assert_eq!(opts.prefix, "_");
    }
}
