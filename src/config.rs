//! Importer configuration.
//!
//! The three recognized options mirror the property names used by TCF
//! importers: `shrinkTokenAnnotations`, `useCommonAnnotatedElement` and
//! `ignoreFullText`.

use serde::Deserialize;

use crate::error::ConfigError;

pub const PROP_SHRINK_TOKEN_ANNOTATIONS: &str = "shrinkTokenAnnotations";
pub const PROP_USE_COMMON_ANNOTATED_ELEMENT: &str = "useCommonAnnotatedElement";
pub const PROP_IGNORE_FULL_TEXT: &str = "ignoreFullText";

/// Options controlling how annotations are attached to the graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImporterConfig {
    /// Single-token annotations attach to the token itself instead of a
    /// span wrapping it.
    pub shrink_token_annotations: bool,
    /// One shared span per target is reused across all annotation levels.
    pub use_common_annotated_element: bool,
    /// Skip base text reconstruction; tokens get no offsets.
    pub ignore_full_text: bool,
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            shrink_token_annotations: true,
            use_common_annotated_element: false,
            ignore_full_text: false,
        }
    }
}

impl ImporterConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shrink_token_annotations(mut self, value: bool) -> Self {
        self.shrink_token_annotations = value;
        self
    }

    pub fn with_use_common_annotated_element(mut self, value: bool) -> Self {
        self.use_common_annotated_element = value;
        self
    }

    pub fn with_ignore_full_text(mut self, value: bool) -> Self {
        self.ignore_full_text = value;
        self
    }

    /// Parse the configuration from a JSON object (load the data from file yourself).
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build a configuration from string properties.
    ///
    /// Values are `true`/`false` (case-insensitive). An empty value keeps the
    /// default, unknown keys are ignored.
    pub fn from_properties<'a, I>(properties: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut config = Self::default();
        for (key, value) in properties {
            let slot = match key {
                PROP_SHRINK_TOKEN_ANNOTATIONS => &mut config.shrink_token_annotations,
                PROP_USE_COMMON_ANNOTATED_ELEMENT => &mut config.use_common_annotated_element,
                PROP_IGNORE_FULL_TEXT => &mut config.ignore_full_text,
                _ => {
                    tracing::debug!(key, "ignoring unknown importer property");
                    continue;
                }
            };
            if let Some(flag) = parse_flag(key, value)? {
                *slot = flag;
            }
        }
        Ok(config)
    }
}

fn parse_flag(key: &str, value: &str) -> Result<Option<bool>, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    if value.eq_ignore_ascii_case("true") {
        Ok(Some(true))
    } else if value.eq_ignore_ascii_case("false") {
        Ok(Some(false))
    } else {
        Err(ConfigError::InvalidBoolean {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ImporterConfig::default();
        assert!(config.shrink_token_annotations);
        assert!(!config.use_common_annotated_element);
        assert!(!config.ignore_full_text);
    }

    #[test]
    fn test_from_json_partial() {
        let config = ImporterConfig::from_json_str(r#"{"useCommonAnnotatedElement": true}"#).unwrap();
        assert!(config.shrink_token_annotations);
        assert!(config.use_common_annotated_element);
    }

    #[test]
    fn test_from_properties() {
        let config = ImporterConfig::from_properties([
            (PROP_SHRINK_TOKEN_ANNOTATIONS, "FALSE"),
            (PROP_IGNORE_FULL_TEXT, "true"),
            ("somethingElse", "whatever"),
            (PROP_USE_COMMON_ANNOTATED_ELEMENT, ""),
        ])
        .unwrap();

        assert!(!config.shrink_token_annotations);
        assert!(config.ignore_full_text);
        assert!(!config.use_common_annotated_element);
    }

    #[test]
    fn test_from_properties_rejects_non_boolean() {
        let err = ImporterConfig::from_properties([(PROP_IGNORE_FULL_TEXT, "yes")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBoolean { .. }));
    }
}
