//! Widget options as handed over by the host page.
//!
//! Hosts tend to pass numbers as strings (`"100"`, `"14px"`), so the numeric
//! and boolean fields are parsed leniently and fall back to defaults instead of
//! failing the whole options object.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

use crate::color::{default_palette, SelectableColor};
use crate::error::{Error, Result};
use crate::model::SavedState;

pub const DEFAULT_CANVAS_WIDTH: u32 = 500;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 100;
pub const DEFAULT_RECT_SIZE: u32 = 100;
pub const DEFAULT_FONT_SIZE: u32 = 14;
pub const DEFAULT_BORDER_WIDTH: u32 = 2;

/// One entry of the annotation type palette.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnnotationConfig {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub key: String,
    #[serde(default, deserialize_with = "lenient_int")]
    pub width: Option<u32>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub height: Option<u32>,
    #[serde(default = "default_color_attr")]
    pub color: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub annotation_name: String,
    #[serde(default, deserialize_with = "lenient_int")]
    pub font_size: Option<u32>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub border_width: Option<u32>,
    #[serde(default = "default_true", deserialize_with = "lenient_bool")]
    pub resizable: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub required: bool,
}

fn default_color_attr() -> String {
    "red".to_string()
}

fn default_true() -> bool {
    true
}

impl AnnotationConfig {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            kind: key.clone(),
            key: key.clone(),
            width: None,
            height: None,
            color: default_color_attr(),
            label: label.into(),
            annotation_name: key,
            font_size: None,
            border_width: None,
            resizable: true,
            required: false,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Fills `type`, `key`, `label` and `annotation_name` from each other
    /// when the host only supplied some of them.
    fn normalized(mut self) -> Self {
        if self.kind.is_empty() {
            self.kind = self.key.clone();
        }
        if self.key.is_empty() {
            self.key = self.kind.clone();
        }
        if self.label.is_empty() {
            self.label = self.key.clone();
        }
        if self.annotation_name.is_empty() {
            self.annotation_name = self.key.clone();
        }
        self
    }

    pub fn rect_width(&self) -> u32 {
        self.width.unwrap_or(DEFAULT_RECT_SIZE)
    }

    pub fn rect_height(&self) -> u32 {
        self.height.unwrap_or(DEFAULT_RECT_SIZE)
    }

    pub fn font_size(&self) -> u32 {
        self.font_size.unwrap_or(DEFAULT_FONT_SIZE)
    }

    pub fn border_width(&self) -> u32 {
        self.border_width.unwrap_or(DEFAULT_BORDER_WIDTH)
    }
}

/// Either a bare list of type configs, or that list wrapped together with a
/// previously saved session.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum RectangleAnnotations {
    Wrapped {
        config: Vec<AnnotationConfig>,
        #[serde(rename = "savedState", default)]
        saved_state: Option<SavedState>,
    },
    List(Vec<AnnotationConfig>),
}

impl Default for RectangleAnnotations {
    fn default() -> Self {
        RectangleAnnotations::List(Vec::new())
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetOptions {
    #[serde(default)]
    pub accepted_files: Vec<String>,
    #[serde(default = "default_palette")]
    pub selectable_colors: Vec<SelectableColor>,
    #[serde(default)]
    pub rectangle_annotations: RectangleAnnotations,
    #[serde(default, deserialize_with = "lenient_int")]
    pub width: Option<u32>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub height: Option<u32>,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            accepted_files: Vec::new(),
            selectable_colors: default_palette(),
            rectangle_annotations: RectangleAnnotations::default(),
            width: None,
            height: None,
        }
    }
}

impl WidgetOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        let mut options: WidgetOptions = serde_json::from_str(json)?;
        let configs = match &mut options.rectangle_annotations {
            RectangleAnnotations::Wrapped { config, .. } => config,
            RectangleAnnotations::List(list) => list,
        };
        *configs = std::mem::take(configs)
            .into_iter()
            .map(AnnotationConfig::normalized)
            .collect();
        Ok(options)
    }

    pub fn with_configs(configs: Vec<AnnotationConfig>) -> Self {
        Self {
            rectangle_annotations: RectangleAnnotations::List(
                configs.into_iter().map(AnnotationConfig::normalized).collect(),
            ),
            ..Self::default()
        }
    }

    pub fn canvas_width(&self) -> u32 {
        self.width.unwrap_or(DEFAULT_CANVAS_WIDTH)
    }

    pub fn canvas_height(&self) -> u32 {
        self.height.unwrap_or(DEFAULT_CANVAS_HEIGHT)
    }

    pub fn configs(&self) -> &[AnnotationConfig] {
        match &self.rectangle_annotations {
            RectangleAnnotations::Wrapped { config, .. } => config,
            RectangleAnnotations::List(list) => list,
        }
    }

    pub fn saved_state(&self) -> Option<&SavedState> {
        match &self.rectangle_annotations {
            RectangleAnnotations::Wrapped { saved_state, .. } => saved_state.as_ref(),
            RectangleAnnotations::List(_) => None,
        }
    }

    /// Case-insensitive extension check. A name without a dot is compared
    /// as if the whole name were the extension.
    pub fn is_accepted(&self, file_name: &str) -> bool {
        let ext = file_name.rsplit('.').next().unwrap_or(file_name);
        let ext = format!(".{}", ext.to_lowercase());
        self.accepted_files
            .iter()
            .any(|accepted| accepted.to_lowercase() == ext)
    }

    /// Rejects palettes where two entries share a `type` or an output name.
    pub fn validate(&self) -> Result<()> {
        let mut kinds = HashSet::new();
        let mut names = HashSet::new();
        for config in self.configs() {
            if !kinds.insert(config.kind.as_str()) {
                return Err(Error::DuplicateType(config.kind.clone()));
            }
            if !names.insert(config.annotation_name.as_str()) {
                return Err(Error::DuplicateAnnotationName(config.annotation_name.clone()));
            }
        }
        Ok(())
    }
}

/// Leading-integer parse: `"14px"` is 14, `"abc"` and `0` are unset.
fn parse_leading_int(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let (sign, digits) = match raw.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|v| v * sign)
}

fn lenient_int<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let parsed = match &value {
        serde_json::Value::Number(n) => n.as_f64().map(|f| f.trunc() as i64),
        serde_json::Value::String(s) => parse_leading_int(s),
        _ => None,
    };
    Ok(parsed
        .filter(|v| *v > 0)
        .and_then(|v| u32::try_from(v).ok()))
}

fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Bool(b) => b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        serde_json::Value::String(s) => matches!(
            s.trim().to_lowercase().as_str(),
            "true" | "1" | "yes" | "on"
        ),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_dimensions_missing_or_invalid() {
        let options = WidgetOptions::from_json(r#"{"width": "abc"}"#).unwrap();
        assert_eq!(options.canvas_width(), 500);
        assert_eq!(options.canvas_height(), 100);
    }

    #[test]
    fn string_numbers_are_parsed() {
        let options = WidgetOptions::from_json(r#"{"width": "640px", "height": 480}"#).unwrap();
        assert_eq!(options.canvas_width(), 640);
        assert_eq!(options.canvas_height(), 480);
    }

    #[test]
    fn raw_list_of_configs() {
        let json = r#"{
            "rectangleAnnotations": [
                {"key": "mac", "label": "MAC", "width": "80", "resizable": "false"}
            ]
        }"#;
        let options = WidgetOptions::from_json(json).unwrap();
        let config = &options.configs()[0];
        assert_eq!(config.kind, "mac");
        assert_eq!(config.annotation_name, "mac");
        assert_eq!(config.rect_width(), 80);
        assert_eq!(config.rect_height(), 100);
        assert_eq!(config.font_size(), 14);
        assert!(!config.resizable);
        assert!(options.saved_state().is_none());
    }

    #[test]
    fn wrapped_configs_with_saved_state() {
        let json = r#"{
            "rectangleAnnotations": {
                "config": [{"type": "a", "label": "A", "annotation_name": "out_a"}],
                "savedState": {"files": [], "annotations": []}
            }
        }"#;
        let options = WidgetOptions::from_json(json).unwrap();
        assert_eq!(options.configs()[0].annotation_name, "out_a");
        assert!(options.saved_state().is_some());
    }

    #[test]
    fn label_defaults_to_key() {
        let options = WidgetOptions::from_json(r#"{"rectangleAnnotations": [{"key": "k"}]}"#)
            .unwrap();
        assert_eq!(options.configs()[0].label, "k");
    }

    #[test]
    fn accepted_extensions_ignore_case() {
        let options = WidgetOptions {
            accepted_files: vec![".jpg".into(), ".PNG".into()],
            ..WidgetOptions::default()
        };
        assert!(options.is_accepted("photo.JPG"));
        assert!(options.is_accepted("scan.v2.png"));
        assert!(!options.is_accepted("notes.txt"));
        assert!(options.is_accepted("png"));
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let options = WidgetOptions::with_configs(vec![
            AnnotationConfig::new("a", "A"),
            AnnotationConfig::new("a", "Again"),
        ]);
        assert!(matches!(options.validate(), Err(Error::DuplicateType(k)) if k == "a"));
    }

    #[test]
    fn duplicate_output_names_are_rejected() {
        let mut second = AnnotationConfig::new("b", "B");
        second.annotation_name = "a".into();
        let options = WidgetOptions::with_configs(vec![AnnotationConfig::new("a", "A"), second]);
        assert!(matches!(options.validate(), Err(Error::DuplicateAnnotationName(_))));
    }

    #[test]
    fn leading_int_parse() {
        assert_eq!(parse_leading_int("  42abc"), Some(42));
        assert_eq!(parse_leading_int("-3"), Some(-3));
        assert_eq!(parse_leading_int("px"), None);
    }
}
