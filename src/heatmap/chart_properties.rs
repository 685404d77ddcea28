//! Chart property definitions with defaults from chart.json
//!
//! chart.json is embedded at compile time and declares every tunable chart
//! property once: its kind, its default and (for enumerations) its valid values.
//! User values (a flat JSON object or `key=value` overrides) are layered on top
//! by `ChartPropertyReader`, which falls back to the declared default whenever a
//! user value is missing or invalid.

use super::error::{HeatmapError, Result};
use std::collections::HashMap;

/// chart.json embedded at compile time
const CHART_JSON: &str = include_str!("../../chart.json");

/// Property definition from chart.json
#[derive(Debug, Clone)]
pub struct PropertyDef {
    pub name: String,
    pub kind: PropertyKind,
    pub default_value: String,
    /// For EnumeratedProperty, the valid values
    pub valid_values: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    String,
    Enumerated,
    Double,
    Boolean,
}

/// Registry of all chart properties with their defaults from chart.json
pub struct PropertyRegistry {
    properties: HashMap<String, PropertyDef>,
}

impl PropertyRegistry {
    /// Parse chart.json and build the registry
    ///
    /// Panics if chart.json is malformed, which can only happen at build time
    /// since the file is embedded.
    pub fn from_chart_json() -> Self {
        let json: serde_json::Value =
            serde_json::from_str(CHART_JSON).expect("chart.json is invalid JSON");

        let properties_array = json["properties"]
            .as_array()
            .expect("chart.json missing 'properties' array");

        let mut properties = HashMap::new();

        for prop in properties_array {
            let name = prop["name"]
                .as_str()
                .expect("property missing 'name'")
                .to_string();

            let kind = match prop["kind"].as_str().expect("property missing 'kind'") {
                "StringProperty" => PropertyKind::String,
                "EnumeratedProperty" => PropertyKind::Enumerated,
                "DoubleProperty" => PropertyKind::Double,
                "BooleanProperty" => PropertyKind::Boolean,
                other => panic!("Unknown property kind: {}", other),
            };

            let default_value = prop["defaultValue"].as_str().unwrap_or("").to_string();

            let valid_values = if kind == PropertyKind::Enumerated {
                prop["values"].as_array().map(|arr| {
                    arr.iter()
                        .filter_map(|v| v.as_str().map(|s| s.to_string()))
                        .collect()
                })
            } else {
                None
            };

            properties.insert(
                name.clone(),
                PropertyDef {
                    name,
                    kind,
                    default_value,
                    valid_values,
                },
            );
        }

        Self { properties }
    }

    /// Get the default value for a property
    pub fn get_default(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(|p| p.default_value.as_str())
    }

    /// Get the property definition
    pub fn get_property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.get(name)
    }
}

static REGISTRY: std::sync::OnceLock<PropertyRegistry> = std::sync::OnceLock::new();

/// Get the global property registry
pub fn registry() -> &'static PropertyRegistry {
    REGISTRY.get_or_init(PropertyRegistry::from_chart_json)
}

/// Typed chart property reader
///
/// User values take precedence; everything else comes from chart.json.
#[derive(Debug, Clone, Default)]
pub struct ChartPropertyReader {
    user_values: HashMap<String, String>,
}

impl ChartPropertyReader {
    /// Reader with no user values (all defaults)
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a flat JSON object: `{"chart.width": 1200, "legend.handles": true}`
    ///
    /// Strings, numbers and booleans are accepted; other JSON values are skipped.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;

        let mut reader = Self::new();
        for (key, value) in map {
            let value_str = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                other => {
                    log::warn!("Ignoring non-scalar value for property '{}': {}", key, other);
                    continue;
                }
            };
            reader.set(key, value_str);
        }

        Ok(reader)
    }

    /// Set a user value. Empty values mean "not set".
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if registry().get_property(&name).is_none() {
            log::warn!("Unknown chart property '{}' (value '{}')", name, value);
        }
        if value.is_empty() {
            self.user_values.remove(&name);
        } else {
            self.user_values.insert(name, value);
        }
    }

    /// Apply a `key=value` override as given on the command line
    pub fn apply_override(&mut self, assignment: &str) -> Result<()> {
        let (key, value) = assignment.split_once('=').ok_or_else(|| {
            HeatmapError::Config(format!(
                "Invalid override '{}', expected key=value",
                assignment
            ))
        })?;
        self.set(key.trim(), value.trim());
        Ok(())
    }

    /// Get string property (user value or default from chart.json)
    pub fn get_string(&self, name: &str) -> String {
        if let Some(value) = self.user_values.get(name) {
            return value.clone();
        }
        registry().get_default(name).unwrap_or("").to_string()
    }

    /// Get optional string property (None if empty)
    pub fn get_optional_string(&self, name: &str) -> Option<String> {
        let value = self.get_string(name);
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }

    /// Get enumerated property with validation
    ///
    /// Returns the declared spelling of the matching value, so lookups
    /// downstream can be case-sensitive.
    pub fn get_enum(&self, name: &str) -> String {
        let reg = registry();
        let default = reg.get_default(name).unwrap_or("");

        if let Some(value) = self.user_values.get(name) {
            if let Some(valid) = reg.get_property(name).and_then(|p| p.valid_values.as_ref()) {
                if let Some(canonical) = valid.iter().find(|v| v.eq_ignore_ascii_case(value)) {
                    return canonical.clone();
                }
                log::warn!(
                    "Invalid value '{}' for property '{}'. Valid values: [{}]. Using default: '{}'",
                    value,
                    name,
                    valid.join(", "),
                    default
                );
            } else {
                return value.clone();
            }
        }

        default.to_string()
    }

    /// Get f64 property, falling back to the default on parse failure
    pub fn get_f64(&self, name: &str) -> f64 {
        let default = registry()
            .get_default(name)
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(0.0);

        match self.user_values.get(name) {
            None => default,
            Some(value) => match value.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => v,
                _ => {
                    log::warn!(
                        "Invalid numeric value '{}' for property '{}'. Using default: {}",
                        value,
                        name,
                        default
                    );
                    default
                }
            },
        }
    }

    /// Get f64 property with range validation
    pub fn get_f64_in_range(&self, name: &str, min: f64, max: f64) -> f64 {
        let value = self.get_f64(name);
        let default = registry()
            .get_default(name)
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(0.0);

        if value >= min && value <= max {
            value
        } else {
            log::warn!(
                "Value {} for property '{}' out of range [{}, {}]. Using default: {}",
                value,
                name,
                min,
                max,
                default
            );
            default
        }
    }

    /// Get a non-negative integer property with range validation
    pub fn get_count_in_range(&self, name: &str, min: usize, max: usize) -> usize {
        self.get_f64_in_range(name, min as f64, max as f64).round() as usize
    }

    /// Get boolean property ("true"/"false", case-insensitive)
    pub fn get_bool(&self, name: &str) -> bool {
        let default = registry()
            .get_default(name)
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        match self.user_values.get(name).map(|v| v.to_ascii_lowercase()) {
            None => default,
            Some(v) if v == "true" => true,
            Some(v) if v == "false" => false,
            Some(other) => {
                log::warn!(
                    "Invalid boolean value '{}' for property '{}'. Using default: {}",
                    other,
                    name,
                    default
                );
                default
            }
        }
    }

    /// Parse a comma-separated list of numbers, e.g. margins "20,70,60,80"
    ///
    /// Returns None if the value does not hold exactly `expected` finite numbers.
    pub fn get_f64_list(&self, name: &str, expected: usize) -> Option<Vec<f64>> {
        let value = self.get_string(name);
        let parsed: std::result::Result<Vec<f64>, _> =
            value.split(',').map(|p| p.trim().parse::<f64>()).collect();

        match parsed {
            Ok(values) if values.len() == expected && values.iter().all(|v| v.is_finite()) => {
                Some(values)
            }
            _ => {
                log::warn!(
                    "Invalid list '{}' for property '{}', expected {} comma-separated numbers",
                    value,
                    name,
                    expected
                );
                None
            }
        }
    }

    /// Parse a comma-separated list of strings, skipping empty entries
    pub fn get_string_list(&self, name: &str) -> Vec<String> {
        self.get_string(name)
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}
