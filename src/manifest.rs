//! Structural validation of resolver manifests.
//!
//! Two document shapes are accepted and normalised into one [`ResolverManifest`]:
//!
//! ```json
//! { "name": "ds", "sets": [{ "name": "base", "sources": ["base.json"] }],
//!   "modifiers": [{ "name": "theme", "values": [{ "name": "dark", "values": ["dark.json"] }] }] }
//! ```
//!
//! ```json
//! { "name": "ds", "version": "2025-10-01",
//!   "tokens": ["base.json", { "type": "modifier", "name": "theme", "context": { "dark": ["dark.json"] } }] }
//! ```
//!
//! Validation only checks shape. Whether the named sources exist is checked when a
//! [`Resolver`](crate::resolver::Resolver) is built.

use crate::error::{ManifestError, ManifestIssue};
use crate::serialization::json_type_name;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// The only `version` discriminant this crate understands.
pub const SUPPORTED_VERSION: &str = "2025-10-01";

const ROOT: &str = "(root)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolverManifest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    /// Contributions to the base tree, in merge order.
    pub sets: Vec<TokenSet>,
    /// Declared modifiers, in declaration order.
    pub modifiers: Vec<Modifier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenSet {
    pub name: String,
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Modifier {
    pub name: String,
    pub values: Vec<ModifierValue>,
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModifierValue {
    pub name: String,
    pub sources: Vec<String>,
}

impl ResolverManifest {
    #[must_use]
    pub fn modifier(&self, name: &str) -> Option<&Modifier> {
        self.modifiers.iter().find(|modifier| modifier.name == name)
    }

    /// Every source name the manifest refers to, sets first, without duplicates.
    #[must_use]
    pub fn referenced_sources(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.sets
            .iter()
            .flat_map(|set| set.sources.iter())
            .chain(
                self.modifiers
                    .iter()
                    .flat_map(|modifier| modifier.values.iter())
                    .flat_map(|value| value.sources.iter()),
            )
            .map(String::as_str)
            .filter(|name| seen.insert(*name))
            .collect()
    }
}

impl Modifier {
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&ModifierValue> {
        self.values.iter().find(|value| value.name == name)
    }

    /// The explicit `default`, or else the first declared value.
    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.default
            .as_deref()
            .or_else(|| self.values.first().map(|value| value.name.as_str()))
    }
}

/// Validates a parsed manifest document, reporting every structural problem at once.
///
/// # Errors
/// Returns a [`ManifestError`] listing one [`ManifestIssue`] per violated field.
pub fn validate(document: &Value) -> Result<ResolverManifest, ManifestError> {
    let mut validator = Validator::default();
    let manifest = validator.manifest(document);
    match manifest {
        Some(manifest) if validator.issues.is_empty() => Ok(manifest),
        _ => Err(ManifestError {
            issues: validator.issues,
        }),
    }
}

#[derive(Default)]
struct Validator {
    issues: Vec<ManifestIssue>,
}

impl Validator {
    fn issue(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ManifestIssue::new(path, message));
    }

    fn manifest(&mut self, document: &Value) -> Option<ResolverManifest> {
        let Some(root) = document.as_object() else {
            self.issue(
                ROOT,
                format!("expected object for manifest, found {}", json_type_name(document)),
            );
            return None;
        };

        // the tokens shape is discriminated by its version, the sets shape may omit it
        let versioned = root.contains_key("tokens") && !root.contains_key("sets");
        let version = if versioned {
            self.required_string(root, "version", "version")
        } else {
            self.optional_string(root, "version", "version")
        };
        if let Some(version) = &version {
            if version != SUPPORTED_VERSION {
                self.issue("version", format!("unsupported version \"{version}\""));
            }
        }
        let description = self.optional_string(root, "description", "description");

        let (sets, modifiers) = match (root.get("sets"), root.get("tokens")) {
            (Some(_), Some(_)) => {
                self.issue(ROOT, "expected either sets or tokens, found both");
                return None;
            }
            (Some(sets), None) => {
                let name = self.optional_string(root, "name", "name");
                let sets = self.sets(sets);
                let modifiers = match root.get("modifiers") {
                    Some(modifiers) => self.modifiers(modifiers),
                    None => Vec::new(),
                };
                return self.finish(name, description, version, sets, modifiers);
            }
            (None, Some(tokens)) => {
                if root.contains_key("modifiers") {
                    self.issue(
                        "modifiers",
                        "modifiers must be declared inline in tokens for this shape",
                    );
                }
                self.tokens(tokens)
            }
            (None, None) => {
                self.issue("sets", "missing sets");
                return None;
            }
        };

        let name = self.required_string(root, "name", "name");
        self.finish(name, description, version, sets, modifiers)
    }

    fn finish(
        &mut self,
        name: Option<String>,
        description: Option<String>,
        version: Option<String>,
        sets: Vec<TokenSet>,
        modifiers: Vec<(String, Modifier)>,
    ) -> Option<ResolverManifest> {
        self.check_modifiers(&modifiers);
        Some(ResolverManifest {
            name,
            description,
            version,
            sets,
            modifiers: modifiers.into_iter().map(|(_, modifier)| modifier).collect(),
        })
    }

    // --- canonical shape ---

    fn sets(&mut self, sets: &Value) -> Vec<TokenSet> {
        let Some(entries) = sets.as_array() else {
            self.issue("sets", "expected array for sets");
            return Vec::new();
        };
        entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let path = format!("sets[{index}]");
                let object = self.object(entry, &path, "set")?;
                let name = self.required_string(object, "name", &format!("{path}.name"));
                let sources = self.source_list(object, &path);
                Some(TokenSet {
                    name: name?,
                    sources: sources?,
                })
            })
            .collect()
    }

    fn modifiers(&mut self, modifiers: &Value) -> Vec<(String, Modifier)> {
        let Some(entries) = modifiers.as_array() else {
            self.issue("modifiers", "expected array for modifiers");
            return Vec::new();
        };
        entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let path = format!("modifiers[{index}]");
                let object = self.object(entry, &path, "modifier")?;
                let modifier = self.modifier_with_value_list(object, &path)?;
                Some((path, modifier))
            })
            .collect()
    }

    fn modifier_with_value_list(
        &mut self,
        object: &Map<String, Value>,
        path: &str,
    ) -> Option<Modifier> {
        let name = self.required_string(object, "name", &format!("{path}.name"));
        let default = self.optional_string(object, "default", &format!("{path}.default"));

        let values_path = format!("{path}.values");
        let values = match object.get("values") {
            None => {
                self.issue(&values_path, "missing values");
                None
            }
            Some(Value::Array(entries)) => Some(
                entries
                    .iter()
                    .enumerate()
                    .filter_map(|(index, entry)| {
                        let entry_path = format!("{values_path}[{index}]");
                        let entry = self.object(entry, &entry_path, "modifier value")?;
                        let name =
                            self.required_string(entry, "name", &format!("{entry_path}.name"));
                        let sources = self.source_list(entry, &entry_path);
                        Some(ModifierValue {
                            name: name?,
                            sources: sources?,
                        })
                    })
                    .collect::<Vec<_>>(),
            ),
            Some(_) => {
                self.issue(&values_path, "expected array for values");
                None
            }
        };

        Some(Modifier {
            name: name?,
            values: values?,
            default,
        })
    }

    // --- versioned shape ---

    fn tokens(&mut self, tokens: &Value) -> (Vec<TokenSet>, Vec<(String, Modifier)>) {
        let mut sets = Vec::new();
        let mut modifiers = Vec::new();
        let Some(entries) = tokens.as_array() else {
            self.issue("tokens", "expected array for tokens");
            return (sets, modifiers);
        };

        for (index, entry) in entries.iter().enumerate() {
            let path = format!("tokens[{index}]");
            match entry {
                Value::String(source) => sets.push(TokenSet {
                    name: source.clone(),
                    sources: vec![source.clone()],
                }),
                Value::Object(object) => match object.get("type") {
                    None => self.issue(format!("{path}.type"), "missing type"),
                    Some(Value::String(kind)) if kind == "set" => {
                        let name = self.required_string(object, "name", &format!("{path}.name"));
                        let sources = self.string_array(object, "sources", &path);
                        if let (Some(name), Some(sources)) = (name, sources) {
                            sets.push(TokenSet { name, sources });
                        }
                    }
                    Some(Value::String(kind)) if kind == "modifier" => {
                        if let Some(modifier) = self.modifier_with_context(object, &path) {
                            modifiers.push((path, modifier));
                        }
                    }
                    Some(other) => self.issue(
                        format!("{path}.type"),
                        format!("unsupported type {other}"),
                    ),
                },
                other => self.issue(
                    path,
                    format!(
                        "expected source name or object, found {}",
                        json_type_name(other)
                    ),
                ),
            }
        }
        (sets, modifiers)
    }

    fn modifier_with_context(
        &mut self,
        object: &Map<String, Value>,
        path: &str,
    ) -> Option<Modifier> {
        let name = self.required_string(object, "name", &format!("{path}.name"));
        let default = self.optional_string(object, "default", &format!("{path}.default"));

        let context_path = format!("{path}.context");
        let values = match object.get("context") {
            None => {
                self.issue(&context_path, "missing context");
                None
            }
            Some(Value::Object(context)) => Some(
                context
                    .iter()
                    .filter_map(|(value_name, sources)| {
                        let sources =
                            self.strings(sources, &format!("{context_path}.{value_name}"), value_name)?;
                        Some(ModifierValue {
                            name: value_name.clone(),
                            sources,
                        })
                    })
                    .collect::<Vec<_>>(),
            ),
            Some(_) => {
                self.issue(&context_path, "expected object for context");
                None
            }
        };

        Some(Modifier {
            name: name?,
            values: values?,
            default,
        })
    }

    // --- cross-entry rules ---

    fn check_modifiers(&mut self, modifiers: &[(String, Modifier)]) {
        let mut names = HashSet::new();
        for (path, modifier) in modifiers {
            if !names.insert(modifier.name.as_str()) {
                self.issue(
                    format!("{path}.name"),
                    format!("duplicate modifier name \"{}\"", modifier.name),
                );
            }
            if modifier.values.is_empty() {
                self.issue(path.as_str(), "modifier must declare at least one value");
            }
            let mut value_names = HashSet::new();
            for value in &modifier.values {
                if !value_names.insert(value.name.as_str()) {
                    self.issue(
                        path.as_str(),
                        format!("duplicate value name \"{}\"", value.name),
                    );
                }
            }
            if let Some(default) = &modifier.default {
                if modifier.value(default).is_none() {
                    self.issue(
                        format!("{path}.default"),
                        format!("unknown default value \"{default}\""),
                    );
                }
            }
        }
    }

    // --- field helpers ---

    fn object<'v>(
        &mut self,
        value: &'v Value,
        path: &str,
        what: &str,
    ) -> Option<&'v Map<String, Value>> {
        let object = value.as_object();
        if object.is_none() {
            self.issue(
                path,
                format!("expected object for {what}, found {}", json_type_name(value)),
            );
        }
        object
    }

    fn required_string(
        &mut self,
        object: &Map<String, Value>,
        key: &str,
        path: &str,
    ) -> Option<String> {
        match object.get(key) {
            None => {
                self.issue(path, format!("missing {key}"));
                None
            }
            Some(Value::String(text)) => Some(text.clone()),
            Some(_) => {
                self.issue(path, format!("expected string for {key}"));
                None
            }
        }
    }

    fn optional_string(
        &mut self,
        object: &Map<String, Value>,
        key: &str,
        path: &str,
    ) -> Option<String> {
        match object.get(key) {
            None | Some(Value::Null) => None,
            Some(_) => self.required_string(object, key, path),
        }
    }

    /// `sources`, falling back to the older `values` spelling.
    fn source_list(&mut self, object: &Map<String, Value>, path: &str) -> Option<Vec<String>> {
        let key = if !object.contains_key("sources") && object.contains_key("values") {
            "values"
        } else {
            "sources"
        };
        self.string_array(object, key, path)
    }

    fn string_array(
        &mut self,
        object: &Map<String, Value>,
        key: &str,
        path: &str,
    ) -> Option<Vec<String>> {
        let field_path = format!("{path}.{key}");
        match object.get(key) {
            None => {
                self.issue(field_path, format!("missing {key}"));
                None
            }
            Some(value) => self.strings(value, &field_path, key),
        }
    }

    fn strings(&mut self, value: &Value, path: &str, label: &str) -> Option<Vec<String>> {
        let Some(items) = value.as_array() else {
            self.issue(path, format!("expected string array for {label}"));
            return None;
        };
        let mut strings = Vec::with_capacity(items.len());
        let mut valid = true;
        for (index, item) in items.iter().enumerate() {
            match item {
                Value::String(text) => strings.push(text.clone()),
                other => {
                    valid = false;
                    self.issue(
                        format!("{path}[{index}]"),
                        format!("expected string, found {}", json_type_name(other)),
                    );
                }
            }
        }
        valid.then_some(strings)
    }
}
