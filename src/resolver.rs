use crate::error::ResolveError;
use crate::manifest::{self, ResolverManifest};
use crate::merge::{merge, merge_into};
use crate::serialization::to_value;
use crate::tracker::{changed_paths, leaf_paths, DEFAULT_PATH_SEPARATOR};
use crate::tree::{ModifierSelection, TokenMap, TokenTree};
use log::{debug, trace};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeSet;

/// Key under which [`ResolvedOutput::to_value`] records modified paths.
pub const EXTENSIONS_KEY: &str = "$extensions";

/// Tunables for a [`Resolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Joins keys into leaf paths, e.g. `color.text`.
    pub path_separator: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            path_separator: DEFAULT_PATH_SEPARATOR.to_string(),
        }
    }
}

impl ResolverConfig {
    #[must_use]
    pub fn with_path_separator(mut self, separator: impl Into<String>) -> Self {
        self.path_separator = separator.into();
        self
    }
}

/// A built resolver: the validated manifest, the sources it draws from and the merged base tree.
///
/// The base tree is computed once by [`Resolver::build`] and never changes afterwards.
/// [`Resolver::apply`] only reads it, so one resolver can serve any number of
/// selections, from any number of threads.
#[derive(Debug, Clone)]
pub struct Resolver {
    manifest: ResolverManifest,
    token_map: TokenMap,
    tokens: TokenTree,
    config: ResolverConfig,
}

/// The outcome of applying a modifier selection.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOutput {
    pub tokens: TokenTree,
    /// Leaf paths contributed by any source the selection pulled in.
    pub modified_paths: BTreeSet<String>,
}

impl Resolver {
    /// Validates `manifest` and merges every set's sources into the base tree.
    ///
    /// # Errors
    /// Fails on any structural manifest problem, on an empty `token_map`, on a set
    /// without sources and on a set source missing from `token_map`.
    pub fn build(token_map: TokenMap, manifest: &Value) -> Result<Self, ResolveError> {
        Self::build_with_config(token_map, manifest, ResolverConfig::default())
    }

    /// Like [`Resolver::build`], with explicit configuration.
    ///
    /// # Errors
    /// See [`Resolver::build`].
    pub fn build_with_config(
        token_map: TokenMap,
        manifest: &Value,
        config: ResolverConfig,
    ) -> Result<Self, ResolveError> {
        let manifest = manifest::validate(manifest)?;
        Self::from_manifest(token_map, manifest, config)
    }

    /// Builds from an already validated manifest.
    ///
    /// # Errors
    /// See [`Resolver::build`], minus manifest validation.
    pub fn from_manifest(
        token_map: TokenMap,
        manifest: ResolverManifest,
        config: ResolverConfig,
    ) -> Result<Self, ResolveError> {
        if token_map.is_empty() {
            return Err(ResolveError::EmptyTokenMap);
        }

        let mut contributions = Vec::new();
        for set in &manifest.sets {
            if set.sources.is_empty() {
                return Err(ResolveError::EmptySourceList {
                    set_name: set.name.clone(),
                });
            }
            for source_name in &set.sources {
                contributions.push(lookup(&token_map, source_name)?);
            }
        }
        let tokens = merge(contributions.iter().copied());
        debug!(
            "built base tree from {} source(s) in {} set(s); {} modifier(s) declared",
            contributions.len(),
            manifest.sets.len(),
            manifest.modifiers.len()
        );

        Ok(Self {
            manifest,
            token_map,
            tokens,
            config,
        })
    }

    /// The base tree: all set sources merged, no modifier applied.
    #[must_use]
    pub fn tokens(&self) -> &TokenTree {
        &self.tokens
    }

    #[must_use]
    pub fn manifest(&self) -> &ResolverManifest {
        &self.manifest
    }

    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Looks up one source tree by name.
    ///
    /// # Errors
    /// Returns [`ResolveError::MissingSource`] if no source has that name.
    pub fn source(&self, name: &str) -> Result<&TokenTree, ResolveError> {
        lookup(&self.token_map, name)
    }

    /// Each modifier mapped to its default value (the first declared one unless set explicitly).
    #[must_use]
    pub fn default_selection(&self) -> ModifierSelection {
        self.manifest
            .modifiers
            .iter()
            .filter_map(|modifier| {
                let value = modifier.default_value()?;
                Some((modifier.name.clone(), value.to_string()))
            })
            .collect()
    }

    /// Merges the sources picked by `selection` on top of a copy of the base tree.
    ///
    /// Modifiers are applied in manifest declaration order, whatever order the
    /// selection lists them in, and each value's sources in their declared order.
    ///
    /// # Errors
    /// Fails if the manifest declares no modifiers, if `selection` is empty, names an
    /// undeclared modifier or value, or pulls in a source missing from the token map.
    /// The resolver itself is unaffected by a failed call.
    pub fn apply(&self, selection: &ModifierSelection) -> Result<ResolvedOutput, ResolveError> {
        if self.manifest.modifiers.is_empty() {
            return Err(ResolveError::NoModifiersDefined);
        }
        if selection.is_empty() {
            return Err(ResolveError::EmptySelection);
        }
        if let Some(unknown) = selection
            .keys()
            .find(|name| self.manifest.modifier(name).is_none())
        {
            return Err(ResolveError::UnknownModifier {
                modifier: unknown.clone(),
            });
        }

        let mut tokens = self.tokens.clone();
        let mut modified_paths = BTreeSet::new();
        for modifier in &self.manifest.modifiers {
            let Some(value_name) = selection.get(&modifier.name) else {
                continue;
            };
            let value = modifier
                .value(value_name)
                .ok_or_else(|| ResolveError::UnknownModifierValue {
                    modifier: modifier.name.clone(),
                    value: value_name.clone(),
                })?;

            for source_name in &value.sources {
                let source = self.source(source_name)?;
                trace!("{}={}: merging {}", modifier.name, value.name, source_name);
                modified_paths.extend(leaf_paths(source, &self.config.path_separator));
                merge_into(&mut tokens, source);
            }
        }

        debug!(
            "applied {} modifier(s), {} path(s) modified",
            selection.len(),
            modified_paths.len()
        );
        Ok(ResolvedOutput {
            tokens,
            modified_paths,
        })
    }

    /// Leaf paths whose value differs between resolving `baseline` and `selection`.
    ///
    /// Unlike [`ResolvedOutput::modified_paths`], this compares values, so a source that
    /// re-states an unchanged value does not show up.
    ///
    /// # Errors
    /// Any error [`Resolver::apply`] reports for either selection.
    pub fn diff(
        &self,
        baseline: &ModifierSelection,
        selection: &ModifierSelection,
    ) -> Result<BTreeSet<String>, ResolveError> {
        let before = self.apply(baseline)?;
        let after = self.apply(selection)?;
        Ok(changed_paths(
            &before.tokens,
            &after.tokens,
            &self.config.path_separator,
        ))
    }
}

fn lookup<'a>(token_map: &'a TokenMap, name: &str) -> Result<&'a TokenTree, ResolveError> {
    token_map
        .get(name)
        .ok_or_else(|| ResolveError::MissingSource {
            source_name: name.to_string(),
        })
}

impl ResolvedOutput {
    /// The merged tree as JSON, annotated with `$extensions.modified`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut value = to_value(&self.tokens);
        if let Value::Object(members) = &mut value {
            members.insert(
                EXTENSIONS_KEY.to_string(),
                serde_json::json!({ "modified": self.modified_paths }),
            );
        }
        value
    }

    /// Serializes the annotated tree into a pretty-printed JSON string.
    ///
    /// # Errors
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self)
    }

    /// Serializes the annotated tree into a YAML string.
    ///
    /// # Errors
    /// Returns a `serde_yaml::Error` if serialization fails.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self)
    }
}

impl Serialize for ResolvedOutput {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_value().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialization::tree_from_value;
    use serde_json::json;

    fn token_map(entries: &[(&str, Value)]) -> TokenMap {
        entries
            .iter()
            .map(|(name, value)| (name.to_string(), tree_from_value(value.clone()).unwrap()))
            .collect()
    }

    fn selection(pairs: &[(&str, &str)]) -> ModifierSelection {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_to_value_adds_extensions() {
        let output = ResolvedOutput {
            tokens: tree_from_value(json!({ "color": { "text": "white" } })).unwrap(),
            modified_paths: ["color.text".to_string()].into_iter().collect(),
        };
        assert_eq!(
            output.to_value(),
            json!({
                "color": { "text": "white" },
                "$extensions": { "modified": ["color.text"] }
            })
        );
    }

    #[test]
    fn test_custom_separator_applies_to_modified_paths() {
        let map = token_map(&[
            ("base", json!({ "color": { "text": "black" } })),
            ("dark", json!({ "color": { "text": "white" } })),
        ]);
        let manifest = json!({
            "sets": [{ "name": "base", "sources": ["base"] }],
            "modifiers": [{ "name": "theme", "values": [{ "name": "dark", "values": ["dark"] }] }]
        });
        let resolver = Resolver::build_with_config(
            map,
            &manifest,
            ResolverConfig::default().with_path_separator("/"),
        )
        .unwrap();

        let output = resolver.apply(&selection(&[("theme", "dark")])).unwrap();
        assert!(output.modified_paths.contains("color/text"));
    }

    #[test]
    fn test_modifiers_apply_in_declaration_order() {
        let map = token_map(&[
            ("base", json!({ "size": 1 })),
            ("a", json!({ "size": 2 })),
            ("z", json!({ "size": 3 })),
        ]);
        // "z" sorts after "a" but is declared first, so "a" wins.
        let manifest = json!({
            "sets": [{ "name": "base", "sources": ["base"] }],
            "modifiers": [
                { "name": "zeta", "values": [{ "name": "on", "values": ["z"] }] },
                { "name": "alpha", "values": [{ "name": "on", "values": ["a"] }] }
            ]
        });
        let resolver = Resolver::build(map, &manifest).unwrap();
        let output = resolver
            .apply(&selection(&[("alpha", "on"), ("zeta", "on")]))
            .unwrap();
        assert_eq!(to_value(&output.tokens), json!({ "size": 2 }));
    }

    #[test]
    fn test_resolver_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Resolver>();
        assert_send_sync::<ResolvedOutput>();
    }
}
