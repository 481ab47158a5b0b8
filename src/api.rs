use crate::error::{ParseError, TokensError};
use crate::resolver::{ResolvedOutput, Resolver, ResolverConfig};
use crate::serialization::{json_type_name, tree_from_value};
use crate::tree::{ModifierSelection, TokenMap, TokenTree};
use crate::utils::offset_of;
use log::debug;
use miette::NamedSource;
use serde_json::Value;
use std::collections::BTreeMap;

/// The file a design system's resolver manifest is read from.
pub const RESOLVER_FILE_NAME: &str = "resolver.json";

/// Parses JSON text, reporting syntax errors against the named file.
///
/// # Errors
/// Returns [`ParseError::InvalidJson`] with the offending location.
pub fn parse_json(file_name: &str, text: &str) -> Result<Value, ParseError> {
    serde_json::from_str(text).map_err(|err| {
        let offset = offset_of(text, err.line(), err.column());
        ParseError::InvalidJson {
            file_name: file_name.to_string(),
            message: err.to_string(),
            src: NamedSource::new(file_name, text.to_string()),
            span: (offset, 0).into(),
        }
    })
}

/// Parses one token source document.
///
/// # Errors
/// Fails on malformed JSON or when the document root is not an object.
pub fn parse_source(file_name: &str, text: &str) -> Result<TokenTree, ParseError> {
    let value = parse_json(file_name, text)?;
    let found = json_type_name(&value);
    tree_from_value(value).ok_or_else(|| ParseError::NotAnObject {
        file_name: file_name.to_string(),
        found: found.to_string(),
    })
}

/// Builds a [`Resolver`] from a design system's files, given as file name to JSON text.
///
/// `resolver.json` is the manifest; every other file is a token source named after its file.
///
/// # Errors
/// Returns a [`TokensError`] if the manifest is absent, any file fails to parse, or
/// the resolver cannot be built.
pub fn load<I, K, V>(files: I) -> Result<Resolver, TokensError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    load_with_config(files, ResolverConfig::default())
}

/// Like [`load`], with explicit configuration.
///
/// # Errors
/// See [`load`].
pub fn load_with_config<I, K, V>(files: I, config: ResolverConfig) -> Result<Resolver, TokensError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let files: BTreeMap<String, V> = files
        .into_iter()
        .map(|(name, text)| (name.as_ref().to_string(), text))
        .collect();

    let manifest_text = files
        .get(RESOLVER_FILE_NAME)
        .ok_or_else(|| ParseError::ManifestNotFound {
            expected: RESOLVER_FILE_NAME.to_string(),
        })?;
    let manifest = parse_json(RESOLVER_FILE_NAME, manifest_text.as_ref())?;

    let mut token_map = TokenMap::new();
    for (name, text) in &files {
        if name == RESOLVER_FILE_NAME {
            continue;
        }
        token_map.insert(name.clone(), parse_source(name, text.as_ref())?);
    }
    debug!("loaded {} token source(s)", token_map.len());

    Ok(Resolver::build_with_config(token_map, &manifest, config)?)
}

/// Loads `files` and applies `selection` in one step.
///
/// # Errors
/// Any error from [`load`] or [`Resolver::apply`].
pub fn resolve<I, K, V>(files: I, selection: &ModifierSelection) -> Result<ResolvedOutput, TokensError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let resolver = load(files)?;
    Ok(resolver.apply(selection)?)
}
