use crate::api::RESOLVER_FILE_NAME;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum TokensError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Resolve(#[from] ResolveError),
}

impl TokensError {
    /// The input file this error belongs to, if it can be pinned to one.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        match self {
            TokensError::Parse(err) => err.file_name(),
            TokensError::Resolve(err) => err.file_name(),
        }
    }
}

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum ParseError {
    #[error("Invalid JSON in {file_name}: {message}")]
    #[diagnostic(
        code(parse::invalid_json),
        help("Every token source and the resolver manifest must be valid JSON.")
    )]
    InvalidJson {
        file_name: String,
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: SourceSpan,
    },

    #[error("Token source {file_name} must be a JSON object, found {found}")]
    #[diagnostic(
        code(parse::not_an_object),
        help("A token source is a tree of groups and tokens rooted at an object.")
    )]
    NotAnObject { file_name: String, found: String },

    #[error("Design system error: {expected} not found")]
    #[diagnostic(
        code(parse::manifest_not_found),
        help("Add a resolver manifest describing the token sets and modifiers.")
    )]
    ManifestNotFound { expected: String },
}

impl ParseError {
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        match self {
            ParseError::InvalidJson { file_name, .. } | ParseError::NotAnObject { file_name, .. } => {
                Some(file_name.as_str())
            }
            ParseError::ManifestNotFound { .. } => None,
        }
    }
}

/// One structural problem found in a resolver manifest.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
#[error("{path}: {message}")]
#[diagnostic(code(manifest::invalid_field))]
pub struct ManifestIssue {
    /// Location of the offending field, e.g. `sets[0].sources`.
    pub path: String,
    pub message: String,
}

impl ManifestIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
#[error("Invalid resolver manifest: {count} problem(s) found", count = .issues.len())]
#[diagnostic(
    code(manifest::invalid),
    help("Fix every listed field; the manifest is checked as a whole before resolution.")
)]
pub struct ManifestError {
    #[related]
    pub issues: Vec<ManifestIssue>,
}

impl ManifestError {
    /// The issue messages in the order they were found.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }
}

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Manifest(#[from] ManifestError),

    #[error("Empty token map! No tokens to resolve")]
    #[diagnostic(
        code(resolve::empty_token_map),
        help("Supply at least one token source alongside the manifest.")
    )]
    EmptyTokenMap,

    #[error("Token set {set_name} can't contain an empty list of sources")]
    #[diagnostic(code(resolve::empty_source_list))]
    EmptySourceList { set_name: String },

    #[error("Tokens \"{source_name}\" missing in token map")]
    #[diagnostic(
        code(resolve::missing_source),
        help("Every source named by the manifest must be supplied by the caller.")
    )]
    MissingSource { source_name: String },

    #[error("No modifiers defined, nothing to apply")]
    #[diagnostic(code(resolve::no_modifiers))]
    NoModifiersDefined,

    #[error("Can't apply an empty modifier selection")]
    #[diagnostic(code(resolve::empty_selection))]
    EmptySelection,

    #[error("Modifier {modifier} not defined")]
    #[diagnostic(code(resolve::unknown_modifier))]
    UnknownModifier { modifier: String },

    #[error("Modifier {modifier} has no {value} defined")]
    #[diagnostic(code(resolve::unknown_modifier_value))]
    UnknownModifierValue { modifier: String, value: String },
}

impl ResolveError {
    /// Manifest and reference errors point at the manifest file; selection errors have no file.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        match self {
            ResolveError::Manifest(_)
            | ResolveError::EmptySourceList { .. }
            | ResolveError::MissingSource { .. } => Some(RESOLVER_FILE_NAME),
            _ => None,
        }
    }
}
