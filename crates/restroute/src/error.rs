use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading and resolving routing documents (E2001–E2016).
#[derive(Debug, Error)]
pub enum RouteError {
    /// E2001: The document is not valid YAML.
    #[error("E2001: the file \"{}\" does not contain valid YAML: {source}", .path.display())]
    DocumentParseError {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// E2002: The document root is not a mapping of definitions.
    #[error("E2002: the file \"{}\" must contain a YAML mapping of route definitions", .path.display())]
    InvalidDocumentShape { path: PathBuf },

    /// E2003: A definition is not itself a mapping.
    #[error("E2003: the definition of \"{name}\" in \"{}\" must be a YAML mapping", .path.display())]
    MalformedDefinition { name: String, path: PathBuf },

    /// E2004: A definition uses keys outside the supported set.
    #[error(
        "E2004: the routing file \"{}\" contains unsupported keys for \"{name}\": \"{}\". Expected one of: \"{}\"",
        .path.display(),
        .keys.join("\", \""),
        .allowed.join("\", \"")
    )]
    UnsupportedKey {
        name: String,
        path: PathBuf,
        keys: Vec<String>,
        allowed: &'static [&'static str],
    },

    /// E2005: A definition declares both `resource` and `path`.
    #[error(
        "E2005: the routing file \"{}\" must not specify both the \"resource\" key and the \"path\" key for \"{name}\"; choose between an import and a route definition",
        .path.display()
    )]
    AmbiguousDefinition { name: String, path: PathBuf },

    /// E2006: `type` used on a route definition.
    #[error(
        "E2006: the \"type\" key for the route definition \"{name}\" in \"{}\" is unsupported; it is only available for imports in combination with the \"resource\" key",
        .path.display()
    )]
    InvalidTypeUsage { name: String, path: PathBuf },

    /// E2007: Neither `resource` nor `path` given.
    #[error("E2007: you must define a \"path\" for the route \"{name}\" in file \"{}\"", .path.display())]
    MissingTarget { name: String, path: PathBuf },

    /// E2008: `parent` names an import that has not been processed yet.
    #[error("E2008: cannot find parent resource with name \"{parent}\" for \"{name}\" in \"{}\"", .path.display())]
    UnknownParent {
        name: String,
        parent: String,
        path: PathBuf,
    },

    /// E2009: The locator could not find the resource.
    #[error("E2009: resource \"{resource}\" not found (looked in {})", searched_display(.searched))]
    ResourceNotFound {
        resource: String,
        searched: Vec<PathBuf>,
    },

    /// E2010: An import failed to resolve.
    #[error("E2010: cannot import resource \"{resource}\" for \"{name}\" from \"{}\": {source}", .path.display())]
    ImportResolutionFailed {
        name: String,
        path: PathBuf,
        resource: String,
        #[source]
        source: Box<RouteError>,
    },

    /// E2011: The resource is not a local file.
    #[error("E2011: this is not a local file \"{resource}\"")]
    NotLocal { resource: String },

    /// E2012: No loader accepts the resource and type combination.
    #[error("E2012: no loader supports resource \"{resource}\" (type: {})", .resource_type.as_deref().unwrap_or("none"))]
    UnsupportedResource {
        resource: String,
        resource_type: Option<String>,
    },

    /// E2013: The document imports itself, directly or through other documents.
    #[error("E2013: circular import detected: {}", chain_display(.chain))]
    CircularImport { chain: Vec<PathBuf> },

    /// E2014: An attribute value has the wrong shape.
    #[error("E2014: the \"{key}\" of \"{name}\" in \"{}\" must be {expected}", .path.display())]
    InvalidAttribute {
        name: String,
        key: &'static str,
        path: PathBuf,
        expected: &'static str,
    },

    /// E2015: A requirement pattern is empty.
    #[error("E2015: routing requirement \"{key}\" of \"{name}\" in \"{}\" cannot be empty", .path.display())]
    InvalidRequirement {
        name: String,
        key: String,
        path: PathBuf,
    },

    /// E2016: Loader configuration could not be read or parsed.
    #[error("E2016: config error: {0}")]
    ConfigError(String),

    /// I/O error reading a document.
    #[error("I/O error reading \"{}\": {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RouteError {
    /// True when the failure comes from the filesystem rather than from document content.
    pub fn is_io(&self) -> bool {
        match self {
            RouteError::Io { .. } | RouteError::ResourceNotFound { .. } => true,
            RouteError::ImportResolutionFailed { source, .. } => source.is_io(),
            _ => false,
        }
    }
}

fn searched_display(searched: &[PathBuf]) -> String {
    if searched.is_empty() {
        return "no directories".to_string();
    }
    searched
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn chain_display(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
