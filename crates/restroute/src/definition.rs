//! Definition validation and typed definition parsing.
//!
//! Every top-level entry of a routing document is validated against the
//! closed key set and then converted into either a [`RouteDefinition`] or
//! an [`ImportDefinition`].

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use crate::error::RouteError;
use crate::model::sanitize_requirement;

/// Keys accepted in a definition.
pub const AVAILABLE_KEYS: &[&str] = &[
    "resource",
    "type",
    "prefix",
    "path",
    "host",
    "schemes",
    "methods",
    "defaults",
    "requirements",
    "options",
    "condition",
    "parent",
    "name_prefix",
];

/// Per-document resolution state.
///
/// Maps the name of each hierarchy-aware import to its parent chain, so
/// later imports in the same document can nest under it via `parent`.
#[derive(Debug, Clone, Default)]
pub struct ResolutionContext {
    parents: HashMap<String, Vec<String>>,
}

impl ResolutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parents.contains_key(name)
    }

    /// The parent chain registered under `name`.
    pub fn parents_of(&self, name: &str) -> Option<&[String]> {
        self.parents.get(name).map(|p| p.as_slice())
    }

    pub fn register(&mut self, name: impl Into<String>, parents: Vec<String>) {
        self.parents.insert(name.into(), parents);
    }
}

/// A key counts as set when present and not `null`.
fn is_set(mapping: &Mapping, key: &str) -> bool {
    mapping.get(key).is_some_and(|v| !v.is_null())
}

/// Validate the raw definition `name` from the document at `path`.
///
/// Returns the definition's mapping on success. Performs no mutation.
pub fn validate<'a>(
    name: &str,
    config: &'a Value,
    path: &Path,
    context: &ResolutionContext,
) -> Result<&'a Mapping, RouteError> {
    let mapping = config
        .as_mapping()
        .ok_or_else(|| RouteError::MalformedDefinition {
            name: name.to_string(),
            path: path.to_path_buf(),
        })?;

    let extra_keys: Vec<String> = mapping
        .keys()
        .filter(|k| !k.as_str().is_some_and(|k| AVAILABLE_KEYS.contains(&k)))
        .map(key_to_string)
        .collect();
    if !extra_keys.is_empty() {
        return Err(RouteError::UnsupportedKey {
            name: name.to_string(),
            path: path.to_path_buf(),
            keys: extra_keys,
            allowed: AVAILABLE_KEYS,
        });
    }

    let has_resource = is_set(mapping, "resource");
    let has_path = is_set(mapping, "path");

    if has_resource && has_path {
        return Err(RouteError::AmbiguousDefinition {
            name: name.to_string(),
            path: path.to_path_buf(),
        });
    }
    if !has_resource && is_set(mapping, "type") {
        return Err(RouteError::InvalidTypeUsage {
            name: name.to_string(),
            path: path.to_path_buf(),
        });
    }
    if !has_resource && !has_path {
        return Err(RouteError::MissingTarget {
            name: name.to_string(),
            path: path.to_path_buf(),
        });
    }

    if let Some(parent) = mapping.get("parent").filter(|v| !v.is_null()) {
        let parent = key_to_string(parent);
        if !context.contains(&parent) {
            return Err(RouteError::UnknownParent {
                name: name.to_string(),
                parent,
                path: path.to_path_buf(),
            });
        }
    }

    Ok(mapping)
}

/// Render a YAML key for diagnostics and name lookups.
pub(crate) fn key_to_string(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "~".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

/// Attributes shared by routes and imports.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    pub host: Option<String>,
    pub schemes: Option<Vec<String>>,
    pub methods: Option<Vec<String>>,
    pub defaults: BTreeMap<String, Value>,
    pub requirements: BTreeMap<String, String>,
    pub options: BTreeMap<String, Value>,
    pub condition: Option<String>,
}

/// A definition that declares a single route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDefinition {
    pub name: String,
    pub path: String,
    pub attributes: Attributes,
}

/// A definition that imports routes from another resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDefinition {
    pub name: String,
    pub resource: String,
    pub resource_type: Option<String>,
    pub prefix: Option<String>,
    pub name_prefix: Option<String>,
    pub parent: Option<String>,
    pub attributes: Attributes,
}

/// A validated definition.
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Route(RouteDefinition),
    Import(ImportDefinition),
}

impl Definition {
    /// Convert a validated mapping into a typed definition.
    pub fn parse(name: &str, mapping: &Mapping, path: &Path) -> Result<Self, RouteError> {
        let reader = Reader {
            name,
            path,
            mapping,
        };
        let attributes = reader.attributes()?;

        match reader.string("resource")? {
            Some(resource) => Ok(Definition::Import(ImportDefinition {
                name: name.to_string(),
                resource,
                resource_type: reader.string("type")?,
                prefix: reader.string("prefix")?,
                name_prefix: reader.string("name_prefix")?,
                parent: reader.string("parent")?,
                attributes,
            })),
            None => {
                let route_path =
                    reader
                        .string("path")?
                        .ok_or_else(|| RouteError::MissingTarget {
                            name: name.to_string(),
                            path: path.to_path_buf(),
                        })?;
                Ok(Definition::Route(RouteDefinition {
                    name: name.to_string(),
                    path: route_path,
                    attributes,
                }))
            }
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Definition::Route(route) => &route.name,
            Definition::Import(import) => &import.name,
        }
    }
}

/// Typed accessors over a definition mapping.
struct Reader<'a> {
    name: &'a str,
    path: &'a Path,
    mapping: &'a Mapping,
}

impl Reader<'_> {
    fn get(&self, key: &str) -> Option<&Value> {
        self.mapping.get(key).filter(|v| !v.is_null())
    }

    fn invalid(&self, key: &'static str, expected: &'static str) -> RouteError {
        RouteError::InvalidAttribute {
            name: self.name.to_string(),
            key,
            path: self.path_buf(),
            expected,
        }
    }

    fn path_buf(&self) -> PathBuf {
        self.path.to_path_buf()
    }

    fn string(&self, key: &'static str) -> Result<Option<String>, RouteError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(self.invalid(key, "a string")),
        }
    }

    /// A single string or a list of strings.
    fn string_list(&self, key: &'static str) -> Result<Option<Vec<String>>, RouteError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(vec![s.clone()])),
            Some(Value::Sequence(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| self.invalid(key, "a string or a list of strings"))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            Some(_) => Err(self.invalid(key, "a string or a list of strings")),
        }
    }

    fn value_map(&self, key: &'static str) -> Result<BTreeMap<String, Value>, RouteError> {
        match self.get(key) {
            None => Ok(BTreeMap::new()),
            Some(Value::Mapping(map)) => Ok(map
                .iter()
                .map(|(k, v)| (key_to_string(k), v.clone()))
                .collect()),
            Some(_) => Err(self.invalid(key, "a mapping")),
        }
    }

    fn requirement_map(&self) -> Result<BTreeMap<String, String>, RouteError> {
        const KEY: &str = "requirements";
        const EXPECTED: &str = "a mapping of scalar patterns";

        let map = match self.get(KEY) {
            None => return Ok(BTreeMap::new()),
            Some(Value::Mapping(map)) => map,
            Some(_) => return Err(self.invalid(KEY, EXPECTED)),
        };

        let mut requirements = BTreeMap::new();
        for (k, v) in map {
            let key = key_to_string(k);
            let pattern = match v {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return Err(self.invalid(KEY, EXPECTED)),
            };
            let pattern =
                sanitize_requirement(&pattern).ok_or_else(|| RouteError::InvalidRequirement {
                    name: self.name.to_string(),
                    key: key.clone(),
                    path: self.path_buf(),
                })?;
            requirements.insert(key, pattern);
        }
        Ok(requirements)
    }

    fn attributes(&self) -> Result<Attributes, RouteError> {
        Ok(Attributes {
            host: self.string("host")?,
            schemes: self.string_list("schemes")?,
            methods: self.string_list("methods")?,
            defaults: self.value_map("defaults")?,
            requirements: self.requirement_map()?,
            options: self.value_map("options")?,
            condition: self.string("condition")?,
        })
    }
}
