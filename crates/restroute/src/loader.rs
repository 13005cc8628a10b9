//! Top-level routing document loader.

use std::path::{Path, PathBuf};

use restroute_telemetry::{log_document_loaded, log_import_resolved, log_route_overridden};
use serde_yaml::Value;

use crate::config::{FormatOptions, LoaderConfig};
use crate::definition::{key_to_string, validate, Definition, ImportDefinition, ResolutionContext};
use crate::error::RouteError;
use crate::expand::expand_route;
use crate::import::{merge_import, ImportRequest, ImportedCollection, ResourceLoader};
use crate::locator::{FileLocator, FsLocator};
use crate::model::RouteCollection;

/// Type tag accepted by [`YamlRouteLoader::supports`].
pub const REST_TYPE: &str = "rest";

/// Extensions of routing documents.
const YAML_EXTENSIONS: &[&str] = &["yml", "yaml"];

/// Loads REST routing documents into a flat [`RouteCollection`].
///
/// The loader holds no per-load state and may be reused.
pub struct YamlRouteLoader {
    locator: Box<dyn FileLocator>,
    format: FormatOptions,
    resource_loaders: Vec<Box<dyn ResourceLoader>>,
}

impl YamlRouteLoader {
    pub fn new(locator: impl FileLocator + 'static, format: FormatOptions) -> Self {
        Self {
            locator: Box::new(locator),
            format,
            resource_loaders: Vec::new(),
        }
    }

    /// Build a filesystem-backed loader from a config.
    pub fn from_config(config: &LoaderConfig) -> Self {
        Self::new(
            FsLocator::with_paths(config.paths.iter().cloned()),
            config.format.clone(),
        )
    }

    /// Register a loader for imported resources. Earlier registrations win.
    pub fn with_resource_loader(mut self, loader: impl ResourceLoader + 'static) -> Self {
        self.resource_loaders.push(Box::new(loader));
        self
    }

    pub fn format(&self) -> &FormatOptions {
        &self.format
    }

    /// Whether this loader handles `resource` with the given type tag.
    pub fn supports(&self, resource: &str, resource_type: Option<&str>) -> bool {
        is_yaml(resource) && resource_type == Some(REST_TYPE)
    }

    /// Load the document identified by `file`.
    pub fn load(&self, file: &str) -> Result<RouteCollection, RouteError> {
        self.load_document(file, None, &[])
    }

    /// Load a routing document on behalf of an import.
    ///
    /// `request.resource` is located relative to `request.base_dir`.
    pub fn load_nested(&self, request: &ImportRequest<'_>) -> Result<RouteCollection, RouteError> {
        self.load_document(request.resource, Some(request.base_dir), request.chain)
    }

    /// Load a document from in-memory content. `path` is used for
    /// diagnostics, as the dependency marker, and to resolve relative imports.
    pub fn load_str(&self, content: &str, path: &Path) -> Result<RouteCollection, RouteError> {
        self.parse_document(content, path, &[])
    }

    fn load_document(
        &self,
        file: &str,
        current_dir: Option<&Path>,
        chain: &[PathBuf],
    ) -> Result<RouteCollection, RouteError> {
        let located = self.locator.locate(file, current_dir)?;
        let path = std::fs::canonicalize(&located).map_err(|source| RouteError::Io {
            path: located.clone(),
            source,
        })?;

        if chain.contains(&path) {
            let mut cycle = chain.to_vec();
            cycle.push(path);
            return Err(RouteError::CircularImport { chain: cycle });
        }

        let content = std::fs::read_to_string(&path).map_err(|source| RouteError::Io {
            path: path.clone(),
            source,
        })?;

        self.parse_document(&content, &path, chain)
    }

    fn parse_document(
        &self,
        content: &str,
        path: &Path,
        chain: &[PathBuf],
    ) -> Result<RouteCollection, RouteError> {
        let root: Value = if is_blank_document(content) {
            Value::Null
        } else {
            serde_yaml::from_str(content).map_err(|source| RouteError::DocumentParseError {
                path: path.to_path_buf(),
                source,
            })?
        };

        let mut collection = RouteCollection::new();
        collection.add_resource(path);

        let definitions = match root {
            Value::Null => {
                tracing::debug!(path = %path.display(), "empty routing document");
                return Ok(collection);
            }
            Value::Mapping(definitions) => definitions,
            _ => {
                return Err(RouteError::InvalidDocumentShape {
                    path: path.to_path_buf(),
                })
            }
        };

        let mut chain = chain.to_vec();
        chain.push(path.to_path_buf());
        let mut context = ResolutionContext::new();

        for (key, config) in &definitions {
            let name = match key {
                Value::String(_) | Value::Number(_) | Value::Bool(_) => key_to_string(key),
                _ => {
                    return Err(RouteError::InvalidDocumentShape {
                        path: path.to_path_buf(),
                    })
                }
            };

            let mapping = validate(&name, config, path, &context)?;

            match Definition::parse(&name, mapping, path)? {
                Definition::Import(import) => {
                    let sub = self.resolve_import(&import, path, &chain, &mut context)?;
                    log_import_resolved!(
                        path = %path.display(),
                        definition = %name,
                        resource = %import.resource,
                        routes = sub.len()
                    );
                    for overridden in collection.add_collection(sub) {
                        log_route_overridden!(path = %path.display(), route = %overridden);
                    }
                }
                Definition::Route(route) => {
                    tracing::trace!(definition = %name, path = %route.path, "expanding route");
                    if collection.add(name.clone(), expand_route(&route, &self.format)).is_some() {
                        log_route_overridden!(path = %path.display(), route = %name);
                    }
                }
            }
        }

        log_document_loaded!(path = %path.display(), routes = collection.len());
        Ok(collection)
    }

    fn resolve_import(
        &self,
        import: &ImportDefinition,
        path: &Path,
        chain: &[PathBuf],
        context: &mut ResolutionContext,
    ) -> Result<RouteCollection, RouteError> {
        let parents: Vec<String> = import
            .parent
            .as_deref()
            .and_then(|parent| context.parents_of(parent))
            .map(<[String]>::to_vec)
            .unwrap_or_default();

        let request = ImportRequest {
            resource: &import.resource,
            resource_type: import.resource_type.as_deref(),
            parents: &parents,
            prefix: import.prefix.as_deref(),
            name_prefix: import.name_prefix.as_deref(),
            base_dir: path.parent().unwrap_or_else(|| Path::new("")),
            chain,
        };

        let imported =
            self.import_resource(&request)
                .map_err(|source| RouteError::ImportResolutionFailed {
                    name: import.name.clone(),
                    path: path.to_path_buf(),
                    resource: import.resource.clone(),
                    source: Box::new(source),
                })?;

        Ok(merge_import(import, imported, parents, context))
    }

    fn import_resource(
        &self,
        request: &ImportRequest<'_>,
    ) -> Result<ImportedCollection, RouteError> {
        if let Some(loader) = self
            .resource_loaders
            .iter()
            .find(|l| l.supports(request.resource, request.resource_type))
        {
            return loader.load(self, request);
        }

        let own_type = matches!(request.resource_type, None | Some(REST_TYPE));
        if own_type && is_yaml(request.resource) {
            return self.load_nested(request).map(ImportedCollection::Flat);
        }

        Err(RouteError::UnsupportedResource {
            resource: request.resource.to_string(),
            resource_type: request.resource_type.map(str::to_string),
        })
    }
}

impl std::fmt::Debug for YamlRouteLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YamlRouteLoader")
            .field("format", &self.format)
            .field("resource_loaders", &self.resource_loaders.len())
            .finish()
    }
}

/// Only whitespace, comments and document markers.
fn is_blank_document(content: &str) -> bool {
    content.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}

fn is_yaml(resource: &str) -> bool {
    Path::new(resource)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| YAML_EXTENSIONS.contains(&ext))
}
