//! Resource imports: the resource-loading seam and the merge of an imported
//! sub-collection into its parent.

use std::path::{Path, PathBuf};

use crate::definition::{ImportDefinition, ResolutionContext};
use crate::error::RouteError;
use crate::loader::YamlRouteLoader;
use crate::model::RouteCollection;

/// Everything a resource loader needs to load one import.
#[derive(Debug, Clone, Copy)]
pub struct ImportRequest<'a> {
    /// Resource identifier as written in the document.
    pub resource: &'a str,
    /// The `type` tag of the import, if any.
    pub resource_type: Option<&'a str>,
    /// Parent chain inherited through `parent`.
    pub parents: &'a [String],
    pub prefix: Option<&'a str>,
    pub name_prefix: Option<&'a str>,
    /// Directory of the importing document.
    pub base_dir: &'a Path,
    /// Documents currently being loaded, outermost first.
    pub(crate) chain: &'a [PathBuf],
}

impl<'a> ImportRequest<'a> {
    /// A request for a top-level resource, with no inherited state.
    pub fn new(resource: &'a str, base_dir: &'a Path) -> Self {
        Self {
            resource,
            resource_type: None,
            parents: &[],
            prefix: None,
            name_prefix: None,
            base_dir,
            chain: &[],
        }
    }

    /// The same request for another resource. The import chain is kept so
    /// circular imports are still detected.
    pub fn with_resource<'b>(&self, resource: &'b str) -> ImportRequest<'b>
    where
        'a: 'b,
    {
        ImportRequest {
            resource,
            resource_type: self.resource_type,
            parents: self.parents,
            prefix: self.prefix,
            name_prefix: self.name_prefix,
            base_dir: self.base_dir,
            chain: self.chain,
        }
    }

    pub fn chain(&self) -> &[PathBuf] {
        self.chain
    }
}

/// What a resource loader produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportedCollection {
    /// Plain routes. Prefix, name prefix and inherited attributes are applied
    /// by the importing document.
    Flat(RouteCollection),
    /// Routes of a hierarchy-aware resource. The loader already applied the
    /// parent chain, prefix and name prefix; `singular_name` extends the
    /// chain for child imports.
    Resource {
        collection: RouteCollection,
        singular_name: String,
    },
}

impl ImportedCollection {
    pub fn collection(&self) -> &RouteCollection {
        match self {
            ImportedCollection::Flat(collection) => collection,
            ImportedCollection::Resource { collection, .. } => collection,
        }
    }

    pub fn singular_name(&self) -> Option<&str> {
        match self {
            ImportedCollection::Flat(_) => None,
            ImportedCollection::Resource { singular_name, .. } => Some(singular_name),
        }
    }
}

/// Loads routes for imported resources.
///
/// Registered loaders are consulted in order; the first one whose
/// [`supports`](ResourceLoader::supports) returns true handles the import.
pub trait ResourceLoader: Send + Sync {
    fn supports(&self, resource: &str, resource_type: Option<&str>) -> bool;

    /// Load the resource. `loader` is the calling document loader and can be
    /// used to load nested routing documents.
    fn load(
        &self,
        loader: &YamlRouteLoader,
        request: &ImportRequest<'_>,
    ) -> Result<ImportedCollection, RouteError>;
}

/// Apply an import's inherited state to the collection it produced.
///
/// Hierarchy-aware results register their parent chain under the import's
/// name in `context`.
pub fn merge_import(
    import: &ImportDefinition,
    imported: ImportedCollection,
    mut parents: Vec<String>,
    context: &mut ResolutionContext,
) -> RouteCollection {
    let (mut collection, prefix, name_prefix) = match imported {
        ImportedCollection::Resource {
            collection,
            singular_name,
        } => {
            let segment = match import.prefix.as_deref().filter(|p| !p.is_empty()) {
                Some(prefix) => format!("{prefix}/{singular_name}"),
                None => singular_name,
            };
            parents.push(segment);
            context.register(import.name.clone(), parents);
            (collection, None, None)
        }
        ImportedCollection::Flat(collection) => (
            collection,
            import.prefix.as_deref(),
            import.name_prefix.as_deref(),
        ),
    };

    if let Some(prefix) = prefix {
        collection.add_prefix(prefix);
    }

    let attributes = &import.attributes;
    if let Some(host) = &attributes.host {
        collection.set_host(host);
    }
    if let Some(condition) = &attributes.condition {
        collection.set_condition(condition);
    }
    if let Some(schemes) = &attributes.schemes {
        collection.set_schemes(schemes);
    }
    if let Some(methods) = &attributes.methods {
        collection.set_methods(methods);
    }
    collection.add_defaults(&attributes.defaults);
    collection.add_requirements(&attributes.requirements);
    collection.add_options(&attributes.options);

    if let Some(name_prefix) = name_prefix {
        collection.add_name_prefix(name_prefix);
    }

    collection
}
