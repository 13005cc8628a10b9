//! REST route definition loader.
//!
//! Reads hierarchical YAML routing documents, validates every definition,
//! expands routes with format negotiation, resolves nested imports and
//! returns a flat, ordered [`RouteCollection`].
//!
//! ```ignore
//! use restroute::{FormatOptions, FsLocator, YamlRouteLoader};
//!
//! let loader = YamlRouteLoader::new(
//!     FsLocator::with_paths(["config/routes"]),
//!     FormatOptions::new().with_formats(["json", "xml"]),
//! );
//! let routes = loader.load("routing.yml")?;
//! ```

pub mod config;
pub mod definition;
pub mod error;
pub mod expand;
pub mod import;
pub mod loader;
pub mod locator;
pub mod model;

pub use config::{FormatOptions, LoaderConfig};
pub use definition::{Definition, ResolutionContext, AVAILABLE_KEYS};
pub use error::RouteError;
pub use import::{ImportRequest, ImportedCollection, ResourceLoader};
pub use loader::{YamlRouteLoader, REST_TYPE};
pub use locator::{FileLocator, FsLocator};
pub use model::{Route, RouteCollection};
