use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_yaml::Value;

/// A fully-resolved route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    /// The path template (e.g. "/users/{id}.{_format}").
    pub path: String,
    /// Host pattern the route is restricted to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Allowed schemes (lowercase).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub schemes: Vec<String>,
    /// Allowed HTTP methods (uppercase). Empty means any method.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,
    /// Default values for placeholders and extra attributes.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub defaults: BTreeMap<String, Value>,
    /// Placeholder patterns, without `^`/`$` anchors.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub requirements: BTreeMap<String, String>,
    /// Free-form options.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, Value>,
    /// Guard condition expression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl Route {
    /// Create a route for the given path with no other attributes.
    pub fn new(path: &str) -> Self {
        Self {
            path: normalize_path(path),
            host: None,
            schemes: Vec::new(),
            methods: Vec::new(),
            defaults: BTreeMap::new(),
            requirements: BTreeMap::new(),
            options: BTreeMap::new(),
            condition: None,
        }
    }

    pub fn set_path(&mut self, path: &str) {
        self.path = normalize_path(path);
    }

    /// Replace the allowed schemes, lowercasing and de-duplicating them.
    pub fn set_schemes<I, S>(&mut self, schemes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.schemes = dedup(schemes.into_iter().map(|s| s.as_ref().to_lowercase()));
    }

    /// Replace the allowed methods, uppercasing and de-duplicating them.
    pub fn set_methods<I, S>(&mut self, methods: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.methods = dedup(methods.into_iter().map(|m| m.as_ref().to_uppercase()));
    }

    /// Whether the route accepts the given scheme (any scheme when none are set).
    pub fn has_scheme(&self, scheme: &str) -> bool {
        self.schemes.is_empty() || self.schemes.iter().any(|s| s.eq_ignore_ascii_case(scheme))
    }

    pub fn default_value(&self, key: &str) -> Option<&Value> {
        self.defaults.get(key)
    }

    pub fn requirement(&self, key: &str) -> Option<&str> {
        self.requirements.get(key).map(|s| s.as_str())
    }

    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }
}

/// Normalize a path template to a single leading slash.
fn normalize_path(path: &str) -> String {
    format!("/{}", path.trim().trim_start_matches('/'))
}

fn dedup(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// Strip a single leading `^` and trailing `$` from a requirement pattern.
///
/// Returns `None` when nothing is left.
pub fn sanitize_requirement(pattern: &str) -> Option<String> {
    let pattern = pattern.strip_prefix('^').unwrap_or(pattern);
    let pattern = pattern.strip_suffix('$').unwrap_or(pattern);
    if pattern.is_empty() {
        None
    } else {
        Some(pattern.to_string())
    }
}

/// An ordered collection of named routes.
///
/// Insertion order is significant: it is the order in which routes are
/// matched. Names are unique; adding a route under an existing name
/// replaces it and moves the name to the end.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteCollection {
    routes: Vec<(String, Route)>,
    /// Name to position in `routes`.
    index: HashMap<String, usize>,
    resources: Vec<PathBuf>,
}

impl RouteCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route, returning the route previously registered under `name`.
    pub fn add(&mut self, name: impl Into<String>, route: Route) -> Option<Route> {
        let name = name.into();
        let previous = self.remove(&name);
        self.index.insert(name.clone(), self.routes.len());
        self.routes.push((name, route));
        previous
    }

    pub fn remove(&mut self, name: &str) -> Option<Route> {
        let position = self.index.remove(name)?;
        let (_, route) = self.routes.remove(position);
        for (offset, (n, _)) in self.routes[position..].iter().enumerate() {
            if let Some(slot) = self.index.get_mut(n) {
                *slot = position + offset;
            }
        }
        Some(route)
    }

    pub fn get(&self, name: &str) -> Option<&Route> {
        self.index
            .get(name)
            .and_then(|&position| self.routes.get(position))
            .map(|(_, r)| r)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Iterate over `(name, route)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Route)> {
        self.routes.iter().map(|(n, r)| (n.as_str(), r))
    }

    pub fn names(&self) -> Vec<&str> {
        self.routes.iter().map(|(n, _)| n.as_str()).collect()
    }

    fn routes_mut(&mut self) -> impl Iterator<Item = &mut Route> {
        self.routes.iter_mut().map(|(_, r)| r)
    }

    /// Source files this collection was built from.
    pub fn resources(&self) -> &[PathBuf] {
        &self.resources
    }

    /// Record a source file dependency (ignored if already present).
    pub fn add_resource(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        if !self.resources.iter().any(|p| p == path) {
            self.resources.push(path.to_path_buf());
        }
    }

    /// Splice another collection into this one.
    ///
    /// Returns the names of routes that replaced an existing entry.
    pub fn add_collection(&mut self, other: RouteCollection) -> Vec<String> {
        let mut overridden = Vec::new();
        for (name, route) in other.routes {
            if self.add(name.clone(), route).is_some() {
                overridden.push(name);
            }
        }
        for resource in other.resources {
            self.add_resource(resource);
        }
        overridden
    }

    /// Prefix every route path. Slashes around the prefix are normalized.
    pub fn add_prefix(&mut self, prefix: &str) {
        let prefix = prefix.trim().trim_matches('/');
        if prefix.is_empty() {
            return;
        }
        for route in self.routes_mut() {
            let path = format!("/{}{}", prefix, route.path);
            route.set_path(&path);
        }
    }

    /// Prefix every route name, keeping iteration order.
    ///
    /// A blank prefix leaves the collection unchanged.
    pub fn add_name_prefix(&mut self, prefix: &str) {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return;
        }
        for (name, _) in self.routes.iter_mut() {
            name.insert_str(0, prefix);
        }
        self.index = self
            .routes
            .iter()
            .enumerate()
            .map(|(position, (name, _))| (name.clone(), position))
            .collect();
    }

    pub fn set_host(&mut self, host: &str) {
        for route in self.routes_mut() {
            route.host = Some(host.to_string());
        }
    }

    pub fn set_condition(&mut self, condition: &str) {
        for route in self.routes_mut() {
            route.condition = Some(condition.to_string());
        }
    }

    pub fn set_schemes(&mut self, schemes: &[String]) {
        for route in self.routes_mut() {
            route.set_schemes(schemes);
        }
    }

    pub fn set_methods(&mut self, methods: &[String]) {
        for route in self.routes_mut() {
            route.set_methods(methods);
        }
    }

    /// Add defaults to every route. Values already set on a route win.
    pub fn add_defaults(&mut self, defaults: &BTreeMap<String, Value>) {
        for route in self.routes_mut() {
            fill_absent(&mut route.defaults, defaults);
        }
    }

    /// Add requirements to every route. Patterns already set on a route win.
    pub fn add_requirements(&mut self, requirements: &BTreeMap<String, String>) {
        for route in self.routes_mut() {
            fill_absent(&mut route.requirements, requirements);
        }
    }

    /// Add options to every route. Values already set on a route win.
    pub fn add_options(&mut self, options: &BTreeMap<String, Value>) {
        for route in self.routes_mut() {
            fill_absent(&mut route.options, options);
        }
    }
}

fn fill_absent<V: Clone>(target: &mut BTreeMap<String, V>, source: &BTreeMap<String, V>) {
    for (key, value) in source {
        target
            .entry(key.clone())
            .or_insert_with(|| value.clone());
    }
}

impl<'a> IntoIterator for &'a RouteCollection {
    type Item = (&'a str, &'a Route);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a Route)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// Serializes as an ordered map of route name to route.
impl Serialize for RouteCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.routes.len()))?;
        for (name, route) in &self.routes {
            map.serialize_entry(name, route)?;
        }
        map.end()
    }
}
