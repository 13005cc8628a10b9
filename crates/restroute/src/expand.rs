//! Route expansion: turns a route definition into a [`Route`], applying
//! format negotiation.

use serde_yaml::Value;

use crate::config::FormatOptions;
use crate::definition::{Attributes, RouteDefinition};
use crate::model::Route;

/// Placeholder carrying the negotiated format.
pub const FORMAT_PLACEHOLDER: &str = "{_format}";

/// Name of the format parameter in defaults and requirements.
pub const FORMAT_PARAM: &str = "_format";

/// Build the route for `definition`.
pub fn expand_route(definition: &RouteDefinition, format: &FormatOptions) -> Route {
    let mut path = definition.path.clone();
    let mut attributes = definition.attributes.clone();

    if format.include_format {
        if !path.contains(FORMAT_PLACEHOLDER) {
            path.push('.');
            path.push_str(FORMAT_PLACEHOLDER);
        }

        if !attributes.requirements.contains_key(FORMAT_PARAM) {
            if let Some(requirement) = format.requirement() {
                attributes
                    .requirements
                    .insert(FORMAT_PARAM.to_string(), requirement);
            }
        }
    }

    if let Some(default_format) = &format.default_format {
        attributes.defaults.insert(
            FORMAT_PARAM.to_string(),
            Value::String(default_format.clone()),
        );
    }

    build_route(&path, attributes)
}

/// Standard route construction from a path and attribute set.
pub fn build_route(path: &str, attributes: Attributes) -> Route {
    let mut route = Route::new(path);
    route.host = attributes.host;
    if let Some(schemes) = attributes.schemes {
        route.set_schemes(schemes);
    }
    if let Some(methods) = attributes.methods {
        route.set_methods(methods);
    }
    route.defaults = attributes.defaults;
    route.requirements = attributes.requirements;
    route.options = attributes.options;
    route.condition = attributes.condition;
    route
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(path: &str) -> RouteDefinition {
        RouteDefinition {
            name: "items".to_string(),
            path: path.to_string(),
            attributes: Attributes {
                methods: Some(vec!["GET".to_string()]),
                ..Attributes::default()
            },
        }
    }

    #[test]
    fn appends_format_and_requirement() {
        let format = FormatOptions::new().with_formats(["json", "xml"]);
        let route = expand_route(&definition("/items"), &format);
        assert_eq!(route.path, "/items.{_format}");
        assert_eq!(route.requirement("_format"), Some("json|xml"));
        assert_eq!(route.methods, vec!["GET"]);
        assert!(route.default_value("_format").is_none());
    }

    #[test]
    fn keeps_existing_placeholder() {
        let format = FormatOptions::new().with_formats(["json"]);
        let route = expand_route(&definition("/items/{_format}/list"), &format);
        assert_eq!(route.path, "/items/{_format}/list");
        assert_eq!(route.requirement("_format"), Some("json"));
    }

    #[test]
    fn explicit_requirement_wins() {
        let mut def = definition("/items");
        def.attributes
            .requirements
            .insert("_format".to_string(), "html".to_string());
        let format = FormatOptions::new().with_formats(["json", "xml"]);
        let route = expand_route(&def, &format);
        assert_eq!(route.requirement("_format"), Some("html"));
    }

    #[test]
    fn no_requirement_without_formats() {
        let route = expand_route(&definition("/items"), &FormatOptions::default());
        assert_eq!(route.path, "/items.{_format}");
        assert!(route.requirements.is_empty());
    }

    #[test]
    fn include_format_disabled() {
        let format = FormatOptions::new()
            .with_include_format(false)
            .with_formats(["json", "xml"]);
        let route = expand_route(&definition("/items"), &format);
        assert_eq!(route.path, "/items");
        assert!(route.requirements.is_empty());
    }

    #[test]
    fn default_format_overrides_explicit_default() {
        let mut def = definition("/items");
        def.attributes
            .defaults
            .insert("_format".to_string(), Value::String("xml".to_string()));
        let format = FormatOptions::new()
            .with_include_format(false)
            .with_default_format("json");
        let route = expand_route(&def, &format);
        assert_eq!(
            route.default_value("_format"),
            Some(&Value::String("json".to_string()))
        );
    }

    #[test]
    fn build_route_applies_attributes() {
        let attributes = Attributes {
            host: Some("api.example.com".to_string()),
            schemes: Some(vec!["HTTPS".to_string()]),
            methods: Some(vec!["get".to_string(), "head".to_string()]),
            condition: Some("context.getMethod() in ['GET']".to_string()),
            ..Attributes::default()
        };
        let route = build_route("users", attributes);
        assert_eq!(route.path, "/users");
        assert_eq!(route.host.as_deref(), Some("api.example.com"));
        assert_eq!(route.schemes, vec!["https"]);
        assert_eq!(route.methods, vec!["GET", "HEAD"]);
        assert!(route.condition.is_some());
    }
}
