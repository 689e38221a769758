//! Template interpolation for pager configs
//!
//! Handles `{{ variable }}` interpolation in header values and URLs, so
//! secrets can stay out of config files. Two roots are supported:
//! `{{ env.NAME }}` reads the process environment and `{{ vars.name }}`
//! reads caller-supplied variables (e.g. `--var name=value` on the CLI).

use crate::error::{Error, Result};
use crate::types::StringMap;
use regex::Regex;
use std::sync::LazyLock;

/// Regex for matching template variables: {{ root.name }}
static TEMPLATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*)\.([a-zA-Z_][a-zA-Z0-9_]*)\s*\}\}")
        .expect("template regex is valid")
});

/// Context for template interpolation
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    /// Caller-supplied variables
    pub vars: StringMap,
    /// Whether `env.*` lookups are allowed
    pub allow_env: bool,
}

impl TemplateContext {
    /// Create a context that resolves `env.*` from the process environment
    pub fn new() -> Self {
        Self {
            vars: StringMap::new(),
            allow_env: true,
        }
    }

    /// Add a variable
    #[must_use]
    pub fn var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Disable `env.*` lookups
    #[must_use]
    pub fn without_env(mut self) -> Self {
        self.allow_env = false;
        self
    }

    /// Look up `root.name`
    pub fn get(&self, root: &str, name: &str) -> Option<String> {
        match root {
            "env" if self.allow_env => std::env::var(name).ok(),
            "vars" => self.vars.get(name).cloned(),
            _ => None,
        }
    }
}

/// Render a template string with the given context
pub fn render(template: &str, ctx: &TemplateContext) -> Result<String> {
    let mut missing = Vec::new();

    let rendered = TEMPLATE_REGEX.replace_all(template, |caps: &regex::Captures<'_>| {
        let root = &caps[1];
        let name = &caps[2];
        if let Some(value) = ctx.get(root, name) {
            value
        } else {
            missing.push(format!("{root}.{name}"));
            String::new()
        }
    });

    if let Some(variable) = missing.into_iter().next() {
        return Err(Error::config(format!(
            "Undefined variable in template: {variable}"
        )));
    }

    Ok(rendered.into_owned())
}

/// Check whether a string contains any template expressions
pub fn has_template(value: &str) -> bool {
    TEMPLATE_REGEX.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_vars() {
        let ctx = TemplateContext::new().var("token", "abc123");
        let result = render("Bearer {{ vars.token }}", &ctx).unwrap();
        assert_eq!(result, "Bearer abc123");
    }

    #[test]
    fn test_render_without_spaces() {
        let ctx = TemplateContext::new().var("host", "api.example.com");
        let result = render("https://{{vars.host}}/v1", &ctx).unwrap();
        assert_eq!(result, "https://api.example.com/v1");
    }

    #[test]
    fn test_render_env() {
        let ctx = TemplateContext::new();
        let path = std::env::var("PATH").unwrap_or_default();
        let result = render("{{ env.PATH }}", &ctx);
        if path.is_empty() {
            assert!(result.is_err());
        } else {
            assert_eq!(result.unwrap(), path);
        }
    }

    #[test]
    fn test_render_env_disabled() {
        let ctx = TemplateContext::new().without_env();
        let err = render("{{ env.PATH }}", &ctx).unwrap_err();
        assert!(err.to_string().contains("env.PATH"));
    }

    #[test]
    fn test_render_missing_var() {
        let ctx = TemplateContext::new();
        let err = render("Bearer {{ vars.missing }}", &ctx).unwrap_err();
        assert!(err.to_string().contains("vars.missing"));
    }

    #[test]
    fn test_render_plain_string() {
        let ctx = TemplateContext::new();
        assert_eq!(render("no templates here", &ctx).unwrap(), "no templates here");
        assert!(!has_template("no templates here"));
        assert!(has_template("{{ vars.x }}"));
    }
}
