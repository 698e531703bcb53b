//! Compiled prompt templates keyed by name
//!
//! Every template is compiled once when it is registered. Rendering only ever
//! sees a single input value, `query`, so templates may reference nothing else.

use minijinja::{context, AutoEscape, Environment, Template, UndefinedBehavior};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{TemplateError, TemplateResult};

/// Name of the synthetic template created when nothing else is available
pub const DEFAULT_TEMPLATE_NAME: &str = "default";

/// Source of the synthetic default template
pub const DEFAULT_TEMPLATE_SOURCE: &str = "{{ query }} Default template response.";

/// Registry of named, precompiled prompt templates
///
/// Built once at startup and read-only afterwards, so it can be shared
/// across concurrent requests behind an `Arc`.
pub struct TemplateRegistry {
    env: Environment<'static>,
    names: BTreeSet<String>,
}

impl TemplateRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        // Prompts are plain text; the query must come through untouched.
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_keep_trailing_newline(true);

        Self {
            env,
            names: BTreeSet::new(),
        }
    }

    /// Build a registry from `(name, source)` pairs
    ///
    /// Sources that fail to compile are logged and skipped.
    pub fn from_sources<I, N, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = (N, S)>,
        N: Into<String>,
        S: Into<String>,
    {
        let mut registry = Self::new();
        for (name, source) in sources {
            let name = name.into();
            if let Err(e) = registry.register(name.clone(), source) {
                tracing::warn!("Skipping template '{}': {}", name, e);
            }
        }
        registry
    }

    /// Compile and register a template under `name`
    ///
    /// Registering an existing name replaces the previous template.
    pub fn register(&mut self, name: impl Into<String>, source: impl Into<String>) -> TemplateResult<()> {
        let name = name.into();
        let source: String = source.into();
        self.env
            .add_template_owned(name.clone(), source)
            .map_err(|e| TemplateError::Parse {
                template: name.clone(),
                reason: e.to_string(),
            })?;
        self.names.insert(name);
        Ok(())
    }

    /// Register the synthetic default template
    pub fn register_default(&mut self) -> TemplateResult<()> {
        self.register(DEFAULT_TEMPLATE_NAME, DEFAULT_TEMPLATE_SOURCE)
    }

    /// Look up a compiled template by name
    pub fn lookup(&self, name: &str) -> Option<PromptTemplate<'_>> {
        if !self.names.contains(name) {
            return None;
        }
        self.env
            .get_template(name)
            .ok()
            .map(|inner| PromptTemplate { inner })
    }

    /// Whether a template with this name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Registered template names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TemplateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateRegistry")
            .field("names", &self.names)
            .finish()
    }
}

/// A compiled template borrowed from a [`TemplateRegistry`]
pub struct PromptTemplate<'a> {
    inner: Template<'a, 'a>,
}

impl PromptTemplate<'_> {
    /// Template name
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Render the prompt for a single query
    pub fn render(&self, query: &str) -> TemplateResult<String> {
        render(self, query)
    }
}

/// Render `template` with `query` as its only input value
///
/// Fails with [`TemplateError::Render`] when the template references anything
/// other than `query` or hits a formatting fault.
pub fn render(template: &PromptTemplate<'_>, query: &str) -> TemplateResult<String> {
    template
        .inner
        .render(context! { query => query })
        .map_err(|e| TemplateError::Render {
            template: template.name().to_string(),
            reason: e.to_string(),
        })
}
