//! Template registry and include resolution.
//!
//! Composition starts from the requested view and pulls every template it
//! references, directly or transitively, from the includes collaborator.
//! Resolution runs as a fixed-point loop: scan all registered trees for a
//! reference that is not registered yet, load and register it, then start the
//! scan over. A name is checked against the registry before anything is
//! fetched, so self references and cycles end as soon as every name in them
//! is known, and no include is fetched twice.

use std::collections::HashMap;
use std::io;

use crate::fs::FileSystem;

use super::ast::Node;
use super::render::{environment, render};
use super::syntax::parse;
use super::types::{RenderContext, TemplateError, TemplateResult, ROOT_TEMPLATE};

#[derive(Debug)]
struct Entry {
    name: String,
    source: String,
    tree: Node,
}

/// Parsed templates of one request, indexed by name
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    templates: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and register `source` under `name`. Returns `false` (and keeps
    /// the existing template) when the name is already registered.
    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<String>) -> TemplateResult<bool> {
        let name = name.into();
        if self.contains(&name) {
            return Ok(false);
        }
        let source = source.into();
        let tree = parse(&name, &source)?;
        self.push(name, source, tree);
        Ok(true)
    }

    fn push(&mut self, name: String, source: String, tree: Node) {
        self.index.insert(name.clone(), self.templates.len());
        self.templates.push(Entry { name, source, tree });
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.index.get(name).map(|&i| &self.templates[i].tree)
    }

    /// Registered names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.iter().map(|entry| entry.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// One full pass over every registered tree; the first referenced name
    /// that is not registered yet, and whether every reference to it
    /// tolerates its absence.
    fn first_unresolved(&self) -> Option<(String, bool)> {
        let name = self.templates.iter().find_map(|entry| {
            entry
                .tree
                .references()
                .into_iter()
                .find(|r| !self.contains(&r.name))
                .map(|r| r.name.clone())
        })?;

        let optional = self
            .templates
            .iter()
            .flat_map(|entry| entry.tree.references())
            .filter(|r| r.name == name)
            .all(|r| r.ignore_missing);

        Some((name, optional))
    }

    /// Load every template reachable from the registered ones.
    ///
    /// Returns how many includes were loaded. An include that is missing but
    /// only ever referenced with `ignore missing` is registered empty.
    pub async fn resolve_includes(&mut self, includes: &dyn FileSystem) -> TemplateResult<usize> {
        let mut loaded = 0;

        while let Some((name, optional)) = self.first_unresolved() {
            match load_include(includes, &name).await {
                Ok(source) => {
                    let tree = parse(&name, &source)?;
                    tracing::trace!(template = %name, "Include registered");
                    self.push(name, source, tree);
                    loaded += 1;
                }
                Err(TemplateError::MissingInclude { .. }) if optional => {
                    tracing::trace!(template = %name, "Optional include missing");
                    self.push(name, String::new(), Node::Sequence(Vec::new()));
                }
                Err(err) => return Err(err),
            }
        }

        Ok(loaded)
    }

    /// Render the registered template `name` against `ctx`.
    pub fn execute(&self, name: &str, ctx: &RenderContext) -> TemplateResult<String> {
        let env = environment(
            self.templates
                .iter()
                .map(|entry| (entry.name.as_str(), entry.source.as_str())),
        )?;
        render(&env, name, ctx)
    }
}

async fn load_include(includes: &dyn FileSystem, name: &str) -> TemplateResult<String> {
    let missing = |source: io::Error| TemplateError::MissingInclude {
        name: name.to_string(),
        source,
    };

    let file = includes.open(name).await.map_err(missing)?;
    if file.meta.is_dir {
        return Err(missing(io::Error::new(io::ErrorKind::InvalidInput, "is a directory")));
    }
    file.read_to_string().await.map_err(missing)
}

/// Parse `root_source` as the page template and resolve everything it needs.
pub async fn compose(root_source: &str, includes: &dyn FileSystem) -> TemplateResult<TemplateRegistry> {
    let mut registry = TemplateRegistry::new();
    registry.insert(ROOT_TEMPLATE, root_source)?;

    let loaded = registry.resolve_includes(includes).await?;
    tracing::debug!(includes = loaded, "Template composed");

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFileSystem;

    fn sorted_names(registry: &TemplateRegistry) -> Vec<String> {
        let mut names: Vec<String> = registry.names().map(str::to_string).collect();
        names.sort();
        names
    }

    #[test]
    fn test_insert_is_first_wins() {
        let mut registry = TemplateRegistry::new();
        assert!(registry.insert("a", "one").unwrap());
        assert!(!registry.insert("a", "two").unwrap());
        assert_eq!(registry.get("a"), Some(&Node::Sequence(vec![Node::Text("one".to_string())])));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.execute("a", &RenderContext::default()).unwrap(), "one");
    }

    #[tokio::test]
    async fn test_compose_transitive_includes() {
        let includes = MemoryFileSystem::new()
            .with_file("header.html", r#"<h1>{% include "title.html" %}</h1>"#)
            .with_file("title.html", "Notes")
            .with_file("unused.html", "never loaded");

        let registry = compose(r#"{% include "header.html" %}body"#, &includes)
            .await
            .unwrap();

        assert_eq!(
            sorted_names(&registry),
            vec!["__page__", "header.html", "title.html"]
        );
        assert_eq!(includes.open_count("unused.html"), 0);
        assert_eq!(
            registry.execute(ROOT_TEMPLATE, &RenderContext::default()).unwrap(),
            "<h1>Notes</h1>body"
        );
    }

    #[tokio::test]
    async fn test_compose_references_in_all_branches() {
        let includes = MemoryFileSystem::new()
            .with_file("a", "")
            .with_file("b", "")
            .with_file("c", "")
            .with_file("d", "")
            .with_file("e", "");

        let root = concat!(
            r#"{% if x %}{% include "a" %}{% else %}{% include "b" %}{% endif %}"#,
            r#"{% for i in x %}{% include "c" %}{% else %}{% include "d" %}{% endfor %}"#,
            r#"{% with y = x %}{% include "e" %}{% endwith %}"#,
        );
        let registry = compose(root, &includes).await.unwrap();
        assert_eq!(registry.len(), 6);
    }

    #[tokio::test]
    async fn test_self_and_mutual_references_terminate() {
        let includes = MemoryFileSystem::new()
            .with_file("self.html", r#"{% if next %}{% include "self.html" %}{% endif %}"#)
            .with_file("ping.html", r#"{% include "pong.html" %}"#)
            .with_file("pong.html", r#"{% include "ping.html" %}{% include "self.html" %}"#);

        let registry = compose(
            r#"{% include "self.html" %}{% include "ping.html" %}"#,
            &includes,
        )
        .await
        .unwrap();

        assert_eq!(registry.len(), 4);
        for name in ["self.html", "ping.html", "pong.html"] {
            assert_eq!(includes.open_count(name), 1, "{} fetched once", name);
        }
    }

    #[tokio::test]
    async fn test_resolution_is_idempotent() {
        let includes = MemoryFileSystem::new()
            .with_file("x", r#"{% include "y" %}{% include "z" %}"#)
            .with_file("y", r#"{% include "z" %}{% include "x" %}"#)
            .with_file("z", r#"{% include "y" %}"#);

        let first = compose(r#"{% include "x" %}{% include "z" %}"#, &includes)
            .await
            .unwrap();
        // same set of includes, referenced in the opposite order
        let second = compose(r#"{% include "z" %}{% include "x" %}"#, &includes)
            .await
            .unwrap();

        assert_eq!(sorted_names(&first), sorted_names(&second));
        assert_eq!(sorted_names(&first), vec!["__page__", "x", "y", "z"]);
    }

    #[tokio::test]
    async fn test_layout_inheritance_is_resolved() {
        let includes = MemoryFileSystem::new().with_file(
            "base.html",
            "<title>{% block title %}{% endblock %}</title>",
        );

        let registry = compose(
            r#"{% extends "base.html" %}{% block title %}{{ note_id }}{% endblock %}"#,
            &includes,
        )
        .await
        .unwrap();

        assert_eq!(
            registry.execute(ROOT_TEMPLATE, &RenderContext::for_note("abc")).unwrap(),
            "<title>abc</title>"
        );
    }

    #[tokio::test]
    async fn test_missing_include_is_named() {
        let includes = MemoryFileSystem::new().with_file("present.html", r#"{% include "absent.html" %}"#);

        let err = compose(r#"{% include "present.html" %}"#, &includes)
            .await
            .unwrap_err();

        assert!(matches!(err, TemplateError::MissingInclude { .. }));
        assert_eq!(err.template_name(), "absent.html");
    }

    #[tokio::test]
    async fn test_ignore_missing_include_renders_nothing() {
        let includes = MemoryFileSystem::new();

        let registry = compose(r#"a{% include "absent.html" ignore missing %}b"#, &includes)
            .await
            .unwrap();
        assert_eq!(
            registry.execute(ROOT_TEMPLATE, &RenderContext::default()).unwrap(),
            "ab"
        );

        // a single strict reference makes the include required
        let err = compose(
            r#"{% include "absent.html" ignore missing %}{% include "absent.html" %}"#,
            &includes,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, TemplateError::MissingInclude { .. }));
    }

    #[tokio::test]
    async fn test_unparsable_include_is_named() {
        let includes = MemoryFileSystem::new().with_file("broken.html", "{% if x %}never closed");

        let err = compose(r#"{% include "broken.html" %}"#, &includes)
            .await
            .unwrap_err();

        assert!(matches!(err, TemplateError::Parse { .. }));
        assert_eq!(err.template_name(), "broken.html");
    }

    #[tokio::test]
    async fn test_directory_include_is_missing() {
        let includes = MemoryFileSystem::new().with_file("partials/a.html", "a");

        let err = compose(r#"{% include "partials" %}"#, &includes)
            .await
            .unwrap_err();
        assert!(matches!(err, TemplateError::MissingInclude { .. }));
    }

    #[tokio::test]
    async fn test_execution_error_is_reported() {
        let registry = compose("before{{ no_such_function() }}after", &MemoryFileSystem::new())
            .await
            .unwrap();

        let err = registry
            .execute(ROOT_TEMPLATE, &RenderContext::default())
            .unwrap_err();
        assert!(matches!(err, TemplateError::Execution { .. }));
    }
}
