//! View template engine.
//!
//! This module provides:
//! - Parsing of Jinja-syntax views (through minijinja) into a closed [`Node`]
//!   tree that exposes every named template reference
//! - Composition: loading every include a page references, to a fixed point
//! - Rendering of a composed page against a [`RenderContext`], HTML-escaped
//!
//! # Example
//!
//! ```ignore
//! let registry = compose(&page_source, &includes).await?;
//! let html = registry.execute(ROOT_TEMPLATE, &RenderContext::for_note("abcd1234"))?;
//! ```

mod ast;
mod registry;
mod render;
mod syntax;
mod types;

pub use ast::{Branch, Node, Reference};
pub use registry::{compose, TemplateRegistry};
pub use syntax::parse;
pub use types::{RenderContext, TemplateError, TemplateResult, ROOT_TEMPLATE};
