//! Parsing view sources with minijinja and reducing the result to [`Node`]

use minijinja::machinery::ast::{Expr, Stmt};

use super::ast::{Branch, Node, Reference};
use super::types::{TemplateError, TemplateResult};

/// Parse `source`, registered as `name`, into a [`Node`] tree.
pub fn parse(name: &str, source: &str) -> TemplateResult<Node> {
    let stmt = minijinja::machinery::parse(source, name, Default::default(), Default::default())
        .map_err(|err| TemplateError::Parse {
            name: name.to_string(),
            line: err.line().unwrap_or(0),
            message: err.to_string(),
        })?;
    Ok(reduce(&stmt))
}

fn reduce_all(stmts: &[Stmt<'_>]) -> Node {
    Node::Sequence(stmts.iter().map(reduce).collect())
}

fn reduce_else(stmts: &[Stmt<'_>]) -> Option<Node> {
    (!stmts.is_empty()).then(|| reduce_all(stmts))
}

/// Constant template name, if the expression is one
fn constant_name(expr: &Expr<'_>) -> Option<String> {
    match expr {
        Expr::Const(c) => c.value.as_str().map(str::to_string),
        _ => None,
    }
}

fn reference(expr: &Expr<'_>, ignore_missing: bool) -> Node {
    match constant_name(expr) {
        Some(name) => Node::NamedReference(Reference { name, ignore_missing }),
        // computed at render time; nothing to load up front
        None => Node::Action,
    }
}

fn reduce(stmt: &Stmt<'_>) -> Node {
    match stmt {
        Stmt::Template(t) => reduce_all(&t.children),
        Stmt::EmitRaw(raw) => Node::Text(raw.raw.to_string()),
        Stmt::EmitExpr(_) => Node::Action,
        Stmt::IfCond(cond) => Node::Conditional(Branch::new(
            reduce_all(&cond.true_body),
            reduce_else(&cond.false_body),
        )),
        Stmt::ForLoop(for_loop) => Node::Iteration(Branch::new(
            reduce_all(&for_loop.body),
            reduce_else(&for_loop.else_body),
        )),
        Stmt::WithBlock(with) => Node::ScopedRebind(Branch::new(reduce_all(&with.body), None)),
        Stmt::Include(include) => reference(&include.name, include.ignore_missing),
        Stmt::Extends(extends) => reference(&extends.name, false),
        Stmt::Import(import) => reference(&import.expr, false),
        Stmt::FromImport(import) => reference(&import.expr, false),
        Stmt::Block(block) => reduce_all(&block.body),
        Stmt::Macro(decl) => reduce_all(&decl.body),
        Stmt::CallBlock(call) => reduce_all(&call.macro_decl.body),
        Stmt::SetBlock(set) => reduce_all(&set.body),
        Stmt::AutoEscape(block) => reduce_all(&block.body),
        Stmt::FilterBlock(block) => reduce_all(&block.body),
        // set, do, loop controls
        _ => Node::Action,
    }
}
