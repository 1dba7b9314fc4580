//! Template structure tree
//!
//! A reduced view of a parsed template: only the shapes composition cares
//! about. Expressions are not kept, rendering goes back to the source.

/// A parsed template.
///
/// The set of shapes is closed: composition matches on it exhaustively, so a
/// new shape has to be handled everywhere it matters.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Nodes rendered one after another
    Sequence(Vec<Node>),
    /// Literal text, written unescaped
    Text(String),
    /// `{{ expr }}` and other statements without a body
    Action,
    /// `{% if %} … {% else %} … {% endif %}`
    Conditional(Branch),
    /// `{% for %} … {% else %} … {% endfor %}`
    Iteration(Branch),
    /// `{% with %} … {% endwith %}`
    ScopedRebind(Branch),
    /// `{% include %}`, `{% extends %}`, `{% import %}` and `{% from %}` with
    /// a constant template name
    NamedReference(Reference),
}

/// Control structure with a primary and an optional else branch
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub body: Box<Node>,
    pub else_body: Option<Box<Node>>,
}

impl Branch {
    pub fn new(body: Node, else_body: Option<Node>) -> Self {
        Self {
            body: Box::new(body),
            else_body: else_body.map(Box::new),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub name: String,
    /// `{% include … ignore missing %}`
    pub ignore_missing: bool,
}

impl Node {
    /// Every template reference in this tree, in document order.
    ///
    /// Walks both branches of every control structure with an explicit stack;
    /// text and actions cannot contain references.
    pub fn references(&self) -> Vec<&Reference> {
        let mut found = Vec::new();
        let mut stack = vec![self];

        while let Some(node) = stack.pop() {
            match node {
                Node::Sequence(nodes) => stack.extend(nodes.iter().rev()),
                Node::Conditional(branch) | Node::Iteration(branch) | Node::ScopedRebind(branch) => {
                    if let Some(else_body) = &branch.else_body {
                        stack.push(else_body);
                    }
                    stack.push(&branch.body);
                }
                Node::NamedReference(reference) => found.push(reference),
                Node::Text(_) | Node::Action => {}
            }
        }

        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(name: &str) -> Node {
        Node::NamedReference(Reference {
            name: name.to_string(),
            ignore_missing: false,
        })
    }

    #[test]
    fn test_references_visit_every_branch() {
        let tree = Node::Sequence(vec![
            Node::Text("x".to_string()),
            reference("a"),
            Node::Conditional(Branch::new(reference("b"), Some(reference("c")))),
            Node::Iteration(Branch::new(
                Node::Sequence(vec![reference("d")]),
                Some(reference("e")),
            )),
            Node::ScopedRebind(Branch::new(reference("f"), Some(reference("g")))),
            Node::Action,
        ]);

        let names: Vec<&str> = tree.references().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d", "e", "f", "g"]);
    }

    #[test]
    fn test_leaf_nodes_have_no_references() {
        assert!(Node::Text("{% include 'x' %}".to_string()).references().is_empty());
        assert!(Node::Action.references().is_empty());
    }
}
