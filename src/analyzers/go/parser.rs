//! Tree-sitter parser integration for Go
//!
//! Provides parsing with the tree-sitter Go grammar plus small node helpers shared by
//! the extraction passes.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser, Tree};

/// A parsed Go file with the source it was parsed from.
pub struct GoAst {
    pub tree: Tree,
    pub source: String,
    pub path: PathBuf,
}

impl GoAst {
    /// Declared package name, or an empty string when the clause is missing.
    pub fn package_name(&self) -> String {
        let root = self.tree.root_node();
        let mut cursor = root.walk();
        let name = root
            .named_children(&mut cursor)
            .find(|child| child.kind() == "package_clause")
            .and_then(|clause| {
                let mut inner = clause.walk();
                let ident = clause
                    .named_children(&mut inner)
                    .find(|c| c.kind() == "package_identifier" || c.kind() == "identifier");
                ident
            })
            .map(|ident| node_text(&ident, &self.source).to_string());
        name.unwrap_or_default()
    }
}

/// Parse Go source code into a tree-sitter AST
pub fn parse_source(content: &str, path: &Path) -> Result<GoAst> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .context("Failed to set Go language")?;

    let tree = parser
        .parse(content, None)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    Ok(GoAst {
        tree,
        source: content.to_string(),
        path: path.to_path_buf(),
    })
}

/// Check if a parse tree has errors
pub fn has_parse_errors(tree: &Tree) -> bool {
    tree.root_node().has_error()
}

/// Get text for a tree-sitter node
pub fn node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    source.get(node.start_byte()..node.end_byte()).unwrap_or("")
}

/// Get the line number for a tree-sitter node (1-indexed)
pub fn node_line(node: &Node) -> usize {
    node.start_position().row + 1
}

/// Named children without comments.
pub fn named_children<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// Arguments of a call expression, in order.
pub fn call_arguments<'t>(call: &Node<'t>) -> Vec<Node<'t>> {
    call.child_by_field_name("arguments")
        .map(|args| named_children(&args))
        .unwrap_or_default()
}

/// For `pkg.Member(...)` or `recv.Member(...)`, the member name.
pub fn selector_member<'a>(call: &Node, source: &'a str) -> Option<&'a str> {
    let function = call.child_by_field_name("function")?;
    if function.kind() != "selector_expression" {
        return None;
    }
    function
        .child_by_field_name("field")
        .map(|field| node_text(&field, source))
}

/// Unwraps `literal_element` and parenthesized wrappers down to the expression.
pub fn unwrap_expression<'t>(node: Node<'t>) -> Node<'t> {
    let mut current = node;
    while matches!(current.kind(), "literal_element" | "parenthesized_expression") {
        match named_children(&current).into_iter().next() {
            Some(inner) => current = inner,
            None => break,
        }
    }
    current
}

/// Contents of a string literal without quotes.
pub fn string_literal_value(node: &Node, source: &str) -> Option<String> {
    match node.kind() {
        "interpreted_string_literal" => Some(node_text(node, source).trim_matches('"').to_string()),
        "raw_string_literal" => Some(node_text(node, source).trim_matches('`').to_string()),
        _ => None,
    }
}

/// Depth-first visit of every descendant, including `node` itself.
pub fn visit_descendants<'t>(node: Node<'t>, visit: &mut impl FnMut(Node<'t>)) {
    visit(node);
    let mut cursor = node.walk();
    let children: Vec<Node<'t>> = node.children(&mut cursor).collect();
    for child in children {
        visit_descendants(child, visit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_go_source() {
        let source = "package orders\n\nfunc Hello() string { return \"hi\" }\n";
        let ast = parse_source(source, Path::new("orders.go")).unwrap();
        assert!(!has_parse_errors(&ast.tree));
        assert_eq!(ast.package_name(), "orders");
    }

    #[test]
    fn test_parse_errors_are_detected_not_fatal() {
        let source = "package broken\n\nfunc Oops( {\n";
        let ast = parse_source(source, Path::new("broken.go")).unwrap();
        assert!(has_parse_errors(&ast.tree));
        assert_eq!(ast.package_name(), "broken");
    }

    #[test]
    fn test_string_literal_value() {
        let source = "package p\n\nvar a = \"quoted\"\nvar b = `raw`\n";
        let ast = parse_source(source, Path::new("p.go")).unwrap();
        let mut values = Vec::new();
        visit_descendants(ast.tree.root_node(), &mut |node| {
            if let Some(value) = string_literal_value(&node, &ast.source) {
                values.push(value);
            }
        });
        assert_eq!(values, vec!["quoted".to_string(), "raw".to_string()]);
    }

    #[test]
    fn test_node_line_is_one_indexed() {
        let source = "package p\n\nfunc F() {}\n";
        let ast = parse_source(source, Path::new("p.go")).unwrap();
        let root = ast.tree.root_node();
        let func = named_children(&root)
            .into_iter()
            .find(|n| n.kind() == "function_declaration")
            .unwrap();
        assert_eq!(node_line(&func), 3);
    }
}
