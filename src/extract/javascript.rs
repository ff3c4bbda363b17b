use crate::extract::{Extraction, LanguageExtractor, node_text, unquote};
use anyhow::Result;
use tree_sitter::{Node, Parser};

pub struct JavascriptExtractor {
    parser: Parser,
}

impl JavascriptExtractor {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let language = tree_sitter_javascript::LANGUAGE;
        parser.set_language(&language.into())?;
        Ok(Self { parser })
    }
}

impl LanguageExtractor for JavascriptExtractor {
    fn extract(&mut self, source: &str) -> Result<Extraction> {
        extract_with_parser(&mut self.parser, source)
    }
}

/// Handles both `.ts` and `.tsx`; tree-sitter recovers well enough from
/// JSX constructs that import forms still parse.
pub struct TypescriptExtractor {
    parser: Parser,
}

impl TypescriptExtractor {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let language = tree_sitter_typescript::LANGUAGE_TYPESCRIPT;
        parser.set_language(&language.into())?;
        Ok(Self { parser })
    }
}

impl LanguageExtractor for TypescriptExtractor {
    fn extract(&mut self, source: &str) -> Result<Extraction> {
        extract_with_parser(&mut self.parser, source)
    }
}

fn extract_with_parser(parser: &mut Parser, source: &str) -> Result<Extraction> {
    let mut output = Extraction::default();
    let Some(tree) = parser.parse(source, None) else {
        return Ok(output);
    };
    let root = tree.root_node();
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        handle_statement(child, source, &mut output);
    }
    Ok(output)
}

fn handle_statement(node: Node<'_>, source: &str, output: &mut Extraction) {
    match node.kind() {
        "import_statement" => {
            if let Some(source_node) = node.child_by_field_name("source") {
                push_import(source_node, source, output);
            }
        }
        "export_statement" => {
            if let Some(source_node) = node.child_by_field_name("source") {
                push_import(source_node, source, output);
            }
            if let Some(declaration) = node.child_by_field_name("declaration") {
                handle_statement(declaration, source, output);
            }
        }
        "function_declaration" | "generator_function_declaration" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = node_text(name_node, source);
                if !name.is_empty() {
                    output.functions.push(name);
                }
            }
        }
        "lexical_declaration" | "variable_declaration" => {
            handle_variable_declaration(node, source, output);
        }
        _ => {
            collect_requires(node, source, output);
        }
    }
}

fn handle_variable_declaration(node: Node<'_>, source: &str, output: &mut Extraction) {
    let mut cursor = node.walk();
    for declarator in node.named_children(&mut cursor) {
        if declarator.kind() != "variable_declarator" {
            continue;
        }
        let Some(value) = declarator.child_by_field_name("value") else {
            continue;
        };
        match value.kind() {
            "arrow_function" | "function_expression" | "function" => {
                if let Some(name_node) = declarator.child_by_field_name("name") {
                    let name = node_text(name_node, source);
                    if !name.is_empty() {
                        output.functions.push(name);
                    }
                }
            }
            _ => collect_requires(value, source, output),
        }
    }
}

fn collect_requires(node: Node<'_>, source: &str, output: &mut Extraction) {
    if node.kind() == "call_expression" {
        if let Some(function) = node.child_by_field_name("function") {
            if node_text(function, source) == "require" {
                if let Some(args) = node.child_by_field_name("arguments") {
                    let mut cursor = args.walk();
                    for arg in args.named_children(&mut cursor) {
                        if arg.kind() == "string" {
                            push_import(arg, source, output);
                        }
                    }
                }
            }
        }
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_requires(child, source, output);
    }
}

fn push_import(node: Node<'_>, source: &str, output: &mut Extraction) {
    let path = unquote(&node_text(node, source));
    if !path.is_empty() {
        output.imports.push(path);
    }
}
