use crate::extract::{Extraction, LanguageExtractor, node_text};
use anyhow::Result;
use tree_sitter::{Node, Parser};

pub struct RustExtractor {
    parser: Parser,
}

impl RustExtractor {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let language = tree_sitter_rust::LANGUAGE;
        parser.set_language(&language.into())?;
        Ok(Self { parser })
    }
}

impl LanguageExtractor for RustExtractor {
    fn extract(&mut self, source: &str) -> Result<Extraction> {
        let mut output = Extraction::default();
        let Some(tree) = self.parser.parse(source, None) else {
            return Ok(output);
        };
        let root = tree.root_node();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "function_item" => {
                    push_function_name(child, source, &mut output.functions);
                }
                "impl_item" => {
                    if let Some(body) = child.child_by_field_name("body") {
                        let mut inner = body.walk();
                        for item in body.named_children(&mut inner) {
                            if item.kind() == "function_item" {
                                push_function_name(item, source, &mut output.functions);
                            }
                        }
                    }
                }
                "use_declaration" => {
                    if let Some(argument) = child.child_by_field_name("argument") {
                        collect_use_paths(argument, source, "", &mut output.imports);
                    }
                }
                _ => {}
            }
        }
        Ok(output)
    }
}

fn push_function_name(node: Node<'_>, source: &str, functions: &mut Vec<String>) {
    if let Some(name_node) = node.child_by_field_name("name") {
        let name = node_text(name_node, source);
        if !name.is_empty() {
            functions.push(name);
        }
    }
}

/// Flattens a `use` tree into full paths by following the grammar's own
/// structure: brace lists recurse with their base path as the prefix,
/// `as` aliases keep only the path side, `self` names the prefix itself,
/// and a wildcard names the path it globs.
fn collect_use_paths(node: Node<'_>, source: &str, prefix: &str, imports: &mut Vec<String>) {
    match node.kind() {
        "use_as_clause" => {
            if let Some(path) = node.child_by_field_name("path") {
                collect_use_paths(path, source, prefix, imports);
            }
        }
        "scoped_use_list" => {
            let base = match node.child_by_field_name("path") {
                Some(path) => join_path(prefix, &node_text(path, source)),
                None => prefix.to_string(),
            };
            if let Some(list) = node.child_by_field_name("list") {
                collect_use_paths(list, source, &base, imports);
            }
        }
        "use_list" => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                collect_use_paths(child, source, prefix, imports);
            }
        }
        "use_wildcard" => {
            if let Some(path) = node.named_child(0) {
                let full = join_path(prefix, &node_text(path, source));
                if !full.is_empty() {
                    imports.push(full);
                }
            }
        }
        "self" => {
            if !prefix.is_empty() {
                imports.push(prefix.to_string());
            }
        }
        _ => {
            // identifier, scoped_identifier, crate, super
            let full = join_path(prefix, &node_text(node, source));
            if !full.is_empty() {
                imports.push(full);
            }
        }
    }
}

fn join_path(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else if segment.is_empty() {
        prefix.to_string()
    } else {
        format!("{prefix}::{segment}")
    }
}
