use crate::extract::{Extraction, LanguageExtractor, node_text, unquote};
use anyhow::Result;
use tree_sitter::{Node, Parser};

pub struct GoExtractor {
    parser: Parser,
}

impl GoExtractor {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let language = tree_sitter_go::LANGUAGE;
        parser.set_language(&language.into())?;
        Ok(Self { parser })
    }
}

impl LanguageExtractor for GoExtractor {
    fn extract(&mut self, source: &str) -> Result<Extraction> {
        let mut output = Extraction::default();
        let Some(tree) = self.parser.parse(source, None) else {
            return Ok(output);
        };
        let root = tree.root_node();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "function_declaration" | "method_declaration" => {
                    if let Some(name_node) = child.child_by_field_name("name") {
                        let name = node_text(name_node, source);
                        if !name.is_empty() {
                            output.functions.push(name);
                        }
                    }
                }
                "import_declaration" => {
                    collect_imports(child, source, &mut output.imports);
                }
                _ => {}
            }
        }
        Ok(output)
    }
}

fn collect_imports(node: Node<'_>, source: &str, imports: &mut Vec<String>) {
    if node.kind() == "import_spec" {
        if let Some(path_node) = node.child_by_field_name("path") {
            let path = unquote(&node_text(path_node, source));
            if !path.is_empty() {
                imports.push(path);
            }
        }
        return;
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_imports(child, source, imports);
    }
}
