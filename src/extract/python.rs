use crate::extract::{Extraction, LanguageExtractor, node_text};
use anyhow::Result;
use tree_sitter::{Node, Parser};

pub struct PythonExtractor {
    parser: Parser,
}

impl PythonExtractor {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let language = tree_sitter_python::LANGUAGE;
        parser.set_language(&language.into())?;
        Ok(Self { parser })
    }
}

impl LanguageExtractor for PythonExtractor {
    fn extract(&mut self, source: &str) -> Result<Extraction> {
        let mut output = Extraction::default();
        let Some(tree) = self.parser.parse(source, None) else {
            return Ok(output);
        };
        let root = tree.root_node();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "function_definition" => {
                    push_function_name(child, source, &mut output.functions);
                }
                "decorated_definition" => {
                    if let Some(definition) = child.child_by_field_name("definition") {
                        if definition.kind() == "function_definition" {
                            push_function_name(definition, source, &mut output.functions);
                        }
                    }
                }
                "import_statement" => {
                    collect_import_names(child, source, &mut output.imports);
                }
                "import_from_statement" => {
                    if let Some(module) = child.child_by_field_name("module_name") {
                        let text = node_text(module, source);
                        if !text.is_empty() {
                            output.imports.push(text);
                        }
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

fn collect_import_names(node: Node<'_>, source: &str, imports: &mut Vec<String>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "dotted_name" => {
                let text = node_text(child, source);
                if !text.is_empty() {
                    imports.push(text);
                }
            }
            "aliased_import" => {
                if let Some(name) = child.child_by_field_name("name") {
                    let text = node_text(name, source);
                    if !text.is_empty() {
                        imports.push(text);
                    }
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PythonExtractor;
    use crate::extract::LanguageExtractor;

    #[test]
    fn extracts_functions_and_imports() {
        let source = r#"
import os
import app.core.config
import numpy as np
from app.services import auth

def main():
    pass

@decorator
def handler(request):
    pass

class Widget:
    def method(self):
        pass
"#;
        let mut extractor = PythonExtractor::new().unwrap();
        let result = extractor.extract(source).unwrap();
        assert_eq!(result.functions, vec!["main", "handler"]);
        assert_eq!(
            result.imports,
            vec!["os", "app.core.config", "numpy", "app.services"]
        );
    }

    #[test]
    fn partial_source_yields_partial_result() {
        let source = "import app.core.config\ndef broken(:\n";
        let mut extractor = PythonExtractor::new().unwrap();
        let result = extractor.extract(source).unwrap();
        assert_eq!(result.imports, vec!["app.core.config"]);
    }
}
