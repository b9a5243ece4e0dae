//! Triple-slash reference directives
//!
//! Directives are only recognized in the leading comment block of a file,
//! before the first statement.

/// A `/// <reference ... />` directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceDirective {
    /// `/// <reference path="./other.d.ts" />`
    Path(String),
    /// `/// <reference lib="es2015.promise" />`
    Lib(String),
    /// `/// <reference types="node" />`
    Types(String),
    /// `/// <reference no-default-lib="true" />`
    NoDefaultLib,
}

/// Collects the reference directives at the top of `source`.
pub fn reference_directives(source: &str) -> Vec<ReferenceDirective> {
    let mut directives = Vec::new();
    let mut in_block_comment = false;

    for line in source.lines() {
        let trimmed = line.trim();

        if in_block_comment {
            if trimmed.contains("*/") {
                in_block_comment = false;
            }
            continue;
        }
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("///") {
            if let Some(directive) = parse_directive(rest.trim()) {
                directives.push(directive);
            }
            continue;
        }
        if trimmed.starts_with("//") {
            continue;
        }
        if trimmed.starts_with("/*") {
            in_block_comment = !trimmed.contains("*/");
            continue;
        }
        break;
    }

    directives
}

fn parse_directive(text: &str) -> Option<ReferenceDirective> {
    let body = text.strip_prefix("<reference")?;
    if !body.starts_with(char::is_whitespace) {
        return None;
    }

    if let Some(path) = attribute(body, "path") {
        return Some(ReferenceDirective::Path(path));
    }
    if let Some(lib) = attribute(body, "lib") {
        return Some(ReferenceDirective::Lib(lib));
    }
    if let Some(types) = attribute(body, "types") {
        return Some(ReferenceDirective::Types(types));
    }
    match attribute(body, "no-default-lib").as_deref() {
        Some("true") => Some(ReferenceDirective::NoDefaultLib),
        _ => None,
    }
}

/// Value of `name="..."` or `name='...'` within a directive body.
fn attribute(body: &str, name: &str) -> Option<String> {
    let mut search = body;
    while let Some(pos) = search.find(name) {
        let preceded_by_space = search[..pos]
            .chars()
            .next_back()
            .map_or(true, char::is_whitespace);
        let rest = search[pos + name.len()..].trim_start();
        if preceded_by_space {
            if let Some(value) = rest.strip_prefix('=') {
                let value = value.trim_start();
                let quote = value.chars().next().filter(|c| *c == '"' || *c == '\'')?;
                let inner = &value[1..];
                let end = inner.find(quote)?;
                return Some(inner[..end].to_string());
            }
        }
        search = &search[pos + name.len()..];
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_and_lib_directives() {
        let source = r#"/// <reference path="./globals.d.ts" />
/// <reference lib='es2015.promise' />
/// <reference types="node" />

declare var x: number;
/// <reference path="ignored.d.ts" />
"#;
        assert_eq!(
            reference_directives(source),
            vec![
                ReferenceDirective::Path("./globals.d.ts".into()),
                ReferenceDirective::Lib("es2015.promise".into()),
                ReferenceDirective::Types("node".into()),
            ]
        );
    }

    #[test]
    fn test_directives_after_license_comment() {
        let source = "/*! *****\n Copyright\n***** */\n\n/// <reference no-default-lib=\"true\"/>\n";
        assert_eq!(reference_directives(source), vec![ReferenceDirective::NoDefaultLib]);
    }

    #[test]
    fn test_plain_triple_slash_comment_ignored() {
        assert!(reference_directives("/// just a note\n").is_empty());
        assert!(reference_directives("/// <referencepath=\"x\" />\n").is_empty());
    }
}
