//! Diagnostic rendering
//!
//! Checker diagnostics never stop a run; they are printed to stderr as
//! warnings, either as annotated source snippets or as single lines.

use ariadne::{Color, Label, Report, ReportKind, Source};
use clap::ValueEnum;
use std::io;
use tsenv_checker::{Diagnostic, Program};
use tsenv_parser::ParseError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum DiagnosticStyle {
    /// Source snippets with labels
    #[default]
    Rich,
    /// One line per diagnostic
    Plain,
}

/// `TypeScript compiler :: <file> (<line>,<col>): <message>`, with
/// one-based positions.
pub fn diagnostic_line(program: &Program, diagnostic: &Diagnostic) -> String {
    match diagnostic.file.and_then(|index| program.files().get(index)) {
        Some(file) => {
            let (line, column) = file.line_col(diagnostic.start);
            format!(
                "TypeScript compiler :: {} ({},{}): {}",
                file.name,
                line + 1,
                column + 1,
                diagnostic.message
            )
        }
        None => format!("TypeScript compiler :: {}", diagnostic.message),
    }
}

pub fn print_diagnostics(program: &Program, diagnostics: &[Diagnostic], style: DiagnosticStyle) -> io::Result<()> {
    for diagnostic in diagnostics {
        let file = diagnostic.file.and_then(|index| program.files().get(index));
        match (style, file) {
            (DiagnosticStyle::Rich, Some(file)) => {
                let code = format!("TS{}", diagnostic.code);
                warning(&code, &diagnostic.message, diagnostic.start, diagnostic.end, &file.name, &file.text)?;
            }
            _ => eprintln!("{}", diagnostic_line(program, diagnostic)),
        }
    }
    Ok(())
}

pub fn print_parse_errors(errors: &[ParseError], filename: &str, source: &str) -> io::Result<()> {
    for err in errors {
        report(ReportKind::Error, Color::Red, "E1000", &err.message, err.span.start, err.span.end, filename, source)?;
    }
    Ok(())
}

pub fn print_lex_error(message: &str, start: usize, end: usize, filename: &str, source: &str) -> io::Result<()> {
    report(ReportKind::Error, Color::Red, "E0001", message, start, end, filename, source)
}

fn warning(code: &str, message: &str, start: usize, end: usize, filename: &str, source: &str) -> io::Result<()> {
    report(ReportKind::Warning, Color::Yellow, code, message, start, end, filename, source)
}

#[allow(clippy::too_many_arguments)]
fn report(
    kind: ReportKind<'_>,
    color: Color,
    code: &str,
    message: &str,
    start: usize,
    end: usize,
    filename: &str,
    source: &str,
) -> io::Result<()> {
    let start = char_offset(source, start);
    let end = char_offset(source, end).max(start);
    let span = (filename, start..end);
    Report::build(kind, span.clone())
        .with_code(code)
        .with_message(message)
        .with_label(Label::new(span).with_message(message).with_color(color))
        .finish()
        .eprint((filename, Source::from(source)))
}

/// Diagnostics carry byte offsets; snippets are indexed by character.
fn char_offset(source: &str, byte: usize) -> usize {
    let byte = byte.min(source.len());
    source
        .char_indices()
        .take_while(|&(i, _)| i < byte)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsenv_checker::CompilerOptions;

    #[test]
    fn test_diagnostic_line() {
        let program = Program::from_sources(
            &[("env.d.ts", "declare var a: string;\ndeclare var b: Missing;")],
            CompilerOptions::default(),
        );
        let diagnostics = program.checker().pre_emit_diagnostics();
        assert_eq!(
            diagnostic_line(&program, &diagnostics[0]),
            "TypeScript compiler :: env.d.ts (2,16): Cannot find name 'Missing'."
        );
        let global = Diagnostic::global(6053, "File 'x.d.ts' not found.");
        assert_eq!(diagnostic_line(&program, &global), "TypeScript compiler :: File 'x.d.ts' not found.");
    }

    #[test]
    fn test_char_offset() {
        assert_eq!(char_offset("héllo", 3), 2);
        assert_eq!(char_offset("abc", 10), 3);
    }
}
