//! Compilation of predicate trees into Airtable formulas.
//!
//! Text literals are always emitted as escaped double-quoted strings, so
//! search input cannot close the literal and inject formula syntax.

use std::fmt::Write;

use crate::predicate::{Literal, Predicate};

/// Compile a predicate into an Airtable `filterByFormula` expression.
#[must_use]
pub fn compile(predicate: &Predicate) -> String {
    let mut out = String::new();
    write_predicate(&mut out, predicate);
    out
}

fn write_predicate(out: &mut String, predicate: &Predicate) {
    match predicate {
        Predicate::Equals { field, value } => {
            write_field(out, field);
            out.push_str(" = ");
            match value {
                Literal::Text(text) => write_string(out, text),
                Literal::Integer(n) => {
                    let _ = write!(out, "{n}");
                }
            }
        }
        Predicate::Contains { field, needle } => {
            out.push_str("SEARCH(LOWER(");
            write_string(out, needle);
            out.push_str("), LOWER(");
            write_field(out, field);
            out.push_str("))");
        }
        Predicate::And(children) => write_call(out, "AND", "TRUE()", children),
        Predicate::Or(children) => write_call(out, "OR", "FALSE()", children),
    }
}

fn write_call(out: &mut String, function: &str, identity: &str, children: &[Predicate]) {
    if children.is_empty() {
        out.push_str(identity);
        return;
    }
    out.push_str(function);
    out.push('(');
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_predicate(out, child);
    }
    out.push(')');
}

fn write_field(out: &mut String, field: &str) {
    out.push('{');
    out.push_str(field);
    out.push('}');
}

fn write_string(out: &mut String, text: &str) {
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out.push('"');
}
