//! Folds a rewrite pass into a [`TemplateArtifact`].
//!
//! The rewritten text alternates escaped literal segments with
//! NUL-delimited op tokens; folding restores document order: literal
//! segments are unescaped into `Append` ops and tokens resolve to the
//! recorded directive ops. The export holder becomes the dispatch table
//! and both holders render into typedef documentation.

use tracing::debug;

use crate::analyzer::Analyzer;
use crate::error::{CompileError, CompileResult};
use crate::escape::EscapeTable;
use crate::holder::Holder;
use crate::program::{DispatchSpec, ExportArity, Op, Program, TemplateArtifact};

pub(crate) fn assemble(
    name: &str,
    rewritten: &str,
    ops: Vec<Op>,
    escapes: &EscapeTable,
    analyzer: &Analyzer,
    input: &Holder,
    output: &Holder,
) -> CompileResult<TemplateArtifact> {
    let program = fold_program(rewritten, ops, escapes)?;

    let mut dispatch = DispatchSpec::new();
    for (export_name, var_type) in output.entries() {
        let arity = if var_type.is_array() {
            ExportArity::Many
        } else {
            ExportArity::Single
        };
        dispatch.add(export_name, arity);
    }

    let input_typedef = match analyzer.input_type() {
        Some(declared) => Some(declared.to_string()),
        None if input.has_entries() => Some(input.typedef()),
        None => None,
    };
    let takes_data = input.has_entries() || analyzer.input_type().is_some();

    debug!(
        template = name,
        ops = program.len(),
        exports = dispatch.names().len(),
        "assembled template artifact"
    );

    Ok(TemplateArtifact {
        name: name.to_string(),
        program,
        dispatch,
        input_typedef,
        output_typedef: output.typedef(),
        takes_data,
    })
}

/// Restore document order from the token-bearing rewritten text.
fn fold_program(rewritten: &str, ops: Vec<Op>, escapes: &EscapeTable) -> CompileResult<Program> {
    let mut program = Program::new();
    let mut expecting_literal = true;
    for part in rewritten.split('\u{0}') {
        if expecting_literal {
            if !part.is_empty() {
                program.push(Op::Append(escapes.unescape(part)));
            }
        } else {
            let index: usize = part
                .parse()
                .map_err(|_| CompileError::CorruptRewrite(format!("bad op token: {part:?}")))?;
            let op = ops
                .get(index)
                .cloned()
                .ok_or_else(|| CompileError::CorruptRewrite(format!("op index {index} out of range")))?;
            program.push(op);
        }
        expecting_literal = !expecting_literal;
    }
    Ok(program)
}
