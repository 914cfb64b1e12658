//! The ordered directive rewriter.
//!
//! The rewrite pipeline is an explicit ordered rule list; each rule is a
//! global regex replacement over the current text. The order is a
//! correctness requirement: typedef blocks must vanish before the escaper
//! touches literal text, and the export-node rule must claim `{{@ }}`
//! attributes before the final evaluate rule sweeps up every remaining
//! directive.
//!
//! Directive handlers record [`Op`]s in a side vector and leave a
//! NUL-delimited placeholder token in the text, so the final rewritten
//! text carries document order; the assembler folds it back into the
//! ordered program.

use regex::{Captures, Regex};
use tracing::trace;

use crate::analyzer::Analyzer;
use crate::error::{CompileError, CompileResult};
use crate::escape::EscapeTable;
use crate::holder::Holder;
use crate::program::{IncludeKind, Op};
use crate::types::VarType;

/// Attribute marking a node for export into the render result.
pub const EXPORT_ATTRIBUTE: &str = "data-export-id";

/// Tag → type-name stem for export typedefs. Unlisted tags export with
/// the generic `Element` type.
const KNOWN_TAGS: &[(&str, &str)] = &[
    ("a", "Anchor"),
    ("audio", "Audio"),
    ("button", "Button"),
    ("canvas", "Canvas"),
    ("caption", "TableCaption"),
    ("div", "Div"),
    ("dl", "DList"),
    ("fieldset", "FieldSet"),
    ("form", "Form"),
    ("h1", "Heading"),
    ("h2", "Heading"),
    ("h3", "Heading"),
    ("h4", "Heading"),
    ("h5", "Heading"),
    ("h6", "Heading"),
    ("iframe", "IFrame"),
    ("img", "Image"),
    ("input", "Input"),
    ("label", "Label"),
    ("legend", "Legend"),
    ("li", "ListItem"),
    ("ol", "OList"),
    ("optgroup", "OptGroup"),
    ("option", "Option"),
    ("p", "Paragraph"),
    ("pre", "Pre"),
    ("select", "Select"),
    ("span", "Span"),
    ("table", "Table"),
    ("tbody", "TableSection"),
    ("td", "TableCell"),
    ("textarea", "TextArea"),
    ("tfoot", "TableSection"),
    ("th", "TableHeaderCell"),
    ("thead", "TableSection"),
    ("tr", "TableRow"),
    ("ul", "UList"),
    ("video", "Video"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleKind {
    Typedef,
    Escaper,
    Interpolate,
    Escape,
    Partial,
    Component,
    ExportNode,
    Evaluate,
}

#[derive(Debug)]
struct RewriteRule {
    kind: RuleKind,
    pattern: Regex,
}

/// Parsed include-directive arguments.
#[derive(Debug, PartialEq)]
struct IncludeArgs {
    reference: String,
    params: Option<String>,
    export: Option<String>,
    is_array: bool,
}

/// Applies the ordered rewrite rules and records render ops.
#[derive(Debug)]
pub(crate) struct Rewriter {
    rules: Vec<RewriteRule>,
    export_marker: Regex,
    ident_pattern: Regex,
    export_name_pattern: Regex,
}

impl Rewriter {
    pub fn new() -> Self {
        let name = r"[a-z][a-z0-9_]*(?:\[\])?";
        let attr = EXPORT_ATTRIBUTE;
        let export_node = format!(
            r#"(?i)<([a-z][a-z0-9-]*)[^>]*\s{attr}\s*=\s*(?:"\{{\{{@\s*({name})\s*\}}\}}"|\\'\{{\{{@\s*({name})\s*\}}\}}\\'|\{{\{{@\s*({name})\s*\}}\}})[^>]*>"#
        );
        let rules = vec![
            RewriteRule {
                kind: RuleKind::Typedef,
                pattern: Regex::new(r"\{\{\*([\s\S]+?)\}\}\s*").unwrap(),
            },
            RewriteRule {
                kind: RuleKind::Escaper,
                pattern: Regex::new(EscapeTable::escaper_class()).unwrap(),
            },
            RewriteRule {
                kind: RuleKind::Interpolate,
                pattern: Regex::new(r"\{\{=([\s\S]+?)\}\}").unwrap(),
            },
            RewriteRule {
                kind: RuleKind::Escape,
                pattern: Regex::new(r"\{\{-([\s\S]+?)\}\}").unwrap(),
            },
            RewriteRule {
                kind: RuleKind::Partial,
                pattern: Regex::new(r"\{\{#([\s\S]+?)\}\}").unwrap(),
            },
            RewriteRule {
                kind: RuleKind::Component,
                pattern: Regex::new(r"\{\{%([\s\S]+?)\}\}").unwrap(),
            },
            RewriteRule {
                kind: RuleKind::ExportNode,
                pattern: Regex::new(&export_node).unwrap(),
            },
            RewriteRule {
                kind: RuleKind::Evaluate,
                pattern: Regex::new(r"\{\{([\s\S]+?)\}\}").unwrap(),
            },
        ];
        Self {
            rules,
            export_marker: Regex::new(r"\{\{@[\s\S]+?\}\}").unwrap(),
            ident_pattern: Regex::new(r"^[A-Za-z][A-Za-z0-9_.]*$").unwrap(),
            export_name_pattern: Regex::new(r"^([A-Za-z][A-Za-z0-9_]*)(\[\])?$").unwrap(),
        }
    }

    /// Run every rule over the template body, in order.
    ///
    /// Returns the rewritten text (literal text escaped, directives
    /// replaced by placeholder tokens) and the recorded ops.
    pub fn rewrite(
        &self,
        body: &str,
        escapes: &EscapeTable,
        analyzer: &mut Analyzer,
        input: &mut Holder,
        output: &mut Holder,
    ) -> CompileResult<(String, Vec<Op>)> {
        let mut text = body.to_string();
        let mut ops: Vec<Op> = Vec::new();

        for rule in &self.rules {
            let mut failure: Option<CompileError> = None;
            text = rule
                .pattern
                .replace_all(&text, |caps: &Captures| -> String {
                    if failure.is_some() {
                        return caps[0].to_string();
                    }
                    match self.apply(rule.kind, caps, escapes, analyzer, input, output, &mut ops)
                    {
                        Ok(replacement) => replacement,
                        Err(e) => {
                            failure = Some(e);
                            caps[0].to_string()
                        }
                    }
                })
                .into_owned();
            if let Some(e) = failure {
                return Err(e);
            }
            trace!(rule = ?rule.kind, len = text.len(), "rewrite pass");
        }

        Ok((text, ops))
    }

    #[allow(clippy::too_many_arguments)]
    fn apply(
        &self,
        kind: RuleKind,
        caps: &Captures,
        escapes: &EscapeTable,
        analyzer: &mut Analyzer,
        input: &mut Holder,
        output: &mut Holder,
        ops: &mut Vec<Op>,
    ) -> CompileResult<String> {
        match kind {
            RuleKind::Typedef => {
                analyzer.parse(&caps[1])?;
                Ok(String::new())
            }
            RuleKind::Escaper => {
                let c = caps[0]
                    .chars()
                    .next()
                    .ok_or_else(|| CompileError::CorruptRewrite("empty escaper match".into()))?;
                let token = EscapeTable::token_for(c)
                    .ok_or_else(|| CompileError::CorruptRewrite("unescapable match".into()))?;
                Ok(format!("\\{token}"))
            }
            RuleKind::Interpolate => {
                analyzer.extract(&caps[1], false, input);
                Ok(push_op(ops, Op::Interpolate(escapes.unescape(&caps[1]))))
            }
            RuleKind::Escape => {
                analyzer.extract(&caps[1], false, input);
                Ok(push_op(ops, Op::Escape(escapes.unescape(&caps[1]))))
            }
            RuleKind::Partial => {
                analyzer.extract(&caps[1], false, input);
                self.replace_include(&caps[1], IncludeKind::Partial, escapes, output, ops)
            }
            RuleKind::Component => {
                analyzer.extract(&caps[1], false, input);
                self.replace_include(&caps[1], IncludeKind::Component, escapes, output, ops)
            }
            RuleKind::ExportNode => self.replace_export(caps, output),
            RuleKind::Evaluate => {
                analyzer.extract(&caps[1], true, input);
                Ok(push_op(ops, Op::Eval(escapes.unescape(&caps[1]))))
            }
        }
    }

    /// Rewrite a `{{#` or `{{%` directive into a deferred-include op.
    fn replace_include(
        &self,
        raw_args: &str,
        kind: IncludeKind,
        escapes: &EscapeTable,
        output: &mut Holder,
        ops: &mut Vec<Op>,
    ) -> CompileResult<String> {
        let args = self.parse_include_args(&escapes.unescape(raw_args))?;

        if let Some(export) = &args.export {
            let type_name = match kind {
                IncludeKind::Partial => partial_output_type(&args.reference),
                IncludeKind::Component => args.reference.clone(),
            };
            let var_type = if args.is_array {
                VarType::Array(Some(type_name))
            } else {
                VarType::Named(type_name)
            };
            output.add(export.clone(), var_type);
        }

        Ok(push_op(
            ops,
            Op::Include {
                kind,
                reference: args.reference,
                params: args.params,
                export: args.export,
            },
        ))
    }

    /// Parse include arguments: `ref[, params…[, exportName[]?]]`.
    ///
    /// Splitting is bracket- and quote-aware, so commas inside nested
    /// calls or object literals do not separate arguments. With three or
    /// more segments the last is taken as an export name when it parses
    /// as one; otherwise everything after the ref is params.
    fn parse_include_args(&self, code: &str) -> CompileResult<IncludeArgs> {
        let segments = split_top_level(code);

        let reference = segments
            .first()
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        if !self.ident_pattern.is_match(&reference) {
            return Err(CompileError::BadIncludeArgs(code.trim().to_string()));
        }

        let (params_segments, export_segment) = if segments.len() > 2 {
            let last = segments[segments.len() - 1].trim();
            if self.export_name_pattern.is_match(last) {
                (&segments[1..segments.len() - 1], Some(last))
            } else {
                (&segments[1..], None)
            }
        } else {
            (&segments[1..], None)
        };

        let params = {
            let joined = params_segments.join(",");
            let trimmed = joined.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        };

        let (export, is_array) = match export_segment {
            Some(name) => {
                let caps = self
                    .export_name_pattern
                    .captures(name)
                    .ok_or_else(|| CompileError::BadIncludeArgs(code.trim().to_string()))?;
                (Some(caps[1].to_string()), caps.get(2).is_some())
            }
            None => (None, false),
        };

        Ok(IncludeArgs {
            reference,
            params,
            export,
            is_array,
        })
    }

    /// Rewrite an export-tagged opening tag: record the export type and
    /// reduce the attribute value to the bare name.
    fn replace_export(&self, caps: &Captures, output: &mut Holder) -> CompileResult<String> {
        let tag = &caps[1];
        let raw_name = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| m.as_str())
            .ok_or_else(|| CompileError::CorruptRewrite("export tag without name".into()))?;

        let (name, is_array) = match raw_name.strip_suffix("[]") {
            Some(bare) => (bare, true),
            None => (raw_name, false),
        };
        let type_name = element_type(tag);
        let var_type = if is_array {
            VarType::Array(Some(type_name))
        } else {
            VarType::Named(type_name)
        };
        output.add(name, var_type);

        Ok(self
            .export_marker
            .replace(&caps[0], name)
            .into_owned())
    }
}

/// Record an op and return its placeholder token.
fn push_op(ops: &mut Vec<Op>, op: Op) -> String {
    let token = format!("\u{0}{}\u{0}", ops.len());
    ops.push(op);
    token
}

/// Split on commas at bracket depth zero, outside quotes.
fn split_top_level(code: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in code.chars() {
        if let Some(q) = quote {
            current.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => {
                quote = Some(c);
                current.push(c);
            }
            '(' | '[' | '{' => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' | '}' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => {
                segments.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    segments.push(current);
    segments
}

/// Derive a partial's result-type name from its reference: the last path
/// segment is capitalized and suffixed `Out`.
fn partial_output_type(reference: &str) -> String {
    let (path, last) = match reference.rfind('.') {
        Some(pos) => (&reference[..pos + 1], &reference[pos + 1..]),
        None => ("", reference),
    };
    let mut chars = last.chars();
    match chars.next() {
        Some(first) => format!("{path}{}{}Out", first.to_uppercase(), chars.as_str()),
        None => format!("{path}Out"),
    }
}

/// Export type name for an element kind.
fn element_type(tag: &str) -> String {
    let lower = tag.to_ascii_lowercase();
    let stem = KNOWN_TAGS
        .iter()
        .find(|(t, _)| *t == lower)
        .map(|(_, stem)| *stem)
        .unwrap_or("");
    format!("{stem}Element")
}
