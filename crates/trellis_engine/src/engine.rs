//! The compile engine.

use tracing::info;

use crate::analyzer::Analyzer;
use crate::assembler;
use crate::error::{CompileError, CompileResult};
use crate::escape::EscapeTable;
use crate::holder::Holder;
use crate::program::TemplateArtifact;
use crate::rewriter::Rewriter;
use crate::types::VarType;

/// Node type recorded for the implicit `root` export.
pub const ROOT_TYPE: &str = "Fragment";

/// Compiles template text into a [`TemplateArtifact`].
///
/// Holders and analyzer state live for one compile only and are cleared
/// at entry, so an engine instance must not be shared between concurrent
/// compiles (compilation takes `&mut self`).
#[derive(Debug)]
pub struct Engine {
    escapes: EscapeTable,
    rewriter: Rewriter,
    analyzer: Analyzer,
    input: Holder,
    output: Holder,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self {
            escapes: EscapeTable::new(),
            rewriter: Rewriter::new(),
            analyzer: Analyzer::new(),
            input: Holder::new(),
            output: Holder::new(),
        }
    }

    /// Compile one template body.
    pub fn compile(&mut self, name: &str, body: &str) -> CompileResult<TemplateArtifact> {
        self.clear();
        if body.contains('\u{0}') {
            return Err(CompileError::NulInTemplate);
        }

        // The container node is always exported, exactly once, last.
        self.output.add("root", VarType::Named(ROOT_TYPE.to_string()));

        let (text, ops) = self.rewriter.rewrite(
            body,
            &self.escapes,
            &mut self.analyzer,
            &mut self.input,
            &mut self.output,
        )?;
        self.analyzer.commit_predefined(&mut self.input);

        let artifact = assembler::assemble(
            name,
            &text,
            ops,
            &self.escapes,
            &self.analyzer,
            &self.input,
            &self.output,
        )?;
        info!(
            template = name,
            ops = artifact.program.len(),
            "compiled template"
        );
        Ok(artifact)
    }

    /// The inferred input shape of the last compile.
    pub fn input_holder(&self) -> &Holder {
        &self.input
    }

    /// The declared export shape of the last compile.
    pub fn output_holder(&self) -> &Holder {
        &self.output
    }

    fn clear(&mut self) {
        self.input.clear();
        self.output.clear();
        self.analyzer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{ExportArity, Op};

    #[test]
    fn test_compile_literal_template() {
        let mut engine = Engine::new();
        let artifact = engine.compile("plain", "<p>hello</p>").unwrap();
        assert_eq!(
            artifact.program,
            vec![Op::Append("<p>hello</p>".to_string())]
        );
        assert_eq!(artifact.dispatch.names(), vec!["root"]);
        assert!(!artifact.takes_data);
        assert_eq!(artifact.input_typedef, None);
    }

    #[test]
    fn test_compile_rejects_nul() {
        let mut engine = Engine::new();
        assert!(matches!(
            engine.compile("bad", "a\u{0}b"),
            Err(CompileError::NulInTemplate)
        ));
    }

    #[test]
    fn test_root_dispatch_arm_is_single() {
        let mut engine = Engine::new();
        let artifact = engine.compile("t", "x").unwrap();
        assert_eq!(artifact.dispatch.arity("root"), Some(ExportArity::Single));
    }

    #[test]
    fn test_state_cleared_between_compiles() {
        let mut engine = Engine::new();
        engine.compile("first", "{{= this.a }}").unwrap();
        let artifact = engine.compile("second", "static").unwrap();
        assert!(!engine.input_holder().has_entries());
        assert!(!artifact.takes_data);
    }

    #[test]
    fn test_takes_data_with_declared_input() {
        let mut engine = Engine::new();
        let artifact = engine.compile("t", "{{* this PageData }}x").unwrap();
        assert!(artifact.takes_data);
        assert_eq!(artifact.input_typedef, Some("PageData".to_string()));
    }

    #[test]
    fn test_explicit_typedef_overrides_inference() {
        let mut engine = Engine::new();
        engine
            .compile("t", "{{* this.x SomeType }}{{ use(this.x); }}")
            .unwrap();
        assert_eq!(
            engine.input_holder().get("x"),
            Some(&VarType::Named("SomeType".to_string()))
        );
    }
}
