//! Input-shape analysis.
//!
//! The analyzer watches how directive bodies use input variables
//! (`this.<name>` references) and merges each observation into the input
//! holder through a small lattice, so conflicting uses degrade to
//! `unknown` instead of picking an arbitrary winner. Explicit type
//! declarations bypass inference: they are collected during the pass and
//! committed after it, overwriting anything inference recorded.

use std::collections::HashMap;

use regex::Regex;
use tracing::debug;

use crate::error::{CompileError, CompileResult};
use crate::holder::Holder;
use crate::types::VarType;

/// Merge a new observation into the current descriptor.
///
/// `string` is near-absorbing at the bottom of the lattice and `unknown`
/// is the top; an explicitly `Named` descriptor is never changed by an
/// observation.
pub fn merge(current: &VarType, observed: &VarType) -> VarType {
    match observed {
        VarType::String => match current {
            VarType::Unknown => VarType::String,
            VarType::String => VarType::String,
            _ => VarType::Unknown,
        },
        VarType::Array(_) => match current {
            VarType::Object | VarType::Unknown => VarType::Unknown,
            other => other.clone(),
        },
        VarType::Object => match current {
            VarType::Array(_) | VarType::Unknown => VarType::Unknown,
            other => other.clone(),
        },
        VarType::Unknown => match current {
            VarType::String => VarType::String,
            VarType::Named(name) => VarType::Named(name.clone()),
            _ => VarType::Unknown,
        },
        VarType::Named(_) => current.clone(),
    }
}

/// Observes input-variable uses and explicit type declarations.
#[derive(Debug)]
pub struct Analyzer {
    reference_pattern: Regex,
    typedef_pattern: Regex,
    pre_types: HashMap<String, String>,
    pre_input_type: Option<String>,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            reference_pattern: Regex::new(
                r"this\.([A-Za-z_][A-Za-z0-9_]*)(\[[^\]]+\])?([A-Za-z0-9_.]*)",
            )
            .unwrap(),
            typedef_pattern: Regex::new(r"(?s)^\s*this(\.[A-Za-z_][A-Za-z0-9_.]*)?\s+(.+)$")
                .unwrap(),
            pre_types: HashMap::new(),
            pre_input_type: None,
        }
    }

    /// Scan a directive body for `this.<name>` references and merge each
    /// observation into the input holder.
    ///
    /// Classification: a subscript or a trailing `.length` reads as an
    /// array; any other property chain reads as an object; a bare
    /// reference reads as unknown inside an evaluate block and as a
    /// string everywhere else.
    pub fn extract(&self, code: &str, is_evaluation: bool, holder: &mut Holder) {
        for caps in self.reference_pattern.captures_iter(code) {
            let name = &caps[1];
            let subscripted = caps.get(2).is_some();
            let property = caps.get(3).map_or("", |m| m.as_str());

            let observed = if subscripted {
                VarType::Array(None)
            } else if let Some(property) = property.strip_prefix('.') {
                if property == "length" {
                    VarType::Array(None)
                } else {
                    VarType::Object
                }
            } else if is_evaluation {
                VarType::Unknown
            } else {
                VarType::String
            };

            let merged = match holder.get(name) {
                Some(current) => merge(current, &observed),
                None => observed,
            };
            holder.add(name, merged);
        }
    }

    /// Parse an explicit typedef directive body.
    ///
    /// `this.<name> <type>` records a per-property override; `this <type>`
    /// records the whole-input type, short-circuiting inference for the
    /// input itself.
    pub fn parse(&mut self, decl: &str) -> CompileResult<()> {
        let caps = self
            .typedef_pattern
            .captures(decl)
            .ok_or_else(|| CompileError::BadTypedef(decl.trim().to_string()))?;
        let declared = caps[2].trim_end().to_string();
        match caps.get(1) {
            Some(property) => {
                let name = property.as_str().trim_start_matches('.').to_string();
                debug!(name = %name, ty = %declared, "predefined property type");
                self.pre_types.insert(name, declared);
            }
            None => {
                debug!(ty = %declared, "predefined input type");
                self.pre_input_type = Some(declared);
            }
        }
        Ok(())
    }

    /// Copy the collected per-property overrides into the input holder.
    ///
    /// Runs once after the whole rewrite pass, so explicit declarations
    /// overwrite inferred entries of the same name.
    pub fn commit_predefined(&self, holder: &mut Holder) {
        for (name, declared) in &self.pre_types {
            holder.add(name.clone(), VarType::Named(declared.clone()));
        }
    }

    /// The predefined whole-input type, if declared.
    pub fn input_type(&self) -> Option<&str> {
        self.pre_input_type.as_deref()
    }

    /// Forget collected declarations; called at the start of a compile.
    pub fn clear(&mut self) {
        self.pre_types.clear();
        self.pre_input_type = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_one(code: &str, is_evaluation: bool) -> Option<VarType> {
        let analyzer = Analyzer::new();
        let mut holder = Holder::new();
        analyzer.extract(code, is_evaluation, &mut holder);
        holder.get("x").cloned()
    }

    #[test]
    fn test_classify_subscript_as_array() {
        assert_eq!(extract_one("this.x[0]", false), Some(VarType::Array(None)));
        assert_eq!(extract_one("this.x[i]", true), Some(VarType::Array(None)));
    }

    #[test]
    fn test_classify_length_as_array() {
        assert_eq!(
            extract_one("this.x.length", true),
            Some(VarType::Array(None))
        );
    }

    #[test]
    fn test_classify_property_as_object() {
        assert_eq!(extract_one("this.x.title", false), Some(VarType::Object));
    }

    #[test]
    fn test_classify_bare_reference() {
        assert_eq!(extract_one("this.x", false), Some(VarType::String));
        assert_eq!(extract_one("this.x", true), Some(VarType::Unknown));
    }

    #[test]
    fn test_merge_table() {
        use VarType::*;
        // new observation: string
        assert_eq!(merge(&Unknown, &String), String);
        assert_eq!(merge(&Array(None), &String), Unknown);
        assert_eq!(merge(&Object, &String), Unknown);
        assert_eq!(merge(&String, &String), String);
        // new observation: array
        assert_eq!(merge(&Object, &Array(None)), Unknown);
        assert_eq!(merge(&Unknown, &Array(None)), Unknown);
        assert_eq!(merge(&Array(None), &Array(None)), Array(None));
        assert_eq!(merge(&String, &Array(None)), String);
        // new observation: object
        assert_eq!(merge(&Array(None), &Object), Unknown);
        assert_eq!(merge(&Unknown, &Object), Unknown);
        assert_eq!(merge(&Object, &Object), Object);
        assert_eq!(merge(&String, &Object), String);
        // new observation: unknown
        assert_eq!(merge(&Array(None), &Unknown), Unknown);
        assert_eq!(merge(&Object, &Unknown), Unknown);
        assert_eq!(merge(&Unknown, &Unknown), Unknown);
        assert_eq!(merge(&String, &Unknown), String);
    }

    #[test]
    fn test_string_survives_later_observations() {
        // string, then array, then unknown: string survives throughout.
        let analyzer = Analyzer::new();
        let mut holder = Holder::new();
        analyzer.extract("this.x", false, &mut holder);
        analyzer.extract("this.x[0]", false, &mut holder);
        analyzer.extract("this.x", true, &mut holder);
        assert_eq!(holder.get("x"), Some(&VarType::String));
    }

    #[test]
    fn test_parse_property_typedef() {
        let mut analyzer = Analyzer::new();
        analyzer.parse("this.user UserRecord").unwrap();
        let mut holder = Holder::new();
        holder.add("user", VarType::Unknown);
        analyzer.commit_predefined(&mut holder);
        assert_eq!(
            holder.get("user"),
            Some(&VarType::Named("UserRecord".to_string()))
        );
    }

    #[test]
    fn test_parse_whole_input_typedef() {
        let mut analyzer = Analyzer::new();
        analyzer
            .parse("this {name: string, items: array}")
            .unwrap();
        assert_eq!(analyzer.input_type(), Some("{name: string, items: array}"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let mut analyzer = Analyzer::new();
        assert!(analyzer.parse("not a typedef").is_err());
        assert!(analyzer.parse("this").is_err());
    }

    #[test]
    fn test_clear_forgets_declarations() {
        let mut analyzer = Analyzer::new();
        analyzer.parse("this.x T").unwrap();
        analyzer.parse("this U").unwrap();
        analyzer.clear();
        assert_eq!(analyzer.input_type(), None);
        let mut holder = Holder::new();
        analyzer.commit_predefined(&mut holder);
        assert!(!holder.has_entries());
    }
}
