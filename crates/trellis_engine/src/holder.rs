//! Variable holders.
//!
//! A holder is a name → type-descriptor registry. Each compile uses two
//! independent instances: one for the inferred input shape and one for the
//! declared output/export shape. Both are cleared at the start of every
//! compile.

use std::collections::HashMap;

use crate::types::VarType;

/// A name → [`VarType`] registry.
#[derive(Debug, Default)]
pub struct Holder {
    variables: HashMap<String, VarType>,
}

impl Holder {
    pub fn new() -> Self {
        Self {
            variables: HashMap::new(),
        }
    }

    /// Record a variable, replacing any previous descriptor.
    pub fn add(&mut self, name: impl Into<String>, var_type: VarType) {
        self.variables.insert(name.into(), var_type);
    }

    /// Look up a variable's descriptor.
    pub fn get(&self, name: &str) -> Option<&VarType> {
        self.variables.get(name)
    }

    /// Whether any variable has been recorded.
    pub fn has_entries(&self) -> bool {
        !self.variables.is_empty()
    }

    /// Whether a variable is flagged as a sequence.
    pub fn is_array(&self, name: &str) -> bool {
        self.get(name).is_some_and(VarType::is_array)
    }

    /// All recorded entries.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &VarType)> {
        self.variables.iter().map(|(n, t)| (n.as_str(), t))
    }

    /// Render the registry as a typedef block for documentation output.
    ///
    /// Entries are sorted by name; an empty holder renders as an empty
    /// string.
    pub fn typedef(&self) -> String {
        if self.variables.is_empty() {
            return String::new();
        }
        let mut names: Vec<&str> = self.variables.keys().map(String::as_str).collect();
        names.sort_unstable();
        let body = names
            .iter()
            .map(|name| format!("    {}: {}", name, self.variables[*name]))
            .collect::<Vec<_>>()
            .join(",\n");
        format!("{{\n{body}\n}}")
    }

    /// Forget all entries.
    pub fn clear(&mut self) {
        self.variables.clear();
    }
}
