//! Template directory loading.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::RuntimeResult;
use crate::namespace::Namespace;

/// File extension recognized as a template source.
pub const TEMPLATE_EXTENSION: &str = "tpl";

/// Loads `*.tpl` files from a directory into a namespace.
pub struct TemplateLoader {
    templates_path: PathBuf,
}

impl TemplateLoader {
    pub fn new(templates_path: impl Into<PathBuf>) -> Self {
        Self {
            templates_path: templates_path.into(),
        }
    }

    /// Register every template file under the directory, keyed by file
    /// stem. Files that fail to read or compile are logged and skipped.
    /// Returns the number of templates registered.
    pub fn load_all(&self, namespace: &mut Namespace) -> RuntimeResult<usize> {
        if !self.templates_path.exists() {
            warn!(
                "Templates directory does not exist: {:?}",
                self.templates_path
            );
            return Ok(0);
        }

        let mut registered = 0;
        for entry in WalkDir::new(&self.templates_path)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || !has_template_extension(path) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match fs::read_to_string(path) {
                Ok(body) => match namespace.register(name, &body) {
                    Ok(_) => {
                        info!("Loaded template: {} ({:?})", name, path);
                        registered += 1;
                    }
                    Err(e) => warn!("Failed to compile template {:?}: {}", path, e),
                },
                Err(e) => warn!("Failed to read template {:?}: {}", path, e),
            }
        }
        Ok(registered)
    }
}

fn has_template_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(TEMPLATE_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_loader_missing_dir() {
        let mut ns = Namespace::new();
        let loader = TemplateLoader::new("definitely/not/here");
        assert_eq!(loader.load_all(&mut ns).unwrap(), 0);
    }

    #[test]
    fn test_loader_registers_by_stem() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("card.tpl"), "<div>{{= this.t }}</div>").unwrap();
        fs::write(temp.path().join("notes.txt"), "not a template").unwrap();

        let mut ns = Namespace::new();
        let loader = TemplateLoader::new(temp.path());
        assert_eq!(loader.load_all(&mut ns).unwrap(), 1);
        assert!(ns.contains_template("card"));
        assert!(!ns.contains_template("notes"));
    }

    #[test]
    fn test_loader_skips_broken_template() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("ok.tpl"), "fine").unwrap();
        fs::write(temp.path().join("broken.tpl"), "{{# 7bad }}").unwrap();

        let mut ns = Namespace::new();
        let loader = TemplateLoader::new(temp.path());
        assert_eq!(loader.load_all(&mut ns).unwrap(), 1);
        assert!(ns.contains_template("ok"));
        assert!(!ns.contains_template("broken"));
    }
}
