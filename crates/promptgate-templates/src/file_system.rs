//! File system template loading
//!
//! One template per file, named by the file stem. Only the top level of the
//! directory is scanned.

use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{TemplateError, TemplateResult};
use crate::registry::{TemplateRegistry, DEFAULT_TEMPLATE_NAME, DEFAULT_TEMPLATE_SOURCE};

/// File extensions recognized as template sources
pub const TEMPLATE_EXTENSIONS: &[&str] = &["tmpl", "j2", "txt", "json"];

/// Extension of templates written in Go `text/template` syntax (`{{.Query}}`)
pub const LEGACY_TEMPLATE_EXTENSION: &str = "json";

/// Extension used when persisting the default template
pub const DEFAULT_TEMPLATE_EXTENSION: &str = "tmpl";

impl TemplateRegistry {
    /// Load every template found in `dir`
    ///
    /// The directory is created when missing. Files that cannot be read or
    /// compiled are logged and skipped. If nothing could be registered, the
    /// default template is registered and written to `dir` so later starts
    /// find it on disk.
    ///
    /// # Example
    /// ```no_run
    /// use promptgate_templates::TemplateRegistry;
    ///
    /// # #[tokio::main]
    /// # async fn main() -> anyhow::Result<()> {
    /// let registry = TemplateRegistry::load_dir("templates").await?;
    /// assert!(!registry.is_empty());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn load_dir<P: AsRef<Path>>(dir: P) -> TemplateResult<Self> {
        let dir = dir
            .as_ref()
            .absolutize()
            .map_err(|_| TemplateError::InvalidPath {
                path: dir.as_ref().to_path_buf(),
            })?
            .to_path_buf();

        if !fs::try_exists(&dir).await? {
            tracing::info!("Templates directory {} does not exist, creating it", dir.display());
            fs::create_dir_all(&dir).await?;
        }

        let mut registry = Self::new();

        for path in template_files(&dir).await? {
            let Some(name) = template_name(&path) else {
                continue;
            };

            if registry.contains(&name) {
                tracing::warn!(
                    "Skipping {}: a template named '{}' is already loaded",
                    path.display(),
                    name
                );
                continue;
            }

            let source = match fs::read_to_string(&path).await {
                Ok(source) => source,
                Err(source) => {
                    let err = TemplateError::Read { path, source };
                    tracing::warn!("{}", err);
                    continue;
                }
            };

            let source = if is_legacy_template(&path) {
                translate_legacy_source(&source)
            } else {
                source
            };

            match registry.register(name.clone(), source) {
                Ok(()) => tracing::debug!("Loaded template '{}' from {}", name, path.display()),
                Err(e) => tracing::warn!("{}", e),
            }
        }

        if registry.is_empty() {
            tracing::info!("No templates found, creating a default template");
            registry.register_default()?;

            let default_path =
                dir.join(format!("{}.{}", DEFAULT_TEMPLATE_NAME, DEFAULT_TEMPLATE_EXTENSION));
            if let Err(e) = fs::write(&default_path, DEFAULT_TEMPLATE_SOURCE).await {
                tracing::warn!(
                    "Failed to save default template to {}: {}",
                    default_path.display(),
                    e
                );
            }
        }

        tracing::info!(
            "Loaded {} template(s) from {}",
            registry.len(),
            dir.display()
        );

        Ok(registry)
    }
}

/// Recognized template files directly under `dir`, sorted by path
async fn template_files(dir: &Path) -> TemplateResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut entries = fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !entry.file_type().await?.is_file() {
            continue;
        }
        if is_template_file(&path) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

fn is_template_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| TEMPLATE_EXTENSIONS.contains(&ext))
}

fn is_legacy_template(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == LEGACY_TEMPLATE_EXTENSION)
}

/// Rewrite `{{.Query}}` actions (with optional `-` trim markers) into `{{ query }}`
///
/// Any other action is left as is and fails to compile or render later.
fn translate_legacy_source(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start + 2..].find("}}") else {
            break;
        };
        let end = start + 2 + len + 2;
        let action = &rest[start..end];
        let inner = &action[2..action.len() - 2];

        out.push_str(&rest[..start]);
        if inner.trim_matches(|c: char| c == '-' || c.is_whitespace()) == ".Query" {
            let left = if inner.starts_with('-') { "-" } else { "" };
            let right = if inner.ends_with('-') { "-" } else { "" };
            out.push_str(&format!("{{{{{} query {}}}}}", left, right));
        } else {
            out.push_str(action);
        }
        rest = &rest[end..];
    }

    out.push_str(rest);
    out
}

/// Template name for a source file: its file stem
fn template_name(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
}
