//! The list of files a template cache is built from.

use crate::error::TemplateError;
use std::fs;
use std::path::{Path, PathBuf};

/// Name the base layout is registered under in every template set.
pub const BASE_TEMPLATE: &str = "base.html";

/// Prefix partials are registered under, e.g. `partials/nav.html`.
pub const PARTIALS_PREFIX: &str = "partials/";

/// One base layout, the shared partials and the page fragments.
///
/// Conventional layout on disk:
///
/// ```text
/// ui/html/
/// ├── base.html
/// ├── partials/
/// │   └── nav.html
/// └── pages/
///     ├── home.html
///     └── view.html
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInventory {
    base: Option<PathBuf>,
    partials: Vec<PathBuf>,
    pages: Vec<PathBuf>,
}

impl PageInventory {
    /// An empty inventory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans `root/base.html`, `root/partials/*.html` and `root/pages/*.html`.
    ///
    /// A missing `partials` directory means no partials. A missing base
    /// layout is reported when the cache is built. A missing `pages`
    /// directory is an error.
    pub fn from_dir(root: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let root = root.as_ref();
        let base = root.join(BASE_TEMPLATE);

        let partials_dir = root.join("partials");
        let partials = if partials_dir.is_dir() {
            html_files(&partials_dir)?
        } else {
            Vec::new()
        };

        Self {
            base: base.is_file().then_some(base),
            partials,
            pages: Vec::new(),
        }
        .with_pages_dir(root.join("pages"))
    }

    /// Sets the base layout file.
    pub fn with_base(mut self, path: impl Into<PathBuf>) -> Self {
        self.base = Some(path.into());
        self
    }

    /// Adds a partial file.
    pub fn with_partial(mut self, path: impl Into<PathBuf>) -> Self {
        self.partials.push(path.into());
        self
    }

    /// Adds every `*.html` file in `dir` as a page.
    pub fn with_pages_dir(mut self, dir: impl AsRef<Path>) -> Result<Self, TemplateError> {
        self.pages.extend(html_files(dir.as_ref())?);
        Ok(self)
    }

    /// Adds a single page file.
    pub fn with_page(mut self, path: impl Into<PathBuf>) -> Self {
        self.pages.push(path.into());
        self
    }

    /// The base layout, if one was found or set.
    #[must_use]
    pub fn base(&self) -> Option<&Path> {
        self.base.as_deref()
    }

    /// Partial files, in registration order.
    #[must_use]
    pub fn partials(&self) -> &[PathBuf] {
        &self.partials
    }

    /// Page files, in registration order.
    #[must_use]
    pub fn pages(&self) -> &[PathBuf] {
        &self.pages
    }
}

/// The name a file is registered under: its file name.
pub(crate) fn file_name(path: &Path) -> Result<&str, TemplateError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            TemplateError::Inventory(format!(
                "template file name is not valid UTF-8: {}",
                path.display()
            ))
        })
}

/// Regular `*.html` files directly in `dir`, sorted by path.
fn html_files(dir: &Path) -> Result<Vec<PathBuf>, TemplateError> {
    let io_error = |source| TemplateError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "html") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
