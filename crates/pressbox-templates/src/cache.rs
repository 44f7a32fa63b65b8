//! Precompiled template sets keyed by page name.

use crate::envelope::RenderEnvelope;
use crate::error::{describe, TemplateError};
use crate::filters;
use crate::inventory::{file_name, PageInventory, BASE_TEMPLATE, PARTIALS_PREFIX};
use bytes::Bytes;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};

/// One compiled page: base layout, partials and the page fragment.
///
/// Each set owns its own [`Tera`] instance, so two pages may define the
/// same block names without clashing.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    page: String,
    tera: Tera,
}

impl TemplateSet {
    fn compile(
        page: &str,
        base: &str,
        partials: &[(String, String)],
        fragment: String,
    ) -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        filters::register(&mut tera);

        let mut sources = Vec::with_capacity(partials.len() + 2);
        sources.push((BASE_TEMPLATE.to_string(), base.to_string()));
        sources.extend(partials.iter().cloned());
        sources.push((page.to_string(), fragment));

        // One call so that inheritance is resolved and checked now.
        tera.add_raw_templates(sources)
            .map_err(|error| TemplateError::Parse {
                page: page.to_string(),
                message: describe(&error),
            })?;

        Ok(Self {
            page: page.to_string(),
            tera,
        })
    }

    /// The page name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.page
    }

    /// Names of every template in the set, sorted.
    #[must_use]
    pub fn template_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tera.get_template_names().collect();
        names.sort_unstable();
        names
    }

    /// Executes the page into a string.
    pub fn render(&self, context: &Context) -> Result<String, TemplateError> {
        self.tera
            .render(&self.page, context)
            .map_err(|error| TemplateError::Render {
                page: self.page.clone(),
                message: describe(&error),
            })
    }
}

/// Immutable map from page name to its compiled [`TemplateSet`].
///
/// Built once at startup; every lookup afterwards is a hash-map read with
/// no filesystem access.
///
/// ```no_run
/// use pressbox_templates::{PageInventory, RenderEnvelope, TemplateCache};
///
/// # fn main() -> Result<(), pressbox_templates::TemplateError> {
/// let cache = TemplateCache::build(&PageInventory::from_dir("./ui/html")?)?;
/// let html = cache.render("home.html", &RenderEnvelope::new(2024))?;
/// # let _ = html;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct TemplateCache {
    sets: HashMap<String, TemplateSet>,
}

impl TemplateCache {
    /// Compiles a template set for every page in `inventory`.
    ///
    /// Any failure fails the whole build.
    pub fn build(inventory: &PageInventory) -> Result<Self, TemplateError> {
        let base_path = inventory
            .base()
            .ok_or_else(|| TemplateError::Inventory("no base layout".to_string()))?;
        let base = read(base_path)?;

        let mut partials = Vec::with_capacity(inventory.partials().len());
        for path in inventory.partials() {
            let name = format!("{PARTIALS_PREFIX}{}", file_name(path)?);
            partials.push((name, read(path)?));
        }

        let mut origins: HashMap<&str, &PathBuf> = HashMap::new();
        let mut sets = HashMap::with_capacity(inventory.pages().len());
        for path in inventory.pages() {
            let page = file_name(path)?;
            if let Some(first) = origins.insert(page, path) {
                return Err(TemplateError::DuplicatePage {
                    name: page.to_string(),
                    first: first.clone(),
                    second: path.clone(),
                });
            }

            let set = TemplateSet::compile(page, &base, &partials, read(path)?)?;
            tracing::debug!(page = page, templates = ?set.template_names(), "compiled template set");
            sets.insert(page.to_string(), set);
        }

        tracing::info!(pages = sets.len(), partials = partials.len(), "template cache built");
        Ok(Self { sets })
    }

    /// Looks up a compiled page.
    #[must_use]
    pub fn get(&self, page: &str) -> Option<&TemplateSet> {
        self.sets.get(page)
    }

    /// Page names, sorted.
    #[must_use]
    pub fn page_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Returns `true` if no pages were built.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Renders `page` with `envelope` into a fully buffered body.
    ///
    /// Nothing is returned unless the whole page rendered.
    pub fn render(&self, page: &str, envelope: &RenderEnvelope) -> Result<Bytes, TemplateError> {
        let set = self
            .get(page)
            .ok_or_else(|| TemplateError::PageNotFound(page.to_string()))?;
        set.render(&envelope.to_context()).map(Bytes::from)
    }
}

fn read(path: &Path) -> Result<String, TemplateError> {
    fs::read_to_string(path).map_err(|source| TemplateError::Io {
        path: path.to_path_buf(),
        source,
    })
}
