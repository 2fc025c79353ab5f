//! Intake Templates - choose, load and fill case templates
//!
//! Covers everything between a case record and rendered prose:
//! - **Resolve**: tier tables map (category, quality) to template ids
//! - **Parse**: checklist templates become task seeds
//! - **Load**: catalogs serve template sources, cached by id
//! - **Render**: Handlebars fills a typed case context
//!
//! # Example
//!
//! ```rust,ignore
//! use intake_templates::{EmbeddedCatalog, TemplateRenderer, TemplateResolver, TierTable};
//!
//! let resolver = TemplateResolver::new(TierTable::documents());
//! let ids = resolver.resolve(case.case_category(), case.quality_tier());
//!
//! let renderer = TemplateRenderer::new(Arc::new(EmbeddedCatalog::new()), firm);
//! let prose = renderer.render(&ids[0], &case).await?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod cache;
pub mod catalog;
pub mod checklist;
pub mod context;
pub mod error;
pub mod renderer;
pub mod resolver;

pub use cache::{CachedCatalog, CatalogCacheStats};
pub use catalog::{EmbeddedCatalog, FsCatalog, LayeredCatalog, TemplateCatalog, TemplateId};
pub use checklist::{dedup_seeds, parse_checklist, TaskSeed};
pub use context::{format_currency, format_date, CaseContext, CONTEXT_VERSION};
pub use error::{TemplateError, TemplateResult};
pub use renderer::TemplateRenderer;
pub use resolver::{CategoryTier, QualityTemplates, TemplateResolver, TierTable};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
