//! Intake Compose - rendered prose to letterhead PDF
//!
//! Two stages:
//! - **Normalize**: lightweight markdown becomes plain text
//! - **Compose**: plain text is wrapped, paginated and drawn onto the
//!   letterhead, overflowing onto blank pages
//!
//! # Example
//!
//! ```rust,ignore
//! use intake_compose::{normalize, Compositor, Letterhead};
//!
//! let letterhead = Letterhead::from_path("assets/letterhead.pdf").await?;
//! let bytes = Compositor::default().compose(&normalize(&markdown), &letterhead)?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod compositor;
pub mod error;
pub mod layout;
pub mod letterhead;
pub mod normalize;
mod pdf;

pub use compositor::{Compositor, PDF_CONTENT_TYPE};
pub use error::{ComposeError, ComposeResult};
pub use layout::{
    plan, wrap_words, LayoutPlan, LayoutSettings, PagePlan, PageSize, PageSource, PlacedLine,
};
pub use letterhead::Letterhead;
pub use normalize::normalize;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
