//! Offer scraping for store listing pages.
//!
//! - [`strategies`]: ordered container and field selectors
//! - [`offers`]: the extraction chain that applies them to a page
//!
//! Extraction never fails: missing elements fall back to raw text or the
//! container is skipped. Loading the page is the job of
//! [`crate::render::Renderer`], which runs before [`offers::extract`].

pub mod offers;
pub mod strategies;
