//! # store_offers
//!
//! Collects promotional offers from store listing pages whose markup is
//! unstable, and exports them as a compact grouped CSV.
//!
//! ## Architecture
//!
//! The pipeline runs one store at a time:
//! 1. **Rendering**: load the store page ([`render`])
//! 2. **Extraction**: locate offer containers with an ordered strategy chain
//!    and read a title and description out of each ([`scrapers`])
//! 3. **Deduplication**: drop repeated offers across the whole run ([`dedup`])
//! 4. **Output**: write the grouped CSV table and optional JSON ([`outputs`])
//!
//! [`runner::OfferRun`] drives the loop, paces requests, and keeps going
//! when individual stores fail.

pub mod cli;
pub mod config;
pub mod dedup;
pub mod error;
pub mod identity;
pub mod models;
pub mod outputs;
pub mod page;
pub mod render;
pub mod runner;
pub mod scrapers;
pub mod utils;
