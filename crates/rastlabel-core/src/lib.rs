//! `rastlabel-core` samples raster values and category labels at vector
//! point locations.
//!
//! All geospatial work is delegated to toolkit modules run through the
//! [`toolkit::Toolkit`] seam. This crate includes:
//! - **Name handling**: raster lists to qualified names and column identifiers.
//! - **Schema**: typed column declarations for the sampled layer.
//! - **Pipeline steps**: sampling, import, unlabeled sampling, join and metadata.
//! - **Cleanup**: a scoped registry removing temporary maps.
//!
//! [`pipeline::run`] ties the steps together.

pub mod cleanup;
pub mod environment;
pub mod error;
pub mod import;
pub mod join;
pub mod metadata;
pub mod names;
pub mod options;
pub mod pipeline;
pub mod sampler;
pub mod schema;
pub mod secondary;
pub mod toolkit;

#[cfg(test)]
mod testing;
