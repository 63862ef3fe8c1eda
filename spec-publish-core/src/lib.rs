#![doc = "spec-publish-core: core logic library for spec-publish."]

//! This crate holds the data model, content rendering and page-tree
//! materialization for spec-publish. It talks to remote services only
//! through the traits in [`contract`]; concrete HTTP clients live in the
//! CLI crate.
//!
//! # Usage
//! - [`pipeline::generate`] turns source documents into a tree file.
//! - [`pipeline::publish`] turns a tree file into a remote page hierarchy.

pub mod block;
pub mod config;
pub mod contract;
pub mod error;
pub mod generate;
pub mod materialize;
pub mod pipeline;
pub mod render;
pub mod source;
pub mod tree;
