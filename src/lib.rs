//! Core entry point for the johnny_reports crate.
//!
//! Exports the Johnny Portal wellness and trust reports as PDF documents:
//! rows are read from the hosted database ([`store`]), a font is resolved
//! ([`fonts`]), the report is laid out ([`layout`]) and rendered
//! ([`render`]).  [`pipeline`] sequences those steps and [`http`] serves them.

pub mod config;
pub mod fonts;
pub mod http;
pub mod layout;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod store;
pub mod summary;
