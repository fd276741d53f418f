//! LogLifeCycle - lifecycle trace logging for compiled Android components
//!
//! This library decides which compiled classes to instrument (marked and
//! descending from a framework component), gathers their declared and
//! inherited lifecycle callbacks, and hands a fixed trace statement for each
//! overridable `on...` method to a weaver. One bad method never aborts its
//! class; one bad class never aborts the pass.

pub mod category;
pub mod cli;
pub mod collector;
pub mod config;
pub mod filter;
pub mod gate;
pub mod model;
pub mod output;
pub mod pass;
pub mod pool;
pub mod statement;
pub mod transformer;
pub mod weaver;
