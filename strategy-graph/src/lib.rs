//! Strategy-Graph: block-based trading strategies for WiseTrader
//!
//! Users assemble strategies on a canvas from typed blocks (market data,
//! indicators, logic, actions) wired by typed connections. This crate owns the
//! engine behind that editor:
//!
//! - **Catalog**: the templates blocks are instantiated from
//! - **Graph editing**: snapshot-in, snapshot-out mutations with connection checks
//! - **Validation**: structural, type and data-flow findings for the editor
//! - **Topology**: execution order and cycle detection
//! - **Code generation**: Rust source for a runnable strategy, with a source map
//! - **Runtime**: the support library generated strategies link against
//!
//! # Example
//!
//! ```no_run
//! use strategy_graph::prelude::*;
//!
//! fn compile(json: &str) -> anyhow::Result<String> {
//!     let definition = StrategyDefinition::from_json(json)?;
//!     let report = StrategyValidator::report(&definition);
//!     for warning in report.warnings() {
//!         println!("{}", warning);
//!     }
//!     Ok(generate(&definition)?.code)
//! }
//! ```

pub mod catalog;
pub mod codegen;
pub mod compat;
pub mod graph;
pub mod naming;
pub mod runtime;
pub mod topology;
pub mod validation;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::catalog::{BlockCatalog, BlockTemplate, BlockType};
    pub use crate::codegen::{
        generate, CodeGenerator, CodegenError, CodegenOptions, CompiledStrategy, SourceMap,
    };
    pub use crate::compat::is_compatible;
    pub use crate::graph::{apply, save, EditError, GraphOp};
    pub use crate::topology::{has_cycle, order, would_create_cycle, CycleError};
    pub use crate::validation::{
        ConnectionValidator, ErrorCode, Severity, StrategyValidator, ValidationError,
        ValidationReport,
    };
    pub use shared::{
        BlockCategory, BlockConnection, DataKind, Position, PropertyValue, Size, StrategyBlock,
        StrategyDefinition,
    };
}
