//! Code generation
//!
//! Turns a validated strategy into Rust source for a self-contained strategy
//! struct built on [`crate::runtime`], plus a source map tying every generated
//! line back to the block or connection it came from.
//!
//! Blocks are emitted in execution order. Names (field handles and parameter
//! keys) are assigned in definition order, so reordering connections never
//! renames anything.

mod emitter;
mod rules;
pub mod source_map;
mod writer;

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use shared::{Config, DataKind, StrategyBlock, StrategyDefinition};
use thiserror::Error;

use crate::catalog::{BlockCatalog, BlockType};
use crate::naming;
use crate::topology;
use crate::validation::{StrategyValidator, ValidationError};

use emitter::{BlockEmitter, InputSlot, OutputSlot, ParamKind, ParamSlot, StateSlot};
use writer::{CodeWriter, LinePos};

pub use source_map::{Section, SourceLocation, SourceMap};

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("strategy has {} blocking validation finding(s)", .0.len())]
    Invalid(Vec<ValidationError>),

    #[error("strategy contains a circular dependency")]
    CircularDependency,

    #[error("block '{block_id}' has unsupported type '{block_type}'")]
    UnsupportedBlockType { block_id: String, block_type: String },

    #[error("connection '{connection_id}' cannot convert {from} to {to}")]
    UnsupportedConversion {
        connection_id: String,
        from: DataKind,
        to: DataKind,
    },

    #[error("port '{port_id}' of block '{block_id}' has kind {kind}, which has no runtime representation")]
    UnsupportedPortKind {
        block_id: String,
        port_id: String,
        kind: DataKind,
    },

    #[error("block '{block_id}' has no {member}")]
    IncompleteBlock { block_id: String, member: String },

    #[error("{option} {value:?} is not usable in generated code")]
    InvalidOption { option: &'static str, value: String },
}

/// Code generator options
#[derive(Debug, Clone, PartialEq)]
pub struct CodegenOptions {
    pub struct_name: String,
    /// Module path exposing `prelude`
    pub runtime_path: String,
    pub indent: usize,
    /// Refuse to compile when validation reports warnings
    pub deny_warnings: bool,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl CodegenOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            struct_name: config.struct_name.clone(),
            runtime_path: config.runtime_path.clone(),
            indent: config.codegen_indent,
            deny_warnings: config.deny_warnings,
        }
    }

    /// Reject names that would splice into uncompilable code
    pub fn check(&self) -> Result<(), CodegenError> {
        if !naming::is_ident(&self.struct_name) {
            return Err(CodegenError::InvalidOption {
                option: "struct name",
                value: self.struct_name.clone(),
            });
        }
        if !naming::is_module_path(&self.runtime_path) {
            return Err(CodegenError::InvalidOption {
                option: "runtime path",
                value: self.runtime_path.clone(),
            });
        }
        Ok(())
    }
}

/// Result of a successful compilation
#[derive(Debug, Clone, Serialize)]
pub struct CompiledStrategy {
    pub code: String,
    pub source_map: SourceMap,
    /// Block ids in the order `execute` runs them
    pub execution_order: Vec<String>,
    pub parameter_keys: Vec<String>,
    /// Non-blocking findings of the validation pass
    pub warnings: Vec<ValidationError>,
}

/// Compile with default options
pub fn generate(definition: &StrategyDefinition) -> Result<CompiledStrategy, CodegenError> {
    CodeGenerator::default().generate(definition)
}

/// Code Generator
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    options: CodegenOptions,
    catalog: BlockCatalog,
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new(CodegenOptions::default())
    }
}

/// Names and slots of one block, fixed before any code is emitted
struct BlockPlan<'a> {
    block: &'a StrategyBlock,
    block_type: BlockType,
    handle: String,
    params: Vec<ParamSlot>,
    outputs: Vec<OutputSlot>,
}

/// Everything emitted for one block
struct EmittedBlock<'a> {
    plan: &'a BlockPlan<'a>,
    state: Option<StateSlot>,
    update: Vec<emitter::Line>,
    consumed: Vec<(String, String)>,
}

#[derive(Default)]
struct Names {
    taken: HashSet<String>,
}

impl Names {
    fn claim(&mut self, base: String) -> String {
        if self.taken.insert(base.clone()) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}_{}", base, n);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

impl CodeGenerator {
    pub fn new(options: CodegenOptions) -> Self {
        Self {
            options,
            catalog: BlockCatalog::builtin(),
        }
    }

    /// Use `catalog` to fill in properties a stored block lacks
    pub fn with_catalog(mut self, catalog: BlockCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn options(&self) -> &CodegenOptions {
        &self.options
    }

    pub fn generate(&self, definition: &StrategyDefinition) -> Result<CompiledStrategy, CodegenError> {
        self.options.check()?;
        let report = StrategyValidator::report(definition);
        if report.has_cycle() {
            tracing::warn!(strategy_id = %definition.id, "compilation refused: circular dependency");
            return Err(CodegenError::CircularDependency);
        }
        let blocking = report.has_errors()
            || (self.options.deny_warnings && report.warnings().next().is_some());
        if blocking {
            let findings: Vec<ValidationError> = if report.has_errors() {
                report.into_errors()
            } else {
                report.issues
            };
            tracing::warn!(
                strategy_id = %definition.id,
                error_count = findings.len(),
                "compilation refused"
            );
            return Err(CodegenError::Invalid(findings));
        }
        let warnings = report.issues;

        let plans = self.plan(definition)?;
        let ordered = topology::order_indices(&definition.blocks, &definition.connections)
            .map_err(|_| CodegenError::CircularDependency)?;

        let outputs_by_port: HashMap<&str, &OutputSlot> = plans
            .iter()
            .flat_map(|p| p.outputs.iter())
            .map(|o| (o.port_id.as_str(), o))
            .collect();

        let mut emitted = Vec::with_capacity(ordered.len());
        for plan in ordered.iter().map(|&i| &plans[i]) {
            let inputs = self.resolve_inputs(definition, plan.block, &outputs_by_port)?;
            let mut e = BlockEmitter::new(plan.block, &plan.handle, &plan.params, &plan.outputs, inputs);
            rules::emit(plan.block_type, &mut e);
            e.check()?;
            tracing::debug!(
                block_id = %plan.block.id,
                block_type = %plan.block_type,
                lines = e.update.len(),
                "block emitted"
            );
            emitted.push(EmittedBlock {
                plan,
                consumed: e.consumed(),
                state: e.state,
                update: e.update,
            });
        }

        let (code, source_map) = self.assemble(definition, &emitted);
        let parameter_keys = emitted
            .iter()
            .flat_map(|b| b.plan.params.iter().map(|p| p.key.clone()))
            .collect();
        let execution_order = emitted.iter().map(|b| b.plan.block.id.clone()).collect();

        tracing::info!(
            strategy_id = %definition.id,
            block_count = emitted.len(),
            line_count = code.lines().count(),
            warning_count = warnings.len(),
            "strategy compiled"
        );

        Ok(CompiledStrategy {
            code,
            source_map,
            execution_order,
            parameter_keys,
            warnings,
        })
    }

    /// Resolve block types and assign every name, in definition order
    fn plan<'a>(&self, definition: &'a StrategyDefinition) -> Result<Vec<BlockPlan<'a>>, CodegenError> {
        let mut handles = Names::default();
        let mut fields = Names::default();
        let mut keys = Names::default();
        let mut plans = Vec::with_capacity(definition.blocks.len());

        for block in &definition.blocks {
            let block_type: BlockType =
                block
                    .block_type
                    .parse()
                    .map_err(|_| CodegenError::UnsupportedBlockType {
                        block_id: block.id.clone(),
                        block_type: block.block_type.clone(),
                    })?;
            let handle = handles.claim(naming::ident(&block.name));

            let mut properties: Vec<(&str, ParamKind, _)> = block
                .properties
                .iter()
                .map(|p| (p.name.as_str(), ParamKind::of(p.kind), p.value.clone()))
                .collect();
            if let Some(template) = self.catalog.template(block_type) {
                for spec in &template.properties {
                    if block.property(&spec.name).is_none() {
                        properties.push((spec.name.as_str(), ParamKind::of(spec.kind), spec.default.clone()));
                    }
                }
            }
            let params = properties
                .into_iter()
                .map(|(name, kind, value)| ParamSlot {
                    key: keys.claim(format!("{}_{}", block.name, name)),
                    property: name.to_string(),
                    field: fields.claim(format!("p_{}_{}", handle, naming::slug(name))),
                    kind,
                    value,
                })
                .collect();

            let outputs = block
                .outputs
                .iter()
                .map(|port| {
                    let field = fields.claim(format!("o_{}_{}", handle, naming::slug(&port.name)));
                    OutputSlot::new(&block.id, &port.id, &port.name, field, port.data_kind)
                })
                .collect::<Result<Vec<_>, _>>()?;

            plans.push(BlockPlan {
                block,
                block_type,
                handle,
                params,
                outputs,
            });
        }
        Ok(plans)
    }

    /// Input slots keyed by port slug; the last connection into a port wins
    fn resolve_inputs(
        &self,
        definition: &StrategyDefinition,
        block: &StrategyBlock,
        outputs_by_port: &HashMap<&str, &OutputSlot>,
    ) -> Result<HashMap<String, InputSlot>, CodegenError> {
        let mut inputs: HashMap<String, InputSlot> = block
            .inputs
            .iter()
            .map(|port| {
                (
                    naming::slug(&port.name),
                    InputSlot {
                        kind: port.data_kind,
                        source: None,
                    },
                )
            })
            .collect();

        for connection in definition.incoming(&block.id) {
            let Some(port) = block.input(&connection.target_input_id) else {
                continue;
            };
            let Some(output) = outputs_by_port.get(connection.source_output_id.as_str()) else {
                continue;
            };
            let expr = emitter::convert_expr(&connection.id, &output.field, output.kind, port.data_kind)?;
            if let Some(slot) = inputs.get_mut(&naming::slug(&port.name)) {
                slot.source = Some((connection.id.clone(), expr));
            }
        }
        Ok(inputs)
    }

    fn assemble(&self, definition: &StrategyDefinition, blocks: &[EmittedBlock<'_>]) -> (String, SourceMap) {
        let mut w = CodeWriter::new(self.options.indent);
        let mut map = SourceMap::default();
        let name = &self.options.struct_name;

        w.line(&format!(
            "// Generated from strategy {:?} ({}), version {}.",
            definition.name,
            comment_text(&definition.id),
            definition.version
        ));
        w.line("// Regenerate from the strategy definition instead of editing.");
        w.blank();
        w.line(&format!("use {}::prelude::*;", self.options.runtime_path));
        w.blank();

        // Struct
        w.line(&format!("/// Strategy {:?}", definition.name));
        w.line("#[derive(Debug, Clone)]");
        w.open(&format!("pub struct {} {{", name));
        for b in blocks {
            let block = b.plan.block;
            let pos = w.line(&block_comment(block));
            mark(&mut map, block, pos, Section::State);
            for p in &b.plan.params {
                let pos = w.line(&format!("{}: {},", p.field, p.kind.rust_type()));
                mark(&mut map, block, pos, Section::Parameter);
            }
            if let Some(s) = &b.state {
                let pos = w.line(&format!("{}: {},", s.field, s.ty));
                mark(&mut map, block, pos, Section::State);
            }
            for o in &b.plan.outputs {
                let pos = w.line(&format!("{}: {},", o.field, o.rust_type()));
                mark(&mut map, block, pos, Section::State);
            }
        }
        w.close("}");
        w.blank();

        w.line("#[allow(unused_mut, unused_variables, unreachable_code, clippy::all)]");
        w.open(&format!("impl {} {{", name));

        // new()
        w.open("pub fn new() -> Self {");
        w.open("Self {");
        for b in blocks {
            let block = b.plan.block;
            for p in &b.plan.params {
                let pos = w.line(&format!("{}: {},", p.field, p.initializer()));
                mark(&mut map, block, pos, Section::Init);
            }
            if let Some(s) = &b.state {
                let pos = w.line(&format!("{}: {},", s.field, s.init));
                mark(&mut map, block, pos, Section::Init);
            }
            for o in &b.plan.outputs {
                let pos = w.line(&format!("{}: {},", o.field, o.default_value()));
                mark(&mut map, block, pos, Section::Init);
            }
        }
        w.close("}");
        w.close("}");
        w.blank();

        // execute()
        w.line("/// Run every block once, in dependency order, for one market update");
        w.open("pub fn execute(&mut self, tick: &Tick) -> Vec<Signal> {");
        w.line("let mut signals = Vec::new();");
        for b in blocks {
            let block = b.plan.block;
            w.blank();
            let pos = w.line(&block_comment(block));
            mark(&mut map, block, pos, Section::Update);

            let mut written: Vec<(LinePos, &str)> = Vec::with_capacity(b.update.len());
            for line in &b.update {
                let pos = w.line_at(line.depth, &line.text);
                mark(&mut map, block, pos, Section::Update);
                written.push((pos, line.text.as_str()));
            }

            for (connection_id, expr) in &b.consumed {
                let found = written
                    .iter()
                    .find_map(|(pos, text)| find_expr(text, expr).map(|offset| (pos, offset)));
                if let Some((pos, offset)) = found {
                    map.add_connection(
                        connection_id,
                        SourceLocation {
                            line: pos.line,
                            column: pos.column() + offset,
                            section: Section::Update,
                        },
                    );
                }
            }
        }
        w.blank();
        w.line("signals");
        w.close("}");
        w.blank();

        // reset()
        w.line("/// Clear indicator history and outputs; parameters are kept");
        w.open("pub fn reset(&mut self) {");
        for b in blocks {
            let block = b.plan.block;
            if let Some(s) = &b.state {
                let pos = w.line(&format!("self.{} = {};", s.field, s.reinit));
                mark(&mut map, block, pos, Section::Reset);
            }
            for o in &b.plan.outputs {
                let pos = w.line(&format!("self.{} = {};", o.field, o.default_value()));
                mark(&mut map, block, pos, Section::Reset);
            }
        }
        w.close("}");
        w.blank();

        // get_parameter()
        w.open("pub fn get_parameter(&self, key: &str) -> Option<ParamValue> {");
        w.open("match key {");
        for b in blocks {
            for p in &b.plan.params {
                let pos = w.line(&format!("{:?} => Some({}),", p.key, p.getter()));
                mark(&mut map, b.plan.block, pos, Section::Parameter);
            }
        }
        w.line("_ => None,");
        w.close("}");
        w.close("}");
        w.blank();

        // set_parameter()
        w.line("/// Parameters shaping indicator state rebuild that state");
        w.open("pub fn set_parameter(&mut self, key: &str, value: ParamValue) -> Result<(), ParamError> {");
        w.open("match key {");
        for b in blocks {
            let block = b.plan.block;
            for p in &b.plan.params {
                let rebuild = b
                    .state
                    .as_ref()
                    .filter(|s| s.depends_on.iter().any(|d| d == &p.property));
                match rebuild {
                    None => {
                        let pos = w.line(&format!("{:?} => {},", p.key, p.setter()));
                        mark(&mut map, block, pos, Section::Parameter);
                    }
                    Some(s) => {
                        let pos = w.open(&format!("{:?} => {{", p.key));
                        mark(&mut map, block, pos, Section::Parameter);
                        let pos = w.line(&format!("{};", p.setter()));
                        mark(&mut map, block, pos, Section::Parameter);
                        let pos = w.line(&format!("self.{} = {};", s.field, s.reinit));
                        mark(&mut map, block, pos, Section::Parameter);
                        w.close("}");
                    }
                }
            }
        }
        w.line("_ => return Err(ParamError::Unknown(key.to_string())),");
        w.close("}");
        w.line("Ok(())");
        w.close("}");
        w.blank();

        // parameter_keys()
        w.open("pub fn parameter_keys() -> &'static [&'static str] {");
        w.open("&[");
        for b in blocks {
            for p in &b.plan.params {
                let pos = w.line(&format!("{:?},", p.key));
                mark(&mut map, b.plan.block, pos, Section::Parameter);
            }
        }
        w.close("]");
        w.close("}");
        w.close("}");
        w.blank();

        w.open(&format!("impl Default for {} {{", name));
        w.open("fn default() -> Self {");
        w.line("Self::new()");
        w.close("}");
        w.close("}");

        // Connections no rule read (superseded inputs) point at the target's first update line
        for connection in &definition.connections {
            if map.connections.contains_key(&connection.id) {
                continue;
            }
            let anchor = map
                .block_locations(&connection.target_block_id)
                .iter()
                .find(|l| l.section == Section::Update)
                .or_else(|| map.block_locations(&connection.target_block_id).first())
                .map(|l| SourceLocation {
                    line: l.line,
                    column: 1,
                    section: l.section,
                });
            if let Some(location) = anchor {
                map.add_connection(&connection.id, location);
            }
        }

        (w.finish(), map)
    }
}

fn mark(map: &mut SourceMap, block: &StrategyBlock, pos: LinePos, section: Section) {
    map.add_block(
        &block.id,
        SourceLocation {
            line: pos.line,
            column: pos.column(),
            section,
        },
    );
}

fn comment_text(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

fn block_comment(block: &StrategyBlock) -> String {
    format!(
        "// {} [{}] ({})",
        comment_text(&block.name),
        comment_text(&block.id),
        block.block_type
    )
}

/// Character offset of `expr` in `text`, matched on identifier boundaries
fn find_expr(text: &str, expr: &str) -> Option<usize> {
    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_';
    let mut start = 0;
    while let Some(found) = text[start..].find(expr) {
        let at = start + found;
        let end = at + expr.len();
        if !text[end..].starts_with(is_ident) {
            return Some(text[..at].chars().count());
        }
        start = at + 1;
        while !text.is_char_boundary(start) {
            start += 1;
        }
    }
    None
}
