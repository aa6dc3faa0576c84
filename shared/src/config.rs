use dotenv::dotenv;

/// Engine configuration read from the environment (and `.env`)
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Name of the struct emitted by the code generator
    pub struct_name: String,
    /// Module path generated code imports its runtime support from
    pub runtime_path: String,
    /// Spaces per indentation level in generated code
    pub codegen_indent: usize,
    /// Treat validation warnings as blocking when compiling
    pub deny_warnings: bool,
    /// Emit logs as JSON lines
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            struct_name: "GeneratedStrategy".to_string(),
            runtime_path: "strategy_graph::runtime".to_string(),
            codegen_indent: 4,
            deny_warnings: false,
            log_json: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenv().ok();
        let defaults = Self::default();

        Ok(Config {
            struct_name: std::env::var("STRATEGY_STRUCT_NAME")
                .unwrap_or(defaults.struct_name),
            runtime_path: std::env::var("STRATEGY_RUNTIME_PATH")
                .unwrap_or(defaults.runtime_path),
            codegen_indent: match std::env::var("STRATEGY_CODEGEN_INDENT") {
                Ok(raw) => raw.parse().map_err(|e| {
                    anyhow::anyhow!("STRATEGY_CODEGEN_INDENT must be a number: {}", e)
                })?,
                Err(_) => defaults.codegen_indent,
            },
            deny_warnings: std::env::var("STRATEGY_DENY_WARNINGS")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            log_json: std::env::var("STRATEGY_LOG_JSON")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
        })
    }
}
