//! Tool System
//!
//! Tools are registered at startup and reached by the turn loop through the
//! [`ToolGateway`] trait. [`ToolRegistry`] is the in-process gateway; a remote
//! gateway lives in `agent-runtime`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{AgentError, Result};

/// Tool arguments keyed by parameter name
pub type Arguments = HashMap<String, serde_json::Value>;

/// Identifiers of the tools the assistant knows how to call
pub mod names {
    pub const LIST_PRODUCTS: &str = "list_products";
    pub const GET_PRODUCT: &str = "get_product";
    pub const ADD_PRODUCT: &str = "add_product";
    pub const GET_STATS: &str = "get_stats";
    pub const CALCULATOR: &str = "calculator";
    pub const FORMATTER: &str = "formatter";
}

/// Tool call request from a decision engine
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool identifier
    #[serde(alias = "tool")]
    pub name: String,

    /// Arguments as key-value pairs
    #[serde(default)]
    pub arguments: Arguments,

    /// Optional call ID for tracking
    #[serde(default)]
    pub id: Option<String>,
}

impl ToolCall {
    /// Create a call with a fresh tracking ID
    pub fn new(name: impl Into<String>, arguments: Arguments) -> Self {
        Self {
            name: name.into(),
            arguments,
            id: Some(uuid::Uuid::new_v4().to_string()),
        }
    }

    /// Read a numeric argument
    pub fn number(&self, key: &str) -> Option<f64> {
        self.arguments.get(key).and_then(serde_json::Value::as_f64)
    }

    /// Read a string argument
    pub fn string(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(serde_json::Value::as_str)
    }
}

/// Result from tool execution
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolResult {
    /// Tool that was called
    pub name: String,

    /// Call ID (if provided in request)
    pub id: Option<String>,

    /// Whether execution succeeded
    pub success: bool,

    /// Output (payload text or error)
    pub output: String,
}

impl ToolResult {
    pub fn success(name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            success: true,
            output: output.into(),
        }
    }

    pub fn failure(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            success: false,
            output: error.into(),
        }
    }

    /// Successful result carrying a JSON payload
    pub fn json<T: Serialize>(name: impl Into<String>, value: &T) -> Result<Self> {
        Ok(Self::success(name, serde_json::to_string(value)?))
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Parameter definition for tool schema
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name
    pub name: String,

    /// JSON Schema type (string, number, integer, boolean)
    #[serde(rename = "type")]
    pub param_type: String,

    /// Human-readable description
    pub description: String,

    /// Whether this parameter is required
    #[serde(default)]
    pub required: bool,

    /// Default value if not provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,

    /// Enum of allowed values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<serde_json::Value>>,
}

impl ParameterSchema {
    /// A required parameter without default or enum
    pub fn required(
        name: impl Into<String>,
        param_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
            description: description.into(),
            required: true,
            default: None,
            enum_values: None,
        }
    }

    /// An optional parameter with a default value
    pub fn optional(
        name: impl Into<String>,
        param_type: impl Into<String>,
        description: impl Into<String>,
        default: serde_json::Value,
    ) -> Self {
        Self {
            required: false,
            default: Some(default),
            ..Self::required(name, param_type, description)
        }
    }
}

/// Tool definition schema (for discovery and model prompting)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Unique tool identifier
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// Parameter definitions
    pub parameters: Vec<ParameterSchema>,

    /// Category for grouping
    #[serde(default)]
    pub category: Option<String>,

    /// Whether tool has side effects
    #[serde(default)]
    pub has_side_effects: bool,
}

/// Tool trait - implement to add new capabilities
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool's schema
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with given arguments
    async fn execute(&self, call: &ToolCall) -> Result<ToolResult>;

    /// Validate arguments before execution
    fn validate(&self, call: &ToolCall) -> Result<()> {
        let schema = self.schema();

        for param in &schema.parameters {
            if param.required && !call.arguments.contains_key(&param.name) {
                return Err(AgentError::ToolValidation(format!(
                    "Missing required parameter: {}",
                    param.name
                )));
            }
        }

        Ok(())
    }
}

/// How the turn loop reaches tools.
///
/// `invoke` returns the tool's textual payload; every failure (unknown tool,
/// bad arguments, a failing tool, a broken transport) comes back as `Err`.
#[async_trait]
pub trait ToolGateway: Send + Sync {
    /// Invoke a tool by name
    async fn invoke(&self, name: &str, arguments: &Arguments) -> Result<String>;

    /// Describe the available tools
    async fn list_tools(&self) -> Result<Vec<ToolSchema>>;

    /// Names of the available tools
    async fn tool_names(&self) -> Result<Vec<String>> {
        Ok(self.list_tools().await?.into_iter().map(|s| s.name).collect())
    }
}

/// Registry for available tools
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Registry preloaded with the built-in tools
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(CalculatorTool);
        registry.register(FormatterTool);
        registry
    }

    /// Register a new tool
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let schema = tool.schema();
        self.tools.insert(schema.name, Arc::new(tool));
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Execute a tool call
    pub async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        let tool = self
            .get(&call.name)
            .ok_or_else(|| AgentError::ToolNotFound(call.name.clone()))?;

        tool.validate(call)?;

        let mut result = tool.execute(call).await?;
        result.id.clone_from(&call.id);
        Ok(result)
    }

    /// All tool schemas, sorted by name
    pub fn schemas(&self) -> Vec<ToolSchema> {
        let mut schemas: Vec<_> = self.tools.values().map(|t| t.schema()).collect();
        schemas.sort_by(|a, b| a.name.cmp(&b.name));
        schemas
    }

    /// Tool names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[async_trait]
impl ToolGateway for ToolRegistry {
    async fn invoke(&self, name: &str, arguments: &Arguments) -> Result<String> {
        let call = ToolCall::new(name, arguments.clone());
        let result = self.execute(&call).await?;

        if result.success {
            Ok(result.output)
        } else {
            Err(AgentError::ToolExecution(result.output))
        }
    }

    async fn list_tools(&self) -> Result<Vec<ToolSchema>> {
        Ok(self.schemas())
    }
}

/// Render a tool listing for a model system prompt
pub fn describe_tools(schemas: &[ToolSchema]) -> String {
    let mut prompt = String::from("## Available Tools\n\n");
    prompt.push_str("You can use the following tools by responding with a JSON block:\n\n");
    prompt.push_str(
        "```tool\n{\"tool\": \"tool_name\", \"arguments\": {\"arg\": \"value\"}}\n```\n\n",
    );

    for schema in schemas {
        prompt.push_str(&format!("### {}\n", schema.name));
        prompt.push_str(&format!("{}\n", schema.description));

        if !schema.parameters.is_empty() {
            prompt.push_str("**Parameters:**\n");
            for param in &schema.parameters {
                let required = if param.required { " (required)" } else { "" };
                prompt.push_str(&format!(
                    "- `{}` ({}){}: {}\n",
                    param.name, param.param_type, required, param.description
                ));
            }
        }
        prompt.push('\n');
    }

    prompt
}

// ============================================================================
// Built-in Tools
// ============================================================================

/// Calculator tool - applies one arithmetic operation to two operands
pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: names::CALCULATOR.into(),
            description: "Perform basic arithmetic operations.".into(),
            parameters: vec![
                ParameterSchema {
                    enum_values: Some(vec![
                        serde_json::json!("add"),
                        serde_json::json!("subtract"),
                        serde_json::json!("multiply"),
                        serde_json::json!("divide"),
                    ]),
                    ..ParameterSchema::required(
                        "operation",
                        "string",
                        "One of 'add', 'subtract', 'multiply', 'divide'",
                    )
                },
                ParameterSchema::required("a", "number", "First operand"),
                ParameterSchema::required("b", "number", "Second operand"),
            ],
            category: Some("math".into()),
            has_side_effects: false,
        }
    }

    async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        let operation = call
            .string("operation")
            .ok_or_else(|| AgentError::ToolValidation("operation must be a string".into()))?;
        let (a, b) = match (call.number("a"), call.number("b")) {
            (Some(a), Some(b)) => (a, b),
            _ => {
                return Err(AgentError::ToolValidation(
                    "operands 'a' and 'b' must be numbers".into(),
                ));
            }
        };

        match apply_operation(operation, a, b) {
            Ok(value) => Ok(ToolResult::success(names::CALCULATOR, value.to_string())),
            Err(e) => Ok(ToolResult::failure(names::CALCULATOR, e)),
        }
    }
}

fn apply_operation(operation: &str, a: f64, b: f64) -> std::result::Result<f64, String> {
    match operation {
        "add" => Ok(a + b),
        "subtract" => Ok(a - b),
        "multiply" => Ok(a * b),
        "divide" if b == 0.0 => Err("Division by zero".into()),
        "divide" => Ok(a / b),
        other => Err(format!("Unknown operation '{other}'")),
    }
}

/// Formatter tool - restyles text
pub struct FormatterTool;

#[async_trait]
impl Tool for FormatterTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: names::FORMATTER.into(),
            description: "Format text in a specific style.".into(),
            parameters: vec![
                ParameterSchema::required("text", "string", "Text to format"),
                ParameterSchema {
                    enum_values: Some(vec![
                        serde_json::json!("uppercase"),
                        serde_json::json!("lowercase"),
                        serde_json::json!("title"),
                    ]),
                    ..ParameterSchema::required(
                        "style",
                        "string",
                        "One of 'uppercase', 'lowercase', 'title'",
                    )
                },
            ],
            category: Some("text".into()),
            has_side_effects: false,
        }
    }

    async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        let text = call.string("text").unwrap_or_default();

        let output = match call.string("style").unwrap_or_default() {
            "uppercase" => text.to_uppercase(),
            "lowercase" => text.to_lowercase(),
            "title" => title_case(text),
            // unknown styles pass the text through
            _ => text.to_string(),
        };

        Ok(ToolResult::success(names::FORMATTER, output))
    }
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
