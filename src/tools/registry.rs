//! Explicit tool registry, built at startup and passed by reference.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use super::arguments::ToolArguments;
use super::tool::Tool;
use super::validation::validate_arguments;
use crate::error::{Result, RoundtableError};
use crate::llm::FunctionDefinition;

/// Maps capability names to implementations.
///
/// Built once at startup and shared by reference with the engines; there is
/// no process-wide registry.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. A duplicate name replaces the previous entry.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_some() {
            warn!(tool = %name, "replacing previously registered tool");
        }
    }

    /// Builder-style registration.
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Whether a tool is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Registered tool names, sorted for stable prompts.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Wire-form definitions for all registered tools, sorted by name.
    pub fn definitions(&self) -> Vec<FunctionDefinition> {
        self.names()
            .into_iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.definition())
            .collect()
    }

    /// Wire-form definitions for a subset of tools.
    pub fn definitions_for(&self, names: &[String]) -> Vec<FunctionDefinition> {
        names
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.definition())
            .collect()
    }

    /// Validate arguments against the tool's schema, then execute.
    ///
    /// Schema violations and non-JSON argument payloads are rejected before
    /// the tool runs, so a failing call never reaches its side effects.
    pub async fn call(&self, name: &str, args: &ToolArguments) -> Result<serde_json::Value> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| RoundtableError::tool(name, "tool not found"))?;

        let parsed = args.parsed()?;
        validate_arguments(&parsed, &tool.parameters().schema)
            .map_err(RoundtableError::InvalidArgument)?;

        tool.execute(&ToolArguments::new(parsed)).await
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::tool::FunctionTool;
    use crate::tools::types::ToolParameters;

    fn echo_tool(name: &str) -> Arc<dyn Tool> {
        Arc::new(FunctionTool::new(
            name,
            "echoes its arguments",
            ToolParameters::object().string("text", "text to echo", true).build(),
            |args| async move { Ok(args.raw().clone()) },
        ))
    }

    #[tokio::test]
    async fn call_dispatches_to_registered_tool() {
        let registry = ToolRegistry::new().with_tool(echo_tool("echo"));

        let result = registry
            .call("echo", &ToolArguments::new(serde_json::json!({"text": "hi"})))
            .await
            .unwrap();

        assert_eq!(result["text"], "hi");
    }

    #[tokio::test]
    async fn call_unknown_tool_is_an_error() {
        let registry = ToolRegistry::new();

        let result = registry
            .call("nope", &ToolArguments::new(serde_json::json!({})))
            .await;

        assert!(matches!(
            result,
            Err(RoundtableError::ToolExecution { .. })
        ));
    }

    #[tokio::test]
    async fn call_rejects_schema_violation_before_execution() {
        let registry = ToolRegistry::new().with_tool(echo_tool("echo"));

        let result = registry
            .call("echo", &ToolArguments::new(serde_json::json!({})))
            .await;

        assert!(matches!(result, Err(RoundtableError::InvalidArgument(_))));
    }

    #[test]
    fn duplicate_registration_replaces() {
        let mut registry = ToolRegistry::new();
        registry.register(echo_tool("echo"));
        registry.register(echo_tool("echo"));

        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn definitions_are_sorted_by_name() {
        let registry = ToolRegistry::new()
            .with_tool(echo_tool("zeta"))
            .with_tool(echo_tool("alpha"));

        let defs = registry.definitions();

        assert_eq!(defs[0].name, "alpha");
        assert_eq!(defs[1].name, "zeta");
    }
}
