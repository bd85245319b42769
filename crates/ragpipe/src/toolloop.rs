//! Bounded tool-invocation loop.
//!
//! The model is given a manifest of registered tools and may request
//! invocations turn by turn; each request is dispatched to the tool's
//! HTTP endpoint and the result fed back as a `tool_result` block. The
//! loop ends when a turn requests no tools, or when the iteration cap
//! is reached.

use ragpipe_core::{
    CompletionBackend, Error, Message, Result, ToolDescriptor, ToolDispatcher, ToolSpec,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// The registered tool set for one loop. Names are unique.
#[derive(Debug)]
pub struct ToolRegistry {
    tools: HashMap<String, ToolDescriptor>,
}

impl ToolRegistry {
    pub fn new(tools: Vec<ToolDescriptor>) -> Result<Self> {
        let mut map = HashMap::with_capacity(tools.len());
        for tool in tools {
            if map.insert(tool.name.clone(), tool).is_some() {
                return Err(Error::NotConfigured(
                    "duplicate tool name in registry".to_string(),
                ));
            }
        }
        Ok(Self { tools: map })
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.get(name)
    }

    /// The manifest advertised to the completion service.
    pub fn manifest(&self) -> Vec<ToolSpec> {
        let mut specs: Vec<ToolSpec> = self.tools.values().map(ToolDescriptor::spec).collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ToolLoopConfig {
    pub system_prompt: String,
    pub max_tokens: u64,
    /// Upper bound on completion turns, counting the final tool-free one.
    pub max_iterations: usize,
}

impl Default for ToolLoopConfig {
    fn default() -> Self {
        Self {
            system_prompt:
                "You are an assistant with access to tools. Use the tools when appropriate."
                    .to_string(),
            max_tokens: 1_000,
            max_iterations: 8,
        }
    }
}

/// How a loop run ended.
#[derive(Debug, Clone, Serialize)]
pub enum LoopOutcome {
    /// The model produced a turn with no tool requests.
    Completed { text: String, iterations: usize },
    /// The iteration cap was hit while the model was still requesting
    /// tools. `last_text` is whatever text accompanied the final turn.
    Exhausted { last_text: String, iterations: usize },
}

pub struct ToolLoop {
    completion: Arc<dyn CompletionBackend>,
    dispatcher: Arc<dyn ToolDispatcher>,
    registry: ToolRegistry,
    config: ToolLoopConfig,
}

impl ToolLoop {
    pub fn new(
        completion: Arc<dyn CompletionBackend>,
        dispatcher: Arc<dyn ToolDispatcher>,
        registry: ToolRegistry,
        config: ToolLoopConfig,
    ) -> Self {
        Self {
            completion,
            dispatcher,
            registry,
            config,
        }
    }

    /// Run the loop to completion or exhaustion.
    ///
    /// Dispatch failures and unknown tool names are fatal: unlike the
    /// answer pipeline, a half-executed tool conversation has no useful
    /// degraded form.
    pub async fn run(&self, prompt: &str) -> Result<LoopOutcome> {
        let manifest = self.registry.manifest();
        let mut messages = vec![Message::user(prompt)];

        for iteration in 1..=self.config.max_iterations {
            let req = ragpipe_core::CompletionRequest {
                system: self.config.system_prompt.clone(),
                messages: messages.clone(),
                max_tokens: self.config.max_tokens,
                temperature: None,
                tools: manifest.clone(),
            };
            let completion = self.completion.complete(&req).await?;
            let calls = completion.tool_calls();

            if calls.is_empty() {
                tracing::info!(iteration, "model finished without requesting tools");
                return Ok(LoopOutcome::Completed {
                    text: completion.text(),
                    iterations: iteration,
                });
            }

            if iteration == self.config.max_iterations {
                tracing::warn!(
                    iterations = iteration,
                    "iteration cap reached with tool requests still pending"
                );
                return Ok(LoopOutcome::Exhausted {
                    last_text: completion.text(),
                    iterations: iteration,
                });
            }

            let mut outputs = Vec::with_capacity(calls.len());
            for call in &calls {
                let tool = self
                    .registry
                    .get(&call.name)
                    .ok_or_else(|| Error::UnknownTool(call.name.clone()))?;
                tracing::info!(tool = %call.name, method = %call.method, iteration, "dispatching tool call");
                let value = self.dispatcher.dispatch(tool, call).await?;
                outputs.push((call.id.clone(), value.to_string()));
            }

            messages.push(Message::assistant(completion.content));
            messages.push(Message::tool_results(outputs));
        }

        // max_iterations == 0; nothing ran.
        Ok(LoopOutcome::Exhausted {
            last_text: String::new(),
            iterations: 0,
        })
    }
}
