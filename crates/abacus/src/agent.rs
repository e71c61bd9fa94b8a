use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::errors::{AgentError, AgentResult};
use crate::models::conversation::Conversation;
use crate::models::message::Message;
use crate::parser::{ActionParser, ResponseParser};
use crate::prompt_template::{load_prompt, SYSTEM_PROMPT};
use crate::providers::base::{Provider, Usage};
use crate::providers::configs::DEFAULT_MODEL;
use crate::tools::{Action, Evaluator, ToolRegistry, ToolResult};

pub const DEFAULT_MAX_STEPS: usize = 10;

#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Model identifier sent with every completion request
    pub model: String,
    /// Model calls allowed before the run gives up
    pub max_steps: usize,
    /// Wall-clock limit for a whole run
    pub deadline: Option<Duration>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_steps: DEFAULT_MAX_STEPS,
            deadline: None,
        }
    }
}

impl AgentConfig {
    pub fn new<S: Into<String>>(model: S) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    Running,
    Terminated,
}

/// What a single step did to the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// An observation was appended; ask the model again
    Continue,
    /// The model answered the human
    Finished(String),
}

/// The result of one run. The conversation is kept even when the run failed.
#[derive(Debug)]
pub struct Run {
    pub conversation: Conversation,
    pub steps: usize,
    pub usage: Usage,
    pub outcome: AgentResult<String>,
}

impl Run {
    pub fn state(&self) -> AgentState {
        if self.conversation.is_terminated() {
            AgentState::Terminated
        } else {
            AgentState::Running
        }
    }

    pub fn final_answer(&self) -> Option<&str> {
        self.outcome.as_deref().ok()
    }
}

/// Agent drives a conversation with the model until it answers the human
pub struct Agent {
    provider: Arc<dyn Provider>,
    tools: ToolRegistry,
    parser: Box<dyn ResponseParser>,
    system_prompt: Option<String>,
    config: AgentConfig,
}

impl Agent {
    /// Create a new Agent with the evalexpr calculator and the two-line action parser
    pub fn new(provider: Arc<dyn Provider>, config: AgentConfig) -> Self {
        Self {
            provider,
            tools: ToolRegistry::default(),
            parser: Box::new(ActionParser::new()),
            system_prompt: None,
            config,
        }
    }

    pub fn with_evaluator(mut self, evaluator: Box<dyn Evaluator>) -> Self {
        self.tools = ToolRegistry::new(evaluator);
        self
    }

    pub fn with_parser(mut self, parser: Box<dyn ResponseParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Use a fully rendered system prompt instead of the built-in template
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn system_prompt(&self) -> AgentResult<String> {
        if let Some(prompt) = &self.system_prompt {
            return Ok(prompt.clone());
        }
        let mut context = HashMap::new();
        context.insert("tools", self.tools.tools());
        load_prompt(SYSTEM_PROMPT, &context).map_err(|e| AgentError::Internal(e.to_string()))
    }

    /// Seed a fresh conversation for `question`
    pub fn start(&self, question: &str) -> AgentResult<Conversation> {
        Ok(Conversation::seed(self.system_prompt()?, question))
    }

    /// Run one model call, parse and dispatch against the conversation.
    ///
    /// The reply is appended before it is parsed, so a malformed reply stays in the
    /// trace. Provider and parse failures are returned as errors; the caller decides
    /// whether to terminate.
    pub async fn step(
        &self,
        conversation: &mut Conversation,
        cancel: &CancellationToken,
    ) -> AgentResult<(StepOutcome, Usage)> {
        if cancel.is_cancelled() {
            return Err(AgentError::Cancelled);
        }

        let (reply, usage) = tokio::select! {
            _ = cancel.cancelled() => return Err(AgentError::Cancelled),
            result = self.provider.complete(&self.config.model, conversation.messages()) => result?,
        };
        tracing::info!("Agent response: {}", reply);
        conversation.append(Message::assistant(reply.as_str()))?;

        let action = Action::from(self.parser.parse(&reply)?);
        tracing::debug!(?action, "Dispatching");

        match self.tools.dispatch(&action) {
            ToolResult::Observation(text) => {
                conversation.append(Message::observation(text))?;
                Ok((StepOutcome::Continue, usage))
            }
            ToolResult::FinalAnswer(answer) => {
                tracing::info!("Final response: {}", answer);
                conversation.terminate();
                Ok((StepOutcome::Finished(answer), usage))
            }
        }
    }

    /// Answer `question`, stepping until the model responds to the human or the run fails
    pub async fn run(&self, question: &str, cancel: CancellationToken) -> AgentResult<Run> {
        let mut conversation = self.start(question)?;
        let mut steps = 0;
        let mut usage = Usage::default();

        let outcome = {
            let drive = self.drive(&mut conversation, &mut steps, &mut usage, &cancel);
            match self.config.deadline {
                Some(limit) => tokio::time::timeout(limit, drive)
                    .await
                    .unwrap_or(Err(AgentError::DeadlineExceeded(limit))),
                None => drive.await,
            }
        };

        if let Err(e) = &outcome {
            tracing::error!("Run ended after {} steps: {}", steps, e);
        }
        conversation.terminate();

        Ok(Run {
            conversation,
            steps,
            usage,
            outcome,
        })
    }

    async fn drive(
        &self,
        conversation: &mut Conversation,
        steps: &mut usize,
        usage: &mut Usage,
        cancel: &CancellationToken,
    ) -> AgentResult<String> {
        loop {
            if *steps >= self.config.max_steps {
                return Err(AgentError::StepLimitExceeded(self.config.max_steps));
            }
            tracing::info!("step {}", *steps);
            *steps += 1;

            let (outcome, step_usage) = self.step(conversation, cancel).await?;
            usage.accumulate(&step_usage);
            if let StepOutcome::Finished(answer) = outcome {
                return Ok(answer);
            }
        }
    }
}
