//! The closed set of actions the model can take and how each one is carried out.
//!
//! Action names arrive as free text; they are matched case-insensitively into [`Action`]
//! once, and dispatch is an exhaustive match from then on.
mod calculator;

pub use calculator::{format_number, Evaluator, EvaluatorError, ExpressionEvaluator};

use crate::models::tool::Tool;
use crate::parser::ParsedAction;

pub const CALCULATOR: &str = "Calculator";
pub const RESPONSE_TO_HUMAN: &str = "Response To Human";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Evaluate the expression and report the result as an observation
    Calculator(String),
    /// Finish the run with this answer
    RespondToHuman(String),
    /// Anything outside the registry; reported back so the model can correct itself
    Unknown { name: String, input: String },
}

impl From<ParsedAction> for Action {
    fn from(parsed: ParsedAction) -> Self {
        let name = parsed.name.trim();
        if name.eq_ignore_ascii_case(CALCULATOR) {
            Action::Calculator(parsed.input)
        } else if name.eq_ignore_ascii_case(RESPONSE_TO_HUMAN) {
            Action::RespondToHuman(parsed.input)
        } else {
            Action::Unknown {
                name: name.to_string(),
                input: parsed.input,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToolResult {
    /// Text to feed back into the conversation; the run continues
    Observation(String),
    /// The run's output; the run terminates
    FinalAnswer(String),
}

pub struct ToolRegistry {
    evaluator: Box<dyn Evaluator>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new(Box::new(ExpressionEvaluator::new()))
    }
}

impl ToolRegistry {
    pub fn new(evaluator: Box<dyn Evaluator>) -> Self {
        Self { evaluator }
    }

    /// The tool catalogue advertised to the model
    pub fn tools(&self) -> Vec<Tool> {
        vec![
            Tool::new(
                CALCULATOR,
                format!(
                    "Useful for when you need to answer questions about math. {}",
                    self.evaluator.syntax_hint()
                ),
            ),
            Tool::new(
                RESPONSE_TO_HUMAN,
                "When you need to respond to the human you are talking to.",
            ),
        ]
    }

    pub fn dispatch(&self, action: &Action) -> ToolResult {
        match action {
            Action::Calculator(expression) => match self.evaluator.evaluate(expression) {
                Ok(value) => {
                    let result = format_number(value);
                    tracing::info!("Calculator result: {}", result);
                    ToolResult::Observation(result)
                }
                Err(e) => {
                    tracing::warn!(expression = %expression, error = %e, "Calculation failed");
                    ToolResult::Observation(format!("Error in calculation: {}", e))
                }
            },
            Action::RespondToHuman(answer) => ToolResult::FinalAnswer(answer.clone()),
            Action::Unknown { name, .. } => {
                tracing::warn!(action = %name, "Model chose an unknown action");
                ToolResult::Observation(format!("unknown action '{}'", name))
            }
        }
    }
}
