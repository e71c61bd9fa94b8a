use anyhow::{bail, Result};

use crate::commands::session::build_session;
use crate::RunArgs;

pub const DEFAULT_QUESTION: &str = "What is the square root of 98237948273498274?";

/// Join the free words into a question, or fall back to the default one
pub fn question_from(words: &[String]) -> String {
    let question = words.join(" ");
    if question.trim().is_empty() {
        DEFAULT_QUESTION.to_string()
    } else {
        question.trim().to_string()
    }
}

pub async fn execute(args: RunArgs) -> Result<()> {
    let (mut session, words) = build_session(&args, None)?;
    let question = question_from(&words);

    let run = session.headless(&question).await?;
    if let Err(e) = run.outcome {
        bail!("Run failed after {} steps: {}", run.steps, e);
    }
    Ok(())
}
