use anyhow::{anyhow, Result};
use bat::WrappingMode;
use console::style;

use abacus::agent::Run;
use abacus::models::message::Message;
use abacus::models::role::Role;

const THEME: &str = "zenburn";

/// One line (or block) per message in the trace. The system prompt is only summarized.
pub fn format_message(message: &Message) -> String {
    match message.role {
        Role::System => format!(
            "{} {}",
            style("system").dim(),
            style(format!("({} characters)", message.content.len())).dim()
        ),
        Role::User if message.is_observation() => {
            format!("{} {}", style("observation").yellow(), message.content)
        }
        Role::User => format!("{} {}", style("human").green().bold(), message.content),
        Role::Assistant => format!("{}\n{}", style("agent").cyan().bold(), message.content),
    }
}

pub fn render_trace(messages: &[Message]) {
    for message in messages {
        println!("{}", format_message(message));
    }
}

fn print_markdown(content: &str) -> Result<()> {
    bat::PrettyPrinter::new()
        .input(bat::Input::from_bytes(content.as_bytes()))
        .theme(THEME)
        .language("Markdown")
        .wrapping_mode(WrappingMode::Character)
        .print()
        .map_err(|e| anyhow!("Failed to render answer: {}", e))?;
    println!();
    Ok(())
}

/// Trace, then the answer or the error that ended the run
pub fn render_run(run: &Run) -> Result<()> {
    render_trace(run.conversation.messages());
    println!();
    match &run.outcome {
        Ok(answer) => print_markdown(answer)?,
        Err(e) => eprintln!("{} {}", style("error").red().bold(), e),
    }
    println!(
        "{}",
        style(format!(
            "{} steps, {} tokens",
            run.steps,
            run.usage.total_tokens.unwrap_or_default()
        ))
        .dim()
    );
    Ok(())
}
