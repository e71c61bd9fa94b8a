use anyhow::{Context, Result};
use cliclack::input;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use abacus::agent::{Agent, AgentConfig};
use abacus::prompt_template::load_prompt_file;
use abacus::providers::openai::OpenAiProvider;
use abacus::tools::ToolRegistry;

use crate::configuration::{default_config_file, split_assignments, Settings};
use crate::session::session_file::session_path;
use crate::session::Session;
use crate::RunArgs;

/// Build a session from resolved settings and the shared run flags.
/// Returns the free words left over after `NAME=value` settings are removed.
pub fn build_session(args: &RunArgs, session_file: Option<PathBuf>) -> Result<(Session, Vec<String>)> {
    let (words, assignments) = split_assignments(&args.words);
    let config_file = args.config.clone().or_else(default_config_file);
    let settings = Settings::load(&assignments, config_file.as_deref())?;
    tracing::debug!(?settings, "Resolved settings");

    let provider = OpenAiProvider::new(settings.provider_config())
        .context("Failed to build the model client")?;

    let mut agent_config = AgentConfig::new(settings.model.clone())
        .with_max_steps(args.max_steps.unwrap_or(settings.max_steps));
    if let Some(secs) = args.deadline_secs {
        agent_config = agent_config.with_deadline(Duration::from_secs(secs));
    }

    let mut agent = Agent::new(Arc::new(provider), agent_config);
    if let Some(template) = &args.system_prompt_file {
        let prompt = render_system_prompt(template, agent.tools())?;
        agent = agent.with_system_prompt(prompt);
    }

    let session_file = session_file.or_else(|| args.trace_file.clone());
    Ok((Session::new(agent, session_file), words))
}

fn render_system_prompt(template: &Path, tools: &ToolRegistry) -> Result<String> {
    let mut context = HashMap::new();
    context.insert("tools", tools.tools());
    load_prompt_file(template, &context)
        .with_context(|| format!("Failed to render system prompt {}", template.display()))
}

pub fn random_session_name() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect()
}

pub async fn execute(args: RunArgs, name: Option<String>) -> Result<()> {
    let name = match name {
        Some(name) => name,
        None => {
            let default = random_session_name();
            input("Session name:")
                .placeholder(&default)
                .default_input(&default)
                .interact()?
        }
    };

    let session_file = match &args.trace_file {
        Some(path) => path.clone(),
        None => session_path(&name)?,
    };
    let (mut session, _) = build_session(&args, Some(session_file))?;
    session.start().await
}
