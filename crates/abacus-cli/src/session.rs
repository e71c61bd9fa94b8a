use anyhow::Result;
use cliclack::{input, spinner};
use console::style;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use abacus::agent::{Agent, Run};
use abacus::models::message::Message;

use crate::session::render::render_run;
use crate::session::session_file::persist_messages;

pub mod render;
pub mod session_file;

pub struct Session {
    agent: Agent,
    session_file: Option<PathBuf>,
    /// Every message of every run in this session, in order
    history: Vec<Message>,
}

impl Session {
    pub fn new(agent: Agent, session_file: Option<PathBuf>) -> Self {
        Session {
            agent,
            session_file,
            history: Vec::new(),
        }
    }

    /// Run one question to completion. Ctrl-C cancels the run in flight.
    pub async fn ask(&mut self, question: &str) -> Result<Run> {
        let cancel = CancellationToken::new();
        let watcher = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            })
        };

        let run = self.agent.run(question, cancel).await;
        watcher.abort();
        let run = run?;

        self.history.extend_from_slice(run.conversation.messages());
        if let Some(path) = &self.session_file {
            persist_messages(path, &self.history)?;
        }
        Ok(run)
    }

    pub async fn headless(&mut self, question: &str) -> Result<Run> {
        let run = self.ask(question).await?;
        render_run(&run)?;
        self.report_recording();
        Ok(run)
    }

    pub async fn start(&mut self) -> Result<()> {
        println!(
            "{} {}",
            style("abacus session").bold().green(),
            style("- type \"exit\" to end the session").dim()
        );
        if let Some(path) = &self.session_file {
            println!("{}", style(format!("Recording to {}", path.display())).dim());
        }

        loop {
            let question: String = input("Question:").placeholder("").interact()?;
            if question.trim().eq_ignore_ascii_case("exit") {
                break;
            }
            if question.trim().is_empty() {
                continue;
            }

            let spin = spinner();
            spin.start("thinking");
            let run = self.ask(question.trim()).await;
            spin.stop("");

            match run {
                Ok(run) => render_run(&run)?,
                Err(e) => eprintln!("{} {:#}", style("error").red().bold(), e),
            }
        }

        self.report_recording();
        Ok(())
    }

    fn report_recording(&self) {
        if let Some(path) = &self.session_file {
            println!("{}", style(format!("Recorded to {}", path.display())).dim());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abacus::agent::AgentConfig;
    use abacus::errors::ProviderError;
    use abacus::models::role::Role;
    use abacus::providers::base::{Provider, Usage};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct AnsweringProvider;

    #[async_trait]
    impl Provider for AnsweringProvider {
        async fn complete(
            &self,
            _model: &str,
            messages: &[Message],
        ) -> Result<(String, Usage), ProviderError> {
            let question = messages.last().map(|m| m.content.clone()).unwrap_or_default();
            Ok((
                format!("Action: Response To Human\nAction Input: you asked {}", question),
                Usage::default(),
            ))
        }
    }

    fn read_trace(path: &std::path::Path) -> Vec<Message> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_trace_keeps_every_run() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("math.jsonl");
        let agent = Agent::new(Arc::new(AnsweringProvider), AgentConfig::default());
        let mut session = Session::new(agent, Some(path.clone()));

        let first = session.ask("first question").await?;
        assert_eq!(first.final_answer(), Some("you asked first question"));
        session.ask("second question").await?;

        let trace = read_trace(&path);
        assert_eq!(trace.len(), 6);
        let questions: Vec<&str> = trace
            .iter()
            .filter(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(questions, vec!["first question", "second question"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_no_trace_file() -> Result<()> {
        let agent = Agent::new(Arc::new(AnsweringProvider), AgentConfig::default());
        let mut session = Session::new(agent, None);
        let run = session.ask("anything").await?;
        assert_eq!(run.conversation.len(), 3);
        Ok(())
    }
}
