use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use abacus::agent::{Agent, AgentConfig, AgentState};
use abacus::errors::{AgentError, ProviderError};
use abacus::models::role::Role;
use abacus::providers::configs::OpenAiProviderConfig;
use abacus::providers::openai::OpenAiProvider;

/// Replies with each scripted assistant message in turn
struct ScriptedReplies {
    replies: Vec<&'static str>,
    next: AtomicUsize,
}

impl ScriptedReplies {
    fn new(replies: Vec<&'static str>) -> Self {
        Self {
            replies,
            next: AtomicUsize::new(0),
        }
    }
}

impl Respond for ScriptedReplies {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let index = self.next.fetch_add(1, Ordering::SeqCst);
        let content = self.replies.get(index).copied().unwrap_or("");
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 50, "completion_tokens": 10, "total_tokens": 60}
        }))
    }
}

fn agent_for(server: &MockServer, config: AgentConfig) -> Result<Agent> {
    let provider = OpenAiProvider::new(
        OpenAiProviderConfig::new("test_api_key").with_host(server.uri()),
    )?;
    Ok(Agent::new(Arc::new(provider), config))
}

#[tokio::test]
async fn test_calculates_then_answers() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ScriptedReplies::new(vec![
            "Action: Calculator\nAction Input: math::sqrt(16)",
            "Action: Response To Human\nAction Input: The square root of 16 is 4.",
        ]))
        .expect(2)
        .mount(&server)
        .await;

    let agent = agent_for(&server, AgentConfig::new("gpt-4o-mini"))?;
    let run = agent
        .run("What is the square root of 16?", CancellationToken::new())
        .await?;

    assert_eq!(run.final_answer(), Some("The square root of 16 is 4."));
    assert_eq!(run.state(), AgentState::Terminated);
    assert_eq!(run.steps, 2);
    assert_eq!(run.usage.total_tokens, Some(120));

    let roles: Vec<Role> = run.conversation.messages().iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![Role::System, Role::User, Role::Assistant, Role::User, Role::Assistant]
    );
    assert_eq!(run.conversation.messages()[3].content, "Observation: 4.0");

    // The second request carries the whole history, observation included
    let requests = server.received_requests().await.unwrap();
    let second: Value = requests[1].body_json()?;
    assert_eq!(second["model"], json!("gpt-4o-mini"));
    let messages = second["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[3], json!({"role": "user", "content": "Observation: 4.0"}));
    Ok(())
}

#[tokio::test]
async fn test_bad_expression_is_fed_back() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ScriptedReplies::new(vec![
            "Action: Calculator\nAction Input: 2 +",
            "Action: Calculator\nAction Input: 2 + 2",
            "Action: Response To Human\nAction Input: 4",
        ]))
        .mount(&server)
        .await;

    let agent = agent_for(&server, AgentConfig::default())?;
    let run = agent.run("What is 2 + 2?", CancellationToken::new()).await?;

    assert_eq!(run.final_answer(), Some("4"));
    let observations: Vec<&str> = run
        .conversation
        .messages()
        .iter()
        .filter(|m| m.is_observation())
        .map(|m| m.content.as_str())
        .collect();
    assert_eq!(observations.len(), 2);
    assert!(observations[0].starts_with("Observation: Error in calculation: "));
    assert_eq!(observations[1], "Observation: 4.0");
    Ok(())
}

#[tokio::test]
async fn test_server_error_ends_run() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let agent = agent_for(&server, AgentConfig::default())?;
    let run = agent.run("What is 2 + 2?", CancellationToken::new()).await?;

    match &run.outcome {
        Err(AgentError::ModelCall(ProviderError::Status { status, body })) => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "upstream unavailable");
        }
        other => panic!("Expected a model call error, got {:?}", other),
    }
    assert_eq!(run.conversation.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_malformed_reply_ends_run() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ScriptedReplies::new(vec!["The answer is probably 4."]))
        .expect(1)
        .mount(&server)
        .await;

    let agent = agent_for(&server, AgentConfig::default())?;
    let run = agent.run("What is 2 + 2?", CancellationToken::new()).await?;

    assert!(matches!(run.outcome, Err(AgentError::MalformedResponse(_))));
    assert_eq!(run.conversation.len(), 3);
    assert_eq!(
        run.conversation.last().unwrap().content,
        "The answer is probably 4."
    );
    Ok(())
}
