mod common;

use std::sync::Arc;

use common::{result, search_call, FailingTool, FixedSearch, MockProvider};
use serde_json::json;

use admissions_assistant::agent::ReasoningLoop;
use admissions_assistant::error::AssistantError;
use admissions_assistant::tools::search::SEARCH_TOOL_NAME;
use admissions_assistant::tools::WebSearchTool;
use admissions_assistant::types::*;

fn search_loop(provider: Arc<MockProvider>, search: Arc<FixedSearch>) -> ReasoningLoop {
    ReasoningLoop::new(provider).with_tool(Arc::new(WebSearchTool::new(search)))
}

#[tokio::test]
async fn plain_answer_needs_one_model_call() {
    let provider = Arc::new(MockProvider::new("mock-model"));
    provider.queue_response("<p>Hello</p>");
    let reasoning = search_loop(provider.clone(), Arc::new(FixedSearch::empty()));

    let outcome = reasoning
        .run("system", vec![ModelMessage::user("hi")], "thread")
        .await
        .unwrap();

    assert_eq!(outcome.final_text(), "<p>Hello</p>");
    assert_eq!(outcome.steps.len(), 1);
    assert_eq!(outcome.messages.len(), 1);
    assert_eq!(outcome.finish_reason, Some(FinishReason::Stop));
    assert!(!outcome.searched_without_results());
}

#[tokio::test]
async fn tool_round_feeds_results_back() {
    let provider = Arc::new(MockProvider::new("mock-model"));
    provider.queue_search("call-1", "SAT 2026 dates");
    provider.queue_response("<p>The SAT is on December 5, 2026.</p>");
    let search = Arc::new(FixedSearch::with_results(vec![result(
        "SAT dates",
        "https://satsuite.collegeboard.org",
        "December 5, 2026",
    )]));
    let reasoning = search_loop(provider.clone(), search.clone());

    let outcome = reasoning
        .run("system", vec![ModelMessage::user("SAT dates?")], "thread")
        .await
        .unwrap();

    assert_eq!(search.queries(), vec!["SAT 2026 dates"]);
    assert_eq!(outcome.steps.len(), 2);
    assert_eq!(outcome.steps[0].tool_results.len(), 1);
    assert!(!outcome.steps[0].tool_results[0].is_error);
    assert_eq!(outcome.usage.input_tokens, 20);

    let roles: Vec<Role> = outcome.messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant, Role::Tool]);
    assert_eq!(outcome.messages[1].tool_calls()[0].name, SEARCH_TOOL_NAME);

    let requests = provider.requests();
    assert_eq!(requests[1].messages.len(), 4);
    let tools = requests[0].tools.as_ref().expect("tool definitions sent");
    assert_eq!(tools[0].name, SEARCH_TOOL_NAME);
    assert_eq!(tools[0].parameters["required"], json!(["query"]));
}

#[tokio::test]
async fn blank_query_is_reported_to_the_model() {
    let provider = Arc::new(MockProvider::new("mock-model"));
    provider.queue_search("call-1", "   ");
    provider.queue_response("<p>Answer</p>");
    let search = Arc::new(FixedSearch::empty());
    let reasoning = search_loop(provider.clone(), search.clone());

    let outcome = reasoning
        .run("system", vec![ModelMessage::user("q")], "thread")
        .await
        .unwrap();

    let tool_result = &outcome.steps[0].tool_results[0];
    assert!(tool_result.is_error);
    assert!(tool_result.result["error"].as_str().unwrap().contains("must not be empty"));
    assert!(search.queries().is_empty());
    assert_eq!(outcome.final_text(), "<p>Answer</p>");
}

#[tokio::test]
async fn unknown_tool_is_reported_to_the_model() {
    let provider = Arc::new(MockProvider::new("mock-model"));
    provider.queue_tool_call("call-1", "calculator", json!({"expr": "1+1"}));
    provider.queue_response("<p>Done</p>");
    let reasoning = search_loop(provider.clone(), Arc::new(FixedSearch::empty()));

    let outcome = reasoning
        .run("system", vec![ModelMessage::user("q")], "thread")
        .await
        .unwrap();

    let tool_result = &outcome.steps[0].tool_results[0];
    assert!(tool_result.is_error);
    assert_eq!(tool_result.result["error"], "Tool 'calculator' not found");
    assert!(!outcome.searched_without_results());
}

#[tokio::test]
async fn tool_execution_failures_are_fed_back() {
    let provider = Arc::new(MockProvider::new("mock-model"));
    provider.queue_tool_call("call-1", FailingTool::NAME, json!({"exam": "GMAT"}));
    provider.queue_response("<p>Fallback</p>");
    let reasoning = ReasoningLoop::new(provider.clone()).with_tool(Arc::new(FailingTool::new()));

    let outcome = reasoning
        .run("system", vec![ModelMessage::user("q")], "thread")
        .await
        .unwrap();

    let tool_result = &outcome.steps[0].tool_results[0];
    assert!(tool_result.is_error);
    assert!(tool_result.result["error"].as_str().unwrap().contains("no calendar for GMAT"));
    assert_eq!(outcome.final_text(), "<p>Fallback</p>");
}

#[tokio::test]
async fn missing_required_argument_is_reported_without_running_the_tool() {
    let provider = Arc::new(MockProvider::new("mock-model"));
    provider.queue_tool_call("call-1", SEARCH_TOOL_NAME, json!({"q": "JEE Main 2027"}));
    provider.queue_response("<p>Answer</p>");
    let search = Arc::new(FixedSearch::empty());
    let reasoning = search_loop(provider.clone(), search.clone());

    let outcome = reasoning
        .run("system", vec![ModelMessage::user("q")], "thread")
        .await
        .unwrap();

    let tool_result = &outcome.steps[0].tool_results[0];
    assert!(tool_result.is_error);
    assert_eq!(tool_result.result["error"], "Missing required argument(s): query");
    assert!(search.queries().is_empty());
    assert!(outcome.searched_without_results());
}

#[tokio::test]
async fn string_encoded_arguments_reach_the_search() {
    let provider = Arc::new(MockProvider::new("mock-model"));
    provider.queue_tool_call("call-1", SEARCH_TOOL_NAME, json!(r#"{"query": "CUET UG 2027"}"#));
    provider.queue_response("<p>Answer</p>");
    let search = Arc::new(FixedSearch::empty());
    let reasoning = search_loop(provider.clone(), search.clone());

    reasoning
        .run("system", vec![ModelMessage::user("q")], "thread")
        .await
        .unwrap();

    assert_eq!(search.queries(), vec!["CUET UG 2027"]);
}

#[tokio::test]
async fn calls_in_one_reply_run_in_order() {
    let provider = Arc::new(MockProvider::new("mock-model"));
    provider.queue_tool_calls(vec![
        search_call("call-a", "GATE 2027 registration dates"),
        search_call("call-b", "GATE 2027 application fee"),
    ]);
    provider.queue_response("<p>Both found.</p>");
    let search = Arc::new(FixedSearch::with_results(vec![result(
        "GATE 2027",
        "https://gate2027.iitr.ac.in",
        "Registration opens on 28 August 2026.",
    )]));
    let reasoning = search_loop(provider.clone(), search.clone());

    let outcome = reasoning
        .run("system", vec![ModelMessage::user("GATE?")], "thread")
        .await
        .unwrap();

    assert_eq!(
        search.queries(),
        vec!["GATE 2027 registration dates", "GATE 2027 application fee"]
    );
    let ids: Vec<&str> = outcome.steps[0]
        .tool_results
        .iter()
        .map(|r| r.tool_call_id.as_str())
        .collect();
    assert_eq!(ids, vec!["call-a", "call-b"]);

    let roles: Vec<Role> = outcome.messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant, Role::Tool, Role::Tool]);
    let call_ids: Vec<&str> = outcome.messages[1]
        .tool_calls()
        .into_iter()
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(call_ids, vec!["call-a", "call-b"]);

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].messages.len(), 5);
}

#[tokio::test]
async fn every_empty_search_is_flagged() {
    let provider = Arc::new(MockProvider::new("mock-model"));
    provider.queue_search("call-1", "first");
    provider.queue_search("call-2", "second");
    provider.queue_response("<p>Nothing found</p>");
    let reasoning = search_loop(provider.clone(), Arc::new(FixedSearch::empty()));

    let outcome = reasoning
        .run("system", vec![ModelMessage::user("q")], "thread")
        .await
        .unwrap();

    assert_eq!(outcome.steps.len(), 3);
    assert!(outcome.searched_without_results());
}

#[tokio::test]
async fn step_budget_stops_runaway_tool_calls() {
    let provider = Arc::new(MockProvider::new("mock-model"));
    for i in 0..5 {
        provider.queue_search(&format!("call-{i}"), "loop");
    }
    let reasoning = search_loop(provider.clone(), Arc::new(FixedSearch::empty())).with_max_steps(3);

    let outcome = reasoning
        .run("system", vec![ModelMessage::user("q")], "thread")
        .await
        .unwrap();

    assert_eq!(provider.request_count(), 3);
    assert_eq!(outcome.finish_reason, Some(FinishReason::Length));
    assert!(outcome.final_text().is_empty());
}

#[tokio::test]
async fn model_errors_propagate() {
    let provider = Arc::new(MockProvider::new("mock-model"));
    provider.queue_error(AssistantError::api(500, "boom"));
    let reasoning = search_loop(provider.clone(), Arc::new(FixedSearch::empty()));

    let err = reasoning
        .run("system", vec![ModelMessage::user("q")], "thread")
        .await
        .unwrap_err();

    assert!(err.is_external());
    assert!(err.is_retryable());
}

#[tokio::test]
async fn settings_are_sent_with_every_call() {
    let provider = Arc::new(MockProvider::new("mock-model"));
    provider.queue_search("call-1", "q");
    provider.queue_response("<p>ok</p>");
    let reasoning = search_loop(provider.clone(), Arc::new(FixedSearch::empty()))
        .with_settings(GenerationSettings::builder().temperature(0.1).build());

    reasoning
        .run("system", vec![ModelMessage::user("q")], "thread")
        .await
        .unwrap();

    for request in provider.requests() {
        assert_eq!(request.settings.temperature, Some(0.1));
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[0].text(), "system");
    }
}
