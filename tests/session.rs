//! Session pipeline integration tests
//!
//! Drive full sessions with a scripted in-process model, no network.

use std::time::Duration;

use chrono::{Days, Local};
use tokio::sync::mpsc;

use vista_gateway::prompt::{FAREWELL, HOLD_ACKNOWLEDGEMENT, IDLE_GOODBYE};
use vista_gateway::{
    IdleConfig, Role, Session, SessionEvent, SessionOutput, SessionParams,
};

mod common;
use common::{ScriptStep, ScriptedGenerator, assistant, seeded_store, tool_call};

/// Receive the next output within a generous window
async fn recv(outputs: &mut mpsc::Receiver<SessionOutput>) -> SessionOutput {
    tokio::time::timeout(Duration::from_secs(60), outputs.recv())
        .await
        .expect("timed out waiting for session output")
        .expect("output channel closed")
}

fn reply_text(output: SessionOutput) -> String {
    match output {
        SessionOutput::Reply(text) => text,
        other => panic!("expected a reply, got {other:?}"),
    }
}

/// Build a session wired to channels; idle effectively disabled unless
/// `idle` is provided
fn start_session(
    script: Vec<ScriptStep>,
    idle: Option<IdleConfig>,
) -> (
    std::sync::Arc<ScriptedGenerator>,
    mpsc::Sender<SessionEvent>,
    mpsc::Receiver<SessionOutput>,
    tokio::task::JoinHandle<vista_gateway::Result<()>>,
) {
    let generator = ScriptedGenerator::new(script);
    let (event_tx, event_rx) = mpsc::channel(16);
    let (output_tx, output_rx) = mpsc::channel(16);

    let params = SessionParams {
        idle: idle.unwrap_or(IdleConfig {
            timeout: Duration::from_secs(3600),
            max_retries: 3,
        }),
        ..Default::default()
    };

    let session = Session::new(
        params,
        generator.clone(),
        None,
        None,
        seeded_store(),
        output_tx,
    )
    .expect("session");
    let handle = tokio::spawn(session.run(event_rx));

    (generator, event_tx, output_rx, handle)
}

#[tokio::test]
async fn hold_scenario_end_to_end() {
    let (generator, events, mut outputs, handle) = start_session(
        vec![
            assistant("Hello! I'm Samora from The Grand Vista Hotel. How can I help?"),
            tool_call("put_on_hold", "{}"),
            assistant("Welcome back! Where were we?"),
        ],
        None,
    );

    // Connect triggers the greeting turn
    events.send(SessionEvent::Connected).await.expect("send");
    let greeting = reply_text(recv(&mut outputs).await);
    assert!(greeting.contains("Samora"));

    // The model puts the call on hold; the fixed acknowledgement is spoken
    events
        .send(SessionEvent::Transcript("hold on one second".to_string()))
        .await
        .expect("send");
    assert_eq!(reply_text(recv(&mut outputs).await), HOLD_ACKNOWLEDGEMENT);

    // Ordinary speech while on hold is dropped: no model turn, no output
    events
        .send(SessionEvent::Transcript("what's the weather".to_string()))
        .await
        .expect("send");

    // The wake utterance is forwarded and answered
    events
        .send(SessionEvent::Transcript("hey samora".to_string()))
        .await
        .expect("send");
    let back = reply_text(recv(&mut outputs).await);
    assert!(back.contains("Welcome back"));

    events.send(SessionEvent::Disconnected).await.expect("send");
    loop {
        if matches!(recv(&mut outputs).await, SessionOutput::Ended) {
            break;
        }
    }
    handle.await.expect("join").expect("session");

    // greeting + hold turn + wake turn; the dropped utterance never
    // reached the model
    assert_eq!(generator.call_count(), 3);
}

#[tokio::test]
async fn end_call_tool_terminates_the_session() {
    let (generator, events, mut outputs, handle) = start_session(
        vec![
            assistant("Hello! How can I help?"),
            tool_call("end_call", "{}"),
        ],
        None,
    );

    events.send(SessionEvent::Connected).await.expect("send");
    let _greeting = recv(&mut outputs).await;

    events
        .send(SessionEvent::Transcript("no that's everything, bye".to_string()))
        .await
        .expect("send");
    assert_eq!(reply_text(recv(&mut outputs).await), FAREWELL);

    // The session winds down on its own, without a disconnect event
    loop {
        if matches!(recv(&mut outputs).await, SessionOutput::Ended) {
            break;
        }
    }
    handle.await.expect("join").expect("session");
    assert_eq!(generator.call_count(), 2);
}

#[tokio::test]
async fn booking_tool_results_feed_back_into_the_model() {
    let check_in = (Local::now().date_naive() + Days::new(30))
        .format("%Y-%m-%d")
        .to_string();
    let check_out = (Local::now().date_naive() + Days::new(33))
        .format("%Y-%m-%d")
        .to_string();
    let arguments =
        format!(r#"{{"check_in_date": "{check_in}", "check_out_date": "{check_out}"}}"#);

    let (generator, events, mut outputs, handle) = start_session(
        vec![
            assistant("Hello!"),
            tool_call("check_availability", &arguments),
            assistant("Great news, we have rooms available for those dates!"),
        ],
        None,
    );

    events.send(SessionEvent::Connected).await.expect("send");
    let _greeting = recv(&mut outputs).await;

    events
        .send(SessionEvent::Transcript(
            "do you have any rooms next month?".to_string(),
        ))
        .await
        .expect("send");
    let reply = reply_text(recv(&mut outputs).await);
    assert!(reply.contains("rooms available"));

    events.send(SessionEvent::Disconnected).await.expect("send");
    handle.await.expect("join").expect("session");

    // The follow-up request carried the structured tool result back to
    // the model
    let requests = generator.requests();
    assert_eq!(requests.len(), 3);
    let tool_message = requests[2]
        .messages
        .iter()
        .find(|m| m.role == Role::Tool)
        .expect("tool result message");
    let payload: serde_json::Value =
        serde_json::from_str(&tool_message.text().expect("tool text")).expect("json payload");
    assert_eq!(payload["success"], serde_json::json!(true));
    assert_eq!(payload["available"], serde_json::json!(true));
}

#[tokio::test(start_paused = true)]
async fn idle_nudges_twice_then_says_goodbye() {
    let (generator, events, mut outputs, handle) = start_session(
        vec![
            assistant("Hello! How can I help?"),
            assistant("Hey, just checking - are you still with me?"),
            assistant("Would you like a bit more time?"),
        ],
        Some(IdleConfig {
            timeout: Duration::from_secs(10),
            max_retries: 3,
        }),
    );

    events.send(SessionEvent::Connected).await.expect("send");
    let greeting = reply_text(recv(&mut outputs).await);
    assert!(greeting.contains("Hello"));

    // No further input: the idle monitor escalates on its own
    let nudge_one = reply_text(recv(&mut outputs).await);
    assert!(nudge_one.contains("still with me"));

    let nudge_two = reply_text(recv(&mut outputs).await);
    assert!(nudge_two.contains("more time"));

    assert_eq!(reply_text(recv(&mut outputs).await), IDLE_GOODBYE);
    assert!(matches!(recv(&mut outputs).await, SessionOutput::Ended));

    handle.await.expect("join").expect("session");
    // Greeting plus two nudge turns; the goodbye is a fixed line
    assert_eq!(generator.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn idle_prompts_are_suppressed_while_on_hold() {
    let (generator, events, mut outputs, handle) = start_session(
        vec![assistant("Hello!"), tool_call("put_on_hold", "{}")],
        Some(IdleConfig {
            timeout: Duration::from_secs(10),
            max_retries: 3,
        }),
    );

    events.send(SessionEvent::Connected).await.expect("send");
    let _greeting = recv(&mut outputs).await;

    events
        .send(SessionEvent::Transcript("hold on a moment".to_string()))
        .await
        .expect("send");
    assert_eq!(reply_text(recv(&mut outputs).await), HOLD_ACKNOWLEDGEMENT);

    // Long silence while on hold: no nudges, no goodbye
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert!(
        outputs.try_recv().is_err(),
        "idle prompts must not fire while on hold"
    );

    events.send(SessionEvent::Disconnected).await.expect("send");
    loop {
        if matches!(recv(&mut outputs).await, SessionOutput::Ended) {
            break;
        }
    }
    handle.await.expect("join").expect("session");
    assert_eq!(generator.call_count(), 2);
}
