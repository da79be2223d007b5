mod common;

use std::cell::RefCell;
use std::rc::Rc;

use chatlane_chat::{
    ChatClient, GatewayError, SendOutcome, SendState, SessionStore, SubmitError,
};
use chatlane_models::Role;
use chatlane_types::{ErrorKind, Sender, DEFAULT_SESSION_ID, ERROR_REPLY};
use common::{scripted_client, ScriptedGateway};
use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;
use pretty_assertions::assert_eq;

type SubmitSlot = Rc<RefCell<Option<Result<SendOutcome, SubmitError>>>>;

/// Start a submit on the pool; the result lands in the returned slot once the
/// request resolves.
fn spawn_submit(
    pool: &LocalPool,
    client: &ChatClient<ScriptedGateway>,
    session_id: &str,
    text: &str,
) -> SubmitSlot {
    let slot: SubmitSlot = Rc::new(RefCell::new(None));
    let result = slot.clone();
    let client = client.clone();
    let session_id = session_id.to_string();
    let text = text.to_string();

    pool.spawner()
        .spawn_local(async move {
            let outcome = client.submit_to(&session_id, &text).await;
            *result.borrow_mut() = Some(outcome);
        })
        .expect("spawn submit");
    slot
}

fn message_texts(client: &ChatClient<ScriptedGateway>, session_id: &str) -> Vec<(Sender, String)> {
    client
        .snapshot()
        .session(session_id)
        .unwrap()
        .messages
        .iter()
        .map(|m| (m.sender, m.text.clone()))
        .collect()
}

#[test]
fn test_user_message_is_appended_before_the_reply_arrives() {
    let mut pool = LocalPool::new();
    let (client, gateway, _) = scripted_client();

    let slot = spawn_submit(&pool, &client, DEFAULT_SESSION_ID, "hello");
    pool.run_until_stalled();

    assert!(client.is_pending(DEFAULT_SESSION_ID));
    assert!(slot.borrow().is_none());
    assert_eq!(gateway.call_count(), 1);
    assert_eq!(message_texts(&client, DEFAULT_SESSION_ID).len(), 2);

    gateway.respond(0, Ok("hi there".to_string()));
    pool.run_until_stalled();

    assert_eq!(
        *slot.borrow(),
        Some(Ok(SendOutcome::Replied { message_id: 3 }))
    );
    assert_eq!(client.send_state(DEFAULT_SESSION_ID), SendState::Idle);
    assert_eq!(
        &message_texts(&client, DEFAULT_SESSION_ID)[1..],
        &[
            (Sender::User, "hello".to_string()),
            (Sender::Bot, "hi there".to_string()),
        ]
    );
}

#[test]
fn test_context_carries_history_and_trailing_user_text() {
    let mut pool = LocalPool::new();
    let (client, gateway, _) = scripted_client();

    spawn_submit(&pool, &client, DEFAULT_SESSION_ID, "first");
    pool.run_until_stalled();
    gateway.respond(0, Err(GatewayError::Timeout));
    pool.run_until_stalled();

    spawn_submit(&pool, &client, DEFAULT_SESSION_ID, "second");
    pool.run_until_stalled();

    let context = gateway.context(1);
    let roles: Vec<_> = context.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![Role::System, Role::Assistant, Role::User, Role::Assistant, Role::User]
    );
    assert_eq!(context[3].content, ERROR_REPLY);
    assert_eq!(context[4].content, "second");
    // the message being sent appears once, as the trailing entry
    assert_eq!(context.iter().filter(|m| m.content == "second").count(), 1);
}

#[test]
fn test_submit_while_pending_is_a_noop() {
    let mut pool = LocalPool::new();
    let (client, gateway, _) = scripted_client();

    spawn_submit(&pool, &client, DEFAULT_SESSION_ID, "one");
    pool.run_until_stalled();
    let before = client.snapshot();

    let second = spawn_submit(&pool, &client, DEFAULT_SESSION_ID, "two");
    pool.run_until_stalled();

    assert_eq!(
        *second.borrow(),
        Some(Err(SubmitError::AlreadyPending(DEFAULT_SESSION_ID.to_string())))
    );
    assert_eq!(gateway.call_count(), 1);
    assert_eq!(client.snapshot(), before);
    assert!(client.is_pending(DEFAULT_SESSION_ID));
}

#[test]
fn test_gateway_failure_appends_one_error_message() {
    let mut pool = LocalPool::new();
    let (client, gateway, _) = scripted_client();

    let slot = spawn_submit(&pool, &client, DEFAULT_SESSION_ID, "will fail");
    pool.run_until_stalled();
    let user_message = client.snapshot().session(DEFAULT_SESSION_ID).unwrap().messages[1].clone();

    gateway.respond(
        0,
        Err(GatewayError::UpstreamStatus {
            status: 502,
            body: "bad gateway".to_string(),
        }),
    );
    pool.run_until_stalled();

    assert_eq!(
        *slot.borrow(),
        Some(Ok(SendOutcome::Failed {
            message_id: 3,
            kind: ErrorKind::UpstreamStatus
        }))
    );
    assert_eq!(client.send_state(DEFAULT_SESSION_ID), SendState::Idle);

    let snapshot = client.snapshot();
    let messages = &snapshot.session(DEFAULT_SESSION_ID).unwrap().messages;
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1], user_message);

    let reply = &messages[2];
    assert_eq!(reply.sender, Sender::Bot);
    assert!(reply.error);
    assert_eq!(reply.text, ERROR_REPLY);
    assert_eq!(reply.error_kind, Some(ErrorKind::UpstreamStatus));
    assert!(!reply.text.contains("bad gateway"));
}

#[test]
fn test_sessions_resolve_independently() {
    let mut pool = LocalPool::new();
    let (client, gateway, _) = scripted_client();

    let a = client.create_session();
    let slot_a = spawn_submit(&pool, &client, &a, "question for A");
    pool.run_until_stalled();
    assert!(client.is_pending(&a));

    let b = client.create_session();
    assert_eq!(client.active_session_id(), b);
    assert!(!client.is_pending(&b));
    let slot_b = spawn_submit(&pool, &client, &b, "question for B");
    pool.run_until_stalled();
    assert_eq!(gateway.call_count(), 2);

    // B resolves first
    gateway.respond(1, Ok("answer for B".to_string()));
    pool.run_until_stalled();

    assert!(slot_b.borrow().is_some());
    assert!(slot_a.borrow().is_none());
    assert!(client.is_pending(&a));
    assert!(!client.is_pending(&b));
    assert_eq!(
        message_texts(&client, &b).last().unwrap(),
        &(Sender::Bot, "answer for B".to_string())
    );
    assert_eq!(
        message_texts(&client, &a).last().unwrap(),
        &(Sender::User, "question for A".to_string())
    );

    gateway.respond(0, Ok("answer for A".to_string()));
    pool.run_until_stalled();

    assert!(!client.is_pending(&a));
    assert_eq!(
        message_texts(&client, &a).last().unwrap(),
        &(Sender::Bot, "answer for A".to_string())
    );
    assert_eq!(message_texts(&client, &b).len(), 3);
}

#[test]
fn test_switching_sessions_does_not_cancel_in_flight_request() {
    let mut pool = LocalPool::new();
    let (client, gateway, _) = scripted_client();

    let origin = client.create_session();
    spawn_submit(&pool, &client, &origin, "slow question");
    pool.run_until_stalled();

    assert!(client.select_session(DEFAULT_SESSION_ID));
    gateway.respond(0, Ok("slow answer".to_string()));
    pool.run_until_stalled();

    // the reply lands in the originating session, not the active one
    assert_eq!(client.active_session_id(), DEFAULT_SESSION_ID);
    assert_eq!(
        message_texts(&client, &origin).last().unwrap(),
        &(Sender::Bot, "slow answer".to_string())
    );
    assert_eq!(message_texts(&client, DEFAULT_SESSION_ID).len(), 1);
}

#[test]
fn test_message_ids_increase_under_interleaving() {
    let mut pool = LocalPool::new();
    let (client, gateway, _) = scripted_client();
    let other = client.create_session();

    let mut call = 0;
    for round in 0..3 {
        spawn_submit(&pool, &client, DEFAULT_SESSION_ID, &format!("d{}", round));
        spawn_submit(&pool, &client, &other, &format!("o{}", round));
        pool.run_until_stalled();
        // answer in reverse order of sending
        gateway.respond(call + 1, Ok("o".to_string()));
        pool.run_until_stalled();
        gateway.respond(call, Err(GatewayError::Transport("reset".to_string())));
        pool.run_until_stalled();
        call += 2;
    }

    let snapshot = client.snapshot();
    for session in &snapshot.sessions {
        let ids: Vec<_> = session.messages.iter().map(|m| m.id).collect();
        assert_eq!(ids, (1..=7).collect::<Vec<u64>>(), "session {}", session.id);
    }
}

#[test]
fn test_title_derivation_through_submit() {
    let mut pool = LocalPool::new();
    let (client, gateway, _) = scripted_client();

    let long = client.create_session();
    spawn_submit(&pool, &client, &long, "Explain quicksort in one sentence please");
    let short = client.create_session();
    spawn_submit(&pool, &client, &short, "hi");
    pool.run_until_stalled();

    let snapshot = client.snapshot();
    assert_eq!(snapshot.session(&long).unwrap().title, "Explain quicksort in...");
    assert_eq!(snapshot.session(&short).unwrap().title, "hi");

    gateway.respond(0, Ok("Divide and conquer.".to_string()));
    gateway.respond(1, Ok("Hello!".to_string()));
    pool.run_until_stalled();

    let snapshot = client.snapshot();
    assert_eq!(snapshot.session(&long).unwrap().title, "Explain quicksort in...");
    assert_eq!(snapshot.session(&short).unwrap().title, "hi");
}

#[test]
fn test_resolved_state_is_persisted() {
    let mut pool = LocalPool::new();
    let (client, gateway, storage) = scripted_client();

    let id = client.create_session();
    spawn_submit(&pool, &client, &id, "remember this");
    pool.run_until_stalled();
    gateway.respond(0, Ok("noted".to_string()));
    pool.run_until_stalled();

    let reopened = SessionStore::open(Box::new(storage));
    assert_eq!(reopened.snapshot(), client.snapshot());
    assert_eq!(reopened.active_session_id(), id);
}

#[test]
fn test_deleting_origin_discards_late_reply() {
    let mut pool = LocalPool::new();
    let (client, gateway, _) = scripted_client();

    let doomed = client.create_session();
    let slot = spawn_submit(&pool, &client, &doomed, "anyone there?");
    pool.run_until_stalled();

    client.delete_session(&doomed).unwrap();
    assert_eq!(client.active_session_id(), DEFAULT_SESSION_ID);

    gateway.respond(0, Ok("too late".to_string()));
    pool.run_until_stalled();

    assert_eq!(*slot.borrow(), Some(Ok(SendOutcome::Discarded)));
    assert!(!client.is_pending(&doomed));
    assert_eq!(client.snapshot().sessions.len(), 1);
}
