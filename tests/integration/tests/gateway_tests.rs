//! Gateway integration tests
//!
//! Each test starts its own gateway on an ephemeral port over in-memory
//! stores, so no external services are needed.
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use std::time::Duration;

use dm_core::traits::MessageRepository;
use integration_tests::{alice, bob, dave, mallory, snapshot_entry, TestClient, TestGateway};

// ============================================================================
// HTTP Surface
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let gateway = TestGateway::start().await.unwrap();
    let (status, body) = gateway.http_get("/health").await.unwrap();
    assert_eq!(status, 200);
    assert!(body.contains("OK"));
}

#[tokio::test]
async fn test_bad_token_is_rejected_before_upgrade() {
    let gateway = TestGateway::start().await.unwrap();

    let status = gateway
        .rejected_status(&gateway.ws_url("not-a-token", None))
        .await
        .unwrap();
    assert_eq!(status, 401);

    // A valid signature for a user the identity store does not know
    let token = gateway.token_for(&mallory());
    let status = gateway.rejected_status(&gateway.ws_url(&token, None)).await.unwrap();
    assert_eq!(status, 401);

    let url = format!("ws://{}/hubs/chat", gateway.addr);
    assert_eq!(gateway.rejected_status(&url).await.unwrap(), 401);

    assert!(gateway.state.presence().is_empty());
    assert_eq!(gateway.state.connection_manager().connection_count(), 0);
}

#[tokio::test]
async fn test_bearer_header_is_accepted() {
    let gateway = TestGateway::start().await.unwrap();
    let mut client = gateway.connect_with_header(&bob()).await.unwrap();

    client.expect_event("ONLINE_USERS").await.unwrap();
    gateway.wait_for_presence("bob", true).await.unwrap();
}

// ============================================================================
// Presence
// ============================================================================

#[tokio::test]
async fn test_join_is_announced_to_others_only() {
    let gateway = TestGateway::start().await.unwrap();
    let mut bob_client = gateway.connect(&bob()).await.unwrap();
    bob_client.expect_event("ONLINE_USERS").await.unwrap();

    let mut alice_client = gateway.connect(&alice()).await.unwrap();

    let joined = bob_client.expect_event("USER_JOINED").await.unwrap();
    assert_eq!(joined.data["username"], "alice");
    assert_eq!(joined.data["fullName"], "Alice Liddell");

    let snapshot = bob_client.expect_event("ONLINE_USERS").await.unwrap();
    assert_eq!(snapshot_entry(&snapshot.data, "alice").unwrap()["isOnline"], true);
    assert_eq!(snapshot_entry(&snapshot.data, "dave").unwrap()["isOnline"], false);

    let own = alice_client.collect_until("ONLINE_USERS").await.unwrap();
    assert!(own.iter().all(|e| e.name != "USER_JOINED"));
}

#[tokio::test]
async fn test_reconnect_does_not_announce_again() {
    let gateway = TestGateway::start().await.unwrap();
    let mut bob_client = gateway.connect(&bob()).await.unwrap();
    bob_client.expect_event("ONLINE_USERS").await.unwrap();

    let _first = gateway.connect(&alice()).await.unwrap();
    bob_client.expect_event("USER_JOINED").await.unwrap();
    bob_client.expect_event("ONLINE_USERS").await.unwrap();

    let mut second = gateway.connect(&alice()).await.unwrap();
    second.expect_event("ONLINE_USERS").await.unwrap();

    let events = bob_client.collect_until("ONLINE_USERS").await.unwrap();
    assert_eq!(events.len(), 1, "unexpected events: {events:?}");
    assert_eq!(gateway.state.presence().len(), 2);
}

#[tokio::test]
async fn test_disconnect_refreshes_snapshot() {
    let gateway = TestGateway::start().await.unwrap();
    let mut bob_client = gateway.connect(&bob()).await.unwrap();
    bob_client.expect_event("ONLINE_USERS").await.unwrap();

    let alice_client = gateway.connect(&alice()).await.unwrap();
    bob_client.expect_event("USER_JOINED").await.unwrap();
    bob_client.expect_event("ONLINE_USERS").await.unwrap();

    alice_client.close().await.unwrap();

    let snapshot = bob_client.expect_event("ONLINE_USERS").await.unwrap();
    assert_eq!(snapshot_entry(&snapshot.data, "alice").unwrap()["isOnline"], false);
    gateway.wait_for_presence("alice", false).await.unwrap();
}

#[tokio::test]
async fn test_snapshot_lists_online_first() {
    let gateway = TestGateway::start().await.unwrap();
    let mut dave_client = gateway.connect(&dave()).await.unwrap();

    let snapshot = dave_client.expect_event("ONLINE_USERS").await.unwrap();
    let entries = snapshot.data.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["username"], "dave");
    assert_eq!(entries[0]["profileImage"], "dave.png");
    assert!(entries[1..].iter().all(|e| e["isOnline"] == false));
}

// ============================================================================
// Messaging
// ============================================================================

#[tokio::test]
async fn test_send_then_page_marks_read() {
    let gateway = TestGateway::start().await.unwrap();
    let mut bob_client = gateway.connect(&bob()).await.unwrap();
    bob_client.expect_event("ONLINE_USERS").await.unwrap();

    // frames are handled only after alice's own connect sequence finished
    let mut alice_client = gateway.connect(&alice()).await.unwrap();
    alice_client.send_message(bob().id, "hi").await.unwrap();
    alice_client.send_message(bob().id, "there").await.unwrap();

    let first = bob_client.expect_event("MESSAGE_CREATE").await.unwrap();
    let second = bob_client.expect_event("MESSAGE_CREATE").await.unwrap();
    assert_eq!(first.data["content"], "hi");
    assert_eq!(second.data["content"], "there");
    assert_eq!(second.data["isRead"], false);
    assert!(second.seq > first.seq);

    bob_client.request_history(alice().id, Some(1)).await.unwrap();
    let page = bob_client.expect_event("MESSAGE_LIST").await.unwrap();
    let contents: Vec<&str> = page
        .data
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["hi", "there"]);
    assert!(page.data.as_array().unwrap().iter().all(|m| m["isRead"] == true));

    // a fresh snapshot shows nothing unread from alice
    let _dave_client = gateway.connect(&dave()).await.unwrap();
    let snapshot = bob_client.expect_event("ONLINE_USERS").await.unwrap();
    assert_eq!(snapshot_entry(&snapshot.data, "alice").unwrap()["unreadCount"], 0);

    let unread = gateway.messages.unread_counts(bob().id).await.unwrap();
    assert!(unread.is_empty());
}

#[tokio::test]
async fn test_connect_with_peer_replays_history() {
    let gateway = TestGateway::start().await.unwrap();
    let mut alice_client = gateway.connect(&alice()).await.unwrap();
    alice_client.expect_event("ONLINE_USERS").await.unwrap();

    alice_client.send_message(bob().id, "you there?").await.unwrap();
    // bob is offline: the message is only stored
    tokio::time::timeout(Duration::from_secs(5), async {
        while gateway.messages.is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    let mut bob_client = gateway.connect_with_peer(&bob(), Some(alice().id)).await.unwrap();
    let events = bob_client.collect_until("ONLINE_USERS").await.unwrap();
    let names: Vec<&str> = events.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["MESSAGE_LIST", "ONLINE_USERS"]);

    assert_eq!(events[0].data[0]["content"], "you there?");
    assert_eq!(snapshot_entry(&events[1].data, "alice").unwrap()["unreadCount"], 0);
}

#[tokio::test]
async fn test_empty_user_id_skips_replay() {
    let gateway = TestGateway::start().await.unwrap();
    let url = format!("{}&userId=", gateway.ws_url(&gateway.token_for(&alice()), None));
    let mut client = TestClient::open(&url).await.unwrap();

    let events = client.collect_until("ONLINE_USERS").await.unwrap();
    let names: Vec<&str> = events.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["ONLINE_USERS"]);
}

#[tokio::test]
async fn test_unknown_receiver_reports_error_and_stays_open() {
    let gateway = TestGateway::start().await.unwrap();
    let mut client = gateway.connect(&alice()).await.unwrap();
    client.expect_event("ONLINE_USERS").await.unwrap();

    client.send_message(mallory().id, "hello?").await.unwrap();
    let error = client.expect_event("ERROR").await.unwrap();
    assert_eq!(error.data["code"], "NOT_FOUND");

    client.request_history(bob().id, None).await.unwrap();
    let page = client.expect_event("MESSAGE_LIST").await.unwrap();
    assert_eq!(page.data, serde_json::json!([]));
    assert!(gateway.messages.is_empty());
}

// ============================================================================
// Typing
// ============================================================================

#[tokio::test]
async fn test_typing_reaches_receiver() {
    let gateway = TestGateway::start().await.unwrap();
    let mut bob_client = gateway.connect(&bob()).await.unwrap();
    bob_client.expect_event("ONLINE_USERS").await.unwrap();

    let mut alice_client = gateway.connect(&alice()).await.unwrap();
    alice_client.notify_typing("bob").await.unwrap();
    let typing = bob_client.expect_event("TYPING_START").await.unwrap();
    assert_eq!(typing.data["username"], "alice");
}

#[tokio::test]
async fn test_typing_to_offline_user_is_silent() {
    let gateway = TestGateway::start().await.unwrap();
    let mut client = gateway.connect(&alice()).await.unwrap();
    client.expect_event("ONLINE_USERS").await.unwrap();

    client.notify_typing("bob").await.unwrap();
    client.request_history(bob().id, None).await.unwrap();

    // the next thing alice sees is her history, not an error
    let event = client.next_event().await.unwrap();
    assert_eq!(event.name, "MESSAGE_LIST");
}

// ============================================================================
// Protocol Errors
// ============================================================================

#[tokio::test]
async fn test_malformed_frame_closes_with_decode_error() {
    let gateway = TestGateway::start().await.unwrap();
    let mut client = gateway.connect(&alice()).await.unwrap();
    client.expect_event("ONLINE_USERS").await.unwrap();

    client.send_raw("{this is not json").await.unwrap();
    assert_eq!(client.expect_close().await.unwrap(), Some(4002));
    gateway.wait_for_presence("alice", false).await.unwrap();
}

#[tokio::test]
async fn test_unknown_op_closes_with_unknown_opcode() {
    let gateway = TestGateway::start().await.unwrap();
    let mut client = gateway.connect(&alice()).await.unwrap();
    client.expect_event("ONLINE_USERS").await.unwrap();

    client.send_op(9, serde_json::Value::Null).await.unwrap();
    assert_eq!(client.expect_close().await.unwrap(), Some(4001));
}

#[tokio::test]
async fn test_server_op_from_client_closes() {
    let gateway = TestGateway::start().await.unwrap();
    let mut client = gateway.connect(&alice()).await.unwrap();
    client.expect_event("ONLINE_USERS").await.unwrap();

    client.send_op(0, serde_json::json!({})).await.unwrap();
    assert_eq!(client.expect_close().await.unwrap(), Some(4001));
}
