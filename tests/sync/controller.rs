//! Controller behavior against the in-memory gateway.

use std::time::Duration;

use repairdesk::{
    AdminState, GatewayError, InventoryItem, InventoryPatch, NewSupportRequest, NewUser,
    QuoteRequest, QuoteRequestPatch, QuoteStatus, RequestStatus, Role, Session, StockStatus,
    SupportRequest, SupportRequestPatch, SyncOutcome, Urgency, User,
};
use serde_json::json;

use crate::support::{admin_state, seeded_gateway, session_for, technician, TECH_TOKEN};

fn new_ticket() -> NewSupportRequest {
    NewSupportRequest {
        user_id: "c3".into(),
        device: "Tablet".into(),
        issue: "Charging port loose".into(),
        urgency: Urgency::Medium,
    }
}

#[tokio::test]
async fn load_replaces_collection_and_counts() {
    let (_gateway, state) = admin_state();

    assert_eq!(state.support_requests().load().await, SyncOutcome::Applied);

    let store = state.support_store();
    assert_eq!(store.total_count(), 3);
    assert_eq!(store.stats().get(RequestStatus::Pending), 2);
    assert_eq!(store.stats().get(RequestStatus::Resolved), 1);
    assert_eq!(store.stats().get(RequestStatus::Scheduled), 0);
    assert!(!store.is_loading());
    assert_eq!(store.error(), None);

    let legacy = store.get("t3").unwrap();
    assert_eq!(legacy.assigned_technician.as_ref().map(|t| t.id()), Some("u-tech"));
}

#[tokio::test]
async fn create_inserts_echo_at_head() {
    let (gateway, state) = admin_state();
    let tickets = state.support_requests();
    tickets.load().await;

    assert_eq!(tickets.create(new_ticket()).await, SyncOutcome::Applied);

    let store = state.support_store();
    assert_eq!(store.total_count(), 4);
    assert_eq!(store.stats().get(RequestStatus::Pending), 3);
    let head = store.read(|s| s.records()[0].clone());
    assert_eq!(head.device, "Tablet");
    assert_eq!(head.status, RequestStatus::Pending);
    assert!(head.created_at.is_some());
    assert_eq!(gateway.documents::<SupportRequest>().len(), 4);
}

#[tokio::test]
async fn failed_create_leaves_store_untouched() {
    let (gateway, state) = admin_state();
    let tickets = state.support_requests();
    tickets.load().await;
    let before = state.support_store().snapshot();

    gateway.fail_next::<SupportRequest>(GatewayError::Api {
        status: 500,
        message: Some("Database unavailable".into()),
    });
    assert_eq!(tickets.create(new_ticket()).await, SyncOutcome::Failed);

    let store = state.support_store();
    assert_eq!(store.total_count(), before.total_count());
    assert_eq!(store.stats(), *before.stats());
    assert_eq!(store.error().as_deref(), Some("Database unavailable"));
    assert!(!store.is_loading());
}

#[tokio::test]
async fn invalid_draft_never_reaches_gateway() {
    let (gateway, state) = admin_state();
    let draft = NewSupportRequest {
        device: "  ".into(),
        ..new_ticket()
    };

    assert_eq!(state.support_requests().create(draft).await, SyncOutcome::Failed);
    assert_eq!(
        state.support_store().error().as_deref(),
        Some("invalid device: must not be empty")
    );
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn status_change_moves_one_count() {
    let (gateway, state) = admin_state();
    let tickets = state.support_requests();
    tickets.load().await;

    let outcome = tickets
        .update("t1", SupportRequestPatch::status(RequestStatus::Scheduled))
        .await;
    assert_eq!(outcome, SyncOutcome::Applied);

    let store = state.support_store();
    assert_eq!(store.stats().get(RequestStatus::Pending), 1);
    assert_eq!(store.stats().get(RequestStatus::Scheduled), 1);
    assert_eq!(store.total_count(), 3);
    assert_eq!(store.get("t1").unwrap().status, RequestStatus::Scheduled);

    let remote = gateway.documents::<SupportRequest>();
    let t1 = remote.iter().find(|d| d["_id"] == "t1").unwrap();
    assert_eq!(t1["status"], "scheduled");
}

#[tokio::test]
async fn assignment_merges_without_touching_other_fields() {
    let (_gateway, state) = admin_state();
    let tickets = state.support_requests();
    tickets.load().await;

    tickets
        .update("t1", SupportRequestPatch::default().assign("u-tech"))
        .await;
    let t1 = state.support_store().get("t1").unwrap();
    assert_eq!(t1.assigned_technician.as_ref().map(|t| t.id()), Some("u-tech"));
    assert_eq!(t1.issue, "Screen flickers");
    assert_eq!(t1.user_id.name(), Some("Carla Customer"));

    tickets
        .update("t1", SupportRequestPatch::default().unassign())
        .await;
    assert!(state.support_store().get("t1").unwrap().assigned_technician.is_none());
}

#[tokio::test]
async fn update_of_unknown_record_is_reported_by_gateway() {
    let (_gateway, state) = admin_state();
    let tickets = state.support_requests();
    tickets.load().await;

    let outcome = tickets
        .update("missing", SupportRequestPatch::status(RequestStatus::Resolved))
        .await;
    assert_eq!(outcome, SyncOutcome::Failed);
    assert_eq!(state.support_store().total_count(), 3);
    assert!(state.support_store().error().is_some());
}

#[tokio::test]
async fn remove_then_remove_again() {
    let (_gateway, state) = admin_state();
    let tickets = state.support_requests();
    tickets.load().await;

    assert_eq!(tickets.remove("t3").await, SyncOutcome::Applied);
    let store = state.support_store();
    assert_eq!(store.total_count(), 2);
    assert_eq!(store.stats().get(RequestStatus::Resolved), 0);

    assert_eq!(tickets.remove("t3").await, SyncOutcome::Failed);
    assert_eq!(store.total_count(), 2);
}

#[tokio::test]
async fn bulk_status_update() {
    let (_gateway, state) = admin_state();
    let tickets = state.support_requests();
    tickets.load().await;

    let outcome = tickets
        .update_many(&["t1", "t2"], SupportRequestPatch::status(RequestStatus::Resolved))
        .await;
    assert_eq!(outcome, SyncOutcome::Applied);

    let stats = state.support_store().stats();
    assert_eq!(stats.get(RequestStatus::Pending), 0);
    assert_eq!(stats.get(RequestStatus::Resolved), 3);
}

#[tokio::test]
async fn bulk_update_keeps_successes_and_reports_failure() {
    let (gateway, state) = admin_state();
    let tickets = state.support_requests();
    tickets.load().await;

    gateway.fail_next::<SupportRequest>(GatewayError::Api {
        status: 409,
        message: Some("Ticket locked".into()),
    });
    let outcome = tickets
        .update_many(&["t1", "t2"], SupportRequestPatch::status(RequestStatus::Scheduled))
        .await;
    assert_eq!(outcome, SyncOutcome::Failed);

    let store = state.support_store();
    assert_eq!(store.get("t1").unwrap().status, RequestStatus::Pending);
    assert_eq!(store.get("t2").unwrap().status, RequestStatus::Scheduled);
    assert_eq!(store.stats().get(RequestStatus::Scheduled), 1);
    assert_eq!(store.error().as_deref(), Some("Ticket locked"));
}

#[tokio::test]
async fn inventory_update_recomputes_stock_status() {
    let (gateway, state) = admin_state();
    let inventory = state.inventory();
    inventory.load().await;

    let store = state.inventory_store();
    assert_eq!(store.get("i1").unwrap().status, StockStatus::InStock);
    assert_eq!(store.get("i1").unwrap().minimum_stock, 2);
    assert_eq!(store.stats().get(StockStatus::OutOfStock), 1);

    assert_eq!(
        inventory.update("i1", InventoryPatch::quantity(1)).await,
        SyncOutcome::Applied
    );
    assert_eq!(store.get("i1").unwrap().status, StockStatus::LowStock);
    assert_eq!(store.stats().get(StockStatus::InStock), 0);
    assert_eq!(store.stats().get(StockStatus::LowStock), 1);

    let remote = gateway.documents::<InventoryItem>();
    let i1 = remote.iter().find(|d| d["_id"] == "i1").unwrap();
    assert_eq!(i1["quantity"], 1);
    assert_eq!(i1["status"], "Low Stock");
}

#[tokio::test]
async fn invalid_price_never_reaches_gateway() {
    let (gateway, state) = admin_state();
    let inventory = state.inventory();
    inventory.load().await;
    let calls_after_load = gateway.calls().len();

    for price in [-40.0, f64::NAN] {
        assert_eq!(
            inventory.update("i1", InventoryPatch::stock(5, 2, price)).await,
            SyncOutcome::Failed
        );
    }
    assert_eq!(
        inventory.update_many(&["i1", "i2"], InventoryPatch::stock(5, 2, -1.0)).await,
        SyncOutcome::Failed
    );

    let store = state.inventory_store();
    assert_eq!(store.get("i1").unwrap().price, 80.0);
    assert_eq!(store.get("i1").unwrap().quantity, 10);
    assert_eq!(
        store.error().as_deref(),
        Some("invalid price: must be a non-negative amount")
    );
    assert_eq!(gateway.calls().len(), calls_after_load);
    assert!(gateway.calls().iter().all(|call| call.method != "PUT"));

    let remote = gateway.documents::<InventoryItem>();
    let i1 = remote.iter().find(|d| d["_id"] == "i1").unwrap();
    assert_eq!(i1["price"], 80.0);
}

#[tokio::test]
async fn negative_quote_amount_is_rejected_locally() {
    let (gateway, state) = admin_state();
    gateway.seed_raw::<QuoteRequest>(vec![json!({
        "_id": "q1", "userId": "c1", "serviceType": "Data recovery",
        "timeline": "express", "budget": 200, "status": "pending"
    })]);
    let quotes = state.quote_requests();
    quotes.load().await;

    assert_eq!(
        quotes.update("q1", QuoteRequestPatch::quote(-10.0)).await,
        SyncOutcome::Failed
    );
    let q1 = state.quote_store().get("q1").unwrap();
    assert_eq!(q1.status, QuoteStatus::Pending);
    assert_eq!(q1.quoted_amount, None);
    assert!(gateway.calls().iter().all(|call| call.method != "PUT"));
}

#[tokio::test]
async fn missing_credential_is_unauthenticated() {
    let gateway = seeded_gateway();
    let state = AdminState::new(gateway.clone(), Session::new());

    assert_eq!(state.support_requests().load().await, SyncOutcome::Failed);
    assert_eq!(
        state.support_store().error().as_deref(),
        Some("authentication required")
    );
    assert!(state.session().needs_login());
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn rejected_token_requires_login() {
    let gateway = seeded_gateway();
    let state = AdminState::new(gateway, session_for("expired", technician()));

    assert_eq!(state.users().load().await, SyncOutcome::Failed);
    assert_eq!(state.user_store().error().as_deref(), Some("Invalid token"));
    assert!(state.session().needs_login());
}

#[tokio::test]
async fn technician_cannot_manage_accounts_or_stock() {
    let gateway = seeded_gateway();
    let state = AdminState::new(gateway.clone(), session_for(TECH_TOKEN, technician()));

    let draft = NewUser {
        name: "New Hire".into(),
        email: "hire@shop.test".into(),
        role: Role::Technician,
        password: "correct horse".into(),
    };
    assert_eq!(state.users().create(draft).await, SyncOutcome::Failed);
    assert_eq!(
        state.user_store().error().as_deref(),
        Some("Only administrators can add or remove accounts.")
    );

    assert_eq!(
        state.inventory().update("i1", InventoryPatch::quantity(0)).await,
        SyncOutcome::Failed
    );
    assert_eq!(
        state.inventory_store().error().as_deref(),
        Some("You do not have permission to update stock.")
    );
    assert!(gateway.calls().is_empty());

    assert_eq!(state.inventory().load().await, SyncOutcome::Applied);
    assert_eq!(state.inventory_store().error(), None);
}

#[tokio::test]
async fn offline_gateway_surfaces_transport_error() {
    let (gateway, state) = admin_state();
    gateway.set_offline(true);

    assert_eq!(state.quote_requests().load().await, SyncOutcome::Failed);
    assert_eq!(
        state.quote_store().error().as_deref(),
        Some("connection refused")
    );
    assert!(!state.session().needs_login());
}

#[tokio::test]
async fn acknowledge_error_and_selection() {
    let (gateway, state) = admin_state();
    let tickets = state.support_requests();
    gateway.fail_next::<SupportRequest>(GatewayError::Transport(String::new()));
    tickets.load().await;
    assert_eq!(state.support_store().error().as_deref(), Some("Network error"));

    tickets.acknowledge_error();
    assert_eq!(state.support_store().error(), None);

    tickets.load().await;
    assert_eq!(tickets.select("t2"), SyncOutcome::Applied);
    assert_eq!(tickets.select("nope"), SyncOutcome::Skipped);
    assert_eq!(state.support_store().selected().unwrap().id, "t2");

    tickets.remove("t2").await;
    assert!(state.support_store().selected().is_none());
}

#[tokio::test]
async fn concurrent_intents_resolve_independently() {
    let (_gateway, state) = admin_state();
    let tickets = state.support_requests();
    tickets.load().await;

    let (created, updated, removed) = tokio::join!(
        tickets.create(new_ticket()),
        tickets.update("t1", SupportRequestPatch::status(RequestStatus::Resolved)),
        tickets.remove("t2"),
    );
    assert_eq!(created, SyncOutcome::Applied);
    assert_eq!(updated, SyncOutcome::Applied);
    assert_eq!(removed, SyncOutcome::Applied);

    let store = state.support_store();
    assert_eq!(store.total_count(), 3);
    assert_eq!(store.stats().get(RequestStatus::Pending), 1);
    assert_eq!(store.stats().get(RequestStatus::Resolved), 2);
}

#[tokio::test]
async fn late_response_after_teardown_is_detached() {
    let (gateway, state) = admin_state();
    gateway.set_latency(Some(Duration::from_millis(100)));

    let tickets = state.support_requests();
    let pending = tokio::spawn(async move { tickets.load().await });
    tokio::time::sleep(Duration::from_millis(20)).await;
    state.teardown();

    assert_eq!(pending.await.unwrap(), SyncOutcome::Detached);
}

#[tokio::test]
async fn users_store_keeps_no_buckets() {
    let (gateway, state) = admin_state();
    gateway.seed_raw::<User>(vec![
        json!({"_id": "u-admin", "name": "Alice Admin", "email": "alice@shop.test", "role": "admin"}),
        json!({"_id": "c1", "name": "Carla Customer", "email": "carla@mail.test", "role": "user"}),
    ]);

    state.users().load().await;
    assert_eq!(state.user_store().total_count(), 2);
    assert_eq!(state.user_store().stats().total(), 0);
}
