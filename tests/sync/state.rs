//! AdminState wiring: session verification and loading every store.

use repairdesk::{
    AdminState, CurrentUser, InMemoryGateway, QuoteRequest, Role, Session, SyncError,
    SyncOutcome,
};
use serde_json::json;

use crate::support::{admin, admin_state, seeded_gateway, ADMIN_TOKEN};

#[tokio::test]
async fn load_all_fills_every_store() {
    let (gateway, state) = admin_state();
    gateway.seed_raw::<QuoteRequest>(vec![json!({
        "_id": "q1", "userId": "c1", "serviceType": "Data recovery",
        "timeline": "sameday", "budget": "100-200", "status": "quoted", "quotedAmount": 150
    })]);

    let report = state.load_all().await;
    assert!(report.all_applied(), "{report:?}");
    assert_eq!(state.support_store().total_count(), 3);
    assert_eq!(state.quote_store().total_count(), 1);
    assert_eq!(state.inventory_store().total_count(), 2);
    assert_eq!(state.user_store().total_count(), 0);
    assert_eq!(gateway.calls().len(), 4);
}

#[tokio::test]
async fn one_failing_collection_does_not_block_the_others() {
    let (gateway, state) = admin_state();
    gateway.fail_next::<QuoteRequest>(repairdesk::GatewayError::Api {
        status: 503,
        message: None,
    });

    let report = state.load_all().await;
    assert_eq!(report.quote_requests, SyncOutcome::Failed);
    assert_eq!(report.support_requests, SyncOutcome::Applied);
    assert_eq!(
        state.quote_store().error().as_deref(),
        Some(repairdesk::API_FAILED_MESSAGE)
    );
    assert!(!report.all_applied());
}

#[tokio::test]
async fn verify_session_resolves_token() {
    let gateway = seeded_gateway();
    let state = AdminState::new(gateway, Session::with_token(ADMIN_TOKEN));

    let user = state.verify_session().await.unwrap();
    assert_eq!(user, admin());
    assert!(state.session().has_panel_access());
    assert!(!state.session().needs_login());
}

#[tokio::test]
async fn customers_are_turned_away() {
    let gateway = InMemoryGateway::new()
        .with_user("customer", CurrentUser::new("c1", "Carla Customer", Role::User));
    let state = AdminState::new(gateway, Session::with_token("customer"));

    let err = state.verify_session().await.unwrap_err();
    assert_eq!(
        err,
        SyncError::Forbidden("You do not have access to Admin Panel".into())
    );
    assert!(state.session().needs_login());
    assert_eq!(state.users().load().await, SyncOutcome::Failed);
}

#[tokio::test]
async fn store_snapshot_serializes_for_views() {
    let (_gateway, state) = admin_state();
    state.support_requests().load().await;

    let view = serde_json::to_value(state.support_store().snapshot()).unwrap();
    assert_eq!(view["totalCount"], 3);
    assert_eq!(view["stats"]["pending"], 2);
    assert_eq!(view["loading"], false);
    assert_eq!(view["records"][0]["_id"], "t1");
}
