//! Shared fixtures: a seeded in-memory gateway and signed-in sessions.

use repairdesk::{
    AdminState, CurrentUser, InMemoryGateway, InventoryItem, Role, Session, SupportRequest,
};
use serde_json::json;

pub const ADMIN_TOKEN: &str = "admin-token";
pub const TECH_TOKEN: &str = "tech-token";

pub fn admin() -> CurrentUser {
    CurrentUser::new("u-admin", "Alice Admin", Role::Admin)
}

pub fn technician() -> CurrentUser {
    CurrentUser::new("u-tech", "Terry Tech", Role::Technician)
}

/// Route test logs through `RUST_LOG` when set. Safe to call more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Gateway knowing both staff tokens, with three tickets and two stock items.
pub fn seeded_gateway() -> InMemoryGateway {
    init_tracing();
    let gateway = InMemoryGateway::new()
        .with_user(ADMIN_TOKEN, admin())
        .with_user(TECH_TOKEN, technician());
    gateway.seed_raw::<SupportRequest>(vec![
        json!({"_id": "t1", "userId": {"_id": "c1", "name": "Carla Customer"}, "device": "Laptop",
               "issue": "Screen flickers", "urgency": "high", "status": "pending"}),
        json!({"_id": "t2", "userId": "c2", "device": "Desktop",
               "issue": "Won't boot", "urgency": "critical", "status": "pending"}),
        json!({"_id": "t3", "userId": "c1", "device": "Phone",
               "issue": "Battery drains", "urgency": "low", "status": "resolved",
               "assignedTechnic": "u-tech"}),
    ]);
    gateway.seed_raw::<InventoryItem>(vec![
        json!({"_id": "i1", "name": "SSD 1TB", "category": "Storage",
               "quantity": 10, "minStock": 2, "price": 80.0}),
        json!({"_id": "i2", "name": "Thermal paste", "category": "Supplies",
               "quantity": 0, "minimumStock": 5, "price": 7.5}),
    ]);
    gateway
}

pub fn session_for(token: &str, user: CurrentUser) -> Session {
    let session = Session::new();
    session.login(token, user);
    session
}

pub fn admin_state() -> (InMemoryGateway, AdminState<InMemoryGateway>) {
    let gateway = seeded_gateway();
    let state = AdminState::new(gateway.clone(), session_for(ADMIN_TOKEN, admin()));
    (gateway, state)
}
