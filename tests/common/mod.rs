//! Shared harness for the HTTP integration tests.
//!
//! Wires the full router over in-memory adapters and registers tenant `t1`
//! with bot `555`, Telegram secret `hook-t1`, a Stripe webhook secret and
//! PayPal credentials.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use tollgate::adapters::http::{webhook_router, WebhookAppState, WebhookDependencies};
use tollgate::adapters::{
    InMemoryItemStore, InMemorySecretStore, ManualClock, MockPayPalApi, RecordingMessenger,
};
use tollgate::application::{RoomCreation, RoomRegistry, SubscriptionLedger, TenantDirectory};
use tollgate::domain::foundation::{ChatId, TenantId, Timestamp};
use tollgate::domain::tenancy::{secret_keys, Room, Tenant};
use tollgate::ports::Clock;

pub const BOT_ID: i64 = 555;
pub const TELEGRAM_SECRET: &str = "hook-t1";
pub const STRIPE_SECRET: &str = "whsec_t1";

pub struct Harness {
    pub app: Router,
    pub store: Arc<InMemoryItemStore>,
    pub secrets: Arc<InMemorySecretStore>,
    pub messenger: Arc<RecordingMessenger>,
    pub paypal: MockPayPalApi,
    pub clock: Arc<ManualClock>,
}

pub fn t1() -> TenantId {
    TenantId::new("t1").unwrap()
}

impl Harness {
    pub async fn new() -> Self {
        let store = Arc::new(InMemoryItemStore::new());
        let secrets = Arc::new(InMemorySecretStore::new());
        let messenger = Arc::new(RecordingMessenger::new());
        let paypal = MockPayPalApi::new();
        let clock = Arc::new(ManualClock::new(Timestamp::now()));

        let state = WebhookAppState::build(WebhookDependencies {
            store: store.clone(),
            secret_store: secrets.clone(),
            messenger: messenger.clone(),
            paypal: Arc::new(paypal.clone()),
            clock: clock.clone(),
            secrets_path_prefix: "/tollgate/tenants".to_string(),
            secrets_cache_ttl: Duration::from_secs(300),
            stripe_tolerance_secs: 300,
        });

        let harness = Self {
            app: webhook_router(state),
            store,
            secrets,
            messenger,
            paypal,
            clock,
        };
        harness.register_tenant("t1", TELEGRAM_SECRET).await;
        harness
    }

    pub async fn register_tenant(&self, tenant: &str, telegram_secret: &str) {
        let tenant_id = TenantId::new(tenant).unwrap();
        TenantDirectory::new(self.store.clone())
            .register(
                &Tenant::new(tenant_id, tenant, format!("sub-{}", tenant), self.clock.now()),
                telegram_secret,
            )
            .await
            .unwrap();

        let param = |key: &str| format!("/tollgate/tenants/{}/{}", tenant, key);
        self.secrets
            .insert(param(secret_keys::TELEGRAM_BOT_TOKEN), format!("{}:bot-hash", BOT_ID))
            .await;
        self.secrets
            .insert(param(secret_keys::TELEGRAM_WEBHOOK_SECRET), telegram_secret)
            .await;
        self.secrets
            .insert(param(secret_keys::STRIPE_WEBHOOK_SECRET), STRIPE_SECRET)
            .await;
        self.secrets
            .insert(param(secret_keys::PAYPAL_CLIENT_ID), "client-1")
            .await;
        self.secrets
            .insert(param(secret_keys::PAYPAL_CLIENT_SECRET), "paypal-secret")
            .await;
        self.secrets
            .insert(param(secret_keys::PAYPAL_WEBHOOK_ID), "WH-ID-1")
            .await;
    }

    pub fn ledger(&self) -> SubscriptionLedger {
        SubscriptionLedger::new(self.store.clone(), self.clock.clone())
    }

    pub fn rooms(&self) -> RoomRegistry {
        RoomRegistry::new(self.store.clone(), self.clock.clone())
    }

    /// Creates an active room bound to `group` with a Stripe payment link.
    pub async fn active_room(&self, group: i64, name: &str) -> Room {
        let rooms = self.rooms();
        let RoomCreation::Created(mut room) = rooms
            .create_for_group(&t1(), ChatId::new(group), Some(name))
            .await
            .unwrap()
        else {
            panic!("group {} already bound", group);
        };
        room.is_active = true;
        room.payment_link = "https://buy.stripe.com/test_room".to_string();
        rooms.save(&room).await.unwrap();
        room
    }

    /// Sends a request and returns the status and JSON body (`Null` if empty).
    pub async fn post(
        &self,
        uri: &str,
        headers: &[(&str, String)],
        body: &str,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method("POST").uri(uri);
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }
        let request = request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }
}
