//! TelegramDispatcher - Handles one classified Telegram update for a tenant.
//!
//! No conversation state is kept; every reply is derived from the rooms and
//! the ledger. Replies always use the tenant's own bot token.

use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::foundation::{ChatId, DomainError, RoomId, TelegramUserId, TenantId};
use crate::domain::telegram::{replies, Chat, ChatMemberUpdated, Command, TelegramUpdate, User};
use crate::domain::tenancy::{Room, TenantSecrets};
use crate::ports::ChatMessenger;

use super::room_registry::{RoomCreation, RoomRegistry};
use super::subscription_ledger::SubscriptionLedger;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Replied { chat_id: ChatId },
    RoomCreated(Room),
    /// Nothing to do: plain text, someone else's membership, duplicates.
    NoAction,
}

pub struct TelegramDispatcher {
    rooms: Arc<RoomRegistry>,
    ledger: Arc<SubscriptionLedger>,
    messenger: Arc<dyn ChatMessenger>,
}

impl TelegramDispatcher {
    pub fn new(
        rooms: Arc<RoomRegistry>,
        ledger: Arc<SubscriptionLedger>,
        messenger: Arc<dyn ChatMessenger>,
    ) -> Self {
        Self {
            rooms,
            ledger,
            messenger,
        }
    }

    pub async fn dispatch(
        &self,
        tenant_id: &TenantId,
        secrets: &TenantSecrets,
        update: TelegramUpdate,
    ) -> Result<DispatchOutcome, DomainError> {
        match update {
            TelegramUpdate::MembershipChange(change) => {
                self.membership_changed(tenant_id, secrets, change).await
            }
            TelegramUpdate::Command {
                chat,
                from,
                command,
            } => {
                let text = self.reply_for(tenant_id, &chat, &from, &command).await?;
                self.messenger
                    .send_message(&secrets.telegram_bot_token, chat.chat_id(), &text)
                    .await?;
                Ok(DispatchOutcome::Replied {
                    chat_id: chat.chat_id(),
                })
            }
            TelegramUpdate::PlainText { .. } | TelegramUpdate::Ignored => {
                Ok(DispatchOutcome::NoAction)
            }
        }
    }

    async fn membership_changed(
        &self,
        tenant_id: &TenantId,
        secrets: &TenantSecrets,
        change: ChatMemberUpdated,
    ) -> Result<DispatchOutcome, DomainError> {
        let subject = change.new_chat_member.user.telegram_user_id();
        let is_bot = subject.is_some() && subject == secrets.bot_user_id();
        if !is_bot || !change.chat.is_group() {
            return Ok(DispatchOutcome::NoAction);
        }

        let group_id = change.chat.chat_id();
        let status = change.new_chat_member.status;

        if status.is_gone() {
            tracing::info!(
                tenant_id = %tenant_id,
                group_id = %group_id,
                status = ?status,
                "Bot removed from group, room kept"
            );
            return Ok(DispatchOutcome::NoAction);
        }
        if !status.is_present() {
            return Ok(DispatchOutcome::NoAction);
        }

        if self.rooms.find_by_group(tenant_id, group_id).await?.is_some() {
            tracing::debug!(
                tenant_id = %tenant_id,
                group_id = %group_id,
                "Group already bound to a room"
            );
            return Ok(DispatchOutcome::NoAction);
        }

        match self
            .rooms
            .create_for_group(tenant_id, group_id, change.chat.title.as_deref())
            .await?
        {
            RoomCreation::Created(room) => {
                tracing::info!(
                    tenant_id = %tenant_id,
                    group_id = %group_id,
                    room_id = %room.room_id,
                    "Created room for group"
                );
                Ok(DispatchOutcome::RoomCreated(room))
            }
            RoomCreation::AlreadyBound => {
                tracing::info!(
                    tenant_id = %tenant_id,
                    group_id = %group_id,
                    "Concurrent update already bound group"
                );
                Ok(DispatchOutcome::NoAction)
            }
        }
    }

    async fn reply_for(
        &self,
        tenant_id: &TenantId,
        chat: &Chat,
        from: &User,
        command: &Command,
    ) -> Result<String, DomainError> {
        let Some(user) = from.telegram_user_id() else {
            return Ok(replies::UNKNOWN_COMMAND.to_string());
        };

        match command {
            Command::Start if chat.is_group() => self.start_in_group(tenant_id, chat, user).await,
            Command::Start => self.start_in_private(tenant_id, user).await,
            Command::Status => self.status(tenant_id, user).await,
            Command::Help => Ok(replies::HELP.to_string()),
            Command::Unknown(name) => {
                tracing::debug!(tenant_id = %tenant_id, command = %name, "Unknown command");
                Ok(replies::UNKNOWN_COMMAND.to_string())
            }
        }
    }

    async fn start_in_private(
        &self,
        tenant_id: &TenantId,
        user: TelegramUserId,
    ) -> Result<String, DomainError> {
        let rooms = self.rooms.list(tenant_id).await?;
        let subscribed: HashSet<RoomId> = self
            .ledger
            .list_user_rooms(tenant_id, user)
            .await?
            .into_iter()
            .filter(|row| row.subscription_status.is_active())
            .map(|row| row.room_id)
            .collect();
        Ok(replies::room_listing(&rooms, &subscribed, user))
    }

    async fn start_in_group(
        &self,
        tenant_id: &TenantId,
        chat: &Chat,
        user: TelegramUserId,
    ) -> Result<String, DomainError> {
        let Some(room) = self.rooms.find_by_group(tenant_id, chat.chat_id()).await? else {
            return Ok(replies::GROUP_NOT_LINKED.to_string());
        };
        let is_subscribed = self
            .ledger
            .get_user_room(tenant_id, user, &room.room_id)
            .await?
            .is_some_and(|row| row.subscription_status.is_active());
        Ok(replies::group_welcome(&room, user, is_subscribed))
    }

    async fn status(
        &self,
        tenant_id: &TenantId,
        user: TelegramUserId,
    ) -> Result<String, DomainError> {
        let rows = self.ledger.list_user_rooms(tenant_id, user).await?;
        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let name = match self.rooms.get(tenant_id, &row.room_id).await? {
                Some(room) => room.name,
                None => row.room_id.to_string(),
            };
            entries.push((name, row.subscription_status));
        }
        Ok(replies::status_report(&entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryItemStore, ManualClock, RecordingMessenger};
    use crate::application::subscription_ledger::ActivateSubscription;
    use crate::domain::foundation::Timestamp;
    use crate::domain::subscription::{PaymentProvider, SubscriptionStatus};
    use crate::domain::telegram::Update;
    use crate::domain::tenancy::secret_keys;
    use serde_json::json;
    use std::collections::HashMap;

    const BOT_ID: i64 = 555;

    struct Fixture {
        dispatcher: TelegramDispatcher,
        rooms: Arc<RoomRegistry>,
        ledger: Arc<SubscriptionLedger>,
        messenger: Arc<RecordingMessenger>,
        secrets: TenantSecrets,
    }

    fn t1() -> TenantId {
        TenantId::new("t1").unwrap()
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryItemStore::new());
        let clock = Arc::new(ManualClock::new(Timestamp::now()));
        let rooms = Arc::new(RoomRegistry::new(store.clone(), clock.clone()));
        let ledger = Arc::new(SubscriptionLedger::new(store, clock));
        let messenger = Arc::new(RecordingMessenger::new());
        let dispatcher = TelegramDispatcher::new(rooms.clone(), ledger.clone(), messenger.clone());
        let params = HashMap::from([
            (
                secret_keys::TELEGRAM_BOT_TOKEN.to_string(),
                format!("{}:bot-hash", BOT_ID),
            ),
            (secret_keys::TELEGRAM_WEBHOOK_SECRET.to_string(), "hook".to_string()),
        ]);
        Fixture {
            dispatcher,
            rooms,
            ledger,
            messenger,
            secrets: TenantSecrets::from_parameters(&t1(), &params).unwrap(),
        }
    }

    fn classify(value: serde_json::Value) -> TelegramUpdate {
        serde_json::from_value::<Update>(value).unwrap().classify()
    }

    fn membership(user_id: i64, old: &str, new: &str) -> TelegramUpdate {
        classify(json!({
            "update_id": 1,
            "my_chat_member": {
                "chat": { "id": -100999, "type": "supergroup", "title": "My Group" },
                "from": { "id": 42, "is_bot": false, "first_name": "Admin" },
                "old_chat_member": {
                    "status": old,
                    "user": { "id": user_id, "is_bot": true, "first_name": "Bot" }
                },
                "new_chat_member": {
                    "status": new,
                    "user": { "id": user_id, "is_bot": true, "first_name": "Bot" }
                }
            }
        }))
    }

    fn command(chat: serde_json::Value, text: &str) -> TelegramUpdate {
        classify(json!({
            "update_id": 2,
            "message": {
                "message_id": 10,
                "from": { "id": 123, "is_bot": false, "first_name": "Ann" },
                "chat": chat,
                "text": text
            }
        }))
    }

    fn private_chat() -> serde_json::Value {
        json!({ "id": 123, "type": "private" })
    }

    async fn active_room(f: &Fixture, group: i64, name: &str) -> Room {
        let RoomCreation::Created(mut room) = f
            .rooms
            .create_for_group(&t1(), ChatId::new(group), Some(name))
            .await
            .unwrap()
        else {
            panic!("room should be created");
        };
        room.is_active = true;
        room.payment_link = format!("https://buy.stripe.com/{}", name.to_lowercase());
        f.rooms.save(&room).await.unwrap();
        room
    }

    async fn subscribe(f: &Fixture, room: &Room) {
        f.ledger
            .activate(ActivateSubscription {
                tenant_id: t1(),
                telegram_user_id: TelegramUserId::new(123).unwrap(),
                room_id: room.room_id.clone(),
                provider: PaymentProvider::Stripe,
                provider_customer_id: "cus_1".to_string(),
                provider_subscription_id: Some("sub_1".to_string()),
            })
            .await
            .unwrap();
    }

    async fn only_reply(f: &Fixture) -> String {
        let sent = f.messenger.sent().await;
        assert_eq!(sent.len(), 1);
        sent[0].text.clone()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Membership changes
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn bot_joining_group_creates_inactive_room() {
        let f = fixture();

        let outcome = f
            .dispatcher
            .dispatch(&t1(), &f.secrets, membership(BOT_ID, "left", "member"))
            .await
            .unwrap();

        let DispatchOutcome::RoomCreated(room) = outcome else {
            panic!("expected a room");
        };
        assert_eq!(room.telegram_group_id, Some(ChatId::new(-100999)));
        assert_eq!(room.name, "My Group");
        assert!(!room.is_active);
        assert_eq!(room.payment_link, "");
        assert_eq!(f.rooms.list(&t1()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn other_user_joining_creates_nothing() {
        let f = fixture();

        let outcome = f
            .dispatcher
            .dispatch(&t1(), &f.secrets, membership(777, "left", "member"))
            .await
            .unwrap();

        assert_eq!(outcome, DispatchOutcome::NoAction);
        assert!(f.rooms.list(&t1()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn bot_promoted_in_bound_group_creates_no_second_room() {
        let f = fixture();
        f.dispatcher
            .dispatch(&t1(), &f.secrets, membership(BOT_ID, "left", "member"))
            .await
            .unwrap();

        let outcome = f
            .dispatcher
            .dispatch(&t1(), &f.secrets, membership(BOT_ID, "member", "administrator"))
            .await
            .unwrap();

        assert_eq!(outcome, DispatchOutcome::NoAction);
        assert_eq!(f.rooms.list(&t1()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn bot_removed_keeps_room() {
        let f = fixture();
        f.dispatcher
            .dispatch(&t1(), &f.secrets, membership(BOT_ID, "left", "member"))
            .await
            .unwrap();

        let outcome = f
            .dispatcher
            .dispatch(&t1(), &f.secrets, membership(BOT_ID, "member", "kicked"))
            .await
            .unwrap();

        assert_eq!(outcome, DispatchOutcome::NoAction);
        assert_eq!(f.rooms.list(&t1()).await.unwrap().len(), 1);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Commands
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn start_in_private_marks_subscribed_rooms() {
        let f = fixture();
        let vip = active_room(&f, -1, "VIP").await;
        let extra = active_room(&f, -2, "Extra").await;
        subscribe(&f, &vip).await;

        f.dispatcher
            .dispatch(&t1(), &f.secrets, command(private_chat(), "/start"))
            .await
            .unwrap();

        let text = only_reply(&f).await;
        assert!(text.contains("✅ *VIP* — subscribed"));
        assert!(text.contains("🔒 *Extra*"));
        let token = format!("t1:123:{}", extra.room_id);
        assert!(text.contains(&token));
        assert!(!text.contains(&format!("t1:123:{}", vip.room_id)));
    }

    #[tokio::test]
    async fn start_in_private_without_rooms() {
        let f = fixture();

        f.dispatcher
            .dispatch(&t1(), &f.secrets, command(private_chat(), "/start"))
            .await
            .unwrap();

        assert_eq!(only_reply(&f).await, replies::NO_ROOMS);
    }

    #[tokio::test]
    async fn start_in_bound_group_shows_room_link() {
        let f = fixture();
        let vip = active_room(&f, -100999, "VIP").await;

        let outcome = f
            .dispatcher
            .dispatch(
                &t1(),
                &f.secrets,
                command(json!({ "id": -100999, "type": "supergroup" }), "/start@tollbot"),
            )
            .await
            .unwrap();

        assert_eq!(
            outcome,
            DispatchOutcome::Replied {
                chat_id: ChatId::new(-100999)
            }
        );
        let text = only_reply(&f).await;
        assert!(text.starts_with("Welcome to *VIP*!"));
        assert!(text.contains(&format!("t1:123:{}", vip.room_id)));
    }

    #[tokio::test]
    async fn start_in_bound_group_welcomes_subscriber_back() {
        let f = fixture();
        let vip = active_room(&f, -100999, "VIP").await;
        subscribe(&f, &vip).await;

        f.dispatcher
            .dispatch(
                &t1(),
                &f.secrets,
                command(json!({ "id": -100999, "type": "group" }), "/start"),
            )
            .await
            .unwrap();

        assert!(only_reply(&f).await.starts_with("Welcome back to *VIP*!"));
    }

    #[tokio::test]
    async fn start_in_unbound_group() {
        let f = fixture();

        f.dispatcher
            .dispatch(
                &t1(),
                &f.secrets,
                command(json!({ "id": -5, "type": "group" }), "/start"),
            )
            .await
            .unwrap();

        assert_eq!(only_reply(&f).await, replies::GROUP_NOT_LINKED);
    }

    #[tokio::test]
    async fn status_lists_rows_with_labels() {
        let f = fixture();
        let vip = active_room(&f, -1, "VIP").await;
        subscribe(&f, &vip).await;
        f.ledger
            .update_status(
                &t1(),
                TelegramUserId::new(123).unwrap(),
                &vip.room_id,
                SubscriptionStatus::PastDue,
                None,
            )
            .await
            .unwrap();

        f.dispatcher
            .dispatch(&t1(), &f.secrets, command(private_chat(), "/status"))
            .await
            .unwrap();

        assert_eq!(only_reply(&f).await, "*Your subscriptions:*\nVIP: ⚠️ Past due");
    }

    #[tokio::test]
    async fn status_without_rows() {
        let f = fixture();

        f.dispatcher
            .dispatch(&t1(), &f.secrets, command(private_chat(), "/STATUS"))
            .await
            .unwrap();

        assert_eq!(only_reply(&f).await, replies::NO_SUBSCRIPTIONS);
    }

    #[tokio::test]
    async fn help_and_unknown_commands() {
        let f = fixture();

        f.dispatcher
            .dispatch(&t1(), &f.secrets, command(private_chat(), "/help"))
            .await
            .unwrap();
        f.dispatcher
            .dispatch(&t1(), &f.secrets, command(private_chat(), "/subscribe now"))
            .await
            .unwrap();

        let sent = f.messenger.sent().await;
        assert_eq!(sent[0].text, replies::HELP);
        assert_eq!(sent[1].text, replies::UNKNOWN_COMMAND);
    }

    #[tokio::test]
    async fn plain_text_gets_no_reply() {
        let f = fixture();

        let outcome = f
            .dispatcher
            .dispatch(
                &t1(),
                &f.secrets,
                command(json!({ "id": -100999, "type": "supergroup" }), "hello all"),
            )
            .await
            .unwrap();

        assert_eq!(outcome, DispatchOutcome::NoAction);
        assert!(f.messenger.sent().await.is_empty());
    }

    #[tokio::test]
    async fn replies_use_tenant_bot_token() {
        let f = fixture();

        f.dispatcher
            .dispatch(&t1(), &f.secrets, command(private_chat(), "/help"))
            .await
            .unwrap();

        assert_eq!(f.messenger.sent().await[0].bot_token, "555:bot-hash");
    }
}
