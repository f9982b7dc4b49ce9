//! Outbound chat text.
//!
//! Replies use Telegram's legacy Markdown. User-supplied text (room names,
//! prices) is escaped; subscribe links go out verbatim as inline links so
//! the correlation token survives byte for byte.

use std::collections::HashSet;

use crate::domain::foundation::{RoomId, TelegramUserId};
use crate::domain::subscription::{CorrelationToken, SubscriptionStatus};
use crate::domain::tenancy::Room;

/// Notices pushed to a subscriber's private chat by payment events.
pub mod notices {
    pub const ACTIVATED: &str = "Your subscription is now active! Use /help to see what you can do.";
    pub const CANCELLED: &str = "Your subscription has been cancelled. Use /start to resubscribe.";
    pub const STRIPE_PAYMENT_FAILED: &str =
        "Your payment failed. Please update your payment method to keep your subscription active.";
    pub const PAYPAL_SUSPENDED: &str =
        "Your subscription payment is past due. Please update your payment method to keep your access.";
    pub const PAYPAL_DENIED: &str =
        "Your PayPal payment was denied. Please update your payment method to keep your access.";
}

pub const HELP: &str = "*Available commands:*\n\
/start - See available rooms and subscribe\n\
/status - Check your subscription status\n\
/help - Show this help message";

pub const UNKNOWN_COMMAND: &str =
    "I don't recognize that command. Use /help to see available commands.";

pub const NO_ROOMS: &str = "This bot has no rooms available yet. Check back later!";

pub const NO_SUBSCRIPTIONS: &str =
    "You do not have any subscriptions yet. Use /start to see available rooms.";

pub const GROUP_NOT_LINKED: &str = "This group is not linked to a room yet.";

pub const ROOM_NOT_OPEN: &str = "This room is not open for subscriptions yet.";

/// Escapes legacy-Markdown control characters.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Inline link; the URL part of a legacy-Markdown link is not parsed for
/// entities, only `)` ends it.
fn subscribe_link(url: &str) -> String {
    format!("[Subscribe]({})", url.replace(')', "%29"))
}

/// `/start` in a private chat: every active room, subscribed ones marked.
pub fn room_listing(
    rooms: &[Room],
    subscribed: &HashSet<RoomId>,
    user: TelegramUserId,
) -> String {
    let active: Vec<&Room> = rooms.iter().filter(|r| r.is_active).collect();
    if active.is_empty() {
        return NO_ROOMS.to_string();
    }

    let mut lines = vec!["Welcome! Here are the available rooms:".to_string()];
    for room in active {
        let name = escape_markdown(&room.name);
        if subscribed.contains(&room.room_id) {
            lines.push(format!("✅ *{}* — subscribed", name));
            continue;
        }

        let price = room
            .price_description
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| format!(" ({})", escape_markdown(p)))
            .unwrap_or_default();
        let token = CorrelationToken::new(room.tenant_id.clone(), user, room.room_id.clone());
        lines.push(format!(
            "🔒 *{}*{}\n{}",
            name,
            price,
            subscribe_link(&room.subscribe_link(&token))
        ));
    }
    lines.join("\n\n")
}

/// `/start` inside the group a room is bound to.
pub fn group_welcome(room: &Room, user: TelegramUserId, is_subscribed: bool) -> String {
    if !room.is_active {
        return ROOM_NOT_OPEN.to_string();
    }

    let name = escape_markdown(&room.name);
    if is_subscribed {
        return format!("Welcome back to *{}*! Your subscription is active.", name);
    }

    let token = CorrelationToken::new(room.tenant_id.clone(), user, room.room_id.clone());
    format!(
        "Welcome to *{}*! Subscribe here to get access:\n{}",
        name,
        subscribe_link(&room.subscribe_link(&token))
    )
}

/// `/status`: one line per room the user has a ledger row for.
pub fn status_report(entries: &[(String, SubscriptionStatus)]) -> String {
    if entries.is_empty() {
        return NO_SUBSCRIPTIONS.to_string();
    }

    let mut text = String::from("*Your subscriptions:*");
    for (name, status) in entries {
        text.push('\n');
        text.push_str(&format!("{}: {}", escape_markdown(name), status.label()));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ChatId, TenantId, Timestamp};

    fn room(name: &str, active: bool) -> Room {
        let mut room = Room::for_group(
            TenantId::new("t1").unwrap(),
            ChatId::new(-1),
            Some(name),
            Timestamp::now(),
        );
        room.is_active = active;
        room.payment_link = "https://buy.stripe.com/x".into();
        room
    }

    fn user() -> TelegramUserId {
        TelegramUserId::new(123).unwrap()
    }

    // ══════════════════════════════════════════════════════════════
    // Room listing
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn listing_marks_subscribed_and_links_the_rest() {
        let vip = room("VIP", true);
        let extra = room("Extra", true);
        let subscribed = HashSet::from([vip.room_id.clone()]);

        let text = room_listing(&[vip.clone(), extra.clone()], &subscribed, user());

        assert!(text.starts_with("Welcome! Here are the available rooms:"));
        assert!(text.contains("✅ *VIP* — subscribed"));
        assert!(text.contains("🔒 *Extra*"));
        assert!(text.contains(&format!("t1:123:{}", extra.room_id)));
        assert!(!text.contains(&format!("t1:123:{}", vip.room_id)));
    }

    #[test]
    fn listing_skips_inactive_rooms() {
        let text = room_listing(&[room("Hidden", false), room("Open", true)], &HashSet::new(), user());
        assert!(!text.contains("Hidden"));
        assert!(text.contains("Open"));
    }

    #[test]
    fn listing_without_active_rooms_says_so() {
        assert_eq!(room_listing(&[room("Hidden", false)], &HashSet::new(), user()), NO_ROOMS);
        assert_eq!(room_listing(&[], &HashSet::new(), user()), NO_ROOMS);
    }

    #[test]
    fn listing_shows_price_description() {
        let mut priced = room("Pro", true);
        priced.price_description = Some("$5/month".into());

        let text = room_listing(&[priced], &HashSet::new(), user());
        assert!(text.contains("🔒 *Pro* ($5/month)"));
    }

    #[test]
    fn listing_sends_link_verbatim_and_escapes_name() {
        let mut open = room("Open_Room", true);
        open.payment_link = "https://buy.stripe.com/test_abc".into();

        let text = room_listing(&[open.clone()], &HashSet::new(), user());

        assert!(text.contains("*Open\\_Room*"));
        assert!(text.contains(&format!(
            "[Subscribe](https://buy.stripe.com/test_abc?client_reference_id=t1:123:{})",
            open.room_id
        )));
    }

    // ══════════════════════════════════════════════════════════════
    // Group welcome
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn group_welcome_for_subscriber() {
        let text = group_welcome(&room("VIP", true), user(), true);
        assert_eq!(text, "Welcome back to *VIP*! Your subscription is active.");
    }

    #[test]
    fn group_welcome_for_visitor_includes_link() {
        let vip = room("VIP", true);
        let text = group_welcome(&vip, user(), false);
        assert!(text.starts_with("Welcome to *VIP*! Subscribe here to get access:\n"));
        assert!(text.contains(&format!("t1:123:{}", vip.room_id)));
    }

    #[test]
    fn group_welcome_for_inactive_room() {
        assert_eq!(group_welcome(&room("VIP", false), user(), false), ROOM_NOT_OPEN);
    }

    // ══════════════════════════════════════════════════════════════
    // Status and escaping
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn status_report_lists_labels() {
        let text = status_report(&[
            ("VIP".into(), SubscriptionStatus::Active),
            ("Extra".into(), SubscriptionStatus::PastDue),
        ]);
        assert_eq!(text, "*Your subscriptions:*\nVIP: ✅ Active\nExtra: ⚠️ Past due");
    }

    #[test]
    fn status_report_without_rows() {
        assert_eq!(status_report(&[]), NO_SUBSCRIPTIONS);
    }

    #[test]
    fn escape_markdown_escapes_control_characters() {
        assert_eq!(escape_markdown("a_b*c`d[e"), "a\\_b\\*c\\`d\\[e");
        assert_eq!(escape_markdown("plain"), "plain");
    }
}
