//! Fallback notifications used when neither the durable slot nor the backend
//! has anything to offer.

use chrono::{DateTime, Duration, Utc};

use super::models::{Notification, NotificationType};

struct SeedEntry {
    id: &'static str,
    notification_type: NotificationType,
    title: &'static str,
    message: &'static str,
    reference_id: &'static str,
    minutes_ago: i64,
    is_read: bool,
}

const SEED_ENTRIES: &[SeedEntry] = &[
    SeedEntry {
        id: "n-001",
        notification_type: NotificationType::Pending,
        title: "Order Placed",
        message: "Your order has been placed and is awaiting confirmation.",
        reference_id: "ORD-1042",
        minutes_ago: 120,
        is_read: false,
    },
    SeedEntry {
        id: "n-002",
        notification_type: NotificationType::Pending,
        title: "Order Being Prepared",
        message: "The kitchen has started preparing your order.",
        reference_id: "ORD-1042",
        minutes_ago: 60,
        is_read: false,
    },
    SeedEntry {
        id: "n-003",
        notification_type: NotificationType::Success,
        title: "Out for Delivery",
        message: "Your order is out for delivery and will arrive soon.",
        reference_id: "ORD-1038",
        minutes_ago: 300,
        is_read: true,
    },
    SeedEntry {
        id: "n-004",
        notification_type: NotificationType::Success,
        title: "Payment Successful",
        message: "Your payment was completed successfully.",
        reference_id: "PAY-7781",
        minutes_ago: 360,
        is_read: true,
    },
    SeedEntry {
        id: "n-005",
        notification_type: NotificationType::Failed,
        title: "Payment Failed",
        message: "Payment failed. Please try again or use a different method.",
        reference_id: "PAY-7790",
        minutes_ago: 180,
        is_read: false,
    },
    SeedEntry {
        id: "n-006",
        notification_type: NotificationType::Info,
        title: "Reservation Confirmed",
        message: "Your table reservation has been confirmed.",
        reference_id: "RES-2401 (Alex Johnson)",
        minutes_ago: 600,
        is_read: true,
    },
    SeedEntry {
        id: "n-007",
        notification_type: NotificationType::Info,
        title: "Upcoming Reservation",
        message: "Reminder: You have a reservation scheduled for today.",
        reference_id: "RES-2405 (Alex Johnson)",
        minutes_ago: 30,
        is_read: false,
    },
];

/// Seed notifications with timestamps relative to now.
pub fn seed_notifications() -> Vec<Notification> {
    seed_notifications_at(Utc::now())
}

/// Seed notifications with timestamps relative to `now`.
pub fn seed_notifications_at(now: DateTime<Utc>) -> Vec<Notification> {
    SEED_ENTRIES
        .iter()
        .map(|entry| Notification {
            id: entry.id.to_string(),
            notification_type: entry.notification_type,
            title: entry.title.to_string(),
            message: entry.message.to_string(),
            reference_id: Some(entry.reference_id.to_string()),
            created_at: now - Duration::minutes(entry.minutes_ago),
            is_read: entry.is_read,
        })
        .collect()
}
