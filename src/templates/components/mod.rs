use maud::{html, Markup};

use crate::controller::{Notification, NotificationKind};

pub mod charts;

pub fn card(title: &str, body: Markup) -> Markup {
    html! {
        section class="card" {
            h3 style="margin-top: 0; font-size: 0.95rem;" { (title) }
            (body)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeVariant {
    Default,
    Secondary,
    Destructive,
    Outline,
}

impl BadgeVariant {
    fn class(self) -> &'static str {
        match self {
            BadgeVariant::Default => "badge badge-default",
            BadgeVariant::Secondary => "badge badge-secondary",
            BadgeVariant::Destructive => "badge badge-destructive",
            BadgeVariant::Outline => "badge badge-outline",
        }
    }
}

pub fn badge(variant: BadgeVariant, label: &str) -> Markup {
    html! {
        span class=(variant.class()) { (label) }
    }
}

/// Big number with a caption.
pub fn kpi_card(title: &str, value: usize, caption: &str, color: &str) -> Markup {
    html! {
        section class="card" {
            div class="muted" style="font-size: 0.85rem;" { (title) }
            div style=(format!("font-size: 1.8rem; font-weight: 700; color: {color};")) { (value) }
            p class="muted" style="font-size: 0.75rem; margin: 0;" { (caption) }
        }
    }
}

/// Pending notifications, shown once.
pub fn toasts(notifications: &[Notification]) -> Markup {
    html! {
        @if !notifications.is_empty() {
            div class="toasts" {
                @for note in notifications {
                    @let class = match note.kind {
                        NotificationKind::Success => "toast toast-success",
                        NotificationKind::Error => "toast toast-error",
                    };
                    div class=(class) role="status" { (note.message) }
                }
            }
        }
    }
}
