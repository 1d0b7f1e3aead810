pub mod components;
pub mod layouts;
pub mod pages;

// Re-exports for convenience
pub use components::{badge, card, kpi_card, toasts, BadgeVariant};
pub use layouts::desktop::desktop_layout;
