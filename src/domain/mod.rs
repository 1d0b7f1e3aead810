pub mod aggregate;
pub mod filter;
pub mod hot;
pub mod lead;

pub use aggregate::DashboardStats;
pub use filter::{apply_filters, StatusFilter};
pub use hot::{format_email_list, format_phone_list, select_hot};
pub use lead::{Lead, LeadRecord, LeadStatus};
