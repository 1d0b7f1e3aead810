pub mod dashboard;
pub mod error;
pub mod home;
pub mod hot_leads;
pub mod login;

pub use dashboard::{dashboard_page, DashboardVm};
pub use error::error_page;
pub use home::home_page;
pub use hot_leads::hot_leads_page;
pub use login::login_page;
