mod auth_flow_tests;
mod dashboard_tests;
mod hot_leads_tests;
mod webhook_tests;
