//! Integration tests for the admin console
//! These drive the app through the real HTTP transport against a mock backend

pub mod test_harness;

pub mod auth_flow_test;
pub mod companies_flow_test;
pub mod users_flow_test;
