//! End-to-end tests driving the BoobleDrive router.
//!
//! Tests that need PostgreSQL are `#[ignore]`d; run them with
//! `DATABASE_URL=postgres://... cargo test -- --ignored`.

mod helpers;

mod auth_test;
mod file_test;
mod health_test;
mod share_test;
mod upload_test;
