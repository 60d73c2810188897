//! CLI integration tests.

mod bootstrap_tests;
mod build_tests;
mod common;
mod init_tests;
mod service_tests;
