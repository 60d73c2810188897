//! Tests of the public library API.

mod common;
mod provider_tests;
mod visitor_tests;
