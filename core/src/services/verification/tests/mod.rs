//! Verification service tests

mod attempt_tracker_tests;
mod hasher_tests;
mod rate_limiter_tests;
