//! Domain entity tests

mod request_options_tests;
