//! Use case tests

mod use_case_tests;
