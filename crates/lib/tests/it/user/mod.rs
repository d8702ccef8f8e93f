//! User module integration tests

mod accounts_tests;
mod patch_tests;
