/*! Integration tests for Karen.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - user: Tests for the Accounts service, credentials and patch semantics
 * - backend: Tests for the UserStore trait and implementations
 * - api: Tests for the HTTP transport, driven over a real socket
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("karen=info".parse().unwrap()))
        .with_test_writer()
        .try_init();
}

mod backend;
mod helpers;
mod user;
