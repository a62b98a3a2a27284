use std::sync::OnceLock;

static TEST_LOGGING: OnceLock<()> = OnceLock::new();

/// Routes `tracing` output from the app layer into the test harness.
///
/// Safe to call from every test; only the first call installs a subscriber.
/// Set `RUST_LOG` (e.g. `RUST_LOG=file_tracer=debug`) to see the output.
pub fn setup_test_logging() {
    TEST_LOGGING.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// `true` when the effective UID is 0. Root bypasses permission bits, so
/// tests that rely on unreadable directories or read-only files skip then.
#[cfg(test)]
pub fn running_as_root() -> bool {
    #[cfg(unix)]
    {
        // SAFETY: geteuid has no preconditions and cannot fail.
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}
