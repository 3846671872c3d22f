mod property_tests;

/// Route `log` output through the test harness; safe to call from every test.
pub(super) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
