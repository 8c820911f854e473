//! Global subscriber installation.
//!
//! Kept as the only test in this binary: the subscriber is process-global.

use std::sync::Arc;

use kernsim_log::{Config, Format, Level, LogError, LogSink, TracingSink, Writer};

#[test]
fn second_install_is_rejected() {
    let guard = kernsim_log::init(
        Config::test()
            .with_format(Format::Json)
            .with_writer(Writer::Stdout),
    )
    .unwrap();
    assert_eq!(guard.filter(), "trace");
    assert_eq!(guard.format(), Format::Json);

    let sink: Arc<dyn LogSink> = Arc::new(TracingSink::new("test").with_min_level(Level::Info));
    assert!(!sink.enabled(Level::Debug));
    sink.info("subscriber installed");

    let err = kernsim_log::init(Config::test()).unwrap_err();
    assert!(matches!(err, LogError::AlreadyInitialized(_)));
    assert_eq!(err.code(), "LOG:INIT:DUPLICATE");
}
