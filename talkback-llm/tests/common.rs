use std::sync::OnceLock;

use talkback_common::observability::{LogConfig, LogFormat};

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

#[allow(dead_code)]
pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "talkback-tests",
            log_dir: Some(std::env::temp_dir().join("talkback-tests")),
            emit_stderr: true,
            format: LogFormat::from_name(
                &std::env::var("TALKBACK_LOG_FORMAT").unwrap_or_default(),
            ),
            default_filter: "debug",
        };

        talkback_common::observability::init_logging(config).unwrap_or_default()
    });
}
