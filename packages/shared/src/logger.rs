//! Logging setup utilities for Roomcast binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// The filter covers the server library crate, this crate and the binary itself.
/// It can be overridden with the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "roomcast-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use roomcast_shared::logger::setup_logger;
///
/// setup_logger("roomcast-server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build the `EnvFilter` directive used when `RUST_LOG` is not set.
fn default_filter(binary_name: &str, default_log_level: &str) -> String {
    format!(
        "roomcast_server={level},roomcast_shared={level},{bin}={level},tower_http={level}",
        level = default_log_level,
        bin = binary_name.replace('-', "_"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_covers_crates_and_binary() {
        // テスト項目: デフォルトのフィルタにサーバークレートとバイナリが含まれる
        // given (前提条件):
        let binary_name = "roomcast-server";

        // when (操作):
        let filter = default_filter(binary_name, "info");

        // then (期待する結果):
        assert!(filter.contains("roomcast_server=info"));
        assert!(filter.contains("roomcast_shared=info"));
        assert!(filter.contains("tower_http=info"));
        assert!(!filter.contains("roomcast-server"));
    }
}
