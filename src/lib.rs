pub mod environment;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod stack;
pub mod string;
pub mod value;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Installs a stderr subscriber filtered by `RUST_LOG`. Does nothing when `RUST_LOG` is unset.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}
