use env_logger::{Builder, Env, Target};
use std::io::Write;

/// Route `log` records to stdout (errors to stderr) and panics into the log.
///
/// `RUST_LOG` overrides the default filter, which is `debug` for debug builds
/// and `info` otherwise.
pub fn init() {
    log_panics::init();

    let mut builder = if cfg!(debug_assertions) {
        Builder::from_env(Env::default().default_filter_or("debug"))
    } else {
        Builder::from_env(Env::default().default_filter_or("info"))
    };

    builder.format(|f, record| match record.level() {
        log::Level::Error => {
            eprintln!("{}", record.args());
            Ok(())
        }
        _ => {
            writeln!(f, "{}", record.args())
        }
    });

    builder.target(Target::Stdout).init();
}
