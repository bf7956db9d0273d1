use miette::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod watch;

use self::config::{Command, Main};

#[tokio::main]
async fn main() -> Result<()> {
    let Ok(main) = Main::parse().map_err(|err| err.exit());

    // `RUST_LOG` takes precedence over `--verbose`.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if main.verbose {
            "trellis=debug,trellis_core=debug,trellis_codegen_typescript=debug"
        } else {
            "info"
        })
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match main.command {
        Command::Types(types) if types.once => watch::run_once(&types.config).await,
        Command::Types(types) => watch::run(types).await,
    }
}
