use clap::Parser;
use db_ready::{sanitize_db_url, DbWaiter, SeaOrmProvider};
use tracing::info;

mod cli;
mod telemetry;

fn main() {
    telemetry::init_tracing();

    let args = match cli::Args::try_parse() {
        Ok(args) => args,
        Err(e) => e.exit(),
    };

    let invocation = match args.resolve() {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(e.exit_code());
        }
    };

    info!(url = %sanitize_db_url(&invocation.url), "db_wait=start");

    let result = SeaOrmProvider::new(invocation.url).and_then(|provider| {
        DbWaiter::new(provider.with_connect_timeout(invocation.connect_timeout))
            .with_policy(invocation.policy)
            .wait()
    });

    if let Err(e) = result {
        eprintln!("❌ {e}");
        std::process::exit(e.exit_code());
    }
}
