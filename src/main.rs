// src/main.rs

use devconsole::{cli, logging, run};

#[tokio::main]
async fn main() {
    let code = match run_main().await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("devconsole error: {err:?}");
            1
        }
    };
    // An interrupted console leaves a blocking stdin read behind, which
    // would keep the runtime from shutting down.
    std::process::exit(code);
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}
