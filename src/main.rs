use gh_autocommit::{cli, logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = logger::init() {
        eprintln!("Failed to initialize logger: {e}");
    }

    match cli::main().await {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}
