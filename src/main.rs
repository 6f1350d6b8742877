use clap::Parser;
use nestegg::api::{Cli, Command, run_http_server, run_project_command};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Command::Serve(args) => run_http_server(args)
            .await
            .map_err(|e| format!("Server error: {e}")),
        Command::Project(args) => run_project_command(args).await,
    };

    if let Err(msg) = outcome {
        eprintln!("{msg}");
        std::process::exit(1);
    }
}
