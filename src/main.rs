use clap::Parser;
use quorum_console::core::config;
use quorum_console::tui;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

#[derive(Parser)]
#[command(name = "quorum-console", about = "Terminal console for the command approval server")]
struct Args {
    /// Server base URL (overrides config file and QUORUM_SERVER_URL)
    #[arg(short, long)]
    server: Option<String>,

    /// Fragment to open on start, e.g. "#!consensus" or "logs?id=cr-1"
    #[arg(short, long)]
    open: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // File logger - writes to quorum-console.log in the current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create("quorum-console.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()));
        }
    };
    let resolved = config::resolve(&file_config, args.server.as_deref(), args.open.as_deref());

    log::info!("Quorum console starting against {}", resolved.server_url);

    tui::run(resolved)
}
