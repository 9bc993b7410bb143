use clap::{Parser, Subcommand};
use sdk_rust::CalculatorClient;

#[derive(Parser)]
#[command(name = "calc-cli")]
#[command(about = "Command-line client for the calculator service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add two numbers and record the calculation
    Add {
        #[arg(allow_hyphen_values = true)]
        a: f64,
        #[arg(allow_hyphen_values = true)]
        b: f64,
    },
    /// Check service and datastore health
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = CalculatorClient::new(&cli.url);

    let json = match cli.command {
        Commands::Add { a, b } => serde_json::to_string_pretty(&client.add(a, b).await?)?,
        Commands::Health => serde_json::to_string_pretty(&client.health().await?)?,
    };
    println!("{}", json);

    Ok(())
}
