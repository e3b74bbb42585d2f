use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    #[command(about = "Compile a criteria request and print the query as JSON")]
    Compile {
        #[arg(help = "Request JSON, or @file (e.g., {\"filters\": [...], \"limit\": 10, \"page\": 1})")]
        request: String,
        #[arg(long, help = "Pretty-print the output")]
        pretty: bool,
    },
    #[command(about = "Validate a criteria request and print a summary")]
    Check {
        #[arg(help = "Request JSON, or @file")]
        request: String,
    },
    #[command(about = "Run a criteria request against an NDJSON file; prints NDJSON to stdout")]
    Run {
        #[arg(help = "Request JSON, or @file")]
        request: String,
        #[arg(help = "NDJSON file with one document per line")]
        data: PathBuf,
    },
}
