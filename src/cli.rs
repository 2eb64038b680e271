use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "gas-trends", version, about = "Rank the hottest contracts by gas burn across chains")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan every configured chain once and print the ranking
    Scan {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Scan periodically and accumulate hot scores in the database
    Watch {
        #[arg(long, default_value_t = 12)]
        interval_secs: u64,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Stop after this many cycles (runs forever when omitted)
        #[arg(long)]
        cycles: Option<u64>,
    },
    /// Print the rolling ranking stored by `watch`
    Hot {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Run the HTTP API server
    Serve {
        /// Override bind address, e.g. 0.0.0.0:8080
        #[arg(long)]
        addr: Option<String>,
        /// Also poll chains in the background every N seconds
        #[arg(long)]
        poll_secs: Option<u64>,
    },
}
