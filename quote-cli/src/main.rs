mod logging;
mod render;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use quote_core::{QuoteRequest, resolve, validate};
use quote_data::{RuleSetLoader, rulesets};
use quote_delivery::{FormRelayDelivery, QuoteLead, send_in_background};
use tracing::error;

/// Compute an itemized tax-preparation price quote.
///
/// The input is a JSON document with the quote request fields (client name
/// and email, filing status, schedule answers, K-1 and jurisdiction
/// counts or tiers, foreign-income flag). Which fields are required
/// depends on the selected rule set.
#[derive(Parser, Debug)]
#[command(name = "quote")]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON file holding the quote request ("-" reads stdin)
    input: Option<PathBuf>,

    /// Built-in rule-set name or path to a rule-set TOML file
    #[arg(short, long, default_value = "schedule-linear")]
    rules: String,

    /// Relay the lead to this endpoint after quoting (fire-and-forget)
    #[arg(long)]
    send_to: Option<String>,

    /// Booking link echoed with the quote
    #[arg(long)]
    booking_url: Option<String>,

    /// List the built-in rule sets and exit
    #[arg(long, default_value_t = false)]
    list_rules: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();

    if args.list_rules {
        for name in rulesets::NAMES {
            println!("{name}");
        }
        return Ok(());
    }

    let config = if rulesets::document(&args.rules).is_some() {
        RuleSetLoader::builtin(&args.rules)
    } else {
        RuleSetLoader::load(Path::new(&args.rules))
    }
    .with_context(|| format!("failed to load rule set '{}'", args.rules))?;

    let Some(input_path) = &args.input else {
        bail!("a quote request file is required ('-' reads stdin)");
    };
    let raw = read_input(input_path)?;
    let request: QuoteRequest =
        serde_json::from_str(&raw).context("input is not a valid quote request document")?;

    let input = match validate(&request, &config) {
        Ok(input) => input,
        Err(errors) => {
            eprintln!("The request is incomplete:");
            for error in &errors {
                eprintln!("  {}: {error}", error.field());
            }
            std::process::exit(1);
        }
    };

    let breakdown = match resolve(&input, &config) {
        Ok(breakdown) => breakdown,
        Err(err) => {
            error!(%err, rule_set = %config.name, "fee schedule is misconfigured");
            eprintln!("internal error: {err}");
            std::process::exit(2);
        }
    };

    print!("{}", render::breakdown(&config.name, &breakdown));

    if let Some(endpoint) = &args.send_to {
        let lead = QuoteLead::new(&input, &breakdown);
        let handle = send_in_background(Arc::new(FormRelayDelivery::new(endpoint.clone())), lead);
        // Keep the process alive until the relay attempt finishes; its
        // outcome never affects the quote already printed.
        let _ = handle.await;
    }

    if let Some(url) = &args.booking_url {
        println!();
        println!("Book your consultation: {url}");
    }

    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))
    }
}
