//! afip-invoicer CLI
//!
//! Splits the requested total into per-invoice chunks, drives the portal
//! through login and the invoice generator, and submits one invoice per
//! chunk. A non-numeric amount is rejected by argument parsing before any
//! browser is launched.

use afip_invoicer::{Config, InvoiceRequest, InvoicingDriver, LaunchOptions, PortalSession, TypingPace};
use clap::Parser;
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "afip-invoicer", version, about = "Automated electronic invoice submission against the AFIP portal")]
struct Cli {
    /// Total invoice amount to cover; split into capped chunks when above
    /// the per-invoice ceiling
    #[arg(short, long)]
    amount: Decimal,

    /// Line-item description applied identically to every generated invoice
    #[arg(short, long)]
    description: String,

    /// Disable the per-keystroke typing delay
    #[arg(short, long)]
    fast: bool,

    /// Path to a JSON config file (credentials, cap, portal overrides);
    /// falls back to AFIP_CUIT / AFIP_PASSWORD when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run Chrome without a visible window
    #[arg(long)]
    headless: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Everything that can fail without browser side effects fails here
    let request = InvoiceRequest::new(cli.amount, cli.description, TypingPace::from_fast_flag(cli.fast))?;
    let config = Config::load(cli.config.as_deref())?;

    let session = PortalSession::launch(LaunchOptions::new().headless(cli.headless))?;
    let driver = InvoicingDriver::new(session, config);

    let summary = driver.run(&request)?;
    println!(
        "{} invoices created for a total of {}",
        summary.invoices_submitted, summary.total_invoiced
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parses_required_arguments() {
        let cli = Cli::try_parse_from(["afip-invoicer", "-a", "250000", "-d", "Servicios"]).unwrap();

        assert_eq!(cli.amount, dec!(250000));
        assert_eq!(cli.description, "Servicios");
        assert!(!cli.fast);
        assert!(!cli.headless);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_parses_long_flags_and_decimals() {
        let cli = Cli::try_parse_from([
            "afip-invoicer",
            "--amount",
            "170000.50",
            "--description",
            "Honorarios",
            "--fast",
        ])
        .unwrap();

        assert_eq!(cli.amount, dec!(170000.50));
        assert!(cli.fast);
    }

    #[test]
    fn test_rejects_non_numeric_amount() {
        let result = Cli::try_parse_from(["afip-invoicer", "-a", "abc", "-d", "Servicios"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_amount_and_description_are_required() {
        assert!(Cli::try_parse_from(["afip-invoicer", "-d", "Servicios"]).is_err());
        assert!(Cli::try_parse_from(["afip-invoicer", "-a", "1000"]).is_err());
    }
}
