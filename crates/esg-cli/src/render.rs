//! Text and JSON output for command results.

use colored::Colorize;
use esg_finance::{CarbonCredits, Eligibility, FinanceTiers};
use esg_types::{Address, ContentId, ReportStatus};
use esg_upload::UploadOutcome;
use esg_workflow::{Attestation, BalanceReport, FeedEntry, Registration};
use serde::Serialize;

use crate::cli::OutputFormat;

/// Print `value` as pretty JSON, or run `text` for human output.
pub fn emit<T: Serialize>(format: OutputFormat, value: &T, text: impl FnOnce()) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => text(),
    }
    Ok(())
}

/// One JSON document per line, for streams.
pub fn emit_line<T: Serialize>(format: OutputFormat, value: &T, text: impl FnOnce()) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(value)?),
        OutputFormat::Text => text(),
    }
    Ok(())
}

pub fn account(account: &Address) {
    println!("{} Connected", "✓".green().bold());
    println!("  Account: {}", account.to_string().cyan());
}

pub fn fingerprint(id: &ContentId) {
    println!("{}", id.to_string().yellow());
}

pub fn registration(reg: &Registration, explorer: &str) {
    println!("{} Registered {}", "✓".green().bold(), reg.id.to_string().yellow());
    println!("  Tx: {}", reg.tx);
    println!("  {}", reg.tx.explorer_link(explorer).blue());
}

pub fn feed_entry(entry: &FeedEntry) {
    let s = &entry.sample;
    println!(
        "{} {}  carbon {}  energy {}  water {}  {} {}",
        "✓".green(),
        s.ts.dimmed(),
        s.carbon,
        s.energy,
        s.water,
        entry.id.short_hex().yellow(),
        entry.tx.hash.short_hex().dimmed(),
    );
}

pub fn feed_failure(message: &str) {
    println!("{} {}", "✗".red(), message.red());
}

pub fn attestation(att: &Attestation, explorer: &str) {
    let verdict = if att.passed { "PASSED".green().bold() } else { "FAILED".red().bold() };
    println!("{} Attested {}: {}", "✓".green().bold(), att.id.to_string().yellow(), verdict);
    println!("  Reason: {}", att.reason);
    println!("  Tx: {}", att.tx);
    println!("  {}", att.tx.explorer_link(explorer).blue());
}

pub fn status(id: &str, status: &ReportStatus) {
    let label = match status.label() {
        "passed" => "passed".green().bold(),
        "failed" => "failed".red().bold(),
        "registered" => "registered".yellow(),
        other => other.dimmed(),
    };
    println!("Report {}: {}", id.yellow(), label);
    println!("  Registered: {}", yes_no(status.registered));
    println!("  Attested:   {}", yes_no(status.attested));
    if status.attested {
        println!("  Attestor:   {}", status.attestor.to_string().cyan());
        match status.attested_at() {
            Some(at) => println!("  At:         {}", at.to_rfc3339()),
            None => println!("  At:         {}", status.timestamp),
        }
        println!("  Reason:     {}", status.reason);
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

pub fn balance(report: &BalanceReport, symbol: &str) {
    if let Some(holder) = &report.holder {
        println!("Account: {}", holder.to_string().cyan());
    }
    println!("Balance: {} {}", report.display.bold(), symbol);
    println!("CO2 reduction: {:.1} t", report.co2_reduction_tons);
    tiers(&report.tiers);
}

pub fn credits(balance: f64, credits: &CarbonCredits) {
    println!("Balance: {balance}");
    println!("Carbon credits: {:.1} (≈ USD {:.0})", credits.credits, credits.usd_value);
}

pub fn tiers(tiers: &FinanceTiers) {
    for (product, tier) in tiers.products() {
        let detail = match tier.level {
            Eligibility::Eligible => tier.detail.green(),
            Eligibility::Pilot => tier.detail.yellow(),
            Eligibility::Ineligible => tier.detail.dimmed(),
        };
        println!("  {} {:<22} {}", tier.level.mark(), product, detail);
    }
}

pub fn upload(outcome: &UploadOutcome, qr_saved: Option<&std::path::Path>) {
    println!("{} Report registered", "✓".green().bold());
    println!("  Hash: {}", outcome.file_hash.yellow());
    if let Some(link) = &outcome.transaction_link {
        println!("  {}", link.blue());
    }
    if let Some(path) = qr_saved {
        println!("  QR code: {}", path.display());
    }
}
