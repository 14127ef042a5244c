//! Terminal and file renderers for reports and categorized transactions.

use anyhow::{Context, Result};
use clap::ValueEnum;
use rust_decimal::Decimal;
use std::io::Write;
use tally_core::{MatchKind, RowParseError};
use tally_finance::{Categorization, Report};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain-text tables
    Table,
    /// Full report as pretty JSON
    Json,
    /// One row per month, one column per category
    Csv,
}

fn money(d: Decimal) -> String {
    format!("{:.2}", d)
}

/// Machine-readable amount: never rounds, pads to at least two decimals.
fn exact(d: Decimal) -> String {
    if d.scale() < 2 { money(d) } else { d.to_string() }
}

fn write_skipped(w: &mut impl Write, skipped: &[RowParseError]) -> Result<()> {
    if skipped.is_empty() {
        return Ok(());
    }
    writeln!(w, "\nSkipped rows ({})", skipped.len())?;
    for err in skipped {
        writeln!(w, "  {err}")?;
    }
    Ok(())
}

pub fn render_report(report: &Report, format: OutputFormat, w: &mut impl Write) -> Result<()> {
    match format {
        OutputFormat::Table => report_table(report, w),
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *w, report).context("serialize report")?;
            writeln!(w)?;
            Ok(())
        }
        OutputFormat::Csv => report_csv(report, w),
    }
}

fn report_table(report: &Report, w: &mut impl Write) -> Result<()> {
    let window = &report.dashboard.window;
    writeln!(
        w,
        "Report as of {} (window {} .. {}, {} transactions)",
        report.as_of, window.start, window.end, window.transaction_count
    )?;
    writeln!(
        w,
        "Parsed {} rows, skipped {}\n",
        report.parsed_rows, report.skipped_rows
    )?;

    writeln!(
        w,
        "{:<10} {:>12} {:>12} {:>12} {:>6}",
        "Month", "Debits", "Credits", "Net", "Count"
    )?;
    for row in &report.dashboard.summary {
        writeln!(
            w,
            "{:<10} {:>12} {:>12} {:>12} {:>6}",
            row.label,
            money(row.debits),
            money(row.credits),
            money(row.net),
            row.count
        )?;
    }
    writeln!(
        w,
        "{:<10} {:>12} {:>12} {:>12} {:>6}",
        "Total",
        money(window.total_debits),
        money(window.total_credits),
        money(window.net_change),
        window.transaction_count
    )?;

    if !report.dashboard.category_series.is_empty() {
        writeln!(w, "\nCategories")?;
        for series in &report.dashboard.category_series {
            writeln!(w, "  {:<24} {:>12}", series.category, money(series.total))?;
        }
    }

    write_skipped(w, &report.skipped)
}

fn report_csv(report: &Report, w: &mut impl Write) -> Result<()> {
    let categories = report.dashboard.categories();
    let mut out = csv::Writer::from_writer(w);

    let mut header = vec!["month", "debits", "credits", "net", "count"];
    header.extend(categories.iter().copied());
    out.write_record(&header)?;

    for m in &report.months {
        let mut record = vec![
            m.month.to_string(),
            exact(m.total_debits),
            exact(m.total_credits),
            exact(m.net_change),
            m.transaction_count.to_string(),
        ];
        record.extend(categories.iter().map(|c| {
            exact(m.category_totals.get(*c).copied().unwrap_or(Decimal::ZERO))
        }));
        out.write_record(&record)?;
    }
    out.flush()?;
    Ok(())
}

fn match_label(kind: Option<MatchKind>) -> &'static str {
    match kind {
        Some(MatchKind::Exact) => "exact",
        Some(MatchKind::Contains) => "contains",
        None => "-",
    }
}

pub fn render_categorization(
    cat: &Categorization,
    format: OutputFormat,
    w: &mut impl Write,
) -> Result<()> {
    match format {
        OutputFormat::Table => {
            for t in &cat.transactions {
                writeln!(
                    w,
                    "{}  {:>12}  {:<20} {:<8}  {}",
                    t.transaction.date,
                    money(t.transaction.amount),
                    t.category,
                    match_label(t.matched_by),
                    t.transaction.description
                )?;
            }
            let uncategorized = cat.transactions.iter().filter(|t| t.is_uncategorized()).count();
            writeln!(
                w,
                "\n{} transactions, {} uncategorized",
                cat.transactions.len(),
                uncategorized
            )?;
            write_skipped(w, &cat.skipped)
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *w, cat).context("serialize transactions")?;
            writeln!(w)?;
            Ok(())
        }
        OutputFormat::Csv => {
            let mut out = csv::Writer::from_writer(w);
            out.write_record(["date", "description", "amount", "category", "match"])?;
            for t in &cat.transactions {
                out.write_record([
                    t.transaction.date.to_string(),
                    t.transaction.description.clone(),
                    exact(t.transaction.amount),
                    t.category.clone(),
                    match_label(t.matched_by).to_string(),
                ])?;
            }
            out.flush()?;
            Ok(())
        }
    }
}
