//! Rendering stored transactions for the terminal.

use anyhow::Result;
use chrono_tz::Tz;
use serde::Serialize;
use std::io::Write;

use gofin_core::CanonicalTransaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ListFormat {
    Json,
    Table,
    Csv,
}

#[derive(Serialize)]
struct CsvRow<'a> {
    id: &'a str,
    date: String,
    #[serde(rename = "type")]
    kind: &'static str,
    amount: f64,
    category: &'a str,
    description: &'a str,
}

pub fn write_list<W: Write>(
    out: &mut W,
    records: &[CanonicalTransaction],
    format: ListFormat,
    tz: Tz,
) -> Result<()> {
    match format {
        ListFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, records)?;
            writeln!(out)?;
        }
        ListFormat::Table => {
            for t in records {
                let sign = if t.is_income() { '+' } else { '-' };
                writeln!(
                    out,
                    "{} | {}{:>10.2} | {:<12} | {}",
                    t.date.with_timezone(&tz).format("%Y-%m-%d %H:%M"),
                    sign,
                    t.amount,
                    t.category,
                    t.description
                )?;
            }
            writeln!(out, "\n{} transactions", records.len())?;
        }
        ListFormat::Csv => {
            let mut w = csv::Writer::from_writer(&mut *out);
            for t in records {
                w.serialize(CsvRow {
                    id: &t.id,
                    date: t.date.with_timezone(&tz).format("%Y-%m-%d").to_string(),
                    kind: t.kind.as_str(),
                    amount: t.amount,
                    category: &t.category,
                    description: &t.description,
                })?;
            }
            w.flush()?;
        }
    }
    Ok(())
}
