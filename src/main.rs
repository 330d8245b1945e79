mod cli;

use anyhow::{anyhow, Result};
use clap::Parser;
use colored::Colorize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

use apurador::feed;
use apurador::ledger::Ledger;
use apurador::tax;
use apurador::utils::format_decimal_br;

use cli::{parse_month_reference, Cli, Commands};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Calculate { file, seed, bonus } => {
            handle_calculate(&file, seed.as_deref(), bonus.as_deref(), cli.json)
        }
        Commands::Darf { records, month } => handle_darf(&records, &month, cli.json),
    }
}

#[derive(Tabled)]
struct MonthlyRow {
    #[tabled(rename = "Mês")]
    reference: String,
    #[tabled(rename = "Classe")]
    asset_class: &'static str,
    #[tabled(rename = "Vendas")]
    total_sold: String,
    #[tabled(rename = "Lucro Comum")]
    swing_profit: String,
    #[tabled(rename = "Lucro Day-Trade")]
    day_profit: String,
    #[tabled(rename = "Imposto")]
    tax_owed: String,
}

fn handle_calculate(
    file: &str,
    seed: Option<&str>,
    bonus: Option<&str>,
    json: bool,
) -> Result<()> {
    info!("calculating taxes from: {}", file);

    let movements = feed::load_movements(Path::new(file))?;

    let mut ledger = match seed {
        Some(path) => Ledger::seeded(feed::load_seed_ledger(Path::new(path))?),
        None => Ledger::new(),
    };

    let report = match bonus {
        Some(path) => {
            let prices = feed::load_bonus_prices(Path::new(path))?;
            tax::calculate(movements, &mut ledger, &prices)?
        }
        None => tax::calculate(movements, &mut ledger, &apurador::reference::NoBonusPrices)?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report.monthly_results)?);
        return Ok(());
    }

    let rows: Vec<MonthlyRow> = report
        .monthly_results
        .iter()
        .map(|r| MonthlyRow {
            reference: r.reference.clone(),
            asset_class: r.asset_class.as_str(),
            total_sold: format_decimal_br(r.total_sold),
            swing_profit: format_decimal_br(r.swing_trade_profit),
            day_profit: format_decimal_br(r.day_trade_profit),
            tax_owed: format_decimal_br(r.tax_owed),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);

    let total_tax: rust_decimal::Decimal =
        report.monthly_results.iter().map(|r| r.tax_owed).sum();
    println!(
        "\n{} {}",
        "Imposto total:".bold(),
        apurador::utils::format_currency(total_tax).green()
    );

    if !report.unresolved_tickers.is_empty() {
        println!(
            "\n{} {}",
            "Atenção:".yellow().bold(),
            format!(
                "tickers sem compra no período ({}); informe o preço médio manualmente",
                report.unresolved_tickers.join(", ")
            )
            .yellow()
        );
    }

    if !ledger.is_empty() {
        println!("\n{}", "Posições em aberto:".bold());
        for (ticker, entry) in ledger.entries() {
            println!(
                "  {}: {} x {}",
                ticker,
                format_decimal_br(entry.quantity),
                apurador::utils::format_currency(entry.average_price)
            );
        }
    }

    Ok(())
}

fn handle_darf(records_file: &str, month: &str, json: bool) -> Result<()> {
    let (year, target_month) = parse_month_reference(month)
        .ok_or_else(|| anyhow!("invalid month reference {:?}, expected MM/yyyy", month))?;

    let records = feed::load_tax_records(Path::new(records_file))?;
    let voucher = tax::assemble_darf(&records, year, target_month)?;

    match voucher {
        Some(voucher) => {
            if json {
                let carried: Vec<serde_json::Value> = voucher
                    .carried
                    .iter()
                    .map(|c| {
                        serde_json::json!({
                            "year": c.year,
                            "month": c.month,
                            "tax_owed": c.tax_owed,
                        })
                    })
                    .collect();
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "year": voucher.year,
                        "month": voucher.month,
                        "darf_code": voucher.darf_code,
                        "amount": voucher.amount,
                        "due_date": voucher.due_date,
                        "carried": carried,
                    }))?
                );
            } else {
                println!("{}", tax::format_darf_voucher(&voucher));
            }
        }
        None => {
            if json {
                println!("null");
            } else {
                println!(
                    "Nenhum DARF a pagar para {}: valor acumulado abaixo do mínimo de {}",
                    month,
                    apurador::utils::format_currency(tax::minimum_darf_amount())
                );
            }
        }
    }

    Ok(())
}
