use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "apurador")]
#[command(
    version,
    about = "Brazilian B3 capital-gains and DARF calculator"
)]
#[command(
    long_about = "Compute average acquisition costs, day-trade/swing-trade profit and \
monthly capital-gains tax per asset class from a B3 movement feed, and assemble DARF \
vouchers with the minimum-payment carry-forward rule."
)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the tax calculation over a movement feed
    Calculate {
        /// Path to the movement feed (JSON or CSV)
        file: String,

        /// Seed ledger JSON with positions from an earlier run
        #[arg(long)]
        seed: Option<String>,

        /// Bonus-share reference price table (JSON)
        #[arg(long)]
        bonus: Option<String>,
    },

    /// Assemble the DARF voucher for a target month
    Darf {
        /// Path to the monthly tax records file (JSON)
        #[arg(long)]
        records: String,

        /// Target month as MM/yyyy
        #[arg(long)]
        month: String,
    },
}

/// Parse a "MM/yyyy" reference into (year, month)
pub fn parse_month_reference(reference: &str) -> Option<(i32, u32)> {
    let (month, year) = reference.split_once('/')?;
    let month: u32 = month.parse().ok()?;
    let year: i32 = year.parse().ok()?;
    if (1..=12).contains(&month) {
        Some((year, month))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month_reference() {
        assert_eq!(parse_month_reference("04/2023"), Some((2023, 4)));
        assert_eq!(parse_month_reference("12/2024"), Some((2024, 12)));
        assert_eq!(parse_month_reference("13/2024"), None);
        assert_eq!(parse_month_reference("2024-04"), None);
        assert_eq!(parse_month_reference(""), None);
    }
}
