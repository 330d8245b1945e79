use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Asset classes subject to capital-gains taxation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AssetClass {
    #[serde(rename = "STOCK", alias = "Ações", alias = "Acoes")]
    Stock, // Brazilian stocks (ações)
    #[serde(rename = "ETF")]
    Etf, // Exchange-traded funds
    #[serde(rename = "FII", alias = "Fundo Imobiliário")]
    Fii, // Real estate investment funds
    #[serde(rename = "BDR")]
    Bdr, // Brazilian depositary receipts
    #[serde(rename = "GOLD", alias = "Ouro")]
    Gold, // Gold as a financial asset
    #[serde(rename = "FUND", alias = "Fundos de Investimento")]
    InvestmentFund, // Investment funds traded on the exchange
}

impl AssetClass {
    /// All classes, in the order monthly results are reported
    pub const ALL: [AssetClass; 6] = [
        AssetClass::Stock,
        AssetClass::Etf,
        AssetClass::Fii,
        AssetClass::Bdr,
        AssetClass::Gold,
        AssetClass::InvestmentFund,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Stock => "STOCK",
            AssetClass::Etf => "ETF",
            AssetClass::Fii => "FII",
            AssetClass::Bdr => "BDR",
            AssetClass::Gold => "GOLD",
            AssetClass::InvestmentFund => "FUND",
        }
    }
}

impl FromStr for AssetClass {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Unicode uppercase: the B3 feed terms carry accents
        match s.trim().to_uppercase().as_str() {
            "STOCK" | "AÇÕES" | "ACOES" | "AÇÃO" | "ACAO" => Ok(AssetClass::Stock),
            "ETF" => Ok(AssetClass::Etf),
            "FII" | "FUNDO IMOBILIÁRIO" | "FUNDO IMOBILIARIO" => Ok(AssetClass::Fii),
            "BDR" => Ok(AssetClass::Bdr),
            "GOLD" | "OURO" => Ok(AssetClass::Gold),
            "FUND" | "FUNDOS DE INVESTIMENTO" | "FUNDO DE INVESTIMENTO" => {
                Ok(AssetClass::InvestmentFund)
            }
            _ => Err(()),
        }
    }
}

/// Movement kinds recognized by the engine. Anything else in the feed
/// (dividends, subscriptions, lending...) maps to `Other` and is discarded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MovementKind {
    #[serde(rename = "BUY", alias = "Compra")]
    Buy,
    #[serde(rename = "SELL", alias = "Venda")]
    Sell,
    #[serde(rename = "SPLIT", alias = "Desdobro", alias = "Desdobramento")]
    Split,
    #[serde(rename = "REVERSE_SPLIT", alias = "Grupamento")]
    ReverseSplit,
    #[serde(
        rename = "BONUS",
        alias = "Bonificação",
        alias = "Bonificação em Ativos",
        alias = "Bonificacao"
    )]
    BonusShare,
    #[serde(other)]
    Other,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Buy => "BUY",
            MovementKind::Sell => "SELL",
            MovementKind::Split => "SPLIT",
            MovementKind::ReverseSplit => "REVERSE_SPLIT",
            MovementKind::BonusShare => "BONUS",
            MovementKind::Other => "OTHER",
        }
    }

    /// Secondary sort rank within one reference date: sells settle after
    /// buys and corporate actions so a same-day position exists when the
    /// sale is matched.
    pub fn sort_rank(&self) -> u8 {
        match self {
            MovementKind::Sell => 1,
            _ => 0,
        }
    }
}

impl FromStr for MovementKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" | "COMPRA" | "C" => Ok(MovementKind::Buy),
            "SELL" | "VENDA" | "V" => Ok(MovementKind::Sell),
            "SPLIT" | "DESDOBRO" | "DESDOBRAMENTO" => Ok(MovementKind::Split),
            "REVERSE_SPLIT" | "GRUPAMENTO" => Ok(MovementKind::ReverseSplit),
            "BONUS" | "BONIFICAÇÃO" | "BONIFICACAO" | "BONIFICAÇÃO EM ATIVOS"
            | "BONIFICACAO EM ATIVOS" => Ok(MovementKind::BonusShare),
            _ => Err(()),
        }
    }
}

/// One raw movement from the account feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movement {
    pub ticker: String,
    pub issuer: String,
    pub asset_class: AssetClass,
    pub kind: MovementKind,
    pub operation_value: Decimal,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub reference_date: NaiveDate,
    /// Set by the normalizer on sells matched with a same-day buy
    #[serde(default)]
    pub day_traded: bool,
}

/// Per-ticker position state: average acquisition price, total amount paid
/// (net of partial sells) and held quantity.
///
/// Invariant after every mutation: `average_price == cost_basis / quantity`
/// while `quantity > 0`. An entry is removed the moment quantity hits zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub average_price: Decimal,
    pub cost_basis: Decimal,
    pub quantity: Decimal,
}

/// Append-only audit item, one per processed movement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationRecord {
    pub date: NaiveDate,
    pub day_of_week: String,
    pub ticker: String,
    pub issuer: String,
    pub kind: MovementKind,
    pub quantity: Decimal,
    pub value: Decimal,
    pub running_profit: Decimal,
}

/// Monthly tax result for one asset class, write-once
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyAssetResult {
    pub year: i32,
    pub month: u32,
    /// "MM/yyyy" label used for bucketing and display
    pub reference: String,
    pub asset_class: AssetClass,
    pub total_sold: Decimal,
    pub swing_trade_profit: Decimal,
    pub day_trade_profit: Decimal,
    pub tax_owed: Decimal,
    /// JSON-serialized `OperationRecord` history for audit/UI display
    pub operations: String,
}

impl MonthlyAssetResult {
    pub fn operation_records(&self) -> serde_json::Result<Vec<OperationRecord>> {
        serde_json::from_str(&self.operations)
    }
}

/// Format a (month, year) pair the way results are keyed: "MM/yyyy"
pub fn month_reference(year: i32, month: u32) -> String {
    format!("{:02}/{}", month, year)
}
