//! CLI smoke tests driving the binary end to end

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_file(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn calculate_outputs_monthly_json() {
    let feed = write_file(
        ".json",
        r#"[
            {
                "ticker": "PETR4",
                "issuer": "PETROBRAS",
                "asset_class": "STOCK",
                "kind": "Compra",
                "operation_value": "24500.00",
                "quantity": "1000",
                "unit_price": "24.50",
                "reference_date": "2023-01-05"
            },
            {
                "ticker": "PETR4",
                "issuer": "PETROBRAS",
                "asset_class": "STOCK",
                "kind": "Venda",
                "operation_value": "25000.00",
                "quantity": "1000",
                "unit_price": "25.00",
                "reference_date": "2023-02-15"
            }
        ]"#,
    );

    let output = Command::cargo_bin("apurador")
        .unwrap()
        .args(["--json", "calculate"])
        .arg(feed.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let results: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let results = results.as_array().unwrap();
    assert_eq!(results.len(), 2);

    let february = &results[1];
    assert_eq!(february["reference"], "02/2023");
    assert_eq!(february["asset_class"], "STOCK");
    assert_eq!(february["tax_owed"], "75.00");
}

#[test]
fn calculate_renders_table_and_totals() {
    let feed = write_file(
        ".csv",
        "ticker,issuer,asset_class,kind,operation_value,quantity,unit_price,reference_date\n\
         MXRF11,MAXI RENDA,FII,BUY,1000.00,100,10.00,2023-04-01\n\
         MXRF11,MAXI RENDA,FII,SELL,600.00,50,12.00,2023-04-15\n",
    );

    Command::cargo_bin("apurador")
        .unwrap()
        .arg("calculate")
        .arg(feed.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("04/2023"))
        .stdout(predicate::str::contains("FII"))
        .stdout(predicate::str::contains("Imposto total:"));
}

#[test]
fn calculate_fails_on_empty_feed() {
    let feed = write_file(".json", "[]");

    Command::cargo_bin("apurador")
        .unwrap()
        .arg("calculate")
        .arg(feed.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no movements to compute"));
}

#[test]
fn darf_reports_carryforward_months() {
    let records = write_file(
        ".json",
        r#"[
            {"year": 2023, "month": 1, "asset_class": "STOCK", "tax_owed": "4", "paid": false},
            {"year": 2023, "month": 2, "asset_class": "STOCK", "tax_owed": "12", "paid": false},
            {"year": 2023, "month": 3, "asset_class": "STOCK", "tax_owed": "3", "paid": false},
            {"year": 2023, "month": 4, "asset_class": "STOCK", "tax_owed": "8", "paid": false}
        ]"#,
    );

    Command::cargo_bin("apurador")
        .unwrap()
        .args(["darf", "--month", "04/2023", "--records"])
        .arg(records.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("DARF 6015"))
        .stdout(predicate::str::contains("R$ 15,00"))
        .stdout(predicate::str::contains("01/2023"))
        .stdout(predicate::str::contains("03/2023"))
        .stdout(predicate::str::contains("02/2023").not());
}

#[test]
fn darf_below_minimum_prints_nothing_payable() {
    let records = write_file(
        ".json",
        r#"[{"year": 2023, "month": 4, "asset_class": "STOCK", "tax_owed": "2", "paid": false}]"#,
    );

    Command::cargo_bin("apurador")
        .unwrap()
        .args(["darf", "--month", "05/2023", "--records"])
        .arg(records.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Nenhum DARF a pagar"));
}
