use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use rusqlite::Connection;
use serde_json::Value;
use tempfile::{tempdir, TempDir};

/// Temporary catalog database and price list.
struct Fixture {
    _dir: TempDir,
    catalog: PathBuf,
    prices: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempdir().expect("create temp dir");
        let catalog = dir.path().join("industry_catalog.db");
        let prices = dir.path().join("prices.csv");
        write_catalog(&catalog);
        fs::write(
            &prices,
            "type_id,buy,sell
34,6,6.5
35,12,13
36,60,65
37,120,130
38,600,650
20424,100,110
20418,200,210
34201,1000,1100
587,14000,15000
11400,45000,50000
",
        )
        .expect("write prices");
        Self {
            _dir: dir,
            catalog,
            prices,
        }
    }

    /// Command with the catalog configured and no price list.
    fn command(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("eveindy-cli");
        cmd.env_remove("EVEINDY_CATALOG")
            .env_remove("EVEINDY_PRICES")
            .env("RUST_LOG", "error")
            .env("NO_COLOR", "1")
            .arg("--no-logo")
            .arg("--catalog")
            .arg(&self.catalog);
        cmd
    }

    fn priced_command(&self) -> Command {
        let mut cmd = self.command();
        cmd.arg("--prices").arg(&self.prices);
        cmd
    }
}

fn write_catalog(path: &Path) {
    let connection = Connection::open(path).expect("create catalog");
    connection
        .execute_batch(
            "CREATE TABLE Items (typeID INTEGER, typeName TEXT, marketGroupID INTEGER, adjPrice REAL);
             CREATE TABLE MarketGroups (marketGroupID INTEGER, parentGroupID INTEGER, marketGroupName TEXT);
             CREATE TABLE bpMaterials (typeID INTEGER, activityID INTEGER, materialTypeID INTEGER, quantity INTEGER);
             CREATE TABLE bpProducts (typeID INTEGER, activityID INTEGER, productTypeID INTEGER, quantity INTEGER);
             CREATE TABLE bpTimes (typeID INTEGER, activityID INTEGER, time INTEGER);

             INSERT INTO MarketGroups VALUES (4, NULL, 'Ships'), (1361, 4, 'Frigates'), (64, 1361, 'Minmatar');
             INSERT INTO Items VALUES
                 (34, 'Tritanium', NULL, 5.0),
                 (35, 'Pyerite', NULL, 10.0),
                 (36, 'Mexallon', NULL, 50.0),
                 (37, 'Isogen', NULL, 100.0),
                 (38, 'Nocxium', NULL, 500.0),
                 (587, 'Rifter', NULL, 9000.0),
                 (691, 'Rifter Blueprint', 64, NULL),
                 (11400, 'Jaguar', NULL, NULL),
                 (11401, 'Jaguar Blueprint', NULL, NULL),
                 (11539, 'Nanoelectrical Microprocessor', NULL, 1100.0),
                 (11540, 'Nanoelectrical Microprocessor Blueprint', NULL, NULL),
                 (20418, 'Datacore - Electronic Engineering', NULL, NULL),
                 (20424, 'Datacore - Mechanical Engineering', NULL, NULL),
                 (34201, 'Accelerant Decryptor', NULL, NULL);
             INSERT INTO bpMaterials VALUES
                 (691, 1, 34, 1000), (691, 1, 35, 300), (691, 1, 36, 5),
                 (691, 8, 20424, 2), (691, 8, 20418, 2),
                 (11540, 1, 37, 5), (11540, 1, 38, 1),
                 (11401, 1, 587, 1), (11401, 1, 34, 2000), (11401, 1, 11539, 10);
             INSERT INTO bpProducts VALUES
                 (691, 1, 587, 1), (691, 8, 11401, 1), (11540, 1, 11539, 1), (11401, 1, 11400, 1);
             INSERT INTO bpTimes VALUES (691, 1, 6000), (691, 8, 63900), (11401, 1, 18000);",
        )
        .expect("populate catalog");
}

fn json_output(cmd: &mut Command) -> Value {
    let output = cmd.arg("--format").arg("json").output().expect("run cli");
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is json")
}

fn assert_amount(value: &Value, expected: f64) {
    let actual = value.as_f64().expect("numeric value");
    assert!(
        (actual - expected).abs() < 0.01,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn materials_lists_components_and_base_materials() {
    let fixture = Fixture::new();
    fixture
        .command()
        .args(["materials", "--item", "Rifter", "--quantity", "2"])
        .assert()
        .success()
        .stdout(contains("Materials for 2 x Rifter (2 runs)"))
        .stdout(contains("Base materials:"))
        .stdout(contains("Tritanium"))
        .stdout(contains("2,000"));
}

#[test]
fn materials_json_expands_tech_two_components() {
    let fixture = Fixture::new();
    let mut cmd = fixture.command();
    cmd.args(["materials", "--item", "11400", "--component-me", "10"]);

    let report = json_output(&mut cmd);
    assert_eq!(report["name"], "Jaguar");
    let base = report["base_materials"].as_array().expect("list");
    let tritanium = base
        .iter()
        .find(|line| line["name"] == "Tritanium")
        .expect("tritanium present");
    assert_eq!(tritanium["quantity"], 2_900);
    assert!(base.iter().all(|line| line["name"] != "Rifter"));
}

#[test]
fn unknown_item_suggests_alternatives() {
    let fixture = Fixture::new();
    fixture
        .command()
        .args(["materials", "--item", "Rifer"])
        .assert()
        .failure()
        .stderr(contains("Did you mean"))
        .stderr(contains("'Rifter'"));
}

#[test]
fn invalid_efficiency_is_rejected() {
    let fixture = Fixture::new();
    fixture
        .command()
        .args(["materials", "--item", "Rifter", "--me", "11"])
        .assert()
        .failure()
        .stderr(contains("material efficiency"));
}

#[test]
fn invention_reports_stats_and_attempt_cost() {
    let fixture = Fixture::new();
    let mut cmd = fixture.priced_command();
    cmd.args(["invention", "--item", "Jaguar", "--decryptor", "accelerant"]);

    let report = json_output(&mut cmd);
    assert_eq!(report["base_name"], "Rifter Blueprint");
    assert_eq!(report["category"], "Frigates");
    assert_eq!(report["invented_blueprint"], "Jaguar Blueprint");
    assert_amount(&report["stats"]["chance"], 0.36);
    assert_eq!(report["stats"]["runs"], 2);
    assert_eq!(report["stats"]["material_efficiency"], 4);
    // two of each datacore plus the decryptor
    assert_amount(&report["cost_per_attempt"], 1_600.0);
    assert_amount(&report["cost_per_run"], 2_222.22);
}

#[test]
fn invention_text_without_prices_omits_costs() {
    let fixture = Fixture::new();
    fixture
        .command()
        .args(["invention", "--item", "Rifter Blueprint"])
        .assert()
        .success()
        .stdout(contains("Invention from Rifter Blueprint (Frigates)"))
        .stdout(contains("Chance:        30.0%"))
        .stdout(contains("Datacore - Mechanical Engineering"))
        .stdout(contains("Cost per attempt").not());
}

#[test]
fn invention_base_must_match_the_item() {
    let fixture = Fixture::new();
    fixture
        .command()
        .args([
            "invention",
            "--item",
            "Nanoelectrical Microprocessor",
            "--base",
            "Rifter",
        ])
        .assert()
        .failure()
        .stderr(contains("Rifter Blueprint does not invent Nanoelectrical Microprocessor"));

    fixture
        .command()
        .args(["invention", "--item", "Jaguar", "--base", "Rifter"])
        .assert()
        .success()
        .stdout(contains("Invention from Rifter Blueprint (Frigates)"));
}

#[test]
fn unknown_decryptor_is_a_usage_error() {
    let fixture = Fixture::new();
    fixture
        .command()
        .args(["invention", "--item", "Jaguar", "--decryptor", "Sparkly"])
        .assert()
        .failure()
        .stderr(contains("unknown decryptor"));
}

#[test]
fn job_time_scales_with_runs_and_efficiency() {
    let fixture = Fixture::new();
    fixture
        .command()
        .args(["job-time", "--item", "Rifter", "--runs", "2"])
        .assert()
        .success()
        .stdout(contains("03:20:00"));

    fixture
        .command()
        .args(["job-time", "--item", "Rifter", "--runs", "2", "--te", "10"])
        .assert()
        .success()
        .stdout(contains("02:40:00"));

    fixture
        .command()
        .args(["job-time", "--item", "Jaguar", "--invention"])
        .assert()
        .success()
        .stdout(contains("17:45:00"));
}

#[test]
fn cost_prints_totals_and_profit() {
    let fixture = Fixture::new();
    fixture
        .priced_command()
        .args(["cost", "--item", "Rifter", "--quantity", "2"])
        .assert()
        .success()
        .stdout(contains("Build cost for 2 x Rifter"))
        .stdout(contains("20,806.50"))
        .stdout(contains("7,693.50"))
        .stdout(contains("2,308.05"));
}

#[test]
fn cost_with_invention_uses_invented_blueprint_by_default() {
    let fixture = Fixture::new();
    let mut cmd = fixture.priced_command();
    cmd.args(["cost", "--item", "Jaguar", "--invent"]);

    let report = json_output(&mut cmd);
    let breakdown = &report["breakdown"];
    assert_eq!(breakdown["params"]["material_efficiency"], 2);
    assert_amount(&breakdown["invention"]["total"], 2_000.0);
    assert_amount(&breakdown["total_cost"], 37_876.05);
    assert_amount(&report["profit"]["profit"], 9_623.95);
    assert_eq!(report["item_names"]["11539"], "Nanoelectrical Microprocessor");
}

#[test]
fn explicit_blueprint_settings_win_over_invention() {
    let fixture = Fixture::new();
    let mut cmd = fixture.priced_command();
    cmd.args(["cost", "--item", "Jaguar", "--invent", "--me", "0"]);

    let report = json_output(&mut cmd);
    assert_eq!(report["breakdown"]["params"]["material_efficiency"], 0);
    assert_amount(&report["breakdown"]["total_cost"], 38_123.25);
}

#[test]
fn station_and_fee_flags_change_the_breakdown() {
    let fixture = Fixture::new();
    let mut cmd = fixture.priced_command();
    cmd.args([
        "cost",
        "--item",
        "Rifter",
        "--quantity",
        "2",
        "--station",
        "--buy-via",
        "sell",
    ]);

    let report = json_output(&mut cmd);
    assert_amount(&report["breakdown"]["product_build_fee"], 453.75);
    let fees = report["breakdown"]["base_materials_buy_fees"]
        .as_object()
        .expect("fee map");
    assert!(fees.values().all(|fee| fee.as_f64() == Some(0.0)));
}

#[test]
fn cost_requires_a_price_list() {
    let fixture = Fixture::new();
    fixture
        .command()
        .args(["cost", "--item", "Rifter"])
        .assert()
        .failure()
        .stderr(contains("no price list"));
}

#[test]
fn catalog_can_come_from_environment() {
    let fixture = Fixture::new();
    let mut cmd = cargo_bin_cmd!("eveindy-cli");
    cmd.env("EVEINDY_CATALOG", fixture.catalog.parent().expect("parent dir"))
        .env("EVEINDY_PRICES", &fixture.prices)
        .env("RUST_LOG", "error")
        .env("NO_COLOR", "1")
        .args(["--no-logo", "cost", "--item", "587"])
        .assert()
        .success()
        .stdout(contains("Total cost:"));
}

#[test]
fn missing_catalog_is_reported() {
    let dir = tempdir().expect("create temp dir");
    let mut cmd = cargo_bin_cmd!("eveindy-cli");
    cmd.env_remove("EVEINDY_CATALOG")
        .env("RUST_LOG", "error")
        .arg("--catalog")
        .arg(dir.path().join("missing.db"))
        .args(["materials", "--item", "Rifter"])
        .assert()
        .failure()
        .stderr(contains("failed to locate the industry catalog"));
}
