#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn prazos(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("prazos").unwrap();
    cmd.current_dir(dir.path())
        .env("PRAZOS_ROOT", dir.path())
        .env("PRAZOS_USER", "cap.andrade")
        .env_remove("PRAZOS_ROLE");
    cmd
}

fn init_project(dir: &TempDir) {
    prazos(dir).arg("init").assert().success();
}

fn json_of(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).expect("stdout is JSON")
}

fn register(dir: &TempDir, number: &str, kind: &str, received: &str) {
    prazos(dir)
        .args([
            "case", "register", number, "--type", kind, "--received", received,
        ])
        .assert()
        .success();
}

// ---------------------------------------------------------------------------
// init / config
// ---------------------------------------------------------------------------

#[test]
fn init_creates_config_and_database() {
    let dir = TempDir::new().unwrap();
    prazos(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized"));

    assert!(dir.path().join(".prazos/config.yaml").exists());
    assert!(dir.path().join(".prazos/prazos.redb").exists());
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    prazos(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Already initialized"));
}

#[test]
fn commands_fail_before_init() {
    let dir = TempDir::new().unwrap();
    prazos(&dir)
        .args(["case", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}

#[test]
fn config_validate_flags_inverted_thresholds() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    prazos(&dir).args(["config", "validate"]).assert().success();

    std::fs::write(
        dir.path().join(".prazos/config.yaml"),
        "thresholds:\n  urgent_days: 12\n  attention_days: 10\n",
    )
    .unwrap();
    prazos(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("urgent_days"));
}

#[test]
fn commands_refuse_an_invalid_config() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    register(&dir, "SR-030/2025", "SR", "2025-01-01");
    std::fs::write(
        dir.path().join(".prazos/config.yaml"),
        "thresholds:\n  urgent_days: 12\n  attention_days: 10\n",
    )
    .unwrap();

    prazos(&dir)
        .args(["--today", "2025-01-20", "deadline", "status", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config"))
        .stdout(predicate::str::contains("urgent").not());
}

// ---------------------------------------------------------------------------
// deadlines
// ---------------------------------------------------------------------------

#[test]
fn pads_initial_deadline_and_extension() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    prazos(&dir)
        .args([
            "case",
            "register",
            "PADS-003/2025",
            "--type",
            "PADS",
            "--document",
            "Memorando Disciplinar",
            "--received",
            "2025-01-01",
        ])
        .assert()
        .success();

    prazos(&dir)
        .args(["deadline", "init", "1", "--start", "2025-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2025-01-31"));

    let out = prazos(&dir)
        .args([
            "--json",
            "deadline",
            "extend",
            "1",
            "--days",
            "10",
            "--order",
            "45/2025",
            "--authorized-by",
            "Cel. Ramos",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v = json_of(&out);
    assert_eq!(v["success"], true);
    assert_eq!(v["data"]["start_date"], "2025-02-01");
    assert_eq!(v["data"]["due_date"], "2025-02-10");
    assert_eq!(v["data"]["ordinal"], 1);
    assert_eq!(v["data"]["authorization"]["order_number"], "45/2025");

    let out = prazos(&dir)
        .args(["--json", "deadline", "periods", "1"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let periods = json_of(&out)["data"].as_array().unwrap().clone();
    assert_eq!(periods.len(), 2);
    assert_eq!(periods[0]["kind"], "initial");
    assert_eq!(periods[0]["active"], false);
    assert_eq!(periods[1]["active"], true);
}

#[test]
fn extend_without_period_needs_bootstrap() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    register(&dir, "SR-010/2025", "SR", "2025-01-01");

    let out = prazos(&dir)
        .args(["--json", "deadline", "extend", "1", "--days", "10"])
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();
    let v = json_of(&out);
    assert_eq!(v["success"], false);
    assert_eq!(v["error"]["kind"], "not_found");

    prazos(&dir)
        .args(["deadline", "extend", "1", "--days", "10", "--bootstrap"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Opened initial period"))
        .stdout(predicate::str::contains("2025-02-10"));
}

#[test]
fn extend_rejects_zero_days() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    register(&dir, "SR-011/2025", "SR", "2025-01-01");
    prazos(&dir).args(["deadline", "ensure", "1"]).assert().success();

    let out = prazos(&dir)
        .args(["--json", "deadline", "extend", "1", "--days", "0"])
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();
    assert_eq!(json_of(&out)["error"]["kind"], "validation");
}

#[test]
fn initialize_twice_is_a_conflict() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    register(&dir, "SR-012/2025", "SR", "2025-01-01");
    prazos(&dir)
        .args(["deadline", "init", "1", "--start", "2025-01-01"])
        .assert()
        .success();

    let out = prazos(&dir)
        .args(["--json", "deadline", "init", "1", "--start", "2025-01-05"])
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();
    assert_eq!(json_of(&out)["error"]["kind"], "conflict");
}

#[test]
fn ipm_status_is_urgent_two_days_out() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    register(&dir, "IPM-001/2025", "IPM", "2025-03-01");
    prazos(&dir).args(["deadline", "ensure", "1"]).assert().success();

    let out = prazos(&dir)
        .args(["--json", "--today", "2025-04-08", "deadline", "status", "1"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v = json_of(&out);
    assert_eq!(v["data"]["due_date"], "2025-04-10");
    assert_eq!(v["data"]["bucket"]["status"], "urgent");
    assert_eq!(v["data"]["bucket"]["days"], 2);
}

#[test]
fn concluded_case_reports_concluded() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    register(&dir, "SV-002/2025", "SV", "2025-01-01");

    prazos(&dir)
        .args(["case", "conclude", "1", "--on", "2025-03-01"])
        .assert()
        .success();

    let out = prazos(&dir)
        .args(["--json", "--today", "2025-06-01", "deadline", "status", "1"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(json_of(&out)["data"]["bucket"]["status"], "concluded");

    prazos(&dir)
        .args(["case", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No cases."));
}

// ---------------------------------------------------------------------------
// timeline
// ---------------------------------------------------------------------------

#[test]
fn timeline_add_list_remove() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    register(&dir, "PAD-004/2025", "PAD", "2025-02-01");

    prazos(&dir)
        .args(["timeline", "add", "1", "Oitiva da testemunha"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added entry [1]"));
    prazos(&dir)
        .args(["timeline", "add", "1", "Relatório final"])
        .assert()
        .success();

    let out = prazos(&dir)
        .args(["--json", "timeline", "list", "1"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let entries = json_of(&out)["data"].as_array().unwrap().clone();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["text"], "Relatório final");
    assert_eq!(entries[0]["author"], "cap.andrade");

    prazos(&dir)
        .args(["timeline", "remove", "1", "99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));

    prazos(&dir)
        .args(["timeline", "remove", "1", "1"])
        .assert()
        .success();
    prazos(&dir)
        .args(["timeline", "list", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Relatório final"))
        .stdout(predicate::str::contains("Oitiva").not());
}

// ---------------------------------------------------------------------------
// dashboard / report / responsible / audit
// ---------------------------------------------------------------------------

#[test]
fn dashboard_counts_open_cases() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    register(&dir, "SR-001/2025", "SR", "2025-05-10"); // due 06-09, overdue
    register(&dir, "SR-002/2025", "SR", "2025-05-19"); // due 06-18, urgent
    prazos(&dir)
        .args(["case", "register", "SR-003/2025", "--type", "SR"])
        .assert()
        .success();

    let out = prazos(&dir)
        .args(["--json", "--today", "2025-06-15", "dashboard"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v = json_of(&out)["data"].clone();
    assert_eq!(v["overdue"], 1);
    assert_eq!(v["urgent"], 1);
    assert_eq!(v["no_receipt_date"], 1);
    assert_eq!(v["total"], 3);

    prazos(&dir)
        .args(["--today", "2025-06-15", "report"])
        .assert()
        .success()
        .stdout(predicate::str::contains("overdue (6d late)"));
}

#[test]
fn responsible_substitution_history() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    register(&dir, "PAD-009/2025", "PAD", "2025-02-01");

    prazos(&dir)
        .args(["responsible", "assign", "1", "Ten. Costa"])
        .assert()
        .success();
    prazos(&dir)
        .args([
            "responsible",
            "assign",
            "1",
            "Cap. Melo",
            "--reason",
            "afastamento",
        ])
        .assert()
        .success();

    let out = prazos(&dir)
        .args(["--json", "responsible", "show", "1"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let history = json_of(&out)["data"].as_array().unwrap().clone();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["active"], false);
    assert_eq!(history[1]["officer"], "Cap. Melo");
    assert_eq!(history[1]["active"], true);
}

#[test]
fn audit_records_actor() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    register(&dir, "SR-020/2025", "SR", "2025-01-01");
    prazos(&dir).args(["deadline", "ensure", "1"]).assert().success();

    let out = prazos(&dir)
        .args(["--json", "audit", "list"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let records = json_of(&out)["data"].as_array().unwrap().clone();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["table"], "periods");
    assert_eq!(records[0]["operation"], "CREATE");
    assert_eq!(records[1]["table"], "cases");
    assert!(records.iter().all(|r| r["actor_id"] == "cap.andrade"));
}
