use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const AUTHORIZED: &str = "<protNFe versao=\"4.00\"><infProt><cStat>100</cStat>\
    <nProt>135240000000001</nProt><xMotivo>Autorizado o uso da NF-e</xMotivo></infProt></protNFe>";

fn nfe(number: u32, net: &str, paid: &str) -> String {
    format!(
        r#"<nfeProc><NFe><infNFe><ide><serie>1</serie><nNF>{number}</nNF></ide>
<emit><xNome>Loja Teste</xNome></emit>
<total><ICMSTot><vNF>{net}</vNF></ICMSTot></total>
<pag><detPag><vPag>{paid}</vPag></detPag></pag></infNFe></NFe>{AUTHORIZED}</nfeProc>"#
    )
}

fn write_batch(dir: &Path, numbers: &[u32]) {
    for n in numbers {
        fs::write(dir.join(format!("nfe-{}.xml", n)), nfe(*n, "10.00", "10.00")).unwrap();
    }
}

/// Command with an isolated config directory.
fn nfcheck(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("nfcheck").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_reconcile_prints_report() {
    let home = TempDir::new().unwrap();
    let data = TempDir::new().unwrap();
    write_batch(data.path(), &[1, 2, 4]);
    fs::write(data.path().join("notes.txt"), "ignored").unwrap();

    let pattern = format!("{}/*", data.path().display());
    let output = nfcheck(&home)
        .args(["reconcile", &pattern, "--compact"])
        .assert()
        .success()
        .stderr(predicate::str::contains("missing numbers: 3"))
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["totalProcessed"], 3);
    assert_eq!(report["missingNumbers"], serde_json::json!([3]));
    assert_eq!(report["missingRanges"], serde_json::json!(["3"]));
    assert_eq!(report["issuerName"], "Loja Teste");
    assert_eq!(report["allHaveProtocol"], true);
}

#[test]
fn test_reconcile_writes_output_file() {
    let home = TempDir::new().unwrap();
    let data = TempDir::new().unwrap();
    write_batch(data.path(), &[7]);
    let out = data.path().join("report.json");

    nfcheck(&home)
        .args(["reconcile", &format!("{}/*.xml", data.path().display())])
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(report["totalProcessed"], 1);
}

#[test]
fn test_reconcile_messages_use_configured_interval() {
    let home = TempDir::new().unwrap();
    let data = TempDir::new().unwrap();
    write_batch(data.path(), &[1, 2, 3]);
    let config = data.path().join("config.json");
    fs::write(&config, r#"{"reconcile": {"progress_interval": 2}}"#).unwrap();

    let output = nfcheck(&home)
        .arg("--config")
        .arg(&config)
        .args(["reconcile", &format!("{}/*.xml", data.path().display()), "--messages"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let lines: Vec<serde_json::Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    let kinds: Vec<&str> = lines.iter().map(|m| m["type"].as_str().unwrap()).collect();
    assert_eq!(kinds, vec!["progress", "progress", "completed"]);
    assert_eq!(lines[0]["processed"], 2);
    assert_eq!(lines[1]["percent"], 100);
}

#[test]
fn test_reconcile_no_files() {
    let home = TempDir::new().unwrap();
    let data = TempDir::new().unwrap();

    nfcheck(&home)
        .args(["reconcile", &format!("{}/*.xml", data.path().display())])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files found"));
}

#[test]
fn test_reconcile_flags_degraded_success() {
    let home = TempDir::new().unwrap();
    let data = TempDir::new().unwrap();
    write_batch(data.path(), &[1]);
    fs::write(data.path().join("broken.xml"), "<infNFe><ide><nNF>2</nNF>").unwrap();
    let config = data.path().join("config.json");
    fs::write(&config, r#"{"reconcile": {"lookup": "structured"}}"#).unwrap();

    nfcheck(&home)
        .arg("--config")
        .arg(&config)
        .args(["reconcile", &format!("{}/*.xml", data.path().display())])
        .assert()
        .success()
        .stderr(predicate::str::contains("Completed with 1 document errors"))
        .stderr(predicate::str::contains("broken.xml"));
}

#[test]
fn test_worker_round_trip() {
    let home = TempDir::new().unwrap();
    let request = serde_json::json!({
        "documents": [
            {"name": "a.xml", "content": nfe(1, "5.00", "4.00")},
            {"name": "b.xml", "content": nfe(1, "5.00", "5.00")},
        ]
    });

    let output = nfcheck(&home)
        .arg("worker")
        .write_stdin(request.to_string())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let lines: Vec<serde_json::Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["type"], "progress");
    assert_eq!(lines[0]["percent"], 100);

    let report = &lines[1]["report"];
    assert_eq!(lines[1]["type"], "completed");
    assert_eq!(report["duplicates"][0]["key"], "1-1");
    assert_eq!(report["divergences"][0]["filename"], "a.xml");
    assert_eq!(report["divergences"][0]["status"], "net-greater");
}

#[test]
fn test_worker_rejects_malformed_request() {
    let home = TempDir::new().unwrap();

    nfcheck(&home)
        .arg("worker")
        .write_stdin(r#"{"files": []}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""type":"failed""#))
        .stdout(predicate::str::contains("missing `documents` field"));

    nfcheck(&home)
        .arg("worker")
        .write_stdin("not json")
        .assert()
        .success()
        .stdout(predicate::str::contains("message is not valid JSON"));
}

#[test]
fn test_config_init_set_get() {
    let home = TempDir::new().unwrap();

    nfcheck(&home)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));

    nfcheck(&home)
        .args(["config", "set", "reconcile.progress_interval", "25"])
        .assert()
        .success();

    nfcheck(&home)
        .args(["config", "get", "reconcile.progress_interval"])
        .assert()
        .success()
        .stdout(predicate::str::contains("25"));

    nfcheck(&home)
        .args(["config", "set", "reconcile.progress_interval", "0"])
        .assert()
        .failure();

    nfcheck(&home)
        .args(["config", "get", "reconcile.nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}

#[test]
fn test_worker_files_bad_entries_as_errors() {
    let home = TempDir::new().unwrap();
    let request = serde_json::json!({
        "documents": [
            {"name": "good.xml", "content": nfe(4, "1.00", "1.00")},
            {"name": "bad.xml"},
            null,
        ]
    });

    let output = nfcheck(&home)
        .arg("worker")
        .write_stdin(request.to_string())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let last: serde_json::Value = String::from_utf8(output)
        .unwrap()
        .lines()
        .last()
        .map(|l| serde_json::from_str(l).unwrap())
        .unwrap();
    assert_eq!(last["type"], "completed");
    assert_eq!(last["report"]["totalProcessed"], 3);
    assert_eq!(last["report"]["rangeMetadata"]["foundCount"], 1);
    let errors = last["report"]["log"]["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert!(errors[0].as_str().unwrap().starts_with("File bad.xml: malformed entry"));
}

#[test]
fn test_config_commands_honor_config_flag() {
    let home = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();
    let custom = dir.path().join("custom.json");

    nfcheck(&home)
        .arg("--config")
        .arg(&custom)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(custom.exists());

    nfcheck(&home)
        .arg("--config")
        .arg(&custom)
        .args(["config", "set", "output.pretty", "false"])
        .assert()
        .success();

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&custom).unwrap()).unwrap();
    assert_eq!(saved["output"]["pretty"], false);

    nfcheck(&home)
        .arg("--config")
        .arg(&custom)
        .args(["config", "get", "output.pretty"])
        .assert()
        .success()
        .stdout(predicate::str::contains("false"));

    nfcheck(&home)
        .arg("--config")
        .arg(&custom)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("custom.json"));

    // The default file was never touched
    assert!(!home.path().join(".config/nfcheck/config.json").exists());
}
