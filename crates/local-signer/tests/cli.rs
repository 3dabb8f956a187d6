use std::io::Write;
use std::process::{Command, Output, Stdio};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};

const BIN: &str = env!("CARGO_BIN_EXE_notation-local-signer");
const KEY_VAR: &str = "NOTATION_CLI_TEST_KEY";

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"))
}

fn run(args: &[&str], input: &str, envs: &[(&str, String)]) -> Output {
    let mut child = Command::new(BIN)
        .args(args)
        .envs(envs.iter().map(|(k, v)| (*k, v.as_str())))
        .env_remove("NOTATION_PLUGIN_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    // get-metadata never reads stdin, so the pipe may already be closed.
    let _ = child.stdin.take().unwrap().write_all(input.as_bytes());
    child.wait_with_output().unwrap()
}

fn json(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

#[test]
fn get_metadata() {
    let output = run(&["get-metadata"], "", &[]);
    assert!(output.status.success());
    assert!(output.stderr.is_empty());

    let metadata = json(&output.stdout);
    assert_eq!(metadata["name"], "local-signer");
    assert_eq!(metadata["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(metadata["capabilities"], json!(["SIGNATURE_GENERATOR.RAW"]));
}

#[test]
fn describe_key() {
    let input = json!({"contractVersion": "1.0", "keyId": fixture("ec-521.crt")});
    let output = run(&["describe-key"], &input.to_string(), &[]);
    assert!(output.status.success());
    assert_eq!(json(&output.stdout)["keySpec"], "EC-521");
}

#[test]
fn generate_signature() {
    let key = STANDARD.encode(std::fs::read(fixture("rsa-2048.key")).unwrap());
    let input = json!({
        "contractVersion": "1.0",
        "keyId": fixture("rsa-2048.crt"),
        "keySpec": "RSA-2048",
        "hashAlgorithm": "SHA-256",
        "payload": STANDARD.encode("payload"),
        "pluginConfig": {"env": KEY_VAR}
    });
    let output = run(&["generate-signature"], &input.to_string(), &[(KEY_VAR, key)]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let response = json(&output.stdout);
    assert_eq!(response["signingAlgorithm"], "RSASSA-PSS-SHA-256");
    assert_eq!(response["certificateChain"].as_array().unwrap().len(), 1);
    let signature = STANDARD.decode(response["signature"].as_str().unwrap()).unwrap();
    assert_eq!(signature.len(), 256);
}

#[test]
fn failure_writes_error_to_stderr() {
    let input = json!({"keyId": fixture("empty.pem")});
    let output = run(&["describe-key"], &input.to_string(), &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert_eq!(
        json(&output.stderr),
        json!({"errorCode": "VALIDATION_ERROR", "errorMessage": "no certificate found"})
    );
}

#[test]
fn unknown_command_is_a_usage_error() {
    let output = run(&["sign"], "", &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert_eq!(json(&output.stderr)["errorCode"], "ERROR");
}

#[test]
fn extra_arguments_are_a_usage_error() {
    let output = run(&["describe-key", "again"], "", &[]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(json(&output.stderr)["errorCode"], "ERROR");
}

#[test]
fn missing_command_is_a_usage_error() {
    let output = run(&[], "", &[]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(json(&output.stderr)["errorCode"], "ERROR");
}

#[test]
fn version_flag() {
    let output = run(&["--version"], "", &[]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")), "{stdout}");
}
