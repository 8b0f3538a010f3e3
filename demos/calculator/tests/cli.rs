//! Smoke tests for the `calculator-suite` binary.

use assert_cmd::Command;

fn suite() -> Result<Command, Box<dyn std::error::Error>> {
    let mut command = Command::cargo_bin("calculator-suite")?;
    command.env_remove("SCENARIO_DEPS_RACE_POLICY");
    Ok(command)
}

#[test]
fn passing_group_succeeds() -> Result<(), Box<dyn std::error::Error>> {
    let output = suite()?
        .args(["--group", "CalculatorFeature", "--workers", "1"])
        .output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("passed Calculator.Use the sum"));
    assert!(stdout.contains("[first=-4, second=4, result=0]"));
    assert!(stdout.ends_with("4 passed, 0 skipped, 0 failed\n"));
    Ok(())
}

#[test]
fn failing_dependency_is_reported_as_json() -> Result<(), Box<dyn std::error::Error>> {
    let output = suite()?
        .args([
            "--group",
            "FailingCalculatorFeature",
            "--workers",
            "1",
            "--json",
        ])
        .output()?;
    assert!(!output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["failed"], 2);
    assert_eq!(report["passed"], 1);
    let dependent = report["scenarios"]
        .as_array()
        .and_then(|scenarios| {
            scenarios
                .iter()
                .find(|scenario| scenario["scenario"] == "Use the sum")
        })
        .ok_or("dependent scenario missing")?;
    assert_eq!(
        dependent["failure"][0],
        "the dependency 'Failing calculator.Add two numbers' failed"
    );
    assert!(
        dependent["failure"][1]
            .as_str()
            .is_some_and(|cause| cause.contains("the result should be 99"))
    );
    Ok(())
}

#[test]
fn unknown_group_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    suite()?
        .args(["--group", "Nope"])
        .assert()
        .failure();
    Ok(())
}

#[test]
fn registry_dump_follows_the_report() -> Result<(), Box<dyn std::error::Error>> {
    let output = suite()?
        .args(["--group", "CalculatorFeature", "--race-policy", "skip", "--dump-registry"])
        .output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("\"id\": \"Calculator.Add two numbers\""));
    assert!(stdout.contains("\"status\": \"succeeded\""));
    Ok(())
}

#[test]
fn dependency_trace_goes_to_stderr() -> Result<(), Box<dyn std::error::Error>> {
    let output = suite()?
        .env("SCENARIO_DEPS_LOG", "info")
        .args(["--group", "CalculatorFeature", "--workers", "1", "--json"])
        .output()?;
    assert!(output.status.success());
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("invoking dependency"), "{stderr}");
    assert!(stderr.contains("before scenario: Use the sum"), "{stderr}");
    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["failed"], 0);
    Ok(())
}
