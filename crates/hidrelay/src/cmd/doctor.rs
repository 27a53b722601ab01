use std::fs::OpenOptions;
use std::os::unix::fs::FileTypeExt;
use std::path::Path;

use serde::Serialize;

use crate::cmd::DoctorArgs;
use crate::exit::{CliResult, HEALTH_CHECK_FAILED, SUCCESS};
use crate::output::OutputFormat;

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Pass,
    Fail,
    Warn,
    Skip,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    name: &'static str,
    status: CheckStatus,
    detail: String,
}

#[derive(Debug, Serialize)]
struct DoctorOutput {
    schema_id: &'static str,
    checks: Vec<CheckResult>,
    overall: &'static str,
}

pub fn run(args: DoctorArgs, format: OutputFormat) -> CliResult<i32> {
    let mut checks = vec![device_node_check(&args.device)];
    if !matches!(checks[0].status, CheckStatus::Fail) {
        checks.push(device_writable_check(&args.device));
    }
    checks.push(bluetooth_check());

    let has_fail = checks.iter().any(|c| matches!(c.status, CheckStatus::Fail));
    let output = DoctorOutput {
        schema_id: "https://schemas.3leaps.dev/hidrelay/cli/v1/doctor-report.schema.json",
        checks,
        overall: if has_fail { "fail" } else { "pass" },
    };

    print_doctor(&output, format);

    if has_fail {
        Ok(HEALTH_CHECK_FAILED)
    } else {
        Ok(SUCCESS)
    }
}

fn print_doctor(output: &DoctorOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(output).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Pretty => {
            println!("hidrelay doctor\n");
            for c in &output.checks {
                println!(
                    "  [{:>4}] {:<18} {}",
                    status_text(c.status),
                    c.name,
                    c.detail
                );
            }
            if output.overall == "pass" {
                println!("\n  Result: all checks passed");
            } else {
                println!("\n  Result: one or more checks failed");
            }
        }
    }
}

fn status_text(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "PASS",
        CheckStatus::Fail => "FAIL",
        CheckStatus::Warn => "WARN",
        CheckStatus::Skip => "SKIP",
    }
}

fn device_node_check(path: &Path) -> CheckResult {
    let name = "device_node";
    match std::fs::metadata(path) {
        Ok(meta) if meta.file_type().is_char_device() => CheckResult {
            name,
            status: CheckStatus::Pass,
            detail: format!("{} is a character device", path.display()),
        },
        Ok(meta) if meta.is_file() => CheckResult {
            name,
            status: CheckStatus::Warn,
            detail: format!(
                "{} is a regular file; reports will be appended, not delivered to a host",
                path.display()
            ),
        },
        Ok(_) => CheckResult {
            name,
            status: CheckStatus::Fail,
            detail: format!("{} is neither a device node nor a file", path.display()),
        },
        Err(err) => CheckResult {
            name,
            status: CheckStatus::Fail,
            detail: format!(
                "{}: {err} (is the HID gadget function configured?)",
                path.display()
            ),
        },
    }
}

fn device_writable_check(path: &Path) -> CheckResult {
    let name = "device_writable";
    match OpenOptions::new().write(true).open(path) {
        Ok(_) => CheckResult {
            name,
            status: CheckStatus::Pass,
            detail: format!("{} opened for writing", path.display()),
        },
        Err(err) => CheckResult {
            name,
            status: CheckStatus::Fail,
            detail: format!("{}: {err}", path.display()),
        },
    }
}

#[cfg(target_os = "linux")]
fn bluetooth_check() -> CheckResult {
    match hidrelay_transport::rfcomm::probe_support() {
        Ok(()) => CheckResult {
            name: "bluetooth_rfcomm",
            status: CheckStatus::Pass,
            detail: "AF_BLUETOOTH/RFCOMM sockets available".to_string(),
        },
        Err(err) => CheckResult {
            name: "bluetooth_rfcomm",
            status: CheckStatus::Warn,
            detail: format!("RFCOMM sockets unavailable ({err}); only --unix upstream will work"),
        },
    }
}

#[cfg(not(target_os = "linux"))]
fn bluetooth_check() -> CheckResult {
    CheckResult {
        name: "bluetooth_rfcomm",
        status: CheckStatus::Skip,
        detail: "RFCOMM listener is linux-only".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doctor_output_has_overall_status() {
        let output = DoctorOutput {
            schema_id: "x",
            checks: vec![CheckResult {
                name: "x",
                status: CheckStatus::Pass,
                detail: "ok".to_string(),
            }],
            overall: "pass",
        };
        let json = serde_json::to_string(&output).expect("doctor output should serialize");
        assert!(json.contains("\"overall\":\"pass\""));
        assert!(json.contains("\"status\":\"pass\""));
    }

    #[test]
    fn missing_device_fails() {
        let check = device_node_check(Path::new("/nonexistent/hidg9"));
        assert!(matches!(check.status, CheckStatus::Fail));
    }

    #[test]
    fn regular_file_warns() {
        let path = std::env::temp_dir().join(format!("hidrelay-doctor-{}", std::process::id()));
        std::fs::write(&path, b"").unwrap();

        let check = device_node_check(&path);
        assert!(matches!(check.status, CheckStatus::Warn));
        assert!(matches!(
            device_writable_check(&path).status,
            CheckStatus::Pass
        ));

        let _ = std::fs::remove_file(&path);
    }
}
