use std::path::Path;
use std::time::Duration;

use pharmabot_core::config::{AppConfig, LoadOptions};
use pharmabot_core::pricelist::{PriceListProvider, ScrapedPriceList};
use pharmabot_server::price_source::HttpPriceSource;
use serde::Serialize;

use crate::commands::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Warn,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

/// Exit code 0 unless a check failed; warnings alone still pass.
pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Fail { 1 } else { 0 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_llm_key(&config));
            checks.push(check_orders_log(&config.orders.log_path));
            checks.push(check_price_list(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["llm_api_key", "orders_log_path", "price_list_fetch"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let failed = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let warned = checks.iter().any(|check| check.status == CheckStatus::Warn);
    let (overall_status, summary) = match (failed, warned) {
        (true, _) => (CheckStatus::Fail, "doctor: one or more readiness checks failed"),
        (false, true) => (CheckStatus::Warn, "doctor: ready with warnings"),
        (false, false) => (CheckStatus::Pass, "doctor: all readiness checks passed"),
    };

    DoctorReport { overall_status, summary: summary.to_string(), checks }
}

fn check_llm_key(config: &AppConfig) -> DoctorCheck {
    if config.llm.api_key.is_some() {
        DoctorCheck {
            name: "llm_api_key",
            status: CheckStatus::Pass,
            details: format!("completion endpoint `{}`", config.llm.base_url),
        }
    } else {
        DoctorCheck {
            name: "llm_api_key",
            status: CheckStatus::Warn,
            details: "no API key; free-text questions get the fallback reply".to_string(),
        }
    }
}

fn check_orders_log(path: &Path) -> DoctorCheck {
    let name = "orders_log_path";

    if path.exists() {
        return match path.metadata() {
            Ok(metadata) if metadata.permissions().readonly() => DoctorCheck {
                name,
                status: CheckStatus::Fail,
                details: format!("`{}` is read-only", path.display()),
            },
            Ok(_) => DoctorCheck {
                name,
                status: CheckStatus::Pass,
                details: format!("appending to `{}`", path.display()),
            },
            Err(error) => DoctorCheck {
                name,
                status: CheckStatus::Fail,
                details: format!("cannot inspect `{}`: {error}", path.display()),
            },
        };
    }

    let parent = path.parent().filter(|parent| !parent.as_os_str().is_empty());
    match parent {
        Some(parent) if !parent.exists() => DoctorCheck {
            name,
            status: CheckStatus::Warn,
            details: format!("`{}` will be created on the first order", parent.display()),
        },
        _ => DoctorCheck {
            name,
            status: CheckStatus::Pass,
            details: format!("`{}` will be created on the first order", path.display()),
        },
    }
}

fn check_price_list(config: &AppConfig) -> DoctorCheck {
    let name = "price_list_fetch";
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck {
                name,
                status: CheckStatus::Fail,
                details: format!("failed to initialize async runtime: {error}"),
            };
        }
    };

    let result = runtime.block_on(async {
        let source = HttpPriceSource::new(
            config.pricelist.url.clone(),
            Duration::from_secs(config.pricelist.timeout_secs),
        )?;
        ScrapedPriceList::new(source).refresh().await
    });

    match result {
        Ok(list) => DoctorCheck {
            name,
            status: CheckStatus::Pass,
            details: format!("{} products parsed from `{}`", list.len(), config.pricelist.url),
        },
        Err(error) => DoctorCheck { name, status: CheckStatus::Fail, details: error.to_string() },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Warn => "warn",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
