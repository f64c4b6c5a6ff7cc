use crate::cli::OutputFormat;
use crate::commands::Report;
use crate::error::CliError;

pub fn render(report: &Report, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(report)?
            } else {
                serde_json::to_string(report)?
            };
            println!("{payload}");
        }
        OutputFormat::Table => print!("{}", render_table(report)?),
    }

    Ok(())
}

fn render_table(report: &Report) -> Result<String, CliError> {
    let mut out = String::new();
    out.push_str(&format!("scope      : {}\n", report.scope));
    out.push_str(&format!("latency_ms : {}\n", report.latency_ms));

    if !report.warnings.is_empty() {
        out.push_str("warnings:\n");
        for warning in &report.warnings {
            out.push_str(&format!("  - {warning}\n"));
        }
    }

    out.push_str("data:\n");
    let pretty_data = serde_json::to_string_pretty(&report.data)?;
    for line in pretty_data.lines() {
        out.push_str(&format!("  {line}\n"));
    }

    if !report.errors.is_empty() {
        out.push_str("errors:\n");
        for error in &report.errors {
            match &error.endpoint {
                Some(endpoint) => out.push_str(&format!(
                    "  - {} [{endpoint}]: {}\n",
                    error.code, error.message
                )),
                None => out.push_str(&format!("  - {}: {}\n", error.code, error.message)),
            }
        }
    }

    Ok(out)
}
