//! Listen mode: newline-delimited JSON requests on stdin, one JSON report per line on stdout.
//!
//! Requests are handled one at a time. A failing request only affects its own report.

use anyhow::Context;
use camino::Utf8PathBuf;
use dtslint_types::report::{PackageReport, ReportStatus, ToolInfo};
use serde::Deserialize;
use std::io::{BufRead, Write};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenRequest {
    pub path: Utf8PathBuf,

    #[serde(default)]
    pub only_test_ts_next: bool,

    #[serde(default)]
    pub expect_only: bool,
}

/// Reads requests until end of input. Only I/O failures on the streams end the loop early.
pub fn serve<R, W, F>(input: R, mut output: W, tool: &ToolInfo, mut handle: F) -> anyhow::Result<()>
where
    R: BufRead,
    W: Write,
    F: FnMut(ListenRequest) -> PackageReport,
{
    for line in input.lines() {
        let line = line.context("read request")?;
        if line.trim().is_empty() {
            continue;
        }

        let report = match serde_json::from_str::<ListenRequest>(&line) {
            Ok(request) => {
                debug!(path = %request.path, "listen request");
                handle(request)
            }
            Err(e) => {
                warn!(error = %e, "malformed listen request");
                let mut report = PackageReport::new(tool.clone(), "", "");
                report.status = ReportStatus::Error;
                report.errors.push(format!("malformed request: {e}"));
                report
            }
        };

        serde_json::to_writer(&mut output, &report).context("write report")?;
        output.write_all(b"\n").context("write report")?;
        output.flush().context("flush report")?;
    }
    Ok(())
}
