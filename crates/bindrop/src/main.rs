//! `bindrop` materializes a build drop into a local directory.
//!
//! ```text
//! bindrop --drop https://acct.example.com/_apis/drop/drops/build/42 --root retail --dest ./out
//! BINDROP_PAT=... bindrop --drop <uri> --root <prefix> --dest <dir> --max-concurrent 16
//! ```
//!
//! Exits non-zero on any failure. Failures before the first write leave the
//! destination untouched; later failures may leave it partially populated.

mod cli;
mod telemetry;

use anyhow::{Context, Result};
use bindrop::{DropApiClient, DropError, DropSession, Materializer, ReqwestClient};
use clap::Parser;
use tracing::{error, info};

use cli::App;

#[tokio::main]
async fn main() -> Result<()> {
    let app = App::parse();
    telemetry::init(&app.log_level);

    let source = DropApiClient::new(app.pat.clone()).context("failed to build manifest client")?;
    let session = DropSession::initialize(&app.drop_location, app.root.as_deref(), &source)
        .await
        .map_err(report)
        .context("failed to read drop manifest")?;

    let client = ReqwestClient::new().context("failed to build content client")?;
    let materializer = Materializer::new(client).with_options(app.materialize_options());

    let summary = session
        .materialize(&materializer, &app.destination)
        .await
        .map_err(report)
        .with_context(|| format!("failed to materialize into '{}'", app.destination.display()))?;

    info!(
        files = summary.files,
        unique = summary.unique,
        downloaded = summary.downloaded,
        copied = summary.copied,
        "done"
    );
    Ok(())
}

fn report(err: DropError) -> DropError {
    if err.is_preflight() {
        error!("nothing was written: {err}");
    } else {
        error!("destination may be partially populated: {err}");
    }
    if let DropError::Materialize(e) = &err {
        for failure in &e.failures {
            error!("{failure}");
        }
    }
    err
}
