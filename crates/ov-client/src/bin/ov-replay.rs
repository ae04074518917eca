//! Drive an editor from a JSON script.
//!
//! Usage: `ov-replay <script.json> [--offline]`
//!
//! Online runs talk to the API configured by `OVERLAY_API_URL`; `--offline`
//! uses an in-memory backend seeded from the script. `RUST_LOG` sets the
//! log level.

use ov_client::script::{Report, Script, replay};
use ov_client::{ClientConfig, HttpBackend};
use ov_editor::Editor;
use ov_editor::memory::Op;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

fn print_report(report: &Report) {
    for notice in &report.notices {
        if notice.is_error() {
            log::warn!("{notice}");
        } else {
            log::info!("{notice}");
        }
    }
    println!(
        "{} regions, {} drawings, {} error notice(s)",
        report.regions,
        report.drawings,
        report.errors()
    );
}

async fn run(path: PathBuf, offline: bool) -> Result<Report, Box<dyn std::error::Error>> {
    let script = Script::load(&path)?;
    if offline {
        let backend = Arc::new(script.offline_backend());
        let mut editor = Editor::open(Arc::clone(&backend), script.page.clone(), script.config.clone()).await?;
        let report = replay(&mut editor, &script).await;
        for op in Op::MUTATIONS.into_iter().chain([Op::Recompose]) {
            println!("{op:?}: {}", backend.calls(op));
        }
        Ok(report)
    } else {
        let config = ClientConfig::from_env();
        log::info!("using {}", config.base_url);
        let backend = Arc::new(HttpBackend::new(&config)?);
        let mut editor = Editor::open(backend, script.page.clone(), script.config.clone()).await?;
        Ok(replay(&mut editor, &script).await)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let mut path = None;
    let mut offline = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--offline" => offline = true,
            _ if path.is_none() => path = Some(PathBuf::from(arg)),
            other => {
                eprintln!("unexpected argument {other:?}");
                return ExitCode::from(2);
            }
        }
    }
    let Some(path) = path else {
        eprintln!("usage: ov-replay <script.json> [--offline]");
        return ExitCode::from(2);
    };

    match run(path, offline).await {
        Ok(report) => {
            print_report(&report);
            if report.errors() == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(error) => {
            log::error!("{error}");
            eprintln!("ov-replay: {error}");
            ExitCode::FAILURE
        }
    }
}
