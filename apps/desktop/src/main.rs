use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::Result;
use clap::Parser;
use client_core::{
    load_settings, DataUrlReader, ImageFile, PredictionClient, SubmitOutcome, WorkflowController,
    WorkflowPhase, WorkflowView,
};
use shared::domain::HealthState;

const PREVIEW_DISPLAY_CHARS: usize = 48;

#[derive(Parser, Debug)]
#[command(about = "Preview an image and submit it to the prediction service")]
struct Args {
    /// Image to submit; omitting it exercises the "no image selected" path.
    #[arg(long)]
    image: Option<PathBuf>,
    #[arg(long)]
    predict_url: Option<String>,
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Check the service root before submitting.
    #[arg(long)]
    check_health: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(url) = args.predict_url {
        settings.predict_url = url;
    }
    if args.timeout_secs.is_some() {
        settings.request_timeout_secs = args.timeout_secs;
    }
    let client = PredictionClient::from_settings(&settings)?;

    if args.check_health {
        match client.health().await {
            Ok(health) if health.status == HealthState::Healthy => {
                println!("service: {}", health.message);
            }
            Ok(health) => {
                eprintln!("service unhealthy: {}", health.message);
                return Ok(ExitCode::FAILURE);
            }
            Err(err) => {
                tracing::warn!(%err, "health check failed");
                eprintln!("service unhealthy: {err}");
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    let mut controller = WorkflowController::new(Arc::new(DataUrlReader), Arc::new(client));

    if let Some(path) = args.image {
        let file = ImageFile::load(&path).await?;
        controller.select_file(file);
        controller.settle().await;
        render(&controller.view());
    }

    if let SubmitOutcome::Started(submission) = controller.submit() {
        tracing::debug!(submission = submission.0, "prediction submitted");
        render(&controller.view());
        controller.settle().await;
    }
    render(&controller.view());

    Ok(match controller.phase() {
        WorkflowPhase::Succeeded(_) => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

fn render(view: &WorkflowView) {
    if let Some(preview) = &view.preview {
        println!("[{}] {}", preview.alt, abbreviate(&preview.src, PREVIEW_DISPLAY_CHARS));
    }
    if let Some(status) = view.status_text() {
        println!("{status}");
    }
}

fn abbreviate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{head}...")
}
