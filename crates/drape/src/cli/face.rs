//! The `drape face` command for face-attribute analysis.

use clap::Args;
use drape_core::{Config, FaceAttributes, FaceClient};
use serde::Serialize;
use std::path::PathBuf;

/// Arguments for the `face` command.
#[derive(Args, Debug)]
pub struct FaceArgs {
    /// Image with a visible face (JPG, PNG or BMP, up to 2MB)
    #[arg(required_unless_present = "check")]
    pub file: Option<PathBuf>,

    /// Only verify that the face API credentials work
    #[arg(long)]
    pub check: bool,

    /// Fall back to sample attributes when the detector is unavailable
    #[arg(long)]
    pub demo_fallback: bool,

    /// Print the raw attributes as JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct FaceReport<'a> {
    demo: bool,
    summary: drape_core::FaceSummary,
    attributes: &'a FaceAttributes,
}

/// Execute the face command.
pub async fn execute(args: FaceArgs, config: Config) -> anyhow::Result<()> {
    let client = FaceClient::new(&config.face);

    if args.check {
        let app = client.check_connection().await?;
        tracing::info!("Face API connection successful");
        println!("{}", serde_json::to_string_pretty(&app)?);
        return Ok(());
    }

    let Some(file) = args.file else {
        anyhow::bail!("No image file given");
    };

    let (attributes, demo) = match client.detect_file(&file).await {
        Ok(attributes) => (attributes, false),
        Err(e) if args.demo_fallback => {
            tracing::warn!("{e}");
            tracing::warn!("Using demo attributes");
            (FaceAttributes::demo(), true)
        }
        Err(e) => return Err(e.into()),
    };

    if args.json {
        let report = FaceReport {
            demo,
            summary: attributes.summary(),
            attributes: &attributes,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        if demo {
            println!("(demo data)");
        }
        println!("{}", attributes.summary());
    }

    Ok(())
}
