use crate::infra::{image_source, load_member, parse_format, parse_selection};
use chrono::Local;
use clap::Args;
use member_dossier::config::AppConfig;
use member_dossier::dossier::{FieldCatalog, FieldProjector, OccupationType};
use member_dossier::error::AppError;
use member_dossier::report::{member_name, ReportExporter, ReportOptions};
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct FieldsArgs {
    /// Member record JSON, as returned by GET /api/v1/members/:id
    pub(crate) member: PathBuf,
    /// "all", "filled", "missing", or a group key such as personalDetails
    #[arg(long, default_value = "all")]
    pub(crate) category: String,
    /// all | filled | missing (ignored when --category is "filled" or "missing")
    #[arg(long)]
    pub(crate) view: Option<String>,
    /// Print the projection as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Member record JSON, as returned by GET /api/v1/members/:id
    pub(crate) member: PathBuf,
    /// "all", "filled", "missing", or a group key such as personalDetails
    #[arg(long, default_value = "all")]
    pub(crate) category: String,
    /// all | filled | missing
    #[arg(long)]
    pub(crate) view: Option<String>,
    /// pdf | csv
    #[arg(long, default_value = "pdf")]
    pub(crate) format: String,
    /// Directory for the exported file (defaults to REPORT_OUTPUT_DIR)
    #[arg(long)]
    pub(crate) output_dir: Option<PathBuf>,
    /// Skip photo downloads; photos render as placeholder boxes
    #[arg(long)]
    pub(crate) offline: bool,
}

pub(crate) fn run_fields(args: FieldsArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let (selector, view) = parse_selection(&args.category, args.view.as_deref())?;
    let record = load_member(&args.member)?;

    let catalog = FieldCatalog::standard();
    let fields = FieldProjector::new(&catalog).field_views(
        &record,
        selector,
        view,
        &config.report.placeholder,
    );

    if args.json {
        let rendered = serde_json::to_string_pretty(&fields)
            .map_err(|err| AppError::Request(err.to_string()))?;
        println!("{rendered}");
        return Ok(());
    }

    println!("{}", member_name(&record, "Unknown"));
    println!(
        "{} | {} | occupation: {}",
        selector.label(),
        view.label(),
        OccupationType::detect(&record).label()
    );

    let mut current = None;
    for field in &fields {
        if current != Some(field.category) {
            current = Some(field.category);
            println!("\n{}", field.category.label());
        }
        let marker = if field.is_missing { "!" } else { "-" };
        println!("  {marker} {}: {}", field.label, field.display);
    }

    let missing = fields.iter().filter(|field| field.is_missing).count();
    println!("\n{} fields, {} missing", fields.len(), missing);
    Ok(())
}

/// Runs outside the async runtime: photo downloads use a blocking client.
pub(crate) fn run_report(args: ReportArgs, config: AppConfig) -> Result<(), AppError> {
    let (selector, view) = parse_selection(&args.category, args.view.as_deref())?;
    let format = parse_format(&args.format)?;
    let record = load_member(&args.member)?;

    let catalog = FieldCatalog::standard();
    let images = image_source(&config.report, args.offline);
    let options = ReportOptions {
        placeholder: config.report.placeholder.clone(),
        ..ReportOptions::default()
    };

    let artifact = ReportExporter::new(&catalog, images.as_ref(), options).export(
        &record,
        selector,
        view,
        format,
        Local::now().naive_local(),
    )?;

    let output_dir = args.output_dir.unwrap_or(config.report.output_dir);
    std::fs::create_dir_all(&output_dir)?;
    let destination = output_dir.join(&artifact.filename);
    std::fs::write(&destination, &artifact.bytes)?;

    info!(path = %destination.display(), "report written");
    println!("{}", destination.display());
    Ok(())
}
