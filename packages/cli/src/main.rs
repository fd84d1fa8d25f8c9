mod config;
mod confirm_delete;
mod output;

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{ArgAction, Args, Parser, Subcommand};
use client::{CabinService, RestBackend};
use common::cabin::{CabinDraft, CabinFields, CabinId, CabinImage, ImageUpload};
use console::Term;
use tracing::{Level, info};

use crate::config::AppConfig;
use crate::confirm_delete::{ConfirmDelete, DialogAction};

#[derive(Parser)]
#[command(name = "cabins", version, about = "Manage the cabins of the booking admin backend")]
struct Cli {
    /// Config file (defaults to config/config.toml when present)
    #[arg(long, short, global = true, env = "CABINS_CONFIG")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(long, short, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every cabin
    List,
    /// Create a cabin with a new image
    Create(CreateArgs),
    /// Replace every field of an existing cabin
    Edit(EditArgs),
    /// Create a copy of a cabin that shares its image
    Duplicate {
        id: CabinId,
    },
    /// Delete a cabin after confirmation
    Delete {
        id: CabinId,
        /// Skip the confirmation dialog
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Args)]
struct FieldArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    max_capacity: u32,
    #[arg(long)]
    regular_price: u32,
    #[arg(long, default_value_t = 0)]
    discount: u32,
    #[arg(long, default_value = "")]
    description: String,
}

impl From<FieldArgs> for CabinFields {
    fn from(args: FieldArgs) -> Self {
        Self {
            name: args.name,
            max_capacity: args.max_capacity,
            regular_price: args.regular_price,
            discount: args.discount,
            description: args.description,
        }
    }
}

#[derive(Args)]
struct CreateArgs {
    #[command(flatten)]
    fields: FieldArgs,
    /// Image file to upload
    #[arg(long)]
    image: PathBuf,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct ImageArgs {
    /// New image file to upload
    #[arg(long)]
    image: Option<PathBuf>,
    /// Keep an image that is already stored, by its public URL
    #[arg(long)]
    image_url: Option<String>,
}

#[derive(Args)]
struct EditArgs {
    id: CabinId,
    #[command(flatten)]
    fields: FieldArgs,
    #[command(flatten)]
    image: ImageArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    let service = RestBackend::connect(&config.backend)
        .context("Failed to set up backend clients")?
        .into_service();
    info!(url = %config.backend.base_url(), table = %config.backend.table, "Backend configured");

    match cli.command {
        Command::List => list(&service).await,
        Command::Create(args) => {
            let image = read_image(&args.image).await?;
            write(&service, args.fields.into(), image, None).await
        }
        Command::Edit(args) => {
            let image = match (args.image.image, args.image.image_url) {
                (Some(path), _) => read_image(&path).await?,
                (None, Some(url)) => CabinImage::Stored(url),
                (None, None) => bail!("Either --image or --image-url is required"),
            };
            write(&service, args.fields.into(), image, Some(args.id)).await
        }
        Command::Duplicate { id } => duplicate(&service, id).await,
        Command::Delete { id, yes } => delete(&service, id, yes).await,
    }
}

async fn list(service: &CabinService) -> anyhow::Result<()> {
    let cabins = service.list_all().await?;
    println!("{}", output::cabin_table(&cabins));
    Ok(())
}

async fn read_image(path: &Path) -> anyhow::Result<CabinImage> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read image {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Image path has no usable file name: {}", path.display()))?;
    Ok(CabinImage::Upload(ImageUpload::new(file_name, bytes)))
}

async fn write(
    service: &CabinService,
    fields: CabinFields,
    image: CabinImage,
    id: Option<CabinId>,
) -> anyhow::Result<()> {
    fields.validate()?;
    let cabin = service.write(CabinDraft { fields, image }, id).await?;
    let verb = if id.is_some() { "Edited" } else { "Created" };
    println!("{verb} {}", output::cabin_summary(&cabin));
    Ok(())
}

async fn duplicate(service: &CabinService, id: CabinId) -> anyhow::Result<()> {
    let cabins = service.list_all().await?;
    let Some(original) = cabins.iter().find(|c| c.id == id) else {
        bail!("No cabin with id {id}");
    };
    let copy = service.duplicate(original).await?;
    println!("Created {}", output::cabin_summary(&copy));
    Ok(())
}

/// Resource type named by the delete dialog.
const RESOURCE_NAME: &str = "cabin";

async fn delete(service: &CabinService, id: CabinId, skip_confirmation: bool) -> anyhow::Result<()> {
    let mut confirmed = false;
    {
        let mut dialog = ConfirmDelete::new(
            RESOURCE_NAME,
            || confirmed = true,
            || info!(cabin_id = id, "Deletion cancelled"),
        );
        if skip_confirmation {
            dialog.click(DialogAction::Confirm);
        } else {
            let term = Term::stderr();
            term.write_line(&format!("Cabin #{id}"))
                .context("Failed to write to terminal")?;
            dialog.prompt(&term).context("Failed to read confirmation")?;
        }
    }

    if !confirmed {
        println!("Nothing deleted.");
        return Ok(());
    }

    let echoed = service.delete_by_id(id).await?;
    match echoed.as_slice() {
        [] => println!("No cabin with id {id}; nothing deleted."),
        rows => {
            for cabin in rows {
                println!("Deleted {}", output::cabin_summary(cabin));
            }
        }
    }
    Ok(())
}
