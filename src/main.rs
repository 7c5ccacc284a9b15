use anyhow::Result;
use clap::{Parser, Subcommand};

use dataset_caption::api::CaptionApi;
use dataset_caption::config::ClientConfig;
use dataset_caption::session::DatasetSession;
use dataset_caption::ExtendAnchor;

/// Terminal client for the dataset captioning backend:
/// browse datasets, edit captions with vocabulary suggestions,
/// and crop/resize/extend images to their training resolution.
#[derive(Parser, Debug)]
#[command(name = "dcap")]
#[command(about = "Browse and edit image-dataset captions from the terminal")]
struct Args {
    /// Backend base URL
    #[arg(short, long, env = "DCAP_SERVER", default_value = "http://127.0.0.1:8000")]
    server: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the datasets the backend serves
    Datasets,

    /// List the images in a dataset with captions and resolutions
    Images {
        /// Dataset name
        dataset: String,
    },

    /// Print the merged caption vocabulary (global, plus one dataset's words)
    Vocab {
        /// Dataset whose local vocabulary to merge in
        dataset: Option<String>,
    },

    /// Suggest completions for the token at the end of a partial caption
    Suggest {
        /// Dataset whose vocabulary to match against
        dataset: String,
        /// Partial caption, e.g. "cat, dog, bi"
        caption: String,
    },

    /// Save an image's caption
    Caption {
        dataset: String,
        /// Image path within the dataset
        image: String,
        /// New caption (comma-separated tags)
        caption: String,
    },

    /// Crop an image; the rectangle is snapped into image bounds first
    Crop {
        dataset: String,
        image: String,
        #[arg(long)]
        x: f64,
        #[arg(long)]
        y: f64,
        #[arg(long)]
        width: f64,
        #[arg(long)]
        height: f64,
    },

    /// Resize an image so its longest side is at most MAX_SIDE
    Resize {
        dataset: String,
        image: String,
        /// Target max side; malformed values fall back to 1024
        #[arg(long, default_value = "1024")]
        max_side: String,
    },

    /// Extend an image's canvas to the 64px training grid
    Extend {
        dataset: String,
        image: String,
        /// Where the original image sits on the extended canvas
        #[arg(long, value_enum, default_value = "cm")]
        anchor: ExtendAnchor,
    },

    /// Print the dataset's metadata export URL
    Export { dataset: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = ClientConfig::new(args.server, args.timeout, 1024);
    config.validate().map_err(anyhow::Error::msg)?;

    let api = CaptionApi::over_http(&config.server, config.timeout())?;
    let mut session = DatasetSession::new(api);

    match args.command {
        Command::Datasets => {
            let names = session.list_datasets().await?;
            for name in names {
                println!("{name}");
            }
        }
        Command::Images { dataset } => {
            session.load_dataset(&dataset).await?;
            for record in session.images() {
                let mark = if record.annotated { "✔" } else { " " };
                println!(
                    "{mark} {:<40} {}x{} → {}x{}  {}",
                    record.path,
                    record.image_resolution[1],
                    record.image_resolution[0],
                    record.train_resolution[1],
                    record.train_resolution[0],
                    record.caption
                );
            }
            println!("{}", session.status());
        }
        Command::Vocab { dataset } => {
            if let Some(dataset) = dataset {
                session.load_dataset(&dataset).await?;
            } else {
                session.refresh_vocabulary().await;
            }
            for word in session.vocabulary().merged() {
                println!("{word}");
            }
        }
        Command::Suggest { dataset, caption } => {
            session.load_dataset(&dataset).await?;
            let cursor = caption.len();
            for word in session.suggest_at(&caption, cursor) {
                println!("{word}");
            }
        }
        Command::Caption {
            dataset,
            image,
            caption,
        } => {
            session.load_dataset(&dataset).await?;
            session.select_image(&image).await?;
            session.save_caption(&caption).await?;
            println!("{}", session.status());
        }
        Command::Crop {
            dataset,
            image,
            x,
            y,
            width,
            height,
        } => {
            session.load_dataset(&dataset).await?;
            session.select_image(&image).await?;
            if let Some(tool) = session.crop_tool_mut() {
                tool.set_rect(dataset_caption::Rect::new(x, y, width, height));
            }
            session.apply_crop().await?;
            println!("{}", session.status());
        }
        Command::Resize {
            dataset,
            image,
            max_side,
        } => {
            session.load_dataset(&dataset).await?;
            session.select_image(&image).await?;
            session.resize(&max_side).await?;
            println!("{}", session.status());
        }
        Command::Extend {
            dataset,
            image,
            anchor,
        } => {
            session.load_dataset(&dataset).await?;
            session.select_image(&image).await?;
            session.extend(anchor).await?;
            println!("{}", session.status());
        }
        Command::Export { dataset } => {
            session.load_dataset(&dataset).await?;
            println!("{}", session.export_url()?);
        }
    }

    Ok(())
}
