use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use mapview::prelude::*;
use std::path::PathBuf;

/// Drive a headless map view against the Mapbox APIs
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Mapbox access token
    #[arg(short, long, env = "MAPBOX_ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// JSON controller configuration; overrides the defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Map container size in pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,
    #[arg(long, default_value_t = 720)]
    height: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available map styles
    Styles,
    /// Search for a place and print the candidates
    Search { query: String },
    /// Search, fly to a candidate and save a snapshot of the view
    Snapshot {
        query: String,
        /// Index of the candidate to fly to
        #[arg(long, default_value_t = 0)]
        pick: usize,
        /// Style id or label, e.g. `dark-v11` or "Satellite Streets"
        #[arg(long)]
        style: Option<String>,
        #[arg(short, long, default_value = "snapshot.png")]
        output: PathBuf,
    },
}

fn load_config(cli: &Cli) -> Result<ControllerConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            ControllerConfig::from_json_str(&json)?
        }
        None => match &cli.token {
            Some(token) => ControllerConfig::with_access_token(token.clone()),
            None => bail!("no access token: pass --token or set MAPBOX_ACCESS_TOKEN"),
        },
    };
    if let (Some(token), Some(_)) = (&cli.token, &cli.config) {
        config.provider.access_token = token.clone();
    }
    // Nobody is watching the globe spin here.
    config.animation.enabled = false;
    config.validate()?;
    Ok(config)
}

fn print_results(results: &[SearchResult]) {
    for (index, result) in results.iter().enumerate() {
        println!("[{}] {} ({})", index, result.label, result.center);
    }
}

fn list_styles() {
    for style in MapStyleId::ALL {
        println!("{:<22} {}", style.id(), style.label());
    }
}

/// Mount a headless map sized like the requested viewport.
fn mounted_controller(cli: &Cli) -> Result<MapViewController> {
    let config = load_config(cli)?;
    let mut controller = MapViewController::with_mapbox(config, Box::new(HeadlessEngine::new()))?;
    controller.mount(Arc::new(HeadlessContainer::new("map", cli.width, cli.height)))?;
    Ok(controller)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut controller = match &cli.command {
        Commands::Styles => {
            list_styles();
            return Ok(());
        }
        Commands::Search { query } => {
            let controller = mounted_controller(&cli)?;
            if let Err(e) = controller.search(query).await {
                bail!(e.user_message());
            }
            print_results(&controller.search_results());
            controller
        }
        Commands::Snapshot {
            query,
            pick,
            style,
            output,
        } => {
            let mut controller = mounted_controller(&cli)?;
            if let Err(e) = controller.search(query).await {
                bail!(e.user_message());
            }
            let results = controller.search_results();
            print_results(&results);
            let Some(target) = results.get(*pick) else {
                bail!("no candidate #{} for '{}'", pick, query);
            };
            controller.select_result(target)?;

            if let Some(style) = style {
                controller.set_style(style.parse()?)?;
                controller.process_events()?;
            }

            match controller.capture_snapshot().await {
                Ok(CaptureOutcome::Shown) => {}
                Ok(CaptureOutcome::Discarded) => bail!("snapshot was discarded"),
                Err(e) => bail!("{} ({})", e.user_message(), e),
            }
            let Some(image) = controller.preview().image else {
                bail!("snapshot finished without an image");
            };
            image.save(output)?;
            println!(
                "saved {}x{} {} snapshot of {} to {}",
                image.width(),
                image.height(),
                controller.current_style().label(),
                target.label,
                output.display()
            );
            controller.dismiss_preview();
            controller
        }
    };

    controller.unmount();
    Ok(())
}
