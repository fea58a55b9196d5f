use clap::{Parser, Subcommand};
use rakhi_gal::catalog::{Catalog, now_ms};
use rakhi_gal::config::{self, GalleryConfig};
use rakhi_gal::imaging::{self, RustBackend};
use rakhi_gal::notify::ConsoleNotifier;
use rakhi_gal::playback::{LoopingTrack, PlaybackCoordinator};
use rakhi_gal::render::{self, PageView};
use rakhi_gal::session::{self, Session};
use rakhi_gal::storage::FileStorage;
use rakhi_gal::store::CollectionStore;
use rakhi_gal::types::{Category, CategoryFilter, NewEntry};
use rakhi_gal::{output, seed};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

type FileCatalog = Catalog<FileStorage, Rc<ConsoleNotifier>>;

fn version_string() -> &'static str {
    let hash = env!("GIT_HASH");
    if hash.is_empty() {
        env!("CARGO_PKG_VERSION")
    } else {
        // Leaked once at startup
        Box::leak(format!("{}@{hash}", env!("CARGO_PKG_VERSION")).into_boxed_str())
    }
}

#[derive(Parser)]
#[command(name = "rakhi-gal")]
#[command(about = "Raksha Bandhan tribute gallery")]
#[command(long_about = "\
Raksha Bandhan tribute gallery

Keep a gallery of sisters grouped as real, cousin and chosen sisters, with
optional photos and a looping background song.

Layout:

  .                                # --config-dir
  ├── config.toml                  # Optional, see 'rakhi-gal gen-config'
  └── assets/                      # Copied into the built site
      ├── music/rakhi-song.mp3     # Background track
      └── uploads/                 # Photos of the built-in entries
  .rakhi-gal/                      # --data-dir, the saved collection
  └── rb_sisters.json

Categories: real, cousin, vow (also accepted: primary, secondary, honorary).

Run 'rakhi-gal session' to add, remove, filter and play interactively.")]
#[command(version = version_string())]
struct Cli {
    /// Directory holding the saved collection
    #[arg(long, default_value = ".rakhi-gal", global = true)]
    data_dir: PathBuf,

    /// Directory containing config.toml and assets/
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List saved sisters
    List {
        /// Only show one category (all, real, cousin, vow)
        #[arg(long, default_value = "all")]
        category: CategoryFilter,
    },
    /// Add a sister
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "real")]
        category: Category,
        /// Photo to compress and store with the entry
        #[arg(long)]
        photo: Option<PathBuf>,
    },
    /// Remove a sister by id
    Remove { id: String },
    /// Compress a photo and print it as a JPEG data URL
    Compress { file: PathBuf },
    /// Render the gallery page
    Build {
        #[arg(long, default_value = "dist")]
        output: PathBuf,
    },
    /// Interactive gallery session
    Session,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = config::load_config(&cli.config_dir)?;
    let assets_dir = cli.config_dir.join("assets");
    let notifier = Rc::new(ConsoleNotifier);

    match cli.command {
        Command::List { category } => {
            let catalog = open_catalog(&cli.data_dir, &config, &notifier)?;
            output::print_entries(&catalog.filter(category), category);
        }
        Command::Add {
            name,
            category,
            photo,
        } => {
            let mut catalog = open_catalog(&cli.data_dir, &config, &notifier)?;
            let backend = RustBackend::new();
            let options = config.compress_options();
            let photo = photo.as_deref().and_then(|path| {
                session::compress_photo(&backend, path, &options, notifier.as_ref())
            });
            let mut new = NewEntry::new(name, category);
            if let Some(url) = photo {
                new = new.with_photo(url);
            }
            let entry = catalog.add(new)?;
            output::print_entry(entry);
        }
        Command::Remove { id } => {
            let mut catalog = open_catalog(&cli.data_dir, &config, &notifier)?;
            if catalog.remove(&id) {
                println!("Removed {id}");
            } else {
                println!("No sister with id {id}");
            }
        }
        Command::Compress { file } => {
            let bytes = std::fs::read(&file)?;
            let url = imaging::compress(&RustBackend::new(), &bytes, &config.compress_options())?;
            println!("{url}");
        }
        Command::Build { output: out_dir } => {
            let catalog = open_catalog(&cli.data_dir, &config, &notifier)?;
            let assets = config.asset_resolver();
            let view = PageView {
                config: &config,
                assets: &assets,
                entries: catalog.entries(),
                active: CategoryFilter::All,
                playback: Default::default(),
            };
            for photo in seed::seed_photo_files() {
                let path = assets_dir.join("uploads").join(photo);
                if !path.is_file() {
                    tracing::warn!(path = %path.display(), "built-in photo is missing");
                }
            }
            let summary = render::write_site(&view, Some(&assets_dir), &out_dir)?;
            output::print_build_output(&summary, &out_dir);
        }
        Command::Session => {
            let catalog = open_catalog(&cli.data_dir, &config, &notifier)?;
            let mut track =
                LoopingTrack::new(&assets_dir.join(&config.audio.track), config.audio.autoplay);
            if config.audio.duration_secs > 0 {
                track = track.with_duration(Duration::from_secs(config.audio.duration_secs));
            }
            let playback = PlaybackCoordinator::shared(track, Rc::clone(&notifier));
            let mut session = Session::new(
                &config,
                catalog,
                playback,
                Rc::clone(&notifier),
                Arc::new(RustBackend::new()),
            )
            .with_assets_dir(assets_dir.clone());
            let stdin = std::io::stdin();
            session.run(stdin.lock(), &mut std::io::stdout())?;
        }
        Command::GenConfig => {}
    }

    Ok(())
}

/// Initialize logging to stderr. `RUST_LOG` takes precedence over `level`.
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("rakhi_gal={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Open the file-backed collection and merge the built-in entries.
fn open_catalog(
    data_dir: &Path,
    config: &GalleryConfig,
    notifier: &Rc<ConsoleNotifier>,
) -> Result<FileCatalog, Box<dyn std::error::Error>> {
    let storage = FileStorage::open(data_dir, config.storage.quota_bytes)?;
    let store = CollectionStore::new(storage, Rc::clone(notifier), config.storage.key.as_str());
    let seed = seed::seed_entries(&config.asset_resolver(), now_ms());
    let mut catalog = Catalog::new(store, seed);
    catalog.initialize();
    Ok(catalog)
}
