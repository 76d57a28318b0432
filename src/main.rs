use anyhow::{Context, Result as AnyhowResult};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use treepick::config::TreeConfig;
use treepick::services::listing::{DirectoryFetcher, HttpFetcher, LocalFetcher};
use treepick::services::tracing_setup;
use treepick::view::file_tree::FileTreeWidget;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Html,
    Text,
}

/// Load a picker tree from a listing endpoint or a local directory and print it
#[derive(Parser, Debug)]
#[command(name = "treepick")]
#[command(about = "Lazily-loaded file/folder picker tree", long_about = None)]
#[command(version)]
struct Args {
    /// Path to configuration file (default: ./treepick.json if present)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Listing endpoint URL (overrides `script` from the config)
    #[arg(long, value_name = "URL", conflicts_with = "local")]
    script: Option<String>,

    /// Serve listings from a local directory instead of an endpoint
    #[arg(long, value_name = "DIR")]
    local: Option<PathBuf>,

    /// Tree root path
    #[arg(long, value_name = "PATH")]
    root: Option<String>,

    /// Folder to open on load
    #[arg(long, value_name = "PATH")]
    folder: Option<String>,

    /// File to reveal and preselect on load
    #[arg(long, value_name = "PATH")]
    file: Option<String>,

    /// Group filter forwarded to the endpoint
    #[arg(long)]
    group: Option<String>,

    /// Allow files to be chosen
    #[arg(long)]
    select_file: bool,

    /// Allow folders to be chosen
    #[arg(long)]
    select_folder: bool,

    /// Set whether several folders may be open at once
    #[arg(long, value_name = "BOOL")]
    multi_folder: Option<bool>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Path to log file (default: system temp dir)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,
}

impl Args {
    /// Layer command-line flags over the loaded configuration
    fn apply_to(&self, config: &mut TreeConfig) {
        if let Some(script) = &self.script {
            config.script = script.clone();
        }
        if let Some(root) = &self.root {
            config.root = root.clone();
        }
        if let Some(folder) = &self.folder {
            config.folder = folder.clone();
        }
        if let Some(file) = &self.file {
            config.file = file.clone();
        }
        if let Some(group) = &self.group {
            config.group = group.clone();
        }
        if let Some(multi_folder) = self.multi_folder {
            config.multi_folder = multi_folder;
        }
        config.select_file |= self.select_file;
        config.select_folder |= self.select_folder;
    }
}

fn build_fetcher(args: &Args, config: &TreeConfig) -> AnyhowResult<Arc<dyn DirectoryFetcher>> {
    if let Some(dir) = &args.local {
        let dir = dir
            .canonicalize()
            .with_context(|| format!("Cannot open local root {}", dir.display()))?;
        tracing::info!("Listing from local directory {:?}", dir);
        return Ok(Arc::new(LocalFetcher::new(dir)));
    }

    let fetcher = HttpFetcher::with_base(&config.script, config.base_url.as_deref())
        .with_context(|| format!("Invalid listing endpoint {:?}", config.script))?
        .with_timeout(config.request_timeout());
    tracing::info!("Listing from {}", fetcher.script());
    Ok(Arc::new(fetcher))
}

fn main() -> AnyhowResult<()> {
    let args = Args::parse();

    let working_dir = std::env::current_dir().context("Cannot read working directory")?;
    let mut config = treepick::config_io::load_config(args.config.as_deref(), &working_dir)
        .context("Failed to load config")?;
    args.apply_to(&mut config);
    config.validate().context("Invalid configuration")?;

    if args.dump_config {
        let json =
            serde_json::to_string_pretty(&config).context("Failed to serialize config")?;
        println!("{}", json);
        return Ok(());
    }

    let log_file = args
        .log_file
        .clone()
        .unwrap_or_else(tracing_setup::default_log_path);
    if !tracing_setup::init_global(&log_file) {
        eprintln!("Warning: could not set up logging to {}", log_file.display());
    }
    tracing::info!("treepick starting");

    let fetcher = build_fetcher(&args, &config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let (rendered, chosen) = runtime.block_on(async {
        let mut widget = FileTreeWidget::new(config, fetcher);
        widget.init();
        widget.settle().await;

        let tree = widget.tree();
        let root_loaded = tree
            .get_node(tree.root_id())
            .is_some_and(|root| root.is_expanded());
        if !root_loaded {
            anyhow::bail!(
                "Failed to list {} (details in {})",
                tree.root_path(),
                log_file.display()
            );
        }

        let rendered = match args.format {
            OutputFormat::Html => widget.render_html(),
            OutputFormat::Text => widget.render_text(),
        };
        Ok((rendered, widget.chosen_all()))
    })?;

    print!("{}", rendered);
    if args.format == OutputFormat::Html {
        println!();
    }
    for entry in chosen {
        println!("chosen: {} ({}) {}", entry.path, entry.kind, entry.name);
    }

    tracing::info!("treepick done");
    Ok(())
}
