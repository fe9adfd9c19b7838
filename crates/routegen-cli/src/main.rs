use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use routegen_cli::output::{render_network, GenerateReport, OutputFormat};
use routegen_cli::terminal::ColorPalette;
use routegen_lib::{
    PolylineRenderer, RouteGenerator, RouteNetwork, RoutingConfig, SearchMode, TerrainMap,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Road, trail and sea route generator")]
struct Cli {
    /// Terrain map in JSON form.
    #[arg(long)]
    map: PathBuf,

    /// Routing configuration in JSON form; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured search mode.
    #[arg(long, value_enum)]
    search_mode: Option<SearchModeArg>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the full network and print its segments.
    Generate {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Generate the network and emit drawable polylines.
    Render {
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        /// Write the render plan here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Generate the network and report the state of one cell.
    Inspect {
        #[arg(long)]
        cell: usize,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SearchModeArg {
    FirstDiscovery,
    Relaxed,
}

impl From<SearchModeArg> for SearchMode {
    fn from(value: SearchModeArg) -> Self {
        match value {
            SearchModeArg::FirstDiscovery => SearchMode::FirstDiscovery,
            SearchModeArg::Relaxed => SearchMode::Relaxed,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let map = TerrainMap::from_path(&cli.map)
        .with_context(|| format!("failed to load map from {}", cli.map.display()))?;
    let config = load_config(cli.config.as_deref(), cli.search_mode)?;

    match cli.command {
        Command::Generate { format } => handle_generate(&map, config, format),
        Command::Render { format, output } => {
            handle_render(&map, config, format, output.as_deref())
        }
        Command::Inspect { cell } => handle_inspect(&map, config, cell),
    }
}

fn load_config(path: Option<&Path>, mode: Option<SearchModeArg>) -> Result<RoutingConfig> {
    let config = match path {
        Some(path) => RoutingConfig::from_path(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => RoutingConfig::default(),
    };
    Ok(match mode {
        Some(mode) => config.with_search_mode(mode.into()),
        None => config,
    })
}

fn build_generator(map: &TerrainMap, config: RoutingConfig) -> Result<RouteGenerator<'_>> {
    RouteGenerator::new(map, config).context("invalid routing configuration")
}

fn handle_generate(map: &TerrainMap, config: RoutingConfig, format: OutputFormat) -> Result<()> {
    let mut generator = build_generator(map, config)?;
    let network = generator.generate();
    let summary = generator.summary(&network);

    match format {
        OutputFormat::Text => {
            print!("{}", render_network(&network, &summary, &ColorPalette::detect()));
        }
        OutputFormat::Json => {
            let report = GenerateReport {
                summary,
                network: &network,
            };
            let json = serde_json::to_string_pretty(&report)
                .context("failed to serialise generated network")?;
            println!("{json}");
        }
    }
    Ok(())
}

fn handle_render(
    map: &TerrainMap,
    config: RoutingConfig,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let mut generator = build_generator(map, config)?;
    let mut renderer = PolylineRenderer::new();
    generator
        .regenerate(&mut renderer)
        .context("failed to render route network")?;
    let plan = renderer
        .into_plan()
        .context("renderer produced no plan")?;

    let rendered = match format {
        OutputFormat::Text => plan.render_text(),
        OutputFormat::Json => {
            serde_json::to_string_pretty(&plan).context("failed to serialise render plan")?
        }
    };

    match output {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("failed to write render plan to {}", path.display()))?;
            tracing::info!(path = %path.display(), paths = plan.path_count(), "render plan written");
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn handle_inspect(map: &TerrainMap, config: RoutingConfig, cell: usize) -> Result<()> {
    let details = map
        .checked_cell(cell)
        .with_context(|| format!("cannot inspect cell {cell}"))?;
    let mut generator = build_generator(map, config)?;
    let network = generator.generate();
    let state = generator.state();

    let medium = if details.is_land(config.water_level) {
        "land"
    } else {
        "water"
    };
    println!(
        "Cell {cell}: {medium}, height {}, feature {}",
        details.height, details.feature
    );
    if let Some(burg) = map.burg(details.burg) {
        println!("Settlement: {} (capital: {}, port: {})", burg.id, burg.capital, burg.is_port());
    }
    println!("Density: {}", state.density(cell));
    println!("Suitability: {:.1}", state.suitability(cell));
    println!("Segments through cell: {}", segments_through(&network, cell));
    Ok(())
}

fn segments_through(network: &RouteNetwork, cell: usize) -> usize {
    network
        .iter()
        .filter(|segment| segment.cells.contains(&cell))
        .count()
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
