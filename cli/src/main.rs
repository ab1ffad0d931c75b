use anyhow::Context;
use clap::{Parser, Subcommand};
use groute_common::db::parser::ispd;
use groute_common::geom::coord::GridCoord;
use groute_common::util::config::Config;
use groute_common::util::profiler::ScopedTimer;
use groute_common::util::{generator, logger, visualization};
use groute_router::{check, output};
use std::path::{Path, PathBuf};

const HEATMAP_SCALE: u32 = 8;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Route a `.gr` benchmark and write the route file.
    Route {
        /// Overrides `[input] design_file`.
        #[arg(long)]
        input: Option<String>,
        /// Overrides `[output] route_file`.
        #[arg(long)]
        output: Option<String>,
    },
    /// Write a random two-pin benchmark.
    Generate {
        #[arg(long, default_value_t = 64)]
        grid_x: u32,
        #[arg(long, default_value_t = 64)]
        grid_y: u32,
        #[arg(long, default_value_t = 4)]
        capacity: u32,
        #[arg(long, default_value_t = 500)]
        nets: usize,
        #[arg(long, default_value_t = 16)]
        span: u32,
        #[arg(long, default_value = "inputs/random.gr")]
        output: String,
    },
}

fn main() -> anyhow::Result<()> {
    logger::init();
    let args = Args::parse();

    let mut config = if args.config.exists() {
        log::info!("Loading configuration from {:?}", args.config);
        let config_str = std::fs::read_to_string(&args.config)
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;
        toml::from_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?
    } else {
        log::warn!(
            "Configuration file {:?} not found. Using internal defaults.",
            args.config
        );
        Config::default()
    };

    let command = args.command.unwrap_or(Commands::Route {
        input: None,
        output: None,
    });

    match command {
        Commands::Generate {
            grid_x,
            grid_y,
            capacity,
            nets,
            span,
            output,
        } => {
            if capacity == 0 {
                return Err(anyhow::anyhow!("Capacity must be at least 1"));
            }
            prepare_output_dir(&output)?;
            generator::generate_random_design(&output, grid_x, grid_y, capacity, nets, span)
                .with_context(|| format!("Failed to write benchmark '{}'", output))?;
            log::info!("Generated: {}", output);
        }
        Commands::Route { input, output } => {
            if let Some(input) = input {
                config.input.design_file = input;
            }
            if let Some(output) = output {
                config.output.route_file = output;
            }

            if !Path::new(&config.input.design_file).exists() {
                return Err(anyhow::anyhow!(
                    "Input design file missing: {}",
                    config.input.design_file
                ));
            }
            run_routing(&config)?;
        }
    }

    Ok(())
}

fn prepare_output_dir(path_str: &str) -> anyhow::Result<()> {
    if let Some(parent) = Path::new(path_str).parent() {
        if !parent.exists() && !parent.as_os_str().is_empty() {
            log::info!("Creating output directory: {:?}", parent);
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn run_routing(config: &Config) -> anyhow::Result<()> {
    let design = ispd::parse(&config.input.design_file)?;

    let (router, summary) = groute_router::route(&design, &config.global_routing)?;

    check::run(&router).map_err(|e| anyhow::anyhow!("Verification Failed: {}", e))?;

    if !summary.failed.is_empty() {
        let names: Vec<&str> = summary
            .failed
            .iter()
            .map(|&net| design.net(net).name.as_str())
            .collect();
        log::warn!("Unrouted nets: {}", names.join(", "));
    }

    {
        let _timer = ScopedTimer::new("Output write");
        prepare_output_dir(&config.output.route_file)?;
        output::save_routes(&config.output.route_file, &design, router.routes())
            .with_context(|| format!("Failed to write routes '{}'", config.output.route_file))?;
    }

    if let Some(heatmap) = &config.output.heatmap {
        log::info!("Generating congestion heat map...");
        prepare_output_dir(heatmap)?;
        let polylines: Vec<Vec<GridCoord>> = router
            .routes()
            .iter()
            .map(|r| r.waypoints().to_vec())
            .collect();
        visualization::draw_demand_map(
            &router.demand_snapshot(),
            &polylines,
            heatmap,
            HEATMAP_SCALE,
        );
    }

    Ok(())
}
