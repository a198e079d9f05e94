use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use workflow::config::MapConfig;
use workflow::runner::Runner;

mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Project the antenna survey and render the array map")]
struct Args {
    /// Load render settings from YAML instead of the flags below
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value = "antenna_map_final.png")]
    output: PathBuf,
    #[arg(long, default_value_t = 300)]
    dpi: u32,
    /// Print the geodetic position of the origin on the overview panel
    #[arg(long, default_value_t = false)]
    annotate_origin: bool,
    /// Also write a JSON summary of the projected array
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let map_config = if let Some(path) = args.config {
        MapConfig::load(path)?
    } else {
        MapConfig::from_args(args.output, args.dpi, args.annotate_origin, args.report)
    };

    let runner = Runner::new(map_config);
    let result = runner.execute().context("building antenna map")?;

    for antenna in &result.map.antennas {
        log::debug!(
            "antenna {} at ({:.3}, {:.3}) m",
            antenna.label,
            antenna.planar.x,
            antenna.planar.y
        );
    }

    runner.render_figure(&result)?;
    runner.write_report(&result)?;

    println!(
        "Mapped {} antennas around Ant {} -> cluster half-width {:.2} m, figure {}",
        result.map.antennas.len(),
        result.map.origin().label,
        result.map.frame.half_width,
        runner.config().output.display()
    );

    Ok(())
}
