use std::fs;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use era5_bbox::{
    monthly_date_sequence, resolve, today_stamp, Backend, CdsClient, MarsClient, Request,
};

/// Variables retrieved by the `era5` subcommand, with their ECMWF parameter
/// codes.
const ERA5_VARIABLES: [(&str, &str); 3] = [
    ("total_precipitation", "228.128"),
    ("2_metre_temperature", "167.128"),
    ("evaporation", "182.128"),
];

const ERA5_DATASET: &str = "reanalysis-era5-complete";

#[derive(Parser)]
#[command(
    name = "era5-bbox",
    version,
    about = "Retrieve ECMWF climate reanalysis data for a geographic bounding box"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct CommonArgs {
    /// Absolute output path (must exist)
    #[arg(long, short = 'P')]
    path: PathBuf,

    /// Output data directory name, created under the output path
    #[arg(long, short = 'D')]
    directory: String,

    /// Domain bounding box as lat_min,lat_max,lon_min,lon_max
    #[arg(long, short = 'B')]
    boundaries: Option<String>,

    /// Geometry file (.shp or .geojson) bounding the region of interest
    #[arg(long, short = 'S')]
    shapefile: Option<PathBuf>,

    /// Request template file (.yaml/.yml or .json)
    #[arg(long, short = 'T')]
    template: PathBuf,
}

#[derive(Args)]
struct YearRange {
    /// First year of the considered period
    #[arg(long, short = 'F', default_value_t = 1979)]
    first_year: i32,

    /// Last year of the considered period
    #[arg(long, short = 'L', default_value_t = 2020)]
    last_year: i32,
}

#[derive(Subcommand)]
enum Command {
    /// ERA5-complete retrieval via CDS: one file per variable per year
    Era5 {
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        years: YearRange,
    },
    /// Single retrieval against a named CDS dataset
    Cds {
        #[command(flatten)]
        common: CommonArgs,
        /// Dataset short name
        #[arg(long, short = 'N')]
        name: String,
    },
    /// Legacy MARS web-API retrieval: one file per year
    Mars {
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        years: YearRange,
    },
}

fn main() {
    env_logger::init();
    if let Err(ref e) = real_main() {
        let red = console::Style::new().red();
        eprintln!("{}: {e:#}", red.apply_to("error"));
        std::process::exit(1);
    }
}

fn real_main() -> anyhow::Result<()> {
    match Cli::parse().command {
        Command::Era5 { common, years } => run_era5(&common, &years),
        Command::Cds { common, name } => run_cds(&common, &name),
        Command::Mars { common, years } => run_mars(&common, &years),
    }
}

/// Resolve the output directory, bounding box, and area-populated template
/// shared by every subcommand.
fn prepare(common: &CommonArgs, backend: Backend) -> anyhow::Result<(PathBuf, Request)> {
    if !common.path.exists() {
        anyhow::bail!("output path not found: {}", common.path.display());
    }
    let data_dir = common.path.join(&common.directory);
    fs::create_dir_all(&data_dir)?;

    let bbox = resolve(common.boundaries.as_deref(), common.shapefile.as_deref())?;
    let template = Request::from_file(&common.template)?.with_area(&bbox, backend);
    Ok((data_dir, template))
}

fn run_era5(common: &CommonArgs, years: &YearRange) -> anyhow::Result<()> {
    let (data_dir, template) = prepare(common, Backend::Era5)?;
    let client = CdsClient::from_home_rc()?;

    for (variable, param) in ERA5_VARIABLES {
        log::info!("downloading data for {variable}");
        for year in years.first_year..=years.last_year {
            let target = data_dir.join(format!("{variable}_{year}.nc"));
            let request = template
                .clone()
                .with("date", monthly_date_sequence(year))
                .with("param", param);
            let result = client.retrieve(ERA5_DATASET, &request, &target)?;
            println!(
                "{}: {} bytes",
                result.target.display(),
                result.size_bytes
            );
        }
    }
    Ok(())
}

fn run_cds(common: &CommonArgs, name: &str) -> anyhow::Result<()> {
    let (data_dir, request) = prepare(common, Backend::Cds)?;
    let client = CdsClient::from_home_rc()?;

    let target = data_dir.join(format!("{name}_{}.nc", today_stamp()));
    let result = client.retrieve(name, &request, &target)?;
    println!("{}: {} bytes", result.target.display(), result.size_bytes);
    Ok(())
}

fn run_mars(common: &CommonArgs, years: &YearRange) -> anyhow::Result<()> {
    let (data_dir, template) = prepare(common, Backend::Mars)?;
    let client = MarsClient::from_home_rc()?;

    let name = template
        .get("name")
        .and_then(|v| v.as_scalar_str())
        .ok_or_else(|| anyhow::anyhow!("mars template carries no name keyword"))?;

    log::info!("downloading selected data");
    for year in years.first_year..=years.last_year {
        let target = data_dir.join(format!("{name}_{year}.nc"));
        let request = template
            .clone()
            .with("date", monthly_date_sequence(year))
            .with("target", target.to_string_lossy().into_owned());
        let result = client.retrieve(&request)?;
        println!("{}: {} bytes", result.target.display(), result.size_bytes);
    }
    Ok(())
}
