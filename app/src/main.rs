use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Local;
use clap::{Parser, ValueEnum};
use env_logger::Builder;
use log::LevelFilter;
use rayon::iter::{IntoParallelRefIterator as _, ParallelIterator as _};

use velo_core::pointcloud::filtering::ring::{
    distinct_kept_angles, PointCloudFilter as _, RingGapFilter,
};
use velo_exporter::beam::{export_beam_file, WriteMode};
use velo_exporter::pcd::{export_pcd_file, DEFAULT_PRECISION};
use velo_parser::parsers::kitti::KittiParserProvider;
use velo_parser::parsers::ParserProvider as _;

mod error;
mod walker;

use error::ConvertError;
use walker::{channel_predicate, collect_jobs, ConversionJob};

#[derive(Parser, Debug)]
#[command(
    name = "Velo Converter",
    about = "A tool for converting KITTI LiDAR captures into filtered PCD or beam files",
    version = "0.0.1"
)]
struct Cli {
    /// Source directory with KITTI bin files, or a single KITTI bin file
    #[arg(value_name = "SRC")]
    src: PathBuf,

    /// Destination directory, or a single output file
    #[arg(value_name = "DEST")]
    dest: PathBuf,

    /// Floating point precision for PCD output values
    #[arg(short, long, default_value_t = DEFAULT_PRECISION)]
    precision: usize,

    /// Output representation
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pcd)]
    format: OutputFormat,

    /// Sensor channel directory whose files are converted in directory mode
    #[arg(long, default_value = "lidar_roof")]
    channel: String,

    /// Append beam output to an existing destination instead of replacing it
    #[arg(long)]
    append: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    /// ASCII PCD v.7 with header
    Pcd,
    /// Raw little-endian x/y/z/intensity floats
    Beam,
}

impl OutputFormat {
    fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Pcd => "pcd",
            OutputFormat::Beam => "bin",
        }
    }
}

struct FileStats {
    decoded: usize,
    kept: usize,
}

fn convert_file(
    src: &Path,
    dest: &Path,
    format: OutputFormat,
    precision: usize,
    mode: WriteMode,
    filter: &RingGapFilter,
) -> Result<FileStats, ConvertError> {
    let provider = KittiParserProvider {
        filenames: vec![src.to_path_buf()],
    };
    let parser = provider.get_parser();
    let cloud = parser
        .parse()
        .map_err(|e| ConvertError::SourceNotReadable {
            path: src.to_path_buf(),
            reason: e.to_string(),
        })?;

    let kept = filter.filter(&cloud.points);

    if log::log_enabled!(log::Level::Debug) {
        let angles = distinct_kept_angles(&kept);
        log::debug!(
            "{}: {} distinct elevation angles kept: {:?}",
            src.display(),
            angles.len(),
            angles
        );
    }

    let result = match format {
        OutputFormat::Pcd => export_pcd_file(dest, &kept, precision),
        OutputFormat::Beam => export_beam_file(dest, &kept, mode),
    };
    result.map_err(|e| ConvertError::DestinationNotWritable {
        path: dest.to_path_buf(),
        reason: e.to_string(),
    })?;

    Ok(FileStats {
        decoded: cloud.metadata.point_count,
        kept: kept.len(),
    })
}

fn run_single(args: &Cli, mode: WriteMode, filter: &RingGapFilter) -> Result<(), ConvertError> {
    let stats = convert_file(
        &args.src,
        &args.dest,
        args.format,
        args.precision,
        mode,
        filter,
    )?;
    log::info!(
        "{}: {} points decoded, {} kept -> {}",
        args.src.display(),
        stats.decoded,
        stats.kept,
        args.dest.display()
    );
    Ok(())
}

fn run_directory(args: &Cli, mode: WriteMode, filter: &RingGapFilter) -> Result<(), ConvertError> {
    if args.dest.is_file() {
        return Err(ConvertError::DestinationIsWrongType(args.dest.clone()));
    }
    fs::create_dir_all(&args.dest).map_err(|e| ConvertError::DestinationNotWritable {
        path: args.dest.clone(),
        reason: e.to_string(),
    })?;

    log::info!("start walking '{}'...", args.src.display());
    let predicate = channel_predicate(args.channel.clone());
    let jobs = collect_jobs(&args.src, &args.dest, &predicate).map_err(|e| {
        ConvertError::SourceNotReadable {
            path: args.src.clone(),
            reason: e.to_string(),
        }
    })?;
    log::info!("{} files to convert", jobs.len());

    let failed: usize = jobs
        .par_iter()
        .map(|job: &ConversionJob| {
            let dest = job.dest.with_extension(args.format.extension());
            match convert_file(&job.src, &dest, args.format, args.precision, mode, filter) {
                Ok(stats) => {
                    log::info!(
                        "{}: {} points decoded, {} kept",
                        job.src.display(),
                        stats.decoded,
                        stats.kept
                    );
                    0
                }
                Err(e) => {
                    log::error!("{}", e);
                    1
                }
            }
        })
        .sum();

    log::info!("converted {} files, {} failed", jobs.len() - failed, failed);
    Ok(())
}

fn main() -> ExitCode {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Cli::parse();

    log::info!("source: {}", args.src.display());
    log::info!("destination: {}", args.dest.display());
    log::info!("output format: {:?}", args.format);
    if args.format == OutputFormat::Pcd {
        log::info!("output precision: {}", args.precision);
    }

    let start = std::time::Instant::now();

    let mode = if args.append {
        WriteMode::Append
    } else {
        WriteMode::Truncate
    };
    let filter = RingGapFilter::kitti();

    let result = if !args.src.exists() {
        Err(ConvertError::SourceNotFound(args.src.clone()))
    } else if args.src.is_file() {
        run_single(&args, mode, &filter)
    } else {
        run_directory(&args, mode, &filter)
    };

    if let Err(e) = result {
        log::error!("{}", e);
        return ExitCode::FAILURE;
    }

    log::info!("Elapsed: {:?}", start.elapsed());
    ExitCode::SUCCESS
}
