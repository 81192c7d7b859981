use anyhow::{Context, Result};
use boundpix_cli::{BoundArgs, Cli, Commands, Config, ConfigCommands, OutputFormatter, ProgressReporter};
use boundpix_common::{EdgeConstraint, MediaFormat, PathManager, PixelSize, TotalPixelLimit};
use boundpix_core::{
    bounded_target_size, calculate_pixel_size, BatchJob, BatchProcessor, BatchProgress,
    BoundedDecoder, DownsampleOptions, Downsampler,
};
use boundpix_formats::{resize, ImageCodec};
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        "boundpix=debug"
    } else {
        "boundpix=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(false)
        .without_time()
        .init();

    // Load config
    let mut config = Config::load()?;

    // Override config with CLI flags
    if cli.no_color {
        config.colored_output = false;
    }
    if cli.no_progress {
        config.show_progress = false;
    }
    if cli.jobs > 0 {
        config.parallel_jobs = cli.jobs;
    }

    let formatter = OutputFormatter::new(config.colored_output);
    let progress = ProgressReporter::new(config.show_progress);

    match cli.command {
        Commands::Size {
            width,
            height,
            bounds,
        } => {
            handle_size(width, height, &bounds, &config, &formatter)?;
        }

        Commands::Decode {
            input,
            bounds,
            eager,
            format,
            output,
        } => {
            handle_decode(
                input, &bounds, eager, format, output, &config, &formatter, &progress,
            )?;
        }

        Commands::Info { input } => {
            handle_info(input, &config, &formatter)?;
        }

        Commands::Batch {
            pattern,
            bounds,
            format,
            output,
        } => {
            handle_batch(pattern, &bounds, format, output, &config, &formatter, &progress).await?;
        }

        Commands::Config { action } => {
            handle_config(action, &formatter)?;
        }
    }

    Ok(())
}

/// Edge caps and pixel limit from flags, falling back to config
fn size_policy(bounds: &BoundArgs, config: &Config) -> Result<(EdgeConstraint, TotalPixelLimit)> {
    let constraint = EdgeConstraint::new(
        bounds.short_edge.or(config.short_edge),
        bounds.long_edge.or(config.long_edge),
    );

    let limit = bounds.pixel_limit.unwrap_or(config.pixel_limit);
    let limit = TotalPixelLimit::new(limit)
        .with_context(|| format!("Pixel limit must be positive: {}", limit))?;

    Ok((constraint, limit))
}

fn downsample_options(
    bounds: &BoundArgs,
    eager: bool,
    format: Option<String>,
    config: &Config,
) -> Result<DownsampleOptions> {
    let (constraint, limit) = size_policy(bounds, config)?;

    let output_format = match format.or_else(|| config.output_format.clone()) {
        Some(fmt) => Some(
            MediaFormat::from_extension(&fmt).context(format!("Unsupported format: {}", fmt))?,
        ),
        None => None,
    };

    Ok(DownsampleOptions {
        constraint,
        limit,
        eager: eager || config.eager_decode,
        output_format,
    })
}

fn build_downsampler(config: &Config) -> Result<Downsampler> {
    let filter = resize::parse_filter(&config.resize_filter)
        .context(format!("Unknown resize filter: {}", config.resize_filter))?;
    let codec = ImageCodec::new()
        .with_filter(filter)
        .with_max_decode_alloc(config.max_decode_alloc_bytes());

    Ok(Downsampler::with_parts(
        PathManager::with_output_dir(&config.default_output_dir)?,
        BoundedDecoder::with_codec(codec),
    ))
}

fn handle_size(
    width: u32,
    height: u32,
    bounds: &BoundArgs,
    config: &Config,
    formatter: &OutputFormatter,
) -> Result<()> {
    let (constraint, limit) = size_policy(bounds, config)?;
    let original = PixelSize::from_dimensions(width, height);

    let constrained = calculate_pixel_size(original, constraint);
    let target = bounded_target_size(original, constraint, limit);

    formatter.print_size(original, constrained, target);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn handle_decode(
    input: PathBuf,
    bounds: &BoundArgs,
    eager: bool,
    format: Option<String>,
    output: Option<PathBuf>,
    config: &Config,
    formatter: &OutputFormatter,
    progress: &ProgressReporter,
) -> Result<()> {
    let options = downsample_options(bounds, eager, format, config)?;
    let downsampler = build_downsampler(config)?;

    let spinner = progress.create_spinner("Decoding...");

    match downsampler.downsample_file(&input, &options, output) {
        Ok(outcome) => {
            ProgressReporter::finish_bar(&spinner, "Done");
            formatter.print_decode(
                &input,
                &outcome.output_path,
                outcome.original_size,
                outcome.output_dimensions,
            );
            Ok(())
        }
        Err(e) => {
            ProgressReporter::finish_bar_error(&spinner, "Failed");
            Err(e).context(format!("Failed to decode {}", input.display()))
        }
    }
}

fn handle_info(input: PathBuf, config: &Config, formatter: &OutputFormatter) -> Result<()> {
    let report = build_downsampler(config)?.inspect(&input)?;

    formatter.print_properties(&input, &report.properties);
    formatter.info(&format!(
        "File size: {}",
        formatter.format_size(report.size_in_kb, report.size_in_mb)
    ));

    Ok(())
}

async fn handle_batch(
    pattern: String,
    bounds: &BoundArgs,
    format: Option<String>,
    output: Option<PathBuf>,
    config: &Config,
    formatter: &OutputFormatter,
    progress: &ProgressReporter,
) -> Result<()> {
    let options = downsample_options(bounds, false, format, config)?;
    let downsampler = build_downsampler(config)?;

    let files = downsampler.path_manager().resolve_pattern(&pattern)?;

    if files.is_empty() {
        anyhow::bail!("No files matched pattern: {}", pattern);
    }

    formatter.info(&format!("Found {} files to process", files.len()));

    let jobs: Vec<BatchJob> = files
        .into_iter()
        .map(|input| BatchJob {
            input,
            options,
            output_path: output.clone(),
        })
        .collect();

    let pb = progress.create_bar(jobs.len() as u64, "Processing batch...");
    let processor = BatchProcessor::new(downsampler, config.parallel_jobs);
    let (tx, mut rx) = mpsc::unbounded_channel::<BatchProgress>();

    let track = async {
        while let Some(update) = rx.recv().await {
            if let Some(pb) = &pb {
                pb.set_position(update.completed as u64);
            }
        }
    };
    let (results, ()) = tokio::join!(processor.process_batch(jobs, tx), track);

    let mut success = 0;
    let mut failed = 0;

    for result in results {
        match result {
            Ok(_) => success += 1,
            Err(e) => {
                failed += 1;
                formatter.error(&format!("Failed: {}", e));
            }
        }
    }

    ProgressReporter::finish_bar(&pb, "Batch complete");
    formatter.print_batch_summary(success + failed, success, failed);

    Ok(())
}

fn handle_config(action: ConfigCommands, formatter: &OutputFormatter) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let config = Config::load()?;
            let toml = toml::to_string_pretty(&config)?;
            println!("{}", toml);
        }

        ConfigCommands::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            formatter.success(&format!("Set {} = {}", key, value));
        }

        ConfigCommands::Reset => {
            Config::reset()?;
            formatter.success("Configuration reset to defaults");
        }

        ConfigCommands::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }

    Ok(())
}
