use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use ddseq_tagger::{
    CompareReport, DecodeStats, Decoder, DecoderConfig, ParallelTagger, QualityEncoding,
    ReferenceBarcodeSet, RunReport, SamReader, SamStream, SamWriter, Tagger,
};
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "ddseq-tagger")]
#[command(about = "Decode ddSeq cell barcodes and UMIs from read1 and tag them onto read2", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode read1 barcodes and write tagged read2 records
    Decode {
        /// Reference barcode blocks, one per line
        #[arg(short = 'b', long, value_name = "FILE")]
        blocks: PathBuf,

        /// Interleaved read1/read2 SAM (.gz accepted, '-' for stdin)
        #[arg(short = 'i', long, value_name = "FILE")]
        input: PathBuf,

        /// Tagged SAM output (.gz compresses, '-' for stdout)
        #[arg(short = 'o', long, value_name = "FILE")]
        output: PathBuf,

        /// Worker threads; 1 decodes sequentially
        #[arg(short = 't', long, value_name = "INT", default_value = "1")]
        threads: usize,

        /// Read pairs per parallel batch
        #[arg(long, value_name = "INT", default_value = "10000")]
        batch_size: usize,

        /// Maximum edit distance for phase block recovery
        #[arg(long, value_name = "INT", default_value = "2")]
        phase_tolerance: usize,

        /// Maximum substitutions within each linker
        #[arg(long, value_name = "INT", default_value = "1")]
        linker_mismatches: usize,

        /// Low-quality bases allowed across the barcode and UMI windows
        #[arg(long, value_name = "INT", default_value = "0")]
        max_low_quality: usize,

        /// Phred score below which a base counts as low quality
        #[arg(long, value_name = "INT", default_value = "10")]
        min_quality: u8,

        /// Quality strings use the Phred+64 offset
        #[arg(long)]
        phred64: bool,

        /// Write the configuration and counters as JSON
        #[arg(long, value_name = "FILE")]
        stats_json: Option<PathBuf>,
    },

    /// Compare barcode tags against another pipeline's output
    Compare {
        /// SAM tagged by the other pipeline (XB:Z / XU:Z)
        #[arg(short = 'r', long, value_name = "FILE")]
        reference: PathBuf,

        /// SAM tagged by this tool (XC:Z / XM:Z)
        #[arg(short = 'c', long, value_name = "FILE")]
        custom: PathBuf,

        /// Original read1 FASTQ, to show the raw read of each mismatch
        #[arg(long, value_name = "FILE")]
        read1: Option<PathBuf>,

        /// Report destination
        #[arg(short = 'o', long, value_name = "FILE")]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = Cli::parse();
    let start = Instant::now();

    match cli.command {
        Commands::Decode {
            blocks,
            input,
            output,
            threads,
            batch_size,
            phase_tolerance,
            linker_mismatches,
            max_low_quality,
            min_quality,
            phred64,
            stats_json,
        } => {
            if threads == 0 {
                bail!("--threads must be at least 1");
            }
            if batch_size == 0 {
                bail!("--batch-size must be at least 1");
            }

            let reference = ReferenceBarcodeSet::from_path(&blocks)
                .with_context(|| format!("loading reference blocks from {}", blocks.display()))?;
            let config = DecoderConfig::new()
                .phase_tolerance(phase_tolerance)
                .linker_mismatches(linker_mismatches)
                .max_low_quality(max_low_quality)
                .min_quality(min_quality)
                .quality_encoding(if phred64 {
                    QualityEncoding::Phred64
                } else {
                    QualityEncoding::Phred33
                });
            let decoder = Decoder::new(reference, config.clone())?;

            let stream = SamReader::from_path(&input)
                .with_context(|| format!("opening input {}", input.display()))?
                .into_stream()?;

            info!("Decoding {} with {} thread(s)", input.display(), threads);
            let stats = if output.as_os_str() == "-" {
                decode(decoder, stream, SamWriter::to_stdout(), threads, batch_size)?
            } else {
                let writer = SamWriter::to_file(&output)
                    .with_context(|| format!("creating output {}", output.display()))?;
                decode(decoder, stream, writer, threads, batch_size)?
            };

            // Stdout carries the SAM stream, so the tally goes to stderr.
            if output.as_os_str() == "-" {
                stats
                    .write_summary(std::io::stderr().lock())
                    .context("writing run summary")?;
            } else {
                stats.print_summary();
            }
            if let Some(path) = stats_json {
                write_stats_json(&path, &config, &stats)?;
            }
        }

        Commands::Compare {
            reference,
            custom,
            read1,
            output,
        } => {
            let mut report = CompareReport::from_paths(&reference, &custom)?;
            if let Some(read1) = read1 {
                report.attach_read1(&read1)?;
            }
            let file = File::create(&output)
                .with_context(|| format!("creating report {}", output.display()))?;
            report.write_to(BufWriter::new(file))?;
            report.print_summary();
        }
    }

    info!("Finished in {:.3} seconds", start.elapsed().as_secs_f64());
    Ok(())
}

fn decode<W: Write>(
    decoder: Decoder,
    stream: SamStream,
    writer: SamWriter<W>,
    threads: usize,
    batch_size: usize,
) -> anyhow::Result<DecodeStats> {
    let stats = if threads == 1 {
        Tagger::new(decoder).run(stream, writer)?
    } else {
        ParallelTagger::new(decoder)
            .threads(threads)
            .batch_size(batch_size)
            .run(stream, writer)?
    };
    Ok(stats)
}

fn write_stats_json(path: &Path, config: &DecoderConfig, stats: &DecodeStats) -> anyhow::Result<()> {
    let json = RunReport::new(config, stats).to_json()?;
    let mut file = File::create(path)
        .with_context(|| format!("creating stats file {}", path.display()))?;
    file.write_all(json.as_bytes())?;
    file.write_all(b"\n")?;
    Ok(())
}
