//! reprcheck CLI.
//!
//! Runs the differential harness against the reference codec.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use rand::Rng;
use tracing_subscriber::EnvFilter;

use reprcheck::codec::{Codec, CodecFactory, ReferenceCodecFactory, Repr, ReprKind};
use reprcheck::conformance::{check_dir, collate_file, validate_strategies, FailurePolicy};
use reprcheck::document::{list_pointers, parse};
use reprcheck::generate::{collate_batch, read_lines, repeat_input, RandomDocuments};
use reprcheck::{
    run_validation, Config, ConfigOverrides, ContainerEncoding, HarnessError, HarnessResult, NumberKind,
    RunOptions, WhitespaceClass,
};

#[derive(Parser)]
#[command(name = "reprcheck")]
#[command(about = "Differential correctness harness for JSON document representations", long_about = None)]
#[command(version)]
struct Cli {
    /// Log in verbose mode
    #[arg(short = 'v', global = true)]
    verbose: bool,

    /// Log in debug mode
    #[arg(short = 'g', global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate documents through every conversion chain and pointer rebuild
    Validate(ValidateArgs),

    /// Check collation byte order against the value comparator
    Collate {
        /// Random seed (0 picks one)
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Batch size
        #[arg(long, default_value_t = 10_000)]
        count: usize,

        /// Number of batches, seeded seed, seed+1, ...
        #[arg(long, default_value_t = 1)]
        repeat: u64,

        /// Sort-order check the lines of this file instead of generated batches
        #[arg(long, conflicts_with = "check_dir")]
        input_file: Option<PathBuf>,

        /// With --input-file, print the lines in collated order instead
        #[arg(long, requires = "input_file")]
        sorted: bool,

        /// Collate every file in this directory and compare it with its .ref file
        #[arg(long)]
        check_dir: Option<PathBuf>,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// List the pointers of a document
    Pointers {
        /// Input document
        input: String,
    },

    /// Convert a document between representations
    Convert {
        /// Source representation (json, value, cbor, collate)
        #[arg(long, value_parser = parse_repr)]
        from: ReprKind,

        /// Target representation (json, value, cbor, collate)
        #[arg(long, value_parser = parse_repr)]
        to: ReprKind,

        #[command(flatten)]
        config: ConfigArgs,

        /// Input; cbor and collate are hex encoded
        input: String,
    },

    /// Print text, binary and collation sizes for a fixed item list
    Overheads {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

#[derive(Args)]
struct ValidateArgs {
    /// Random seed (0 picks one)
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Number of validations [default: 1, or every line of --input-file]
    #[arg(long)]
    count: Option<usize>,

    /// Number of worker threads
    #[arg(long, default_value_t = 1)]
    par: usize,

    /// Queue size between generator and workers
    #[arg(long, default_value_t = 1024)]
    queue: usize,

    /// Stop at the first failure
    #[arg(long)]
    stop: bool,

    /// Validate this document instead of random ones
    #[arg(long, conflicts_with = "input_file")]
    input: Option<String>,

    /// Validate one document per line of this file
    #[arg(long)]
    input_file: Option<PathBuf>,

    /// Store every validated sample in this file
    #[arg(long)]
    genout: Option<PathBuf>,

    /// Run a sort-order batch of this size alongside
    #[arg(long, default_value_t = 0)]
    sort_batch: usize,

    /// Save one report file per failure into this directory
    #[arg(long)]
    report_dir: Option<PathBuf>,

    #[command(flatten)]
    config: ConfigArgs,

    /// Print statistics as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ConfigArgs {
    /// Pin the number kind (smart, float, float32)
    #[arg(long)]
    nk: Option<NumberKind>,

    /// Pin the whitespace class (ansi, unicode)
    #[arg(long)]
    ws: Option<WhitespaceClass>,

    /// Pin the container encoding (lenprefix, stream)
    #[arg(long)]
    ct: Option<ContainerEncoding>,

    /// Pin array-length prefix ordering
    #[arg(long)]
    arrlenprefix: Option<bool>,

    /// Pin property-count prefix ordering
    #[arg(long)]
    proplenprefix: Option<bool>,

    /// Pin missing-value support
    #[arg(long)]
    missing: Option<bool>,
}

impl ConfigArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            number_kind: self.nk,
            whitespace: self.ws,
            container_encoding: self.ct,
            array_length_prefix: self.arrlenprefix,
            property_count_prefix: self.proplenprefix,
            support_missing: self.missing,
        }
    }

    fn config(&self) -> Config {
        self.overrides().apply(Config::default())
    }
}

fn parse_repr(name: &str) -> Result<ReprKind, String> {
    ReprKind::from_name(name).ok_or_else(|| format!("unknown representation {name:?}"))
}

fn pick_seed(seed: u64) -> u64 {
    if seed == 0 {
        rand::thread_rng().gen_range(1..u64::MAX)
    } else {
        seed
    }
}

fn init_tracing(verbose: bool, debug: bool) {
    let level = if debug {
        tracing::Level::TRACE
    } else if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.debug);

    let result = match cli.command {
        Commands::Validate(args) => cmd_validate(args),
        Commands::Collate {
            seed,
            count,
            repeat,
            input_file,
            sorted,
            check_dir,
            config,
        } => match (input_file, check_dir) {
            (_, Some(dir)) => cmd_check_dir(&dir, &config.config()),
            (Some(path), None) if sorted => cmd_collate_sorted(&path, &config.config()),
            (Some(path), None) => cmd_collate_file(seed, &path, &config.overrides()),
            (None, None) => cmd_collate(seed, count, repeat, &config.overrides()),
        },
        Commands::Pointers { input } => cmd_pointers(&input),
        Commands::Convert {
            from,
            to,
            config,
            input,
        } => cmd_convert(from, to, &config.config(), &input),
        Commands::Overheads { config } => cmd_overheads(&config.config()),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn cmd_validate(args: ValidateArgs) -> HarnessResult<bool> {
    let seed = pick_seed(args.seed);
    let options = RunOptions {
        seed,
        workers: args.par,
        queue: args.queue,
        policy: if args.stop {
            FailurePolicy::StopOnFirst
        } else {
            FailurePolicy::Continue
        },
        overrides: args.config.overrides(),
        sort_batch: args.sort_batch,
        genout: args.genout,
    };
    options.validate()?;

    let factory = ReferenceCodecFactory;
    let summary = if let Some(input) = &args.input {
        run_validation(&factory, &options, repeat_input(input, args.count.unwrap_or(1)))?
    } else if let Some(path) = &args.input_file {
        let lines = read_lines(path)?;
        let take = args.count.unwrap_or(lines.len());
        run_validation(&factory, &options, lines.into_iter().take(take))?
    } else {
        run_validation(&factory, &options, RandomDocuments::new(seed, args.count.unwrap_or(1)))?
    };

    for bundle in &summary.failures {
        println!("{}", bundle.to_report());
    }
    if let Some(dir) = &args.report_dir {
        std::fs::create_dir_all(dir)?;
        for (i, bundle) in summary.failures.iter().enumerate() {
            bundle.save(dir.join(format!("failure-{i:04}.txt")))?;
        }
    }
    for report in &summary.sort_reports {
        match report {
            Ok(report) => println!("{}", report.summary_line()),
            Err(e) => println!("sort order: {e}"),
        }
    }

    if args.json {
        let sort_reports: Vec<serde_json::Value> = summary
            .sort_reports
            .iter()
            .map(|r| match r {
                Ok(report) => serde_json::to_value(report),
                Err(e) => Ok(serde_json::json!({ "error": e.to_string() })),
            })
            .collect::<Result<_, _>>()?;
        let out = serde_json::json!({
            "seed": summary.seed,
            "aborted": summary.aborted,
            "statistics": summary.statistics,
            "failures": summary.failures,
            "sort_reports": sort_reports,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for line in summary.statistics.summary_lines(seed) {
            println!("{line}");
        }
    }

    Ok(summary.exit_ok())
}

fn cmd_collate(seed: u64, count: usize, repeat: u64, overrides: &ConfigOverrides) -> HarnessResult<bool> {
    let seed = pick_seed(seed);
    let mut ok = true;
    for round in 0..repeat {
        let round_seed = seed.wrapping_add(round);
        let batch = collate_batch(round_seed, count);
        println!("seed: {round_seed}, items: {}", batch.len());
        ok &= print_strategies(round_seed, overrides, &batch);
    }
    Ok(ok)
}

fn cmd_collate_file(seed: u64, path: &Path, overrides: &ConfigOverrides) -> HarnessResult<bool> {
    let seed = pick_seed(seed);
    let lines = read_lines(path)?;
    println!("seed: {seed}, items: {}", lines.len());
    Ok(print_strategies(seed, overrides, &lines))
}

fn cmd_collate_sorted(path: &Path, config: &Config) -> HarnessResult<bool> {
    let codec = ReferenceCodecFactory.build(config);
    for line in collate_file(&codec, path)? {
        println!("{line}");
    }
    Ok(true)
}

fn cmd_check_dir(dir: &Path, config: &Config) -> HarnessResult<bool> {
    let codec = ReferenceCodecFactory.build(config);
    let mut ok = true;
    for check in check_dir(&codec, dir)? {
        match check.first_difference {
            None => println!("ok {} ({} lines)", check.path.display(), check.lines),
            Some(line) => {
                ok = false;
                println!("sort mismatch in {} at line {}", check.path.display(), line + 1);
            }
        }
    }
    Ok(ok)
}

fn print_strategies<S: AsRef<str> + Sync>(seed: u64, overrides: &ConfigOverrides, batch: &[S]) -> bool {
    let mut ok = true;
    for result in validate_strategies(&ReferenceCodecFactory, seed, overrides, batch) {
        match result {
            Ok(report) => {
                println!("{}", report.summary_line());
                if !report.is_consistent() {
                    ok = false;
                    for m in &report.mismatches {
                        println!("  mismatch at {}: expected {} got {}", m.index, m.expected, m.actual);
                    }
                    if let Some((expected, got)) = report.length_mismatch {
                        println!("  length mismatch: expected {expected} got {got}");
                    }
                }
            }
            Err(e) => {
                ok = false;
                println!("{e}");
            }
        }
    }
    ok
}

fn cmd_pointers(input: &str) -> HarnessResult<bool> {
    let config = Config::default().with_number_kind(NumberKind::IntPreferring);
    let doc = parse(input.as_bytes(), &config).map_err(|e| HarnessError::InvalidParameter(e.to_string()))?;
    for pointer in list_pointers(&doc) {
        println!("{pointer}");
    }
    Ok(true)
}

fn cmd_convert(from: ReprKind, to: ReprKind, config: &Config, input: &str) -> HarnessResult<bool> {
    let codec = ReferenceCodecFactory.build(config);
    let invalid = |e: &dyn std::fmt::Display| HarnessError::InvalidParameter(e.to_string());

    let source = match from {
        ReprKind::Text => Repr::Text(input.as_bytes().to_vec()),
        ReprKind::Value => Repr::Value(codec.text_to_value(input.as_bytes()).map_err(|e| invalid(&e))?),
        ReprKind::Binary => Repr::Binary(hex::decode(input.trim()).map_err(|e| invalid(&e))?),
        ReprKind::Ordered => Repr::Ordered(hex::decode(input.trim()).map_err(|e| invalid(&e))?),
    };
    let target = source.convert(&codec, to).map_err(|e| invalid(&e))?;
    match target {
        Repr::Text(bytes) => println!("{}", String::from_utf8_lossy(&bytes)),
        Repr::Value(doc) => println!("{doc:?}"),
        Repr::Binary(bytes) | Repr::Ordered(bytes) => println!("{}", hex::encode(bytes)),
    }
    Ok(true)
}

const OVERHEAD_ITEMS: [&str; 13] = [
    "10",
    "10000",
    "1000000000",
    "100000000000000000.0",
    "123456789123565670.0",
    "10.2",
    "10.23456789012",
    "null",
    "true",
    "false",
    r#""hello world""#,
    r#"[10,10000,1000000000,10.2,10.23456789012,null,true,false,"hello world"]"#,
    r#"{"a":10000,"b":10.23456789012,"c":null,"d":true,"e":false,"f":"hello world"}"#,
];

fn cmd_overheads(config: &Config) -> HarnessResult<bool> {
    let codec = ReferenceCodecFactory.build(config);
    println!("config: {config}");
    for item in OVERHEAD_ITEMS {
        let binary = codec
            .text_to_binary(item.as_bytes())
            .map_err(|e| HarnessError::InvalidParameter(e.to_string()))?;
        let ordered = codec
            .text_to_ordered(item.as_bytes())
            .map_err(|e| HarnessError::InvalidParameter(e.to_string()))?;
        println!("item: {item}");
        println!(
            "Json: {} bytes, Cbor: {} bytes, Collated: {} bytes",
            item.len(),
            binary.len(),
            ordered.len()
        );
    }
    Ok(true)
}
