// Command line front end for mtgadiff.
//
// Subcommands map one-to-one onto the file helpers in `crate::io`:
// `create` diffs two files into a patch, `apply` (alias `patch`)
// reconstructs the modified file, `info` prints a patch header and
// `config` prints build details.

use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::codec::{FormatConfig, PatchHeader};
use crate::diff::DiffOptions;
use crate::io::{self, IoError};

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Positional binary patch tool for the MTGADIFF format.
#[derive(Parser, Debug)]
#[command(
    name = "mtgadiff",
    version,
    about = "Create and apply MTGADIFF binary patches",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Create a patch from an original and a modified file.
    Create(CreateArgs),
    /// Apply a patch to an original file.
    #[command(alias = "patch")]
    Apply(ApplyArgs),
    /// Print the header (and optionally the items) of a patch file.
    Info(InfoArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Args, Debug)]
struct CreateArgs {
    /// Original file.
    #[arg(long, value_hint = ValueHint::FilePath)]
    original: PathBuf,

    /// New/modified file.
    #[arg(long = "new", value_hint = ValueHint::FilePath)]
    modified: PathBuf,

    /// Path to save the patch file.
    #[arg(long = "out", short = 'o', value_hint = ValueHint::FilePath)]
    output: PathBuf,

    /// Split the diff scan across threads (requires the `parallel` feature).
    #[arg(long)]
    parallel: bool,
}

#[derive(Args, Debug)]
struct ApplyArgs {
    /// Original file.
    #[arg(long, value_hint = ValueHint::FilePath)]
    original: PathBuf,

    /// Patch file.
    #[arg(long, value_hint = ValueHint::FilePath)]
    patch: PathBuf,

    /// Path to save the patched file.
    #[arg(long = "out", short = 'o', value_hint = ValueHint::FilePath, required_unless_present = "check_only")]
    output: Option<PathBuf>,

    /// Verify only (do not write output).
    #[arg(long = "check-only", conflicts_with = "output")]
    check_only: bool,
}

#[derive(Args, Debug)]
struct InfoArgs {
    /// Patch file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Also list every item.
    #[arg(long)]
    items: bool,
}

// ---------------------------------------------------------------------------
// Resolved command + options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Create,
    Apply,
    Info,
    Config,
}

#[derive(Debug)]
struct Options {
    command: Command,
    force: bool,
    quiet: bool,
    verbose: u8,
    json_output: bool,
    parallel: bool,
    check_only: bool,
    list_items: bool,
    original_file: Option<PathBuf>,
    modified_file: Option<PathBuf>,
    patch_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
}

fn resolve_options(cli: Cli) -> Options {
    let base = Options {
        command: Command::Config,
        force: cli.force,
        quiet: cli.quiet,
        verbose: cli.verbose.min(2),
        json_output: cli.json_output,
        parallel: false,
        check_only: false,
        list_items: false,
        original_file: None,
        modified_file: None,
        patch_file: None,
        output_file: None,
    };

    match cli.command {
        Cmd::Create(args) => Options {
            command: Command::Create,
            parallel: args.parallel,
            original_file: Some(args.original),
            modified_file: Some(args.modified),
            output_file: Some(args.output),
            ..base
        },
        Cmd::Apply(args) => Options {
            command: Command::Apply,
            check_only: args.check_only,
            original_file: Some(args.original),
            patch_file: Some(args.patch),
            output_file: args.output,
            ..base
        },
        Cmd::Info(args) => Options {
            command: Command::Info,
            list_items: args.items,
            patch_file: Some(args.input),
            ..base
        },
        Cmd::Config => base,
    }
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("mtgadiff".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let _ = resolve_options(cli);
    }
}

fn log_filter(opts: &Options) -> &'static str {
    match (opts.quiet, opts.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    }
}

/// Refuse to clobber an existing file unless `--force` was given.
fn check_output(path: &Path, opts: &Options) -> bool {
    if path.exists() && !opts.force {
        eprintln!(
            "mtgadiff: output file exists, use -f to overwrite: {}",
            path.display()
        );
        return false;
    }
    true
}

fn report_error(context: &str, err: &IoError) {
    eprintln!("mtgadiff: {context}: {err}");
    if let Some(hint) = failure_hint(err) {
        eprintln!("mtgadiff: {hint}");
    }
}

/// Extra line printed after the length/checksum failures raised by apply.
fn failure_hint(err: &IoError) -> Option<&'static str> {
    match err {
        IoError::Patch(e) if e.is_integrity_failure() => {
            Some("integrity check failed: output was not written")
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    let format = FormatConfig::MTGADIFF;
    eprintln!("mtgadiff version {version} (Rust)");

    let parallel = cfg!(feature = "parallel") as u8;
    let file_io = cfg!(feature = "file-io") as u8;
    let ptr_size = std::mem::size_of::<*const ()>();

    eprintln!("FORMAT_MAGIC={}", format.magic.escape_ascii());
    eprintln!(
        "FORMAT_VERSION={}.{}",
        format.version_major, format.version_minor
    );
    eprintln!("HEADER_LEN={}", PatchHeader::LEN);
    eprintln!("PARALLEL={parallel}");
    eprintln!("FILE_IO={file_io}");
    eprintln!("DEFAULT_CHUNK_SIZE={}", DiffOptions::default().chunk_size);
    eprintln!("sizeof(usize)={ptr_size}");

    0
}

// ---------------------------------------------------------------------------
// Create command
// ---------------------------------------------------------------------------

fn cmd_create(opts: &Options) -> i32 {
    let (Some(original), Some(modified), Some(output)) = (
        opts.original_file.as_deref(),
        opts.modified_file.as_deref(),
        opts.output_file.as_deref(),
    ) else {
        eprintln!("mtgadiff: create requires --original, --new and --out");
        return 1;
    };

    if !check_output(output, opts) {
        return 1;
    }

    let diff_opts = DiffOptions {
        parallel: opts.parallel,
        ..Default::default()
    };

    let stats = match io::create_patch_file(original, modified, output, &diff_opts) {
        Ok(stats) => stats,
        Err(e) => {
            report_error("error creating patch", &e);
            return 1;
        }
    };

    if !opts.quiet {
        eprintln!("mtgadiff: created patch file: {}", output.display());
    }
    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "mtgadiff: original size: {}, new size: {}, patch size: {}, items: {}",
            stats.original_size, stats.modified_size, stats.patch_size, stats.items
        );
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": "create",
            "original_size": stats.original_size,
            "modified_size": stats.modified_size,
            "patch_size": stats.patch_size,
            "items": stats.items,
            "content_bytes": stats.content_bytes,
            "original_sha256": stats.original_sha256.to_string(),
            "modified_sha256": stats.modified_sha256.to_string(),
        });
        eprintln!("{json:#}");
    }

    0
}

// ---------------------------------------------------------------------------
// Apply command
// ---------------------------------------------------------------------------

fn cmd_apply(opts: &Options) -> i32 {
    let (Some(original), Some(patch)) =
        (opts.original_file.as_deref(), opts.patch_file.as_deref())
    else {
        eprintln!("mtgadiff: apply requires --original and --patch");
        return 1;
    };

    let output = if opts.check_only {
        None
    } else {
        match opts.output_file.as_deref() {
            Some(path) => Some(path),
            None => {
                eprintln!("mtgadiff: apply requires --out (or --check-only)");
                return 1;
            }
        }
    };

    if let Some(path) = output
        && !check_output(path, opts)
    {
        return 1;
    }

    let stats = match io::apply_patch_file(original, patch, output) {
        Ok(stats) => stats,
        Err(e) => {
            report_error("error applying patch", &e);
            return 1;
        }
    };

    if !opts.quiet {
        match output {
            Some(path) => eprintln!("mtgadiff: applied patch to: {}", path.display()),
            None => eprintln!("mtgadiff: patch verified"),
        }
    }
    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "mtgadiff: output size: {}, items: {}, sha256: {}",
            stats.output_size, stats.items, stats.output_sha256
        );
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": "apply",
            "original_size": stats.original_size,
            "patch_size": stats.patch_size,
            "output_size": stats.output_size,
            "items": stats.items,
            "output_sha256": stats.output_sha256.to_string(),
            "written": output.is_some(),
        });
        eprintln!("{json:#}");
    }

    0
}

// ---------------------------------------------------------------------------
// Info command
// ---------------------------------------------------------------------------

fn cmd_info(opts: &Options) -> i32 {
    let Some(path) = opts.patch_file.as_deref() else {
        eprintln!("mtgadiff: info requires an input file");
        return 1;
    };

    if opts.list_items {
        let patch = match io::read_patch_file(path) {
            Ok(p) => p,
            Err(e) => {
                report_error(&path.display().to_string(), &e);
                return 1;
            }
        };
        let header = match PatchHeader::for_patch(&patch) {
            Ok(h) => h,
            Err(e) => {
                report_error(&path.display().to_string(), &IoError::Patch(e));
                return 1;
            }
        };
        print_header(&header);
        println!();
        println!("  Offset        Length");
        for item in patch.items() {
            println!("  {:<12}  {}", item.offset(), item.content().len());
        }
        return 0;
    }

    match io::read_patch_info(path) {
        Ok(header) => {
            print_header(&header);
            0
        }
        Err(e) => {
            report_error(&path.display().to_string(), &e);
            1
        }
    }
}

fn print_header(header: &PatchHeader) {
    let format = FormatConfig::MTGADIFF;
    println!(
        "MTGADIFF version:             {}.{}",
        format.version_major, format.version_minor
    );
    println!("Original length:              {}", header.original_len);
    println!("Original SHA-256:             {}", header.original_checksum);
    println!("Patched length:               {}", header.patched_len);
    println!("Patched SHA-256:              {}", header.patched_checksum);
    println!("Item count:                   {}", header.item_count);
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();
    let opts = resolve_options(cli);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter(&opts)))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let exit_code = match opts.command {
        Command::Create => cmd_create(&opts),
        Command::Apply => cmd_apply(&opts),
        Command::Info => cmd_info(&opts),
        Command::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
