//! ovp - Overlay Patch CLI tool
//!
//! Computes and applies anchored overlays on YAML/JSON resource files.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use overlay_patch::value::{self, Value};
use overlay_patch::{ConditionMatch, Engine, ListPairing, OverlayOptions, Patch, Path};

#[derive(Parser, Debug)]
#[command(name = "ovp")]
#[command(version, about = "Compile anchored overlays into JSON Patches")]
struct Cli {
    /// Options file (YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Which elements a conditioned list element applies to
    #[arg(long, global = true, value_enum)]
    condition_match: Option<ConditionMatchArg>,

    /// How anchor-free list elements are paired
    #[arg(long, global = true, value_enum)]
    list_pairing: Option<ListPairingArg>,

    /// Output location. Use '-' for stdout
    #[arg(short, long, global = true, default_value = "-")]
    output: String,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the JSON Patch that applies the overlay
    Patch(Inputs),
    /// Print the resource with the overlay applied
    Apply {
        #[command(flatten)]
        inputs: Inputs,

        #[arg(long, value_enum, default_value = "json")]
        format: Format,
    },
}

#[derive(Args, Debug)]
struct Inputs {
    /// Resource file (YAML or JSON)
    #[arg(short, long)]
    resource: PathBuf,

    /// Overlay file (YAML or JSON)
    #[arg(short = 'l', long)]
    overlay: PathBuf,

    /// JSON Pointer inside the resource where the overlay applies.
    /// Both "" and "/" select the whole document, so a top-level member with
    /// the empty key cannot be targeted
    #[arg(short, long, default_value = "")]
    path: String,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ConditionMatchArg {
    First,
    All,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ListPairingArg {
    Structural,
    Append,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Json,
    Yaml,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn init_tracing(verbose: u8) {
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());

    let directive = match verbose {
        0 => None,
        1 => Some("overlay_patch=debug"),
        _ => Some("overlay_patch=trace"),
    };
    if let Some(Ok(parsed)) = directive.map(str::parse::<tracing_subscriber::filter::Directive>) {
        env_filter = env_filter.add_directive(parsed);
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let options = load_options(&cli)?;
    let engine = Engine::new(options);
    tracing::debug!(?options, "engine options");

    let mut output: Box<dyn Write> = if cli.output == "-" {
        Box::new(io::stdout())
    } else {
        Box::new(fs::File::create(&cli.output)
            .map_err(|e| format!("Failed to create output file {:?}: {}", cli.output, e))?)
    };

    match cli.command {
        Command::Patch(inputs) => patch(&engine, &inputs, &mut output)?,
        Command::Apply { inputs, format } => apply(&engine, &inputs, format, &mut output)?,
    }

    Ok(())
}

fn load_options(cli: &Cli) -> Result<OverlayOptions, Box<dyn std::error::Error>> {
    let mut options = match &cli.config {
        Some(path) => OverlayOptions::from_file(path)?,
        None => OverlayOptions::default(),
    };
    if let Some(mode) = cli.condition_match {
        options.condition_match = match mode {
            ConditionMatchArg::First => ConditionMatch::First,
            ConditionMatchArg::All => ConditionMatch::All,
        };
    }
    if let Some(mode) = cli.list_pairing {
        options.list_pairing = match mode {
            ListPairingArg::Structural => ListPairing::Structural,
            ListPairingArg::Append => ListPairing::Append,
        };
    }
    Ok(options)
}

fn read_document(file: &PathBuf) -> Result<Value, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(file)
        .map_err(|e| format!("Failed to read file {:?}: {}", file, e))?;
    // YAML rejects tab-indented JSON, so JSON is tried first.
    match value::from_json(&content) {
        Ok(document) => Ok(document),
        Err(_) => value::from_yaml(&content)
            .map_err(|e| format!("Failed to parse {:?}: {}", file, e).into()),
    }
}

fn compile(engine: &Engine, inputs: &Inputs) -> Result<(Value, Patch), Box<dyn std::error::Error>> {
    let resource = read_document(&inputs.resource)?;
    let overlay = read_document(&inputs.overlay)?;
    let path = Path::parse(&inputs.path)?;

    let ops = engine.patches_at(&resource, &overlay, &path)?;
    Ok((resource, Patch::from(ops)))
}

fn patch(engine: &Engine, inputs: &Inputs, output: &mut dyn Write) -> Result<(), Box<dyn std::error::Error>> {
    let (_, patch) = compile(engine, inputs)?;
    output.write_all(&patch.to_bytes()?)?;
    writeln!(output)?;
    Ok(())
}

fn apply(
    engine: &Engine,
    inputs: &Inputs,
    format: Format,
    output: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let (resource, patch) = compile(engine, inputs)?;
    let patched = overlay_patch::patch::apply_patch_to_value(&resource, patch.as_slice())?;

    match format {
        Format::Json => {
            serde_json::to_writer_pretty(&mut *output, &patched)?;
            writeln!(output)?;
        }
        Format::Yaml => write!(output, "{}", value::to_yaml(&patched)?)?,
    }
    Ok(())
}
