use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use enigma_core::{
    EnigmaSession, GROUP_WIDTH, HISTORICAL, LineOutcome, MachineConfig, SessionSettings,
    group_symbols, historical_config,
};
use env_logger::Env;
use log::{LevelFilter, debug, info};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "enigma",
    author,
    version,
    about = "Configurable rotor cipher machine"
)]
struct Cli {
    #[arg(long, global = true)]
    debug: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DescribeFormat {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a stream of settings lines and messages.
    Run {
        /// Configuration file, or `historical` for the built-in rotor set.
        #[arg(long, value_name = "FILE")]
        config: String,
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Symbols per output group; 0 disables grouping.
        #[arg(long, value_name = "N", default_value_t = GROUP_WIDTH)]
        group: usize,
    },
    /// Convert a single message under one settings line.
    Convert {
        #[arg(long, value_name = "FILE")]
        config: String,
        #[arg(long, value_name = "LINE")]
        settings: String,
        #[arg(long, value_name = "TEXT")]
        message: String,
        #[arg(long, value_name = "N", default_value_t = GROUP_WIDTH)]
        group: usize,
    },
    /// Print the parsed configuration.
    Describe {
        #[arg(long, value_name = "FILE")]
        config: String,
        #[arg(long, value_enum, default_value = "json")]
        format: DescribeFormat,
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);
    match cli.command {
        Commands::Run {
            config,
            input,
            output,
            group,
        } => cmd_run(&config, input, output, group),
        Commands::Convert {
            config,
            settings,
            message,
            group,
        } => cmd_convert(&config, &settings, &message, group),
        Commands::Describe {
            config,
            format,
            out,
        } => cmd_describe(&config, format, out),
    }
}

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or(default));
    builder.format_timestamp(None);
    if debug {
        builder.filter_level(LevelFilter::Debug);
    }
    let _ = builder.try_init();
}

fn cmd_run(
    config: &str,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    group: usize,
) -> Result<()> {
    let machine = load_config(config)?
        .build_machine()
        .with_context(|| format!("building machine from {config}"))?;
    let reader: Box<dyn BufRead> = match &input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening input {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };
    let writer: Box<dyn Write> = match &output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating output {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };
    let summary = EnigmaSession::new(machine)
        .with_group_width(group)
        .process(reader, writer)
        .context("processing messages")?;
    info!(
        "processed {} message lines ({} symbols) under {} settings lines",
        summary.messages, summary.symbols, summary.settings_lines
    );
    Ok(())
}

fn cmd_convert(config: &str, settings: &str, message: &str, group: usize) -> Result<()> {
    let machine = load_config(config)?
        .build_machine()
        .with_context(|| format!("building machine from {config}"))?;
    if !SessionSettings::is_settings_line(settings) {
        bail!("settings must start with '*', got {settings:?}");
    }
    let mut session = EnigmaSession::new(machine);
    session.process_line(settings).context("applying settings")?;
    let converted = match session.process_line(message).context("converting message")? {
        LineOutcome::Message(converted) => converted,
        LineOutcome::Blank => String::new(),
        LineOutcome::Settings => bail!("message must not be a settings line, got {message:?}"),
    };
    debug!(
        "convert cmd symbols={} final_positions={}",
        converted.chars().count(),
        session.machine().settings()
    );
    println!("{}", group_symbols(&converted, group));
    Ok(())
}

fn cmd_describe(config: &str, format: DescribeFormat, out: Option<PathBuf>) -> Result<()> {
    let config = load_config(config)?;
    let rendered = match format {
        DescribeFormat::Json => config.to_json()?,
        DescribeFormat::Text => config.to_text(),
    };
    match out {
        Some(path) => {
            fs::write(&path, rendered)
                .with_context(|| format!("writing configuration to {}", path.display()))?;
            println!("Wrote configuration to {}", path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

/// Resolves `--config`: the built-in set, a `.json` file, or the text format.
fn load_config(source: &str) -> Result<MachineConfig> {
    if source == HISTORICAL {
        return historical_config().context("loading built-in historical configuration");
    }
    let path = Path::new(source);
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading configuration from {}", path.display()))?;
    let config = if path.extension().is_some_and(|ext| ext == "json") {
        let config = MachineConfig::from_json(&text)
            .with_context(|| format!("parsing configuration from {}", path.display()))?;
        config
            .build_machine()
            .with_context(|| format!("validating configuration from {}", path.display()))?;
        config
    } else {
        MachineConfig::parse(&text)
            .with_context(|| format!("parsing configuration from {}", path.display()))?
    };
    debug!(
        "loaded configuration alphabet={} slots={} pawls={} rotors={}",
        config.alphabet,
        config.slots,
        config.pawls,
        config.rotors.len()
    );
    Ok(config)
}
