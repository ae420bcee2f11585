use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use panconf::{Document, Format, RenderOptions, Rendered};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "panconf",
    version,
    about = "Render PAN-OS XML configuration as XML, JSON, flat paths or set commands"
)]
struct Args {
    /// Input file (defaults to stdin)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,
    /// Output format
    #[arg(short, long, value_enum)]
    to: Option<FormatArg>,
    /// Path expression selecting the nodes to render, e.g. "./devices/entry[@name='x']/vsys"
    #[arg(short = 'x', long, value_name = "EXPR")]
    xpath: Option<String>,
    /// Prefix for flat paths and set commands (defaults to "/" and "set ")
    #[arg(short, long)]
    prefix: Option<String>,
    /// Collapse repeated member elements into "[ a b ]" lists in set commands
    #[arg(short, long)]
    mlist: bool,
    /// Print the config version attribute
    #[arg(long)]
    config_version: bool,
    /// Print whether the config is centrally managed
    #[arg(long)]
    centralized: bool,
    /// Print whether the config has more than one vsys
    #[arg(long)]
    multi_tenant: bool,
    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Xml,
    #[value(alias = "structure")]
    Json,
    Flat,
    #[value(alias = "commands")]
    Set,
}

impl FormatArg {
    const fn default_prefix(self) -> &'static str {
        match self {
            Self::Flat => "/",
            Self::Set => "set ",
            Self::Xml | Self::Json => "",
        }
    }
}

impl From<FormatArg> for Format {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Xml => Format::Xml,
            FormatArg::Json => Format::Structure,
            FormatArg::Flat => Format::Flat,
            FormatArg::Set => Format::Commands,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let show_facts = args.config_version || args.centralized || args.multi_tenant;
    if args.to.is_none() && !show_facts {
        bail!("nothing to do; pass --to or one of --config-version, --centralized, --multi-tenant");
    }

    let input = read_input(&args.input)?;
    let doc = Document::parse(&input).context("failed to parse configuration")?;

    let mut output = String::new();
    if args.config_version {
        let version = doc.version();
        output.push_str(&format!(
            "config-version: {}\n",
            version.as_deref().unwrap_or("none")
        ));
    }
    if args.centralized {
        output.push_str(&format!(
            "centralized-management: {}\n",
            fact(doc.is_centralized_management())
        ));
    }
    if args.multi_tenant {
        output.push_str(&format!("multi-tenant: {}\n", fact(doc.is_multi_tenant())));
    }

    if let Some(to) = args.to {
        let options = RenderOptions::default()
            .with_prefix(args.prefix.as_deref().unwrap_or(to.default_prefix()))
            .with_member_list(args.mlist);
        let rendered = doc
            .render(to.into(), args.xpath.as_deref(), &options)
            .context("failed to render configuration")?;
        match rendered {
            Some(rendered) => output.push_str(&format_rendered(&rendered)?),
            None => info!(xpath = args.xpath.as_deref().unwrap_or_default(), "no nodes selected"),
        }
    }

    write_output(&args.output, output.as_bytes())?;
    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .init();
}

fn fact(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "yes",
        Some(false) => "no",
        None => "n/a",
    }
}

fn format_rendered(rendered: &Rendered) -> Result<String> {
    let mut text = match rendered {
        Rendered::Xml(xml) => xml.clone(),
        Rendered::Structure(value) => {
            serde_json::to_string_pretty(value).context("failed to serialize structure")?
        }
        Rendered::Flat(lines) | Rendered::Commands(lines) => lines.join("\n"),
    };
    text.push('\n');
    Ok(text)
}

fn read_input(path: &Option<PathBuf>) -> Result<String> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "reading input file");
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read input file {}", path.display()))
        }
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            if buffer.trim().is_empty() {
                bail!("no input provided on stdin");
            }
            Ok(buffer)
        }
    }
}

fn write_output(path: &Option<PathBuf>, data: &[u8]) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, data)
            .with_context(|| format!("failed to write output file {}", path.display())),
        None => {
            let mut stdout = io::stdout();
            stdout.write_all(data).context("failed to write stdout")?;
            Ok(())
        }
    }
}
