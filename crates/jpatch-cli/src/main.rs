//! Command-line interface for applying RFC 6902 JSON Patch documents.
//!
//! `jpatch PATCH [DOCUMENT]` reads a patch file, applies it to DOCUMENT (or
//! to STDIN when DOCUMENT is omitted) and prints the patched document.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{ArgAction, Parser};
use jpatch_core::{Node, PatchDocument};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");
const VERSION_BANNER: &str = concat!("jpatch version ", env!("CARGO_PKG_VERSION"));
const LOG_ENV: &str = "JPATCH_LOG";

const HELP_TEMPLATE: &str = r#"Usage: jpatch [OPTION]... PATCH [DOCUMENT]
Apply RFC 6902 JSON Patch documents.

Applies PATCH to DOCUMENT and prints the result to STDOUT.
When DOCUMENT is omitted the document is read from STDIN.

Options:
  -o=FILE      Write to FILE instead of STDOUT.
  -yaml        Read and write YAML instead of JSON.
  -pretty      Pretty-print the JSON output.
  -check       Only validate PATCH and print its operation count.
  -v           Increase log verbosity (repeatable). Logs go to STDERR and
               can also be configured with the JPATCH_LOG variable.

Examples:
  jpatch patch.json doc.json
  cat doc.json | jpatch patch.json
  jpatch -o out.json patch.json doc.json
  jpatch -check patch.json

Version: {version}
"#;

#[derive(Debug, Parser)]
#[command(
    name = "jpatch",
    disable_help_flag = true,
    disable_help_subcommand = true,
    disable_version_flag = true,
    override_usage = "jpatch [OPTION]... PATCH [DOCUMENT]"
)]
struct Cli {
    #[arg(long = "help", short = 'h', action = ArgAction::SetTrue, hide = true)]
    help: bool,

    #[arg(long = "version", action = ArgAction::SetTrue, hide = true)]
    version: bool,

    /// Write output to FILE instead of STDOUT.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Read and write YAML instead of JSON.
    #[arg(long = "yaml", action = ArgAction::SetTrue)]
    yaml: bool,

    /// Pretty-print JSON output.
    #[arg(long = "pretty", action = ArgAction::SetTrue)]
    pretty: bool,

    /// Validate the patch without applying it.
    #[arg(long = "check", action = ArgAction::SetTrue)]
    check: bool,

    /// Increase log verbosity.
    #[arg(short = 'v', action = ArgAction::Count)]
    verbose: u8,

    /// Positional inputs (PATCH \[DOCUMENT]).
    #[arg()]
    inputs: Vec<OsString>,
}

fn main() {
    match try_main() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            let _ = writeln!(io::stderr(), "{err:#}");
            std::process::exit(1);
        }
    }
}

fn try_main() -> Result<i32> {
    let args = canonicalize_args(std::env::args_os());
    let cli = Cli::parse_from(args);

    if cli.help {
        print!("{}", help_text());
        return Ok(0);
    }

    if cli.version {
        println!("{VERSION_BANNER}");
        return Ok(0);
    }

    init_logging(cli.verbose);

    if cli.check {
        run_check(&cli)
    } else {
        run_apply(&cli)
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = if verbose == 0 {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level))
    } else {
        EnvFilter::new(default_level)
    };
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).try_init();
}

fn run_check(cli: &Cli) -> Result<i32> {
    let [patch_input] = cli.inputs.as_slice() else {
        return Err(anyhow!("{}", help_text()));
    };
    let patch_source = InputSource::File(path_from(patch_input)?);
    let patch = parse_patch(&read_input(&patch_source)?, cli.yaml)
        .with_context(|| format!("invalid patch {patch_source}"))?;
    write_output(cli, &format!("{} operation(s)\n", patch.len()))?;
    Ok(0)
}

fn run_apply(cli: &Cli) -> Result<i32> {
    let (patch_source, document_source) = match cli.inputs.as_slice() {
        [patch] => (InputSource::File(path_from(patch)?), InputSource::Stdin),
        [patch, document] => {
            (InputSource::File(path_from(patch)?), InputSource::File(path_from(document)?))
        }
        _ => {
            return Err(anyhow!("{}", help_text()));
        }
    };

    let patch_text = read_input(&patch_source)?;
    let document_text = read_input(&document_source)?;
    let patch = parse_patch(&patch_text, cli.yaml)
        .with_context(|| format!("invalid patch {patch_source}"))?;
    let document = parse_node(&document_text, cli.yaml)
        .with_context(|| format!("failed to parse document {document_source}"))?;
    debug!(operations = patch.len(), "patch loaded");

    let patched = document.apply_patch(&patch).context("failed to apply patch")?;
    info!(operations = patch.len(), "patch applied");

    let rendered = render_node(&patched, cli)?;
    write_output(cli, &rendered)?;
    Ok(0)
}

#[derive(Debug)]
enum InputSource {
    File(PathBuf),
    Stdin,
}

impl std::fmt::Display for InputSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Stdin => f.write_str("<stdin>"),
        }
    }
}

fn path_from(input: &OsString) -> Result<PathBuf> {
    let path = PathBuf::from(input);
    if path.as_os_str().is_empty() {
        bail!("expected file path; got empty string");
    }
    Ok(path)
}

fn read_input(source: &InputSource) -> Result<String> {
    match source {
        InputSource::File(path) => {
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
        }
        InputSource::Stdin => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).context("failed to read STDIN")?;
            Ok(buffer)
        }
    }
}

fn parse_patch(input: &str, yaml: bool) -> Result<PatchDocument> {
    let patch =
        if yaml { PatchDocument::from_yaml_str(input) } else { PatchDocument::from_json_str(input) };
    patch.map_err(|err| anyhow!(err))
}

fn parse_node(input: &str, yaml: bool) -> Result<Node> {
    if yaml {
        Node::from_yaml_str(input).map_err(|err| anyhow!(err))
    } else {
        Node::from_json_str(input).map_err(|err| anyhow!(err))
    }
}

fn render_node(node: &Node, cli: &Cli) -> Result<String> {
    let value = node.to_json_value();
    if cli.yaml {
        return serde_yaml::to_string(&value).context("failed to serialize YAML output");
    }
    let mut rendered = if cli.pretty {
        serde_json::to_string_pretty(&value).context("failed to serialize JSON output")?
    } else {
        serde_json::to_string(&value).context("failed to serialize JSON output")?
    };
    rendered.push('\n');
    Ok(rendered)
}

fn write_output(cli: &Cli, rendered: &str) -> Result<()> {
    if let Some(path) = &cli.output {
        fs::write(path, rendered.as_bytes())
            .with_context(|| format!("failed to write output to {}", path.display()))?;
    } else {
        print!("{rendered}");
        io::stdout().flush().ok();
    }
    Ok(())
}

fn canonicalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut canonicalized = Vec::new();
    for (idx, arg) in args.into_iter().enumerate() {
        if idx == 0 {
            canonicalized.push(arg);
            continue;
        }
        match arg.to_str() {
            Some("-help") => canonicalized.push(OsString::from("--help")),
            Some("-h") => canonicalized.push(OsString::from("--help")),
            Some("-version") => canonicalized.push(OsString::from("--version")),
            Some("-yaml") => canonicalized.push(OsString::from("--yaml")),
            Some("-pretty") => canonicalized.push(OsString::from("--pretty")),
            Some("-check") => canonicalized.push(OsString::from("--check")),
            Some(other) if other.starts_with("-o=") => {
                canonicalized.push(OsString::from("-o"));
                canonicalized.push(OsString::from(other.trim_start_matches("-o=")));
            }
            _ => canonicalized.push(arg),
        }
    }
    canonicalized
}

fn help_text() -> String {
    HELP_TEMPLATE.replace("{version}", VERSION_NUMBER)
}
