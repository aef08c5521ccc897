//! stitch — render a Swift-embedded template.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use stitch::{Binding, Config, Options, Processor};

#[derive(Parser, Debug)]
#[command(name = "stitch", version)]
#[command(about = "Render a template with embedded Swift code")]
struct Args {
    /// Template file, or `-` for stdin
    template: String,

    /// Output file, or `-` for stdout
    #[arg(long, short = 'o', default_value = "-")]
    output: String,

    /// Bind NAME to the string VALUE (can be specified multiple times)
    #[arg(short = 'D', value_name = "NAME=VALUE")]
    define: Vec<Binding>,

    /// Print a marker before each output run; `{file}` and `{line}` are filled in
    #[arg(long, value_name = "FORMAT")]
    line_directive: Option<String>,

    /// Print the parsed template as JSON and stop
    #[arg(long)]
    dump: bool,

    /// Print the generated Swift program and stop
    #[arg(long, conflicts_with = "dump")]
    dump_code: bool,

    /// Compile with swiftc instead of using the interpreter
    #[arg(long)]
    compile: bool,

    /// File name used in #sourceLocation directives (default: the template path)
    #[arg(long)]
    template_name: Option<String>,

    /// Config file (default: ~/.stitch/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// More logging on stderr (repeat for more)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_template(path: &str) -> Result<String> {
    if path == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read template from stdin")?;
        return Ok(text);
    }
    fs::read_to_string(path).with_context(|| format!("failed to read template {path}"))
}

fn write_output(path: &str, text: &str) -> Result<()> {
    if path == "-" {
        let mut stdout = io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        stdout.flush()?;
        return Ok(());
    }
    fs::write(path, text).with_context(|| format!("failed to write {path}"))
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let template = read_template(&args.template)?;
    let file = args.template_name.clone().unwrap_or_else(|| {
        if args.template == "-" {
            "stdin".to_string()
        } else {
            args.template.clone()
        }
    });

    if args.dump {
        let nodes = Processor::parse(&template);
        let json = serde_json::to_string_pretty(&nodes)?;
        return write_output(&args.output, &(json + "\n"));
    }

    let options = Options {
        file,
        bindings: args.define,
        line_directive: args.line_directive.or(config.line_directive.clone()),
    };

    if args.dump_code {
        return write_output(&args.output, &Processor::generate(&template, &options));
    }

    let mut toolchain = config.toolchain();
    toolchain.force_compile |= args.compile;
    let rendered = Processor::render(&template, &options, &toolchain)?;
    write_output(&args.output, &rendered)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<stitch::RunError>() {
                Some(run_error) => eprintln!("{}: {run_error}", run_error.kind()),
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}
