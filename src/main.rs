//! Layout Synth CLI
//!
//! Usage:
//!   layout-synth [OPTIONS] <COMMAND>
//!
//! Commands:
//!   check       Type-check a layout program against a model
//!   compile     Compile a layout program against an instance
//!   infer       Infer layout rules from a drawn instance
//!   arrange     Compile, stage and solve a program into positions
//!   synthesize  Infer rules from one instance and arrange another with them
//!
//! Options:
//!   -c, --config <FILE>    Pipeline configuration (TOML format)
//!   -f, --format <FORMAT>  Output format: json or pretty
//!   -h, --help             Print help

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use layout_synth::load::{json_from_str, program_from_str, read_source};
use layout_synth::{
    arrange, check_abstract_layout, compile, infer, synthesize, AbstractDiagram, AbstractLayout,
    Instance, LoadError, Model, SynthConfig,
};

#[derive(Parser)]
#[command(name = "layout-synth")]
#[command(about = "Compile, infer and arrange layouts of relational instances")]
struct Cli {
    /// Pipeline configuration file (TOML format)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Json, global = true)]
    format: Format,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Pretty,
}

#[derive(Subcommand)]
enum Command {
    /// Type-check a layout program against a model
    Check {
        #[arg(long)]
        model: PathBuf,
        /// Program file (JSON array or text syntax)
        #[arg(long)]
        program: PathBuf,
    },

    /// Compile a layout program against an instance
    Compile {
        #[arg(long)]
        model: PathBuf,
        #[arg(long)]
        instance: PathBuf,
        #[arg(long)]
        program: PathBuf,
    },

    /// Infer layout rules from a drawn instance
    Infer {
        #[arg(long)]
        model: PathBuf,
        #[arg(long)]
        instance: PathBuf,
        /// Observed positions: JSON object of atom -> {x, y}
        #[arg(long)]
        diagram: PathBuf,
        /// Override the configured chain bound
        #[arg(long)]
        bound: Option<usize>,
    },

    /// Compile, stage and solve a program into positions
    Arrange {
        #[arg(long)]
        model: PathBuf,
        #[arg(long)]
        instance: PathBuf,
        #[arg(long)]
        program: PathBuf,
    },

    /// Infer rules from one instance and arrange another with them
    Synthesize {
        #[arg(long)]
        model: PathBuf,
        #[arg(long)]
        example: PathBuf,
        #[arg(long)]
        diagram: PathBuf,
        #[arg(long)]
        target: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mut config = match &cli.config {
        Some(path) => match SynthConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => fail(format!("loading config '{}': {}", path.display(), e)),
        },
        None => SynthConfig::default(),
    };

    match cli.command {
        Command::Check { model, program } => {
            let model: Model = read_json(&model);
            let program = read_program(&program);
            let mut ok = true;
            for (i, layout) in program.iter().enumerate() {
                match check_abstract_layout(layout, &model) {
                    Ok(env) => {
                        let vars: Vec<String> =
                            env.iter().map(|(v, sig)| format!("{} : {}", v, sig)).collect();
                        println!("rule {}: ok ({})", i, vars.join(", "));
                    }
                    Err(e) => {
                        println!("rule {}: {}", i, e);
                        ok = false;
                    }
                }
            }
            if !ok {
                process::exit(1);
            }
        }

        Command::Compile {
            model,
            instance,
            program,
        } => {
            let model: Model = read_json(&model);
            let instance: Instance = read_json(&instance);
            let program = read_program(&program);
            let layouts = compile(&program, &model, &instance).unwrap_or_else(|e| fail(e));
            emit(cli.format, &layouts, || {
                layouts.iter().map(|l| l.to_string()).collect()
            });
        }

        Command::Infer {
            model,
            instance,
            diagram,
            bound,
        } => {
            if let Some(bound) = bound {
                config.inference.bound = bound;
            }
            let model: Model = read_json(&model);
            let instance: Instance = read_json(&instance);
            let diagram: AbstractDiagram = read_json(&diagram);
            let inferred =
                infer(&model, &instance, &diagram, &config.inference).unwrap_or_else(|e| fail(e));
            emit(cli.format, &inferred, || {
                inferred.iter().map(|i| i.to_string()).collect()
            });
        }

        Command::Arrange {
            model,
            instance,
            program,
        } => {
            let model: Model = read_json(&model);
            let instance: Instance = read_json(&instance);
            let program = read_program(&program);
            let diagram = arrange(&program, &model, &instance, &config.staging)
                .unwrap_or_else(|e| fail(e));
            emit(cli.format, &diagram, || diagram_lines(&diagram));
        }

        Command::Synthesize {
            model,
            example,
            diagram,
            target,
        } => {
            let model: Model = read_json(&model);
            let example: Instance = read_json(&example);
            let drawn: AbstractDiagram = read_json(&diagram);
            let target: Instance = read_json(&target);
            let result =
                synthesize(&model, &example, &drawn, &target, &config).unwrap_or_else(|e| fail(e));
            emit(cli.format, &result, || {
                let mut lines: Vec<String> = result.inferred.iter().map(|i| i.to_string()).collect();
                lines.push(String::new());
                lines.extend(diagram_lines(&result.diagram));
                lines
            });
        }
    }
}

fn fail(message: impl Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Print a load error with source context and exit
fn fail_load(err: LoadError, source: &str, path: &Path) -> ! {
    eprintln!("{}", err.format(source, &path.display().to_string()));
    process::exit(1);
}

fn read_json<T: DeserializeOwned>(path: &Path) -> T {
    let source = read_source(path).unwrap_or_else(|e| fail(e));
    json_from_str(&source, path).unwrap_or_else(|e| fail_load(e, &source, path))
}

fn read_program(path: &Path) -> Vec<AbstractLayout> {
    let source = read_source(path).unwrap_or_else(|e| fail(e));
    program_from_str(&source, path).unwrap_or_else(|e| fail_load(e, &source, path))
}

fn diagram_lines(diagram: &AbstractDiagram) -> Vec<String> {
    diagram
        .iter()
        .map(|(atom, p)| format!("{}: ({:.1}, {:.1})", atom, p.x, p.y))
        .collect()
}

fn emit<T: Serialize>(format: Format, value: &T, pretty: impl FnOnce() -> Vec<String>) {
    match format {
        Format::Json => match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{}", json),
            Err(e) => fail(e),
        },
        Format::Pretty => {
            for line in pretty() {
                println!("{}", line);
            }
        }
    }
}
