use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use clap::{ArgAction, Parser, ValueEnum};
use serde::Serialize;

use roomway::{Diagram, Vertex, build_graph, path_length, render_route_svg,
    shortest_path_between_labels};

#[derive(Debug, Parser)]
#[command(
    name = "roomway route",
    about = "Compute the shortest walking route between two labelled room points."
)]
struct RouteArgs {
    /// Path to the diagram snapshot (JSON). Use '-' to read from stdin.
    #[arg(short = 'i', long = "input")]
    input: Option<String>,

    /// Label of the room point the route starts from.
    #[arg(short = 'f', long = "from")]
    from: String,

    /// Label of the room point the route ends at.
    #[arg(short = 't', long = "to")]
    to: String,

    /// Path to the output file. Use '-' to write to stdout.
    #[arg(short = 'o', long = "output")]
    output: Option<String>,

    /// Output format (defaults to the output file extension or json).
    #[arg(short = 'e', long = "output-format")]
    output_format: Option<OutputFormat>,

    /// Pretty-print JSON output.
    #[arg(long = "pretty", action = ArgAction::SetTrue)]
    pretty: bool,

    /// Suppress informational output.
    #[arg(short = 'q', long = "quiet", action = ArgAction::SetTrue)]
    quiet: bool,
}

#[derive(Debug, Parser)]
#[command(
    name = "roomway build",
    about = "Extract the walkable graph from a diagram snapshot."
)]
struct BuildArgs {
    /// Path to the diagram snapshot (JSON). Use '-' to read from stdin.
    #[arg(short = 'i', long = "input")]
    input: Option<String>,

    /// Path to the output graph document. Use '-' to write to stdout.
    #[arg(short = 'o', long = "output")]
    output: Option<String>,

    /// Pretty-print the graph document.
    #[arg(long = "pretty", action = ArgAction::SetTrue)]
    pretty: bool,

    /// Suppress informational output.
    #[arg(short = 'q', long = "quiet", action = ArgAction::SetTrue)]
    quiet: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    fn resolve(raw: Option<&str>) -> Self {
        match raw {
            None | Some("-") => InputSource::Stdin,
            Some(path) => InputSource::File(PathBuf::from(path)),
        }
    }

    fn read(&self) -> Result<String> {
        match self {
            InputSource::Stdin => {
                let mut buffer = String::new();
                io::stdin()
                    .read_to_string(&mut buffer)
                    .context("failed to read diagram snapshot from stdin")?;
                Ok(buffer)
            }
            InputSource::File(path) => fs::read_to_string(path)
                .with_context(|| format!("failed to read '{}'", path.display())),
        }
    }
}

#[derive(Debug, Clone)]
enum OutputDestination {
    Stdout,
    File(PathBuf),
}

impl OutputDestination {
    fn resolve(raw: Option<&str>) -> Self {
        match raw {
            None | Some("-") => OutputDestination::Stdout,
            Some(path) => OutputDestination::File(PathBuf::from(path)),
        }
    }

    fn write(&self, contents: &[u8]) -> Result<()> {
        match self {
            OutputDestination::Stdout => {
                io::stdout()
                    .write_all(contents)
                    .context("failed to write to stdout")?;
                Ok(())
            }
            OutputDestination::File(path) => fs::write(path, contents)
                .with_context(|| format!("failed to write '{}'", path.display())),
        }
    }

    fn describe(&self) -> String {
        match self {
            OutputDestination::Stdout => "stdout".to_string(),
            OutputDestination::File(path) => path.display().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Svg,
}

impl OutputFormat {
    fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
        {
            Some(ext) if ext == "json" => Some(OutputFormat::Json),
            Some(ext) if ext == "svg" => Some(OutputFormat::Svg),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct RouteDocument<'a> {
    from: &'a str,
    to: &'a str,
    length: f64,
    vertices: &'a [Vertex],
}

fn main() {
    if let Err(err) = dispatch() {
        eprintln!("\u{001b}[31merror:\u{001b}[0m {err:?}");
        std::process::exit(1);
    }
}

fn dispatch() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(|s| s.as_str()) {
        Some("build") => {
            let build_args = BuildArgs::parse_from(
                std::iter::once(args[0].clone()).chain(args.iter().skip(2).cloned()),
            );
            run_build(build_args)
        }
        Some("route") => {
            let route_args = RouteArgs::parse_from(
                std::iter::once(args[0].clone()).chain(args.iter().skip(2).cloned()),
            );
            run_route(route_args)
        }
        _ => {
            let route_args = RouteArgs::parse_from(args);
            run_route(route_args)
        }
    }
}

fn run_build(args: BuildArgs) -> Result<()> {
    let source = InputSource::resolve(args.input.as_deref()).read()?;
    let diagram = Diagram::from_json(&source)?;
    let graph = build_graph(&diagram);

    let mut document = if args.pretty {
        graph.to_json_pretty()?
    } else {
        graph.to_json()?
    };
    document.push('\n');

    let destination = OutputDestination::resolve(args.output.as_deref());
    destination.write(document.as_bytes())?;

    if !args.quiet {
        let report = format!(
            "built graph with {} vertices and {} edges ({})",
            graph.vertices.len(),
            graph.edges.len(),
            destination.describe()
        );
        match destination {
            OutputDestination::Stdout => eprintln!("{report}"),
            OutputDestination::File(_) => println!("{report}"),
        }
    }

    Ok(())
}

fn run_route(args: RouteArgs) -> Result<()> {
    let destination = OutputDestination::resolve(args.output.as_deref());
    let format = args
        .output_format
        .or_else(|| match &destination {
            OutputDestination::File(path) => OutputFormat::from_path(path),
            OutputDestination::Stdout => None,
        })
        .unwrap_or(OutputFormat::Json);

    let source = InputSource::resolve(args.input.as_deref()).read()?;
    let diagram = Diagram::from_json(&source)?;
    let graph = build_graph(&diagram);

    let route = shortest_path_between_labels(&graph, &args.from, &args.to)?
        .ok_or_else(|| anyhow!("no route between '{}' and '{}'", args.from, args.to))?;
    let length = path_length(&route);

    let payload = match format {
        OutputFormat::Json => {
            let document = RouteDocument {
                from: &args.from,
                to: &args.to,
                length,
                vertices: &route,
            };
            let mut json = if args.pretty {
                serde_json::to_string_pretty(&document)?
            } else {
                serde_json::to_string(&document)?
            };
            json.push('\n');
            json.into_bytes()
        }
        OutputFormat::Svg => {
            if args.pretty {
                bail!("--pretty only applies to json output");
            }
            render_route_svg(&diagram, &graph, &route)?.into_bytes()
        }
    };

    destination.write(&payload)?;

    if !args.quiet {
        let report = format!(
            "route {} -> {}: {} stops, length {:.1} ({})",
            args.from,
            args.to,
            route.len(),
            length,
            destination.describe()
        );
        match destination {
            OutputDestination::Stdout => eprintln!("{report}"),
            OutputDestination::File(_) => println!("{report}"),
        }
    }

    Ok(())
}
