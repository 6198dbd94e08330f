use clap::{ArgAction, Parser};
use cwl_dot::{
    IdRewrite, RenderOptions, Rendering, inspect_dot, load_document, render_workflow,
    write_workflow_dot,
};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "cwl-dot")]
#[command(about = "Render a workflow document as a Graphviz DOT graph")]
struct Cli {
    /// Workflow document, as a local path or a file: URI.
    document: String,
    /// Write the graph here instead of stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,
    /// Rewrite identifiers before they become node ids, as FROM=TO.
    #[arg(long = "rewrite")]
    rewrites: Vec<IdRewrite>,
    /// Fail when a workflow output source cannot be resolved.
    #[arg(long, action = ArgAction::SetTrue)]
    strict: bool,
    /// Parse the generated graph back and report its shape on stderr.
    #[arg(long, action = ArgAction::SetTrue)]
    check: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), String> {
    tracing::debug!(document = %cli.document, "rendering workflow document");
    let root = load_document(&cli.document).map_err(|error| error.to_string())?;
    let mut options = RenderOptions {
        rewrites: cli.rewrites,
        ..RenderOptions::default()
    };
    if cli.strict {
        options = options.strict();
    }

    let rendering = match cli.output.as_deref() {
        Some(path) => {
            let rendering = render_workflow(&root, &options).map_err(|error| error.to_string())?;
            std::fs::write(path, &rendering.dot)
                .map_err(|error| format!("cannot write '{}': {error}", path.display()))?;
            rendering
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            let rendering =
                write_workflow_dot(&root, &options, &mut out).map_err(|error| error.to_string())?;
            out.flush().map_err(|error| error.to_string())?;
            rendering
        }
    };

    for diagnostic in &rendering.diagnostics {
        eprintln!("{diagnostic}");
    }

    if cli.check {
        check_rendering(&rendering)?;
    }
    Ok(())
}

fn check_rendering(rendering: &Rendering) -> Result<(), String> {
    let summary = inspect_dot(&rendering.dot).map_err(|error| error.to_string())?;
    let dangling: Vec<String> = summary
        .dangling_edges()
        .map(|edge| format!("{} -> {}", edge.from, edge.to))
        .collect();
    if !dangling.is_empty() {
        return Err(format!(
            "graph has edges to undeclared nodes: {}",
            dangling.join(", ")
        ));
    }
    eprintln!(
        "check: {} nodes, {} edges, {} clusters",
        summary.nodes.len(),
        summary.edges.len(),
        summary.clusters.len()
    );
    Ok(())
}
