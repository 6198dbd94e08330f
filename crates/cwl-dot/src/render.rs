use crate::session::RenderSession;
use crate::traverse::render_workflow_cluster;
use crate::{CwlDotError, Process, RenderOptions, Rendering, Repetition};
use std::io::Write;

/// Graph-wide styling written ahead of the first cluster.
pub const PREAMBLE: &str = r##"digraph workflow {
  graph [
    bgcolor = "#eeeeee",
    color = "black",
    fontsize = "10",
    clusterrank = "local",
    newrank = true
  ];

  node [
    fontname = "Helvetica",
    fontsize = "10",
    fontcolor = "black",
    shape = "rect",
    height = "0",
    width = "0",
    color = "black",
    fillcolor = "lightgoldenrodyellow",
    style = "filled"
  ];

  edge [
    fontname = "Helvetica",
    fontsize = "8",
    fontcolor = "black",
    color = "black"
  ];
"##;

/// Renders `root` into DOT text plus the node and edge records behind it.
///
/// Edges are written after every cluster so that references into clusters
/// drawn later still resolve. On error nothing usable is returned.
pub fn render_workflow(root: &Process, options: &RenderOptions) -> Result<Rendering, CwlDotError> {
    let workflow = root
        .as_workflow()
        .ok_or_else(|| CwlDotError::UnsupportedProcess(format!(
            "only Workflow documents can be rendered, got {} '{}'",
            root.class_name(),
            root.id()
        )))?;

    let mut session = RenderSession::new(options);
    session.write_raw(PREAMBLE);
    session.indent();

    let cluster = session.next_uid();
    render_workflow_cluster(&mut session, workflow, Repetition::ROOT, cluster)?;

    session.flush_edges();
    session.dedent();
    session.line("}");

    let rendering = session.into_rendering();
    tracing::debug!(
        nodes = rendering.nodes.len(),
        edges = rendering.edges.len(),
        "rendered workflow"
    );
    Ok(rendering)
}

/// Renders and writes the DOT text to `out`. Nothing is written on failure.
pub fn write_workflow_dot<W: Write>(
    root: &Process,
    options: &RenderOptions,
    out: &mut W,
) -> Result<Rendering, CwlDotError> {
    let rendering = render_workflow(root, options)?;
    out.write_all(rendering.dot.as_bytes())?;
    Ok(rendering)
}
