//! Depth-first walk that turns one workflow (and every workflow nested in it)
//! into clusters, nodes and buffered edges.

use crate::emit::{
    BOUNDARY_FILL, EXPRESSION_FILL, LITERAL_FILL, VALUE_FROM_FILL, escape_literal, escape_quoted,
};
use crate::endpoint::{resolve_input_endpoint, resolve_output_endpoint};
use crate::session::{EdgeEnd, NodeSpec, RenderSession};
use crate::{
    CwlDotError, Diagnostic, NodeKind, Process, Repetition, Step, StepInput, Workflow,
    after_last_hash_or_slash, display_name, owning_process_id, referenced_input_names, shortname,
};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Port lookups for the steps of one workflow.
#[derive(Debug, Default)]
struct StepIndex<'w> {
    workflow_inputs: HashSet<&'w str>,
    inner_inputs: HashMap<&'w str, &'w str>,
    inner_outputs: HashMap<&'w str, &'w str>,
}

/// How an upstream reference ended up being drawn.
#[derive(Debug, PartialEq, Eq)]
enum SourceResolution {
    ToolStep(String),
    InnerOutput(String),
    WorkflowInput(String),
    Unresolved(String),
}

impl SourceResolution {
    fn arrow_source(&self) -> &str {
        match self {
            Self::ToolStep(id)
            | Self::InnerOutput(id)
            | Self::WorkflowInput(id)
            | Self::Unresolved(id) => id,
        }
    }
}

/// Renders `workflow` as cluster number `cluster`, recursing into nested
/// workflows.
pub(crate) fn render_workflow_cluster(
    session: &mut RenderSession<'_>,
    workflow: &Workflow,
    repetition: Repetition,
    cluster: usize,
) -> Result<(), CwlDotError> {
    session.register_cluster(&workflow.id, cluster);

    let name = escape_quoted(display_name(&workflow.id));
    let uid = session.next_uid();
    session.open_block(&format!("subgraph \"cluster_{name}{uid}\""));
    session.line("color=grey");
    session.line(&format!("label=\"{name}\";"));

    let workflow_inputs = emit_input_boundary(session, workflow, repetition, cluster);
    let mut index = index_steps(session, workflow)?;
    index.workflow_inputs = workflow_inputs;

    for step in &workflow.steps {
        emit_step(session, &index, step, repetition, cluster)?;
    }

    emit_output_boundary(session, &index, workflow, repetition, cluster)?;
    session.close_block();
    Ok(())
}

fn emit_input_boundary<'w>(
    session: &mut RenderSession<'_>,
    workflow: &'w Workflow,
    repetition: Repetition,
    cluster: usize,
) -> HashSet<&'w str> {
    let uid = session.next_uid();
    session.open_block(&format!("subgraph cluster_inputs{uid}"));
    session.line("rank = \"same\";");
    session.line("style = \"dashed\";");
    session.line("label = \"Workflow Inputs\";");

    let mut input_ids = HashSet::new();
    for input in &workflow.inputs {
        input_ids.insert(input.id.as_str());
        session.emit_node(
            cluster,
            NodeSpec {
                key: &input.id,
                label: escape_quoted(display_name(&input.id)),
                kind: NodeKind::WorkflowInput,
                repetition,
                fillcolor: Some(BOUNDARY_FILL),
            },
        );
    }

    session.close_block();
    input_ids
}

fn index_steps<'w>(
    session: &mut RenderSession<'_>,
    workflow: &'w Workflow,
) -> Result<StepIndex<'w>, CwlDotError> {
    let mut index = StepIndex::default();
    for step in &workflow.steps {
        if step.run.as_workflow().is_none() {
            session.mark_tool_step(&step.id);
        }
        for input in &step.inputs {
            let inner = resolve_input_endpoint(&input.id, &step.run)?;
            index.inner_inputs.insert(input.id.as_str(), inner);
        }
        for output in &step.outputs {
            let inner = resolve_output_endpoint(&output.id, &step.run)?;
            index.inner_outputs.insert(output.id.as_str(), inner);
        }
    }
    Ok(index)
}

fn emit_step(
    session: &mut RenderSession<'_>,
    index: &StepIndex<'_>,
    step: &Step,
    repetition: Repetition,
    cluster: usize,
) -> Result<(), CwlDotError> {
    let step_repetition = repetition.for_step(step);

    let target_for = |input: &StepInput| -> Result<EdgeEnd, CwlDotError> {
        if step.run.as_workflow().is_none() {
            return Ok(EdgeEnd::port(&step.id));
        }
        let inner = index.inner_inputs.get(input.id.as_str()).ok_or_else(|| {
            CwlDotError::UnresolvedEndpoint {
                port: input.id.clone(),
                process: step.run.id().to_string(),
            }
        })?;
        Ok(EdgeEnd::via_step(*inner, &step.id))
    };

    match step.run.as_ref() {
        Process::Workflow(inner) => {
            let inner_cluster = session.next_uid();
            session.register_cluster(&step.id, inner_cluster);
            tracing::debug!(step = %step.id, cluster = inner_cluster, "entering nested workflow");
            render_workflow_cluster(session, inner, step_repetition, inner_cluster)?;
        }
        Process::CommandLineTool(_) | Process::ExpressionTool(_) => {
            let (kind, fillcolor) = match step.run.as_ref() {
                Process::ExpressionTool(_) => (NodeKind::ExpressionStep, Some(EXPRESSION_FILL)),
                _ => (NodeKind::CommandStep, None),
            };
            session.emit_node(
                cluster,
                NodeSpec {
                    key: &step.id,
                    label: escape_quoted(display_name(&step.id)),
                    kind,
                    repetition: step_repetition,
                    fillcolor,
                },
            );
        }
    }

    for input in &step.inputs {
        let target = target_for(input)?;
        wire_step_input(session, index, step, input, target, repetition, cluster)?;
    }
    Ok(())
}

fn wire_step_input(
    session: &mut RenderSession<'_>,
    index: &StepIndex<'_>,
    step: &Step,
    input: &StepInput,
    target: EdgeEnd,
    repetition: Repetition,
    cluster: usize,
) -> Result<(), CwlDotError> {
    let port_name = after_last_hash_or_slash(&input.id);

    let sources = match (&input.source, &input.value_from) {
        (Some(sources), _) => Some(sources.iter().map(str::to_string).collect::<Vec<_>>()),
        (None, Some(expression)) => sources_from_expression(session, step, input, expression),
        (None, None) => None,
    };

    let Some(sources) = sources else {
        let value = input
            .default
            .clone()
            .or_else(|| input.value_from.clone().map(Value::String))
            .ok_or_else(|| CwlDotError::MalformedStepInput(input.id.clone()))?;
        let name = format!("literal{}", session.next_uid());
        session.emit_node(
            cluster,
            NodeSpec {
                key: &name,
                label: escape_literal(&value),
                kind: NodeKind::Literal,
                repetition,
                fillcolor: Some(LITERAL_FILL),
            },
        );
        session.emit_edge(EdgeEnd::synthetic(name), target, Some(port_name), false);
        return Ok(());
    };

    let value_from_node = match &input.value_from {
        Some(expression) => {
            let name = format!("value_from{}", session.next_uid());
            session.emit_node(
                cluster,
                NodeSpec {
                    key: &name,
                    label: escape_literal(&Value::String(expression.clone())),
                    kind: NodeKind::ValueFrom,
                    repetition,
                    fillcolor: Some(VALUE_FROM_FILL),
                },
            );
            Some(name)
        }
        None => None,
    };

    let double_arrow = step.scatters(&input.id);
    for source in &sources {
        let resolution = resolve_source(session, index, source);
        if let SourceResolution::Unresolved(raw) = &resolution {
            session.report(
                Diagnostic::warning(
                    "unresolved_step_source",
                    format!("step input '{}' references unknown source '{raw}'", input.id),
                )
                .with_node_id(&input.id),
            );
        }
        let source_end =
            EdgeEnd::via_step(resolution.arrow_source(), owning_process_id(source));
        let source_name = after_last_hash_or_slash(source);

        match &value_from_node {
            Some(node) => {
                session.emit_edge(source_end, EdgeEnd::synthetic(node.as_str()), None, false);
                session.emit_edge(
                    EdgeEnd::synthetic(node.as_str()),
                    target.clone(),
                    Some(source_name),
                    double_arrow,
                );
            }
            None => {
                // Input-boundary edges stay unlabeled; the boundary node already names them.
                let label = match resolution {
                    SourceResolution::WorkflowInput(_) => None,
                    _ => Some(source_name),
                };
                session.emit_edge(source_end, target.clone(), label, double_arrow);
            }
        }
    }
    Ok(())
}

/// Recovers the sources of a computed input from the step inputs its
/// expression mentions. Names without a declared source are dropped with a
/// warning; `None` means nothing usable was found.
fn sources_from_expression(
    session: &mut RenderSession<'_>,
    step: &Step,
    input: &StepInput,
    expression: &str,
) -> Option<Vec<String>> {
    let mut sources = Vec::new();
    for name in referenced_input_names(expression) {
        let declared = step
            .inputs
            .iter()
            .find(|candidate| shortname(&candidate.id) == name)
            .and_then(|candidate| candidate.source.as_ref());
        match declared {
            Some(declared) => sources.extend(declared.iter().map(str::to_string)),
            None => session.report(
                Diagnostic::warning(
                    "expression_reference_unresolved",
                    format!(
                        "valueFrom of '{}' reads inputs.{name}, which has no source",
                        input.id
                    ),
                )
                .with_node_id(&input.id),
            ),
        }
    }
    (!sources.is_empty()).then_some(sources)
}

fn resolve_source(
    session: &RenderSession<'_>,
    index: &StepIndex<'_>,
    source: &str,
) -> SourceResolution {
    let owner = owning_process_id(source);
    if session.is_tool_step(owner) {
        return SourceResolution::ToolStep(owner.to_string());
    }
    if let Some(inner) = index.inner_outputs.get(source) {
        return SourceResolution::InnerOutput((*inner).to_string());
    }
    if index.workflow_inputs.contains(source) {
        return SourceResolution::WorkflowInput(source.to_string());
    }
    SourceResolution::Unresolved(source.to_string())
}

fn emit_output_boundary(
    session: &mut RenderSession<'_>,
    index: &StepIndex<'_>,
    workflow: &Workflow,
    repetition: Repetition,
    cluster: usize,
) -> Result<(), CwlDotError> {
    let uid = session.next_uid();
    session.open_block(&format!("subgraph cluster_outputs{uid}"));
    session.line("rank = \"same\";");
    session.line("style = \"dashed\";");
    session.line("labelloc = \"b\";");
    session.line("label = \"Workflow Outputs\";");

    for output in &workflow.outputs {
        session.emit_node(
            cluster,
            NodeSpec {
                key: &output.id,
                label: escape_quoted(display_name(&output.id)),
                kind: NodeKind::WorkflowOutput,
                repetition,
                fillcolor: Some(BOUNDARY_FILL),
            },
        );

        for source in output.output_source.iter() {
            let resolution = resolve_source(session, index, source);
            if let SourceResolution::Unresolved(raw) = &resolution {
                if session.options().strict_output_sources {
                    return Err(CwlDotError::UnresolvedOutputSource {
                        output: output.id.clone(),
                        reference: raw.clone(),
                    });
                }
                session.report(
                    Diagnostic::warning(
                        "unresolved_output_source",
                        format!(
                            "workflow output '{}' references unknown source '{raw}'; drawing it as-is",
                            output.id
                        ),
                    )
                    .with_node_id(&output.id)
                    .with_fix("point outputSource at a step output or workflow input"),
                );
            }
            session.emit_edge(
                EdgeEnd::via_step(resolution.arrow_source(), owning_process_id(source)),
                EdgeEnd::port(&output.id),
                Some(after_last_hash_or_slash(source)),
                false,
            );
        }
    }

    session.close_block();
    Ok(())
}
