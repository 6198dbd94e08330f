#![allow(dead_code)]

use cwl_dot::{Port, Process, Sources, Step, StepInput, Tool, Workflow, WorkflowOutput};

pub const WF: &str = "file:///w/wf.cwl";
pub const TOOL: &str = "file:///w/tool.cwl";
pub const SUB: &str = "file:///w/sub.cwl";

pub fn id(base: &str, name: &str) -> String {
    format!("{base}#{name}")
}

pub fn ports(base: &str, names: &[&str]) -> Vec<Port> {
    names.iter().map(|name| Port::new(id(base, name))).collect()
}

pub fn command_tool(base: &str, inputs: &[&str], outputs: &[&str]) -> Process {
    Process::CommandLineTool(Tool {
        id: base.to_string(),
        inputs: ports(base, inputs),
        outputs: ports(base, outputs),
    })
}

pub fn expression_tool(base: &str, inputs: &[&str], outputs: &[&str]) -> Process {
    Process::ExpressionTool(Tool {
        id: base.to_string(),
        inputs: ports(base, inputs),
        outputs: ports(base, outputs),
    })
}

pub fn step(workflow: &str, name: &str, run: Process, inputs: Vec<StepInput>, outputs: &[&str]) -> Step {
    let step_id = id(workflow, name);
    Step {
        outputs: outputs
            .iter()
            .map(|output| Port::new(format!("{step_id}/{output}")))
            .collect(),
        id: step_id,
        inputs,
        scatter: Vec::new(),
        run: Box::new(run),
    }
}

pub fn step_input(workflow: &str, step: &str, name: &str) -> StepInput {
    StepInput::new(format!("{workflow}#{step}/{name}"))
}

pub fn output(workflow: &str, name: &str, sources: Sources) -> WorkflowOutput {
    WorkflowOutput {
        id: id(workflow, name),
        output_source: sources,
    }
}

pub fn workflow(
    base: &str,
    inputs: &[&str],
    steps: Vec<Step>,
    outputs: Vec<WorkflowOutput>,
) -> Process {
    Process::Workflow(Workflow {
        id: base.to_string(),
        inputs: ports(base, inputs),
        outputs,
        steps,
    })
}

/// One input `i1`, one command step `s1` fed by it, one output `result`
/// taken from `s1/out`.
pub fn single_step_workflow(scatter: bool) -> Process {
    let mut s1 = step(
        WF,
        "s1",
        command_tool(TOOL, &["x"], &["out"]),
        vec![step_input(WF, "s1", "x").with_source(id(WF, "i1").as_str())],
        &["out"],
    );
    if scatter {
        s1.scatter = vec![id(WF, "s1/x")];
    }
    workflow(
        WF,
        &["i1"],
        vec![s1],
        vec![output(WF, "result", Sources::One(id(WF, "s1/out")))],
    )
}
