mod support;

use cwl_dot::{NodeKind, Process, RenderOptions, Sources, inspect_dot, render_workflow};
use std::collections::HashSet;
use support::*;

/// `sub.cwl`: input `x`, scattered command step `t` over `x`, output `y`
/// from `t/out`.
fn sub_workflow() -> Process {
    let mut t = step(
        SUB,
        "t",
        command_tool(TOOL, &["a"], &["out"]),
        vec![step_input(SUB, "t", "a").with_source(id(SUB, "x").as_str())],
        &["out"],
    );
    t.scatter = vec![id(SUB, "t/a")];
    workflow(
        SUB,
        &["x"],
        vec![t],
        vec![output(SUB, "y", Sources::One(id(SUB, "t/out")))],
    )
}

fn outer_step(name: &str, scatter: bool) -> cwl_dot::Step {
    let mut nested = step(
        WF,
        name,
        sub_workflow(),
        vec![step_input(WF, name, "x").with_source(id(WF, "i").as_str())],
        &["y"],
    );
    if scatter {
        nested.scatter = vec![format!("{WF}#{name}/x")];
    }
    nested
}

#[test]
fn scattered_nested_workflow_expected_repetition_propagated() {
    let process = workflow(
        WF,
        &["i"],
        vec![outer_step("sub", true)],
        vec![output(WF, "result", Sources::One(id(WF, "sub/y")))],
    );
    let rendering = render_workflow(&process, &RenderOptions::default()).expect("render");

    assert_eq!(rendering.node(&id(WF, "i")).map(|n| n.peripheries), Some(1));
    assert_eq!(rendering.node(&id(WF, "result")).map(|n| n.peripheries), Some(1));

    let inner_x = rendering.node(&id(SUB, "x")).expect("nested input");
    let inner_t = rendering.node(&id(SUB, "t")).expect("nested step");
    let inner_y = rendering.node(&id(SUB, "y")).expect("nested output");
    assert_eq!(inner_x.peripheries, 2);
    assert_eq!(inner_t.peripheries, 3);
    assert_eq!(inner_y.peripheries, 2);

    assert_eq!(inner_x.cluster, 4);
    assert_eq!(inner_x.dot_id, "file:///w/sub.cwl#x#4");
    assert_eq!(inner_t.dot_id, "file:///w/sub.cwl#t#4");

    let edges: Vec<(&str, &str, Option<&str>, bool)> = rendering
        .edges
        .iter()
        .map(|e| (e.source.as_str(), e.target.as_str(), e.label.as_deref(), e.double_arrow))
        .collect();
    assert_eq!(
        edges,
        vec![
            ("file:///w/sub.cwl#x#4", "file:///w/sub.cwl#t#4", None, true),
            ("file:///w/sub.cwl#t#4", "file:///w/sub.cwl#y#4", Some("out"), false),
            ("file:///w/wf.cwl#i#1", "file:///w/sub.cwl#x#4", None, true),
            ("file:///w/sub.cwl#y#4", "file:///w/wf.cwl#result#1", Some("y"), false),
        ]
    );
}

#[test]
fn unscattered_nested_workflow_expected_root_repetition() {
    let process = workflow(WF, &["i"], vec![outer_step("sub", false)], Vec::new());
    let rendering = render_workflow(&process, &RenderOptions::default()).expect("render");

    assert_eq!(rendering.node(&id(SUB, "x")).map(|n| n.peripheries), Some(1));
    assert_eq!(rendering.node(&id(SUB, "t")).map(|n| n.peripheries), Some(2));
}

#[test]
fn same_sub_workflow_twice_expected_edges_bound_to_each_cluster() {
    let process = workflow(
        WF,
        &["i"],
        vec![outer_step("a", false), outer_step("b", false)],
        vec![output(
            WF,
            "both",
            Sources::Many(vec![id(WF, "a/y"), id(WF, "b/y")]),
        )],
    );
    let rendering = render_workflow(&process, &RenderOptions::default()).expect("render");

    let inner_inputs: Vec<_> = rendering
        .nodes
        .iter()
        .filter(|node| node.key == id(SUB, "x"))
        .map(|node| node.dot_id.as_str())
        .collect();
    assert_eq!(inner_inputs, vec!["file:///w/sub.cwl#x#4", "file:///w/sub.cwl#x#8"]);

    let from_outer_input: Vec<_> = rendering
        .outgoing_edges("file:///w/wf.cwl#i#1")
        .map(|edge| edge.target.as_str())
        .collect();
    assert_eq!(from_outer_input, vec!["file:///w/sub.cwl#x#4", "file:///w/sub.cwl#x#8"]);

    let into_both: Vec<_> = rendering
        .incoming_edges("file:///w/wf.cwl#both#1")
        .map(|edge| edge.source.as_str())
        .collect();
    assert_eq!(into_both, vec!["file:///w/sub.cwl#y#4", "file:///w/sub.cwl#y#8"]);

    let declared: HashSet<&str> = rendering.nodes.iter().map(|n| n.dot_id.as_str()).collect();
    assert!(
        rendering
            .edges
            .iter()
            .all(|edge| declared.contains(edge.source.as_str()) && declared.contains(edge.target.as_str()))
    );
}

#[test]
fn consumer_before_nested_producer_expected_forward_reference_resolved() {
    let consumer = step(
        WF,
        "use",
        command_tool(TOOL, &["a"], &[]),
        vec![step_input(WF, "use", "a").with_source(id(WF, "late/y").as_str())],
        &[],
    );
    let process = workflow(WF, &["i"], vec![consumer, outer_step("late", false)], Vec::new());
    let rendering = render_workflow(&process, &RenderOptions::default()).expect("render");

    let into_consumer: Vec<_> = rendering
        .incoming_edges("file:///w/wf.cwl#use#1")
        .collect();
    assert_eq!(into_consumer.len(), 1);
    assert_eq!(into_consumer[0].source, "file:///w/sub.cwl#y#4");
    assert_eq!(into_consumer[0].label.as_deref(), Some("y"));
}

#[test]
fn nested_rendering_expected_every_node_once_and_clusters_nested() {
    let process = workflow(
        WF,
        &["i"],
        vec![outer_step("sub", true)],
        vec![output(WF, "result", Sources::One(id(WF, "sub/y")))],
    );
    let rendering = render_workflow(&process, &RenderOptions::default()).expect("render");
    let summary = inspect_dot(&rendering.dot).expect("rendered DOT should parse");

    assert_eq!(summary.nodes.len(), 5);
    assert_eq!(rendering.nodes_of_kind(NodeKind::CommandStep).count(), 1);
    assert_eq!(summary.dangling_edges().count(), 0);

    let nested = summary
        .clusters
        .iter()
        .find(|cluster| cluster.name == "cluster_sub.cwl5")
        .expect("nested cluster");
    assert_eq!(nested.label.as_deref(), Some("sub.cwl"));
    assert_eq!(nested.parents, vec!["cluster_wf.cwl2".to_string()]);
    assert_eq!(
        summary.nodes["file:///w/sub.cwl#y#4"].cluster.as_deref(),
        Some("cluster_outputs7")
    );
}
