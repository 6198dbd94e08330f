//! Turns a workflow document on disk into the [`Process`] tree.
//!
//! Accepts YAML or JSON, the usual map-or-list shorthands, inline `run`
//! objects, `run` paths to other documents and packed `$graph` documents.
//! Identifiers are qualified against the document URI:
//!
//! - a process `P` names its children `P#x`, or `P/x` once `P` has a fragment;
//! - a leading `#` is relative to the document itself;
//! - anything containing `://` or starting with `_:` is kept as is.

use crate::{
    CwlDotError, Port, Process, Sources, Step, StepInput, Tool, Workflow, WorkflowOutput,
};
use serde_yaml::Value as YamlValue;
use std::path::Path;
use url::Url;

/// Loads the document at `location`, a local path or a `file:` URI.
pub fn load_document(location: &str) -> Result<Process, CwlDotError> {
    let uri = document_uri(location)?;
    let mut loader = Loader::default();
    loader.load_uri(&uri)
}

/// Builds the tree from document text already in memory. `uri` names the
/// document and anchors relative `run` paths.
pub fn parse_document(text: &str, uri: &str) -> Result<Process, CwlDotError> {
    let uri = Url::parse(uri)?;
    let value: YamlValue = serde_yaml::from_str(text)?;
    let mut loader = Loader::default();
    loader.stack.push(uri.to_string());
    let process = loader.document(&value, &uri)?;
    loader.stack.pop();
    Ok(process)
}

/// `file:` URIs pass through; anything else is treated as a path relative to
/// the working directory.
pub fn document_uri(location: &str) -> Result<Url, CwlDotError> {
    if location.starts_with("file:") {
        return Ok(Url::parse(location)?);
    }
    let path = Path::new(location);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    Url::from_file_path(&absolute).map_err(|()| {
        CwlDotError::Document(format!(
            "cannot turn '{}' into a file URI",
            absolute.display()
        ))
    })
}

/// Where identifiers and `run` references of one document are resolved.
struct DocContext<'d> {
    url: &'d Url,
    base: String,
    graph: Option<&'d [YamlValue]>,
}

#[derive(Debug, Default)]
struct Loader {
    /// Documents and packed entries currently being built, outermost first.
    stack: Vec<String>,
}

impl Loader {
    fn load_uri(&mut self, uri: &Url) -> Result<Process, CwlDotError> {
        let key = uri.to_string();
        self.enter(&key)?;

        let path = uri.to_file_path().map_err(|()| {
            CwlDotError::Document(format!("only file: documents can be loaded, got '{uri}'"))
        })?;
        tracing::debug!(path = %path.display(), "loading workflow document");
        let text = std::fs::read_to_string(&path)?;
        let value: YamlValue = serde_yaml::from_str(&text)?;
        let process = self.document(&value, uri)?;

        self.stack.pop();
        Ok(process)
    }

    fn enter(&mut self, key: &str) -> Result<(), CwlDotError> {
        if self.stack.iter().any(|open| open == key) {
            return Err(CwlDotError::Document(format!(
                "cyclic run reference through '{key}'"
            )));
        }
        self.stack.push(key.to_string());
        Ok(())
    }

    fn document(&mut self, value: &YamlValue, url: &Url) -> Result<Process, CwlDotError> {
        let base = url.to_string();
        match value.get("$graph") {
            Some(graph) => {
                let entries = graph.as_sequence().ok_or_else(|| {
                    CwlDotError::Document("'$graph' must be a list".to_string())
                })?;
                let ctx = DocContext {
                    url,
                    base,
                    graph: Some(entries.as_slice()),
                };
                let root = packed_root(entries)?;
                let id = qualify(raw_id(root)?.unwrap_or("main"), &ctx.base, &ctx.base);
                self.enter(&id)?;
                let process = self.process(root, id, &ctx)?;
                self.stack.pop();
                Ok(process)
            }
            None => {
                let ctx = DocContext {
                    url,
                    base: base.clone(),
                    graph: None,
                };
                let id = match raw_id(value)? {
                    Some(raw) => qualify(raw, &base, &base),
                    None => base,
                };
                self.process(value, id, &ctx)
            }
        }
    }

    fn process(
        &mut self,
        value: &YamlValue,
        id: String,
        ctx: &DocContext<'_>,
    ) -> Result<Process, CwlDotError> {
        let class = value
            .get("class")
            .and_then(YamlValue::as_str)
            .ok_or_else(|| CwlDotError::Document(format!("process '{id}' has no class")))?;

        let inputs = ports(value.get("inputs"), &id, ctx, "inputs")?;
        match class {
            "CommandLineTool" | "ExpressionTool" => {
                let tool = Tool {
                    outputs: ports(value.get("outputs"), &id, ctx, "outputs")?,
                    inputs,
                    id,
                };
                Ok(if class == "CommandLineTool" {
                    Process::CommandLineTool(tool)
                } else {
                    Process::ExpressionTool(tool)
                })
            }
            "Workflow" => {
                let outputs = entries(value.get("outputs"), &id, "outputs")?
                    .into_iter()
                    .map(|(name, body)| workflow_output(&name, body, &id, ctx))
                    .collect::<Result<Vec<_>, _>>()?;
                let mut steps = Vec::new();
                for (name, body) in entries(value.get("steps"), &id, "steps")? {
                    let body = body.ok_or_else(|| {
                        CwlDotError::Document(format!("step '{name}' of '{id}' has no body"))
                    })?;
                    steps.push(self.step(&name, body, &id, ctx)?);
                }
                Ok(Process::Workflow(Workflow {
                    id,
                    inputs,
                    outputs,
                    steps,
                }))
            }
            other => Err(CwlDotError::UnsupportedProcess(format!(
                "'{other}' in process '{id}'"
            ))),
        }
    }

    fn step(
        &mut self,
        name: &str,
        body: &YamlValue,
        workflow_id: &str,
        ctx: &DocContext<'_>,
    ) -> Result<Step, CwlDotError> {
        let id = qualify(name, workflow_id, &ctx.base);

        let inputs = entries(body.get("in"), &id, "in")?
            .into_iter()
            .map(|(input, spec)| step_input(&input, spec, &id, workflow_id, ctx))
            .collect::<Result<Vec<_>, _>>()?;
        let outputs = ports(body.get("out"), &id, ctx, "out")?;
        let scatter = string_list(body.get("scatter"), &id, "scatter")?
            .into_iter()
            .map(|raw| qualify(&raw, &id, &ctx.base))
            .collect();

        let run = match body.get("run") {
            Some(YamlValue::String(reference)) => self.run_reference(reference, ctx)?,
            Some(inline @ YamlValue::Mapping(_)) => {
                let run_id = match raw_id(inline)? {
                    Some(raw) => qualify(raw, &ctx.base, &ctx.base),
                    None => format!("{id}/run"),
                };
                self.process(inline, run_id, ctx)?
            }
            _ => {
                return Err(CwlDotError::Document(format!(
                    "step '{id}' needs a run reference or an inline process"
                )));
            }
        };

        Ok(Step {
            id,
            inputs,
            outputs,
            scatter,
            run: Box::new(run),
        })
    }

    fn run_reference(&mut self, reference: &str, ctx: &DocContext<'_>) -> Result<Process, CwlDotError> {
        if reference.starts_with('#') {
            let graph = ctx.graph.ok_or_else(|| {
                CwlDotError::Document(format!(
                    "run '{reference}' points into a $graph, but '{}' is not packed",
                    ctx.base
                ))
            })?;
            let wanted = qualify(reference, &ctx.base, &ctx.base);
            for entry in graph {
                if let Some(raw) = raw_id(entry)? {
                    let id = qualify(raw, &ctx.base, &ctx.base);
                    if id == wanted {
                        self.enter(&id)?;
                        let process = self.process(entry, id, ctx)?;
                        self.stack.pop();
                        return Ok(process);
                    }
                }
            }
            return Err(CwlDotError::Document(format!(
                "run '{reference}' does not match any $graph entry"
            )));
        }

        let target = ctx.url.join(reference)?;
        self.load_uri(&target)
    }
}

fn packed_root(entries: &[YamlValue]) -> Result<&YamlValue, CwlDotError> {
    for entry in entries {
        if let Some(raw) = raw_id(entry)? {
            if raw.trim_start_matches('#') == "main" {
                return Ok(entry);
            }
        }
    }
    match entries {
        [only] => Ok(only),
        _ => Err(CwlDotError::Document(
            "packed document has several entries but none named 'main'".to_string(),
        )),
    }
}

fn step_input(
    name: &str,
    spec: Option<&YamlValue>,
    step_id: &str,
    workflow_id: &str,
    ctx: &DocContext<'_>,
) -> Result<StepInput, CwlDotError> {
    let mut input = StepInput::new(qualify(name, step_id, &ctx.base));
    let qualify_sources = |raw: Vec<String>| -> Vec<String> {
        raw.iter()
            .map(|source| qualify(source, workflow_id, &ctx.base))
            .collect()
    };

    match spec {
        None | Some(YamlValue::Null) => {}
        Some(YamlValue::String(source)) => {
            input.source = Some(Sources::One(qualify(source, workflow_id, &ctx.base)));
        }
        Some(list @ YamlValue::Sequence(_)) => {
            let sources = string_list(Some(list), &input.id, "source")?;
            input.source = Some(Sources::Many(qualify_sources(sources)));
        }
        Some(body @ YamlValue::Mapping(_)) => {
            input.source = match body.get("source") {
                None | Some(YamlValue::Null) => None,
                Some(YamlValue::String(source)) => {
                    Some(Sources::One(qualify(source, workflow_id, &ctx.base)))
                }
                Some(other) => Some(Sources::Many(qualify_sources(string_list(
                    Some(other),
                    &input.id,
                    "source",
                )?))),
            };
            input.value_from = body
                .get("valueFrom")
                .and_then(YamlValue::as_str)
                .map(str::to_string);
            input.default = match body.get("default") {
                None => None,
                Some(value) => Some(serde_json::to_value(value).map_err(|error| {
                    CwlDotError::Document(format!(
                        "default of '{}' cannot be represented: {error}",
                        input.id
                    ))
                })?),
            };
        }
        Some(_) => {
            return Err(CwlDotError::Document(format!(
                "step input '{}' has an unsupported shape",
                input.id
            )));
        }
    }
    Ok(input)
}

fn workflow_output(
    name: &str,
    body: Option<&YamlValue>,
    workflow_id: &str,
    ctx: &DocContext<'_>,
) -> Result<WorkflowOutput, CwlDotError> {
    let id = qualify(name, workflow_id, &ctx.base);
    let sources = string_list(body.and_then(|b| b.get("outputSource")), &id, "outputSource")?
        .into_iter()
        .map(|raw| qualify(&raw, workflow_id, &ctx.base))
        .collect::<Vec<_>>();
    let output_source = match <[String; 1]>::try_from(sources) {
        Ok([single]) => Sources::One(single),
        Err(many) => Sources::Many(many),
    };
    Ok(WorkflowOutput { id, output_source })
}

fn ports(
    value: Option<&YamlValue>,
    owner: &str,
    ctx: &DocContext<'_>,
    field: &str,
) -> Result<Vec<Port>, CwlDotError> {
    Ok(entries(value, owner, field)?
        .into_iter()
        .map(|(name, _)| Port::new(qualify(&name, owner, &ctx.base)))
        .collect())
}

/// Name/body pairs of a field written either as a map keyed by name or as a
/// list of names or of objects carrying an `id`.
fn entries<'v>(
    value: Option<&'v YamlValue>,
    owner: &str,
    field: &str,
) -> Result<Vec<(String, Option<&'v YamlValue>)>, CwlDotError> {
    match value {
        None | Some(YamlValue::Null) => Ok(Vec::new()),
        Some(YamlValue::Sequence(items)) => items
            .iter()
            .map(|item| match item {
                YamlValue::String(name) => Ok((name.clone(), None)),
                YamlValue::Mapping(_) => match raw_id(item)? {
                    Some(name) => Ok((name.to_string(), Some(item))),
                    None => Err(CwlDotError::Document(format!(
                        "an entry of '{field}' in '{owner}' has no id"
                    ))),
                },
                _ => Err(CwlDotError::Document(format!(
                    "entries of '{field}' in '{owner}' must be names or objects"
                ))),
            })
            .collect(),
        Some(YamlValue::Mapping(map)) => map
            .iter()
            .map(|(key, body)| match key.as_str() {
                Some(name) => Ok((name.to_string(), Some(body))),
                None => Err(CwlDotError::Document(format!(
                    "keys of '{field}' in '{owner}' must be strings"
                ))),
            })
            .collect(),
        Some(_) => Err(CwlDotError::Document(format!(
            "'{field}' in '{owner}' must be a list or a map"
        ))),
    }
}

fn string_list(
    value: Option<&YamlValue>,
    owner: &str,
    field: &str,
) -> Result<Vec<String>, CwlDotError> {
    match value {
        None | Some(YamlValue::Null) => Ok(Vec::new()),
        Some(YamlValue::String(single)) => Ok(vec![single.clone()]),
        Some(YamlValue::Sequence(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    CwlDotError::Document(format!(
                        "'{field}' of '{owner}' must only contain strings"
                    ))
                })
            })
            .collect(),
        Some(_) => Err(CwlDotError::Document(format!(
            "'{field}' of '{owner}' must be a string or a list of strings"
        ))),
    }
}

fn raw_id(value: &YamlValue) -> Result<Option<&str>, CwlDotError> {
    match value.get("id") {
        None => Ok(None),
        Some(YamlValue::String(id)) => Ok(Some(id.as_str())),
        Some(_) => Err(CwlDotError::Document("'id' must be a string".to_string())),
    }
}

fn qualify(raw: &str, parent: &str, document: &str) -> String {
    if raw.contains("://") || raw.starts_with("_:") {
        return raw.to_string();
    }
    if let Some(fragment) = raw.strip_prefix('#') {
        return format!("{document}#{fragment}");
    }
    let separator = if parent.contains('#') { '/' } else { '#' };
    format!("{parent}{separator}{raw}")
}
