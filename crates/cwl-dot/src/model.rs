//! Read-only object tree of a resolved workflow document.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One or more port references.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sources {
    One(String),
    Many(Vec<String>),
}

impl Sources {
    pub fn as_slice(&self) -> &[String] {
        match self {
            Self::One(source) => std::slice::from_ref(source),
            Self::Many(sources) => sources,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.as_slice().iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

impl From<&str> for Sources {
    fn from(source: &str) -> Self {
        Self::One(source.to_string())
    }
}

impl From<Vec<String>> for Sources {
    fn from(sources: Vec<String>) -> Self {
        Self::Many(sources)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub id: String,
}

impl Port {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepInput {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Sources>,
    #[serde(default, rename = "valueFrom", skip_serializing_if = "Option::is_none")]
    pub value_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl StepInput {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: None,
            value_from: None,
            default: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<Sources>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_value_from(mut self, expression: impl Into<String>) -> Self {
        self.value_from = Some(expression.into());
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkflowOutput {
    pub id: String,
    #[serde(rename = "outputSource")]
    pub output_source: Sources,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    #[serde(rename = "in")]
    pub inputs: Vec<StepInput>,
    #[serde(rename = "out")]
    pub outputs: Vec<Port>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scatter: Vec<String>,
    pub run: Box<Process>,
}

impl Step {
    pub fn is_scattered(&self) -> bool {
        !self.scatter.is_empty()
    }

    pub fn scatters(&self, input_id: &str) -> bool {
        self.scatter.iter().any(|scattered| scattered == input_id)
    }
}

/// An atomic process: a command or an expression evaluator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub id: String,
    pub inputs: Vec<Port>,
    pub outputs: Vec<Port>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: String,
    pub inputs: Vec<Port>,
    pub outputs: Vec<WorkflowOutput>,
    pub steps: Vec<Step>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "class")]
pub enum Process {
    CommandLineTool(Tool),
    ExpressionTool(Tool),
    Workflow(Workflow),
}

impl Process {
    pub fn id(&self) -> &str {
        match self {
            Self::CommandLineTool(tool) | Self::ExpressionTool(tool) => &tool.id,
            Self::Workflow(workflow) => &workflow.id,
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            Self::CommandLineTool(_) => "CommandLineTool",
            Self::ExpressionTool(_) => "ExpressionTool",
            Self::Workflow(_) => "Workflow",
        }
    }

    pub fn input_ids(&self) -> impl Iterator<Item = &str> {
        let ports = match self {
            Self::CommandLineTool(tool) | Self::ExpressionTool(tool) => &tool.inputs,
            Self::Workflow(workflow) => &workflow.inputs,
        };
        ports.iter().map(|port| port.id.as_str())
    }

    pub fn output_ids(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        match self {
            Self::CommandLineTool(tool) | Self::ExpressionTool(tool) => {
                Box::new(tool.outputs.iter().map(|port| port.id.as_str()))
            }
            Self::Workflow(workflow) => {
                Box::new(workflow.outputs.iter().map(|output| output.id.as_str()))
            }
        }
    }

    pub fn as_workflow(&self) -> Option<&Workflow> {
        match self {
            Self::Workflow(workflow) => Some(workflow),
            _ => None,
        }
    }
}
