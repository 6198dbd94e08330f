use thiserror::Error;

#[derive(Debug, Error)]
pub enum CwlDotError {
    #[error("no matching endpoint for port '{port}' in process '{process}'")]
    UnresolvedEndpoint { port: String, process: String },
    #[error("step input '{0}' has none of source, valueFrom or default")]
    MalformedStepInput(String),
    #[error("workflow output '{output}' references unknown source '{reference}'")]
    UnresolvedOutputSource { output: String, reference: String },
    #[error("unsupported process class: {0}")]
    UnsupportedProcess(String),
    #[error("invalid workflow document: {0}")]
    Document(String),
    #[error("DOT parse error: {0}")]
    DotParse(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Url(#[from] url::ParseError),
}
