use crate::IdRewrite;

/// Caller-controlled knobs for one rendering.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Applied to every node id and edge endpoint before it is written.
    pub rewrites: Vec<IdRewrite>,
    /// Fail instead of falling back to the raw reference when a workflow
    /// output names a source that is neither a step output nor a workflow
    /// input.
    pub strict_output_sources: bool,
}

impl RenderOptions {
    pub fn with_rewrite(mut self, rewrite: IdRewrite) -> Self {
        self.rewrites.push(rewrite);
        self
    }

    pub fn strict(mut self) -> Self {
        self.strict_output_sources = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_options_defaults_expected_lenient_without_rewrites() {
        let options = RenderOptions::default();
        assert!(options.rewrites.is_empty());
        assert!(!options.strict_output_sources);
    }
}
