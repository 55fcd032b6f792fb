//! Rhai expression filter.

use crate::element::Item;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::pipe::{Pipe, Upstream};
use crate::scripting::{shared_engine, CompiledScript};

pub struct ScriptFilterPipe {
    upstream: Upstream,
    script: CompiledScript,
}

impl ScriptFilterPipe {
    /// Compile `source` with the shared engine. Syntax errors are
    /// construction errors.
    pub fn compile(source: &str) -> PipelineResult<Self> {
        let script = shared_engine()
            .compile_expression(source)
            .map_err(|e| PipelineError::Construction {
                kind: "ScriptFilter".to_string(),
                args: source.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            upstream: Upstream::default(),
            script,
        })
    }
}

impl Pipe for ScriptFilterPipe {
    fn name(&self) -> &str {
        "ScriptFilter"
    }

    fn set_upstream(&mut self, upstream: Box<dyn Pipe>) {
        self.upstream.set(upstream);
    }

    fn upstream(&self) -> Option<&(dyn Pipe + 'static)> {
        self.upstream.get()
    }

    fn upstream_mut(&mut self) -> Option<&mut (dyn Pipe + 'static)> {
        self.upstream.get_mut()
    }

    fn next_match(&mut self) -> PipelineResult<Option<Item>> {
        while let Some(candidate) = self.upstream.pull("ScriptFilter")? {
            match shared_engine().test(&self.script, &candidate) {
                Ok(true) => return Ok(Some(candidate)),
                Ok(false) => continue,
                Err(e) => {
                    tracing::warn!("Script filter `{}` failed: {}", self.script.source(), e);
                    return Err(PipelineError::Script {
                        stage: "ScriptFilter".to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::pipes::IterPipe;

    #[test]
    fn test_filters_by_expression() {
        let mut pipe = ScriptFilterPipe::compile("it >= 3").unwrap();
        pipe.set_upstream(Box::new(IterPipe::from_items(
            (1..=5).map(Item::from).collect(),
        )));
        let mut out = Vec::new();
        while let Some(item) = pipe.next_match().unwrap() {
            out.push(item);
        }
        assert_eq!(out, vec![Item::from(3), Item::from(4), Item::from(5)]);
    }

    #[test]
    fn test_syntax_error_is_construction_error() {
        assert!(matches!(
            ScriptFilterPipe::compile("it >"),
            Err(PipelineError::Construction { .. })
        ));
    }

    #[test]
    fn test_runtime_error_surfaces() {
        let mut pipe = ScriptFilterPipe::compile("it * 2").unwrap();
        pipe.set_upstream(Box::new(IterPipe::once(Item::from(1))));
        assert!(matches!(
            pipe.next_match(),
            Err(PipelineError::Script { .. })
        ));
    }
}
