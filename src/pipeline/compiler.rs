use super::compiled_plan::{CompiledPipeline, PlanStats};
use super::error::{PipelineError, PipelineResult};
use super::pipe::Pipe;
use super::pipes::EmptyPipe;
use super::stage::StageContext;
use crate::route::{resolve_source, Link, Route};

/// Compiles a route chain into a runnable pipeline
pub struct PipelineCompiler;

impl PipelineCompiler {
    /// Compile `route` and everything behind it.
    ///
    /// Walks the chain from the tip back to the root, then instantiates one
    /// fresh pipe per stage-bearing link on the way back out, wiring each to
    /// the one before it. A root source becomes the first pipe. Links
    /// without a stage pass their upstream through.
    ///
    /// # Errors
    /// - [`PipelineError::Construction`] when a stage rejects its arguments
    /// - [`PipelineError::NoInput`] when a stage has nothing to draw from:
    ///   the chain ends in a root that was never given a source. A root
    ///   whose source resolves to nothing compiles to an exhausted pipeline.
    pub fn compile(route: &Route) -> PipelineResult<CompiledPipeline> {
        let start_time = std::time::Instant::now();
        let mut stats = PlanStats::default();

        let tail = match Self::build(route, &mut stats)? {
            Some(tail) => tail,
            None => {
                stats.pipes = 1;
                Box::new(EmptyPipe::new())
            }
        };

        stats.compile_time_us = start_time.elapsed().as_micros() as u64;
        tracing::debug!(
            "Compiled {} link(s) into {} pipe(s) in {}us",
            stats.links,
            stats.pipes,
            stats.compile_time_us
        );

        Ok(CompiledPipeline::new(tail, stats))
    }

    fn build(route: &Route, stats: &mut PlanStats) -> PipelineResult<Option<Box<dyn Pipe>>> {
        stats.links += 1;

        let upstream = match route.link() {
            Link::Back(back) => Self::build(&back, stats)?,
            Link::Source(source) => {
                stats.pipes += 1;
                let pipe = match resolve_source(&source) {
                    Some(pipe) => {
                        stats.has_source = true;
                        pipe
                    }
                    None => Box::new(EmptyPipe::new()),
                };
                Some(pipe)
            }
            Link::Root => None,
        };

        let Some(spec) = route.stage() else {
            stats.pass_through += 1;
            return Ok(upstream);
        };

        let Some(upstream) = upstream else {
            return Err(PipelineError::NoInput {
                stage: spec.kind.name().to_string(),
            });
        };

        let mut pipe = spec.instantiate(&StageContext { route })?;
        pipe.set_upstream(upstream);
        stats.pipes += 1;
        tracing::trace!("Attached {} ({})", spec.kind, spec.render_args());

        Ok(Some(pipe))
    }
}
