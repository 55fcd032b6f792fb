//! Stage descriptions carried by routes.
//!
//! A route never holds a live pipe. It holds a [`StageSpec`]: which kind of
//! stage to build and the arguments to build it with. The compiler turns the
//! description into a fresh [`Pipe`] on every compile pass.

use crate::element::{Element, Item};
use crate::pipeline::error::{BoxError, PipelineError, PipelineResult};
use crate::pipeline::pipe::Pipe;
use crate::pipeline::pipes::{
    AdjacencyPipe, BlockFilterPipe, DuplicateFilterPipe, GraphElementsPipe, IdentityPipe,
    LabelFilterPipe, RandomFilterPipe, RangeFilterPipe, ScriptFilterPipe, Step,
};
use crate::route::Route;
use std::fmt;
use std::sync::Arc;

/// Direction of an adjacency step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Out,
    In,
    Both,
}

/// Types of stages a route link can instantiate.
#[derive(Clone)]
pub enum StageKind {
    /// Pass every value through unchanged.
    Identity,
    /// Expand a graph into its vertices.
    GraphVertices,
    /// Expand a graph into its edges.
    GraphEdges,
    OutEdges,
    InEdges,
    BothEdges,
    OutVertex,
    InVertex,
    BothVertices,
    /// Keep values accepted by a predicate closure.
    BlockFilter,
    /// Keep values accepted by a rhai expression.
    ScriptFilter,
    /// Keep edges whose label is listed.
    LabelFilter,
    /// Keep values whose position falls inside an inclusive window.
    RangeFilter,
    /// Drop values already seen in this evaluation.
    DuplicateFilter,
    /// Keep each value with a fixed probability.
    RandomFilter,
    /// Stage supplied from outside the crate.
    Custom(Arc<dyn StageFactory>),
}

impl StageKind {
    pub fn name(&self) -> &str {
        match self {
            StageKind::Identity => "Identity",
            StageKind::GraphVertices => "GraphVertices",
            StageKind::GraphEdges => "GraphEdges",
            StageKind::OutEdges => "OutE",
            StageKind::InEdges => "InE",
            StageKind::BothEdges => "BothE",
            StageKind::OutVertex => "OutV",
            StageKind::InVertex => "InV",
            StageKind::BothVertices => "BothV",
            StageKind::BlockFilter => "BlockFilter",
            StageKind::ScriptFilter => "ScriptFilter",
            StageKind::LabelFilter => "LabelFilter",
            StageKind::RangeFilter => "RangeFilter",
            StageKind::DuplicateFilter => "DuplicateFilter",
            StageKind::RandomFilter => "RandomFilter",
            StageKind::Custom(factory) => factory.name(),
        }
    }

    /// Filter-like stages render differently in route descriptions.
    pub fn is_filter(&self) -> bool {
        self.name().ends_with("Filter")
    }

    /// Name with any `Filter` suffix removed.
    pub fn short_name(&self) -> &str {
        let name = self.name();
        name.strip_suffix("Filter")
            .filter(|s| !s.is_empty())
            .unwrap_or(name)
    }
}

impl PartialEq for StageKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (StageKind::Custom(a), StageKind::Custom(b)) => {
                a.name() == b.name() && std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl fmt::Debug for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StageKind({})", self.name())
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

type PredicateFn = dyn Fn(&Element) -> Result<bool, BoxError> + Send + Sync;

/// User predicate evaluated by the block filter.
#[derive(Clone)]
pub struct Predicate {
    name: Option<String>,
    f: Arc<PredicateFn>,
}

impl Predicate {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Element) -> bool + Send + Sync + 'static,
    {
        Self {
            name: None,
            f: Arc::new(move |element: &Element| -> Result<bool, BoxError> { Ok(f(element)) }),
        }
    }

    /// A predicate that may fail. Returning [`Exhausted`](super::Exhausted)
    /// ends the iteration instead of failing it.
    pub fn try_new<F>(f: F) -> Self
    where
        F: Fn(&Element) -> Result<bool, BoxError> + Send + Sync + 'static,
    {
        Self {
            name: None,
            f: Arc::new(f),
        }
    }

    /// Give the predicate a stable name for route descriptions.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn call(&self, element: &Element) -> Result<bool, BoxError> {
        (self.f)(element)
    }

    /// The name if one was given, otherwise the closure's address.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("block@{:p}", Arc::as_ptr(&self.f) as *const ()),
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Predicate({})", self.label())
    }
}

/// Construction argument for a stage.
#[derive(Debug, Clone)]
pub enum StageArg {
    Int(i64),
    Float(f64),
    Str(String),
    Items(Vec<Item>),
    Predicate(Predicate),
}

impl fmt::Display for StageArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageArg::Int(n) => write!(f, "{}", n),
            StageArg::Float(x) => write!(f, "{}", x),
            StageArg::Str(s) => f.write_str(s),
            StageArg::Items(items) if items.len() > 10 => {
                write!(f, "[...{} items...]", items.len())
            }
            StageArg::Items(items) => {
                let rendered: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", rendered.join(", "))
            }
            StageArg::Predicate(p) => f.write_str(&p.label()),
        }
    }
}

impl From<i64> for StageArg {
    fn from(n: i64) -> Self {
        StageArg::Int(n)
    }
}

impl From<f64> for StageArg {
    fn from(x: f64) -> Self {
        StageArg::Float(x)
    }
}

impl From<&str> for StageArg {
    fn from(s: &str) -> Self {
        StageArg::Str(s.to_string())
    }
}

impl From<String> for StageArg {
    fn from(s: String) -> Self {
        StageArg::Str(s)
    }
}

impl From<Predicate> for StageArg {
    fn from(p: Predicate) -> Self {
        StageArg::Predicate(p)
    }
}

/// What a stage sees of the route it is built for.
pub struct StageContext<'a> {
    pub route: &'a Route,
}

/// Builds pipes for [`StageKind::Custom`].
pub trait StageFactory: Send + Sync {
    fn name(&self) -> &str;

    fn build(&self, args: &[StageArg], ctx: &StageContext<'_>) -> PipelineResult<Box<dyn Pipe>>;
}

/// A stage kind plus its construction arguments.
#[derive(Debug, Clone)]
pub struct StageSpec {
    pub kind: StageKind,
    pub args: Vec<StageArg>,
}

impl StageSpec {
    pub fn new(kind: StageKind, args: Vec<StageArg>) -> Self {
        Self { kind, args }
    }

    pub fn bare(kind: StageKind) -> Self {
        Self::new(kind, Vec::new())
    }

    /// Arguments joined the way route descriptions show them.
    pub fn render_args(&self) -> String {
        self.args
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Error naming this stage and its arguments.
    pub fn invalid(&self, reason: impl Into<String>) -> PipelineError {
        PipelineError::Construction {
            kind: self.kind.name().to_string(),
            args: self.render_args(),
            reason: reason.into(),
        }
    }

    fn expect_no_args(&self) -> PipelineResult<()> {
        if self.args.is_empty() {
            Ok(())
        } else {
            Err(self.invalid(format!("expected no arguments, got {}", self.args.len())))
        }
    }

    /// Build a fresh pipe for this stage.
    pub fn instantiate(&self, ctx: &StageContext<'_>) -> PipelineResult<Box<dyn Pipe>> {
        let pipe: Box<dyn Pipe> = match &self.kind {
            StageKind::Identity => {
                self.expect_no_args()?;
                Box::new(IdentityPipe::new())
            }
            StageKind::GraphVertices => {
                self.expect_no_args()?;
                Box::new(GraphElementsPipe::vertices())
            }
            StageKind::GraphEdges => {
                self.expect_no_args()?;
                Box::new(GraphElementsPipe::edges())
            }
            StageKind::OutEdges | StageKind::InEdges | StageKind::BothEdges => {
                self.expect_no_args()?;
                Box::new(
                    AdjacencyPipe::new(self.direction(), Step::Edges).with_graph(ctx.route.graph()),
                )
            }
            StageKind::OutVertex | StageKind::InVertex | StageKind::BothVertices => {
                self.expect_no_args()?;
                Box::new(
                    AdjacencyPipe::new(self.direction(), Step::Vertices)
                        .with_graph(ctx.route.graph()),
                )
            }
            StageKind::BlockFilter => match self.args.as_slice() {
                [StageArg::Predicate(predicate)] => {
                    Box::new(BlockFilterPipe::new(ctx.route, predicate.clone()))
                }
                _ => return Err(self.invalid("expected a single predicate")),
            },
            StageKind::ScriptFilter => match self.args.as_slice() {
                [StageArg::Str(source)] => Box::new(ScriptFilterPipe::compile(source)?),
                _ => return Err(self.invalid("expected a single script expression")),
            },
            StageKind::LabelFilter => {
                let labels = self
                    .args
                    .iter()
                    .map(|arg| match arg {
                        StageArg::Str(label) => Ok(label.clone()),
                        _ => Err(self.invalid("labels must be strings")),
                    })
                    .collect::<PipelineResult<Vec<_>>>()?;
                if labels.is_empty() {
                    return Err(self.invalid("expected at least one label"));
                }
                Box::new(LabelFilterPipe::new(labels))
            }
            StageKind::RangeFilter => match self.args.as_slice() {
                [StageArg::Int(low), StageArg::Int(high)] => {
                    let low = usize::try_from(*low)
                        .map_err(|_| self.invalid("lower bound must not be negative"))?;
                    let high = match *high {
                        -1 => None,
                        h => {
                            let h = usize::try_from(h).map_err(|_| {
                                self.invalid("upper bound must be -1 or non-negative")
                            })?;
                            Some(h)
                        }
                    };
                    Box::new(RangeFilterPipe::new(low, high))
                }
                _ => return Err(self.invalid("expected lower and upper bounds")),
            },
            StageKind::DuplicateFilter => {
                self.expect_no_args()?;
                Box::new(DuplicateFilterPipe::new())
            }
            StageKind::RandomFilter => {
                let (bias, seed) = match self.args.as_slice() {
                    [StageArg::Float(bias)] => (*bias, None),
                    [StageArg::Float(bias), StageArg::Int(seed)] => (*bias, Some(*seed as u64)),
                    _ => return Err(self.invalid("expected a bias and an optional seed")),
                };
                if !(0.0..=1.0).contains(&bias) {
                    return Err(self.invalid("bias must be between 0 and 1"));
                }
                Box::new(RandomFilterPipe::new(bias, seed))
            }
            StageKind::Custom(factory) => factory.build(&self.args, ctx)?,
        };
        Ok(pipe)
    }

    fn direction(&self) -> Direction {
        match self.kind {
            StageKind::InEdges | StageKind::InVertex => Direction::In,
            StageKind::BothEdges | StageKind::BothVertices => Direction::Both,
            _ => Direction::Out,
        }
    }
}
