//! Grid search over the start angles of the input and output links.
use crate::{validity::Filter, *};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Objective of the optimizing sweep, smaller is better.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Metric {
    /// Longest link minus shortest link
    #[default]
    Range,
    /// Longest link
    MaxLen,
}

impl Metric {
    /// Cost of the linkage.
    pub fn cost(&self, fb: &FourBar) -> f64 {
        match self {
            Self::Range => fb.range(),
            Self::MaxLen => fb.max_len(),
        }
    }

    /// Name of the metric.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Range => "range",
            Self::MaxLen => "max-len",
        }
    }
}

/// Sweep options.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[cfg_attr(feature = "clap", derive(clap::Args))]
#[derive(Clone, Debug, PartialEq)]
pub struct SweepCfg {
    /// Search for the smallest cost, otherwise stop at the first valid
    /// linkage
    #[cfg_attr(feature = "clap", clap(long, default_value_t = SweepCfg::new().optimize, action = clap::ArgAction::Set))]
    pub optimize: bool,
    /// Stop the optimizing sweep once a cost below this value is found
    #[cfg_attr(feature = "clap", clap(long, default_value_t = SweepCfg::new().min_range))]
    pub min_range: f64,
    /// Reject linkages violating Grashof's inequality
    #[cfg_attr(feature = "clap", clap(long))]
    pub grashof: bool,
    /// Reject linkages that cannot close at the start position
    #[cfg_attr(feature = "clap", clap(long, default_value_t = SweepCfg::new().validity, action = clap::ArgAction::Set))]
    pub validity: bool,
    /// Suppress the diagnostic events
    #[cfg_attr(feature = "clap", clap(skip = SweepCfg::new().silent))]
    pub silent: bool,
    /// Angle step of the grid in degrees, must divide 360
    #[cfg_attr(feature = "clap", clap(long, default_value_t = SweepCfg::new().step))]
    pub step: u32,
    /// Objective of the optimizing sweep
    #[cfg_attr(feature = "clap", clap(long, value_enum, default_value_t = SweepCfg::new().metric))]
    pub metric: Metric,
    /// Evaluate the grid in parallel (requires the `rayon` feature)
    #[cfg_attr(feature = "clap", clap(skip = SweepCfg::new().parallel))]
    pub parallel: bool,
}

impl Default for SweepCfg {
    fn default() -> Self {
        Self::new()
    }
}

impl SweepCfg {
    /// Constant default value.
    pub const fn new() -> Self {
        Self {
            optimize: true,
            min_range: 0.,
            grashof: false,
            validity: true,
            silent: true,
            step: 5,
            metric: Metric::Range,
            parallel: true,
        }
    }

    /// Enable the optimizing sweep.
    pub fn optimize(self, optimize: bool) -> Self {
        Self { optimize, ..self }
    }

    /// Set the early-exit threshold of the optimizing sweep.
    pub fn min_range(self, min_range: f64) -> Self {
        Self { min_range, ..self }
    }

    /// Enforce Grashof's inequality.
    pub fn grashof(self, grashof: bool) -> Self {
        Self { grashof, ..self }
    }

    /// Enforce the loop closure at the start position.
    pub fn validity(self, validity: bool) -> Self {
        Self { validity, ..self }
    }

    /// Suppress the diagnostic events.
    pub fn silent(self, silent: bool) -> Self {
        Self { silent, ..self }
    }

    /// Set the grid step in degrees.
    pub fn step(self, step: u32) -> Self {
        Self { step, ..self }
    }

    /// Set the objective.
    pub fn metric(self, metric: Metric) -> Self {
        Self { metric, ..self }
    }

    /// Evaluate the grid in parallel.
    pub fn parallel(self, parallel: bool) -> Self {
        Self { parallel, ..self }
    }

    /// The validity filter of these options.
    pub fn filter(&self) -> Filter {
        Filter { grashof: self.grashof, closure: self.validity }
    }

    fn check(&self) -> Result<(), SynError> {
        if self.step == 0 || 360 % self.step != 0 {
            let msg = format!("step {}° does not divide a full rotation", self.step);
            return Err(SynError::Config(msg));
        }
        if self.min_range.is_nan() {
            return Err(SynError::Config("min_range is NaN".to_string()));
        }
        Ok(())
    }
}

/// A linkage passing the validity filter.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    /// Offsets of the start angles `[θ2, θ4]` in degrees
    pub offset: [u32; 2],
    /// Start angles `[θ2_start, θ4_start]` in radians
    pub start: [f64; 2],
    /// Angle mapping
    pub mapping: AngleMapping,
    /// Freudenstein's coefficients
    pub coef: FreudensteinCoef,
    /// Linkage
    pub fb: FourBar,
    /// Cost of the objective
    pub cost: f64,
}

/// A visited grid cell, passed to the sweep callback.
pub struct Step<'a> {
    /// Number of visited cells, including this one
    pub visited: usize,
    /// Offsets of the start angles `[θ2, θ4]` in degrees
    pub offset: [u32; 2],
    /// Evaluation result
    pub eval: &'a Result<Candidate, Reject>,
    /// The candidate becomes the best solution
    pub improved: bool,
}

/// Statistics of the sweep.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SweepStat {
    /// Visited cells
    pub visited: usize,
    /// Cells passing the validity filter
    pub accepted: usize,
    /// Rejected cells, indexed as [`Reject::LIST`]
    pub rejected: [usize; 7],
    /// The sweep stopped before the grid is exhausted
    pub early_exit: bool,
}

impl SweepStat {
    /// Number of rejected cells of a kind.
    pub fn rejected(&self, kind: Reject) -> usize {
        self.rejected[kind.index()]
    }

    /// Iterate over the rejection counts.
    pub fn rejections(&self) -> impl Iterator<Item = (Reject, usize)> + '_ {
        Reject::LIST.into_iter().zip(self.rejected)
    }

    /// Total number of rejected cells.
    pub fn total_rejected(&self) -> usize {
        self.rejected.iter().sum()
    }
}

/// Result of the sweep.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    /// The best (or the first) valid candidate
    pub best: Option<Candidate>,
    /// Statistics
    pub stat: SweepStat,
}

impl Solution {
    /// Return true if a linkage is found.
    pub fn is_feasible(&self) -> bool {
        self.best.is_some()
    }

    /// Take the best candidate, [`SynError::NoFeasible`] if there is none.
    pub fn into_best(self) -> Result<Candidate, SynError> {
        self.best.ok_or(SynError::NoFeasible)
    }
}

/// The start angle grid of a task. Each cell is evaluated independently.
#[derive(Clone, Debug)]
pub struct Grid {
    tar: FnTarget,
    start: [f64; 2],
    rot: [f64; 2],
    cfg: SweepCfg,
}

impl Grid {
    /// Create the grid from the sampled target, base start angles and
    /// rotation spans.
    pub fn new(tar: FnTarget, start: [f64; 2], rot: [f64; 2], cfg: SweepCfg) -> Result<Self, SynError> {
        cfg.check()?;
        Ok(Self { tar, start, rot, cfg })
    }

    /// Sampled target.
    pub fn target(&self) -> &FnTarget {
        &self.tar
    }

    /// Options.
    pub fn cfg(&self) -> &SweepCfg {
        &self.cfg
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        let n = (360 / self.cfg.step) as usize;
        n * n
    }

    /// Return true if the grid has no cell.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offsets `[θ2, θ4]` in degrees, in scan order.
    ///
    /// The outer loop is the input offset and the inner loop is the output
    /// offset, both ascending.
    pub fn cells(&self) -> impl Iterator<Item = [u32; 2]> {
        let step = self.cfg.step;
        (0..360 / step).flat_map(move |i| (0..360 / step).map(move |j| [i * step, j * step]))
    }

    /// Evaluate a cell.
    pub fn eval(&self, offset: [u32; 2]) -> Result<Candidate, Reject> {
        let [o2, o4] = offset.map(|o| (o as f64).to_radians());
        let start = [self.start[0] + o2, self.start[1] + o4];
        let mapping = AngleMapping::new(&self.tar, start, self.rot)?;
        let coef = FreudensteinCoef::solve(&mapping.pairs(&self.tar.pp))?;
        let fb = FourBar::from_coef(&coef)?;
        self.cfg.filter().check(&fb, start[0])?;
        let cost = self.cfg.metric.cost(&fb);
        Ok(Candidate { offset, start, mapping, coef, fb, cost })
    }
}

/// Sweep over the start angle grid.
///
/// ```
/// use fgen::{LinkageSpec, SweepCfg};
///
/// let spec = LinkageSpec::new(|x: f64| x.ln(), [1., 3.]).unwrap();
/// let spec = spec.theta2(0., 90f64.to_radians()).theta4(0., 60f64.to_radians());
/// let mut visited = 0;
/// let s = spec
///     .sweep(SweepCfg::new())
///     .unwrap()
///     .callback(|step| visited = step.visited)
///     .solve();
/// assert_eq!(s.stat.visited, visited);
/// ```
pub struct Sweep<'a> {
    grid: Grid,
    callback: Box<dyn FnMut(&Step) + 'a>,
}

impl<'a> Sweep<'a> {
    /// Create a sweep without callback.
    pub fn new(grid: Grid) -> Self {
        Self { grid, callback: Box::new(|_| ()) }
    }

    /// Set the callback of each visited cell, called in scan order.
    pub fn callback<C>(self, callback: C) -> Self
    where
        C: FnMut(&Step) + 'a,
    {
        Self { callback: Box::new(callback), ..self }
    }

    /// The grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Run the sweep.
    ///
    /// With the `rayon` feature, the optimizing sweep evaluates the cells in
    /// parallel and folds the results in scan order, so the solution is the
    /// same as the sequential one. The first-found sweep is always
    /// sequential and stops at the first valid cell.
    pub fn solve(self) -> Solution {
        let Self { grid, mut callback } = self;
        match grid.eval_par() {
            Some(evals) => fold(&grid.cfg, evals, &mut callback),
            None => {
                let evals = grid.cells().map(|c| (c, grid.eval(c)));
                fold(&grid.cfg, evals, &mut callback)
            }
        }
    }
}

type Eval = ([u32; 2], Result<Candidate, Reject>);

impl Grid {
    // Only the optimizing sweep needs the whole grid
    #[cfg(feature = "rayon")]
    fn eval_par(&self) -> Option<Vec<Eval>> {
        (self.cfg.parallel && self.cfg.optimize).then(|| {
            self.cells()
                .collect::<Vec<_>>()
                .into_par_iter()
                .map(|c| (c, self.eval(c)))
                .collect()
        })
    }

    #[cfg(not(feature = "rayon"))]
    fn eval_par(&self) -> Option<Vec<Eval>> {
        None
    }
}

fn fold<I>(cfg: &SweepCfg, evals: I, callback: &mut dyn FnMut(&Step)) -> Solution
where
    I: IntoIterator<Item = Eval>,
{
    let mut best = None::<Candidate>;
    let mut stat = SweepStat::default();
    for (offset, eval) in evals {
        stat.visited += 1;
        let (improved, stop) = match &eval {
            Err(reason) => {
                stat.rejected[reason.index()] += 1;
                if !cfg.silent {
                    tracing::trace!(?offset, %reason, "rejected");
                }
                (false, false)
            }
            Ok(_) if !cfg.optimize => {
                stat.accepted += 1;
                (true, true)
            }
            Ok(c) => {
                stat.accepted += 1;
                let best_cost = best.as_ref().map_or(f64::INFINITY, |b| b.cost);
                let improved = c.cost < best_cost;
                (improved, improved && c.cost < cfg.min_range)
            }
        };
        callback(&Step { visited: stat.visited, offset, eval: &eval, improved });
        if improved {
            if let Ok(c) = eval {
                if !cfg.silent {
                    tracing::debug!(?offset, cost = c.cost, fb = ?c.fb.planar_loop(), "improved");
                }
                best.replace(c);
            }
        }
        if stop {
            stat.early_exit = true;
            break;
        }
    }
    if !cfg.silent {
        tracing::info!(
            visited = stat.visited,
            accepted = stat.accepted,
            rejected = stat.total_rejected(),
            early_exit = stat.early_exit,
            feasible = best.is_some(),
            "sweep finished"
        );
    }
    Solution { best, stat }
}
