use crate::config::{PackerOptions, SortMetric};
use crate::error::{Result, TilePackerError};
use crate::session::PackingSession;
use std::time::Instant;
use tracing::{debug, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Which sort metrics to try and how.
#[derive(Debug, Clone)]
pub struct PortfolioConfig {
    pub metrics: Vec<SortMetric>,
    /// Evaluate candidates in parallel when the "parallel" feature is on.
    pub parallel: bool,
    /// Optional time budget for sequential evaluation (milliseconds). None or 0 disables.
    /// The first candidate always runs.
    pub time_budget_ms: Option<u64>,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            metrics: SortMetric::ALL.to_vec(),
            parallel: false,
            time_budget_ms: None,
        }
    }
}

/// Winning candidate of [`pack_portfolio`].
#[derive(Debug)]
pub struct PortfolioOutcome {
    pub metric: SortMetric,
    /// Return value of the winning `pack()` call.
    pub packed: usize,
    pub session: PackingSession,
}

struct Candidate {
    metric: SortMetric,
    packed: usize,
    session: PackingSession,
}

impl Candidate {
    /// Lower is better: most tiles placed, then fewest canvases, then least canvas area.
    fn score(&self) -> (usize, usize, u64) {
        let stats = self.session.stats();
        (
            stats.num_tiles - stats.num_packed,
            stats.num_canvases,
            stats.total_canvas_area,
        )
    }
}

fn run_candidate(
    sizes: &[(u32, u32)],
    width: u32,
    height: u32,
    base: &PackerOptions,
    metric: SortMetric,
) -> Result<Candidate> {
    let mut session = PackingSession::with_tiles(sizes.iter().copied(), width, height)?;
    let mut opts = *base;
    opts.sort_by = metric;
    opts.tiles_presorted = false;
    session.set_options(opts);
    let packed = session.pack()?;
    Ok(Candidate {
        metric,
        packed,
        session,
    })
}

#[instrument(skip_all, fields(tiles = sizes.len()))]
/// Packs `sizes` once per configured sort metric, each in its own session, and keeps the best.
///
/// Candidates are compared by unplaced tiles, then canvas count, then total canvas area;
/// ties go to the metric listed first.
pub fn pack_portfolio(
    sizes: &[(u32, u32)],
    width: u32,
    height: u32,
    base: &PackerOptions,
    cfg: &PortfolioConfig,
) -> Result<PortfolioOutcome> {
    if cfg.metrics.is_empty() {
        return Err(TilePackerError::WrongParameters(
            "portfolio needs at least one sort metric".into(),
        ));
    }

    // Parallel path (optional)
    #[cfg(feature = "parallel")]
    {
        if cfg.parallel {
            let results: Vec<Candidate> = cfg
                .metrics
                .par_iter()
                .map(|&m| run_candidate(sizes, width, height, base, m))
                .collect::<Result<Vec<_>>>()?;
            return pick_best(results);
        }
    }

    // Sequential path with optional time budget
    let budget_ms = cfg.time_budget_ms.unwrap_or(0);
    let start = Instant::now();
    let mut results = Vec::with_capacity(cfg.metrics.len());
    for &m in &cfg.metrics {
        if !results.is_empty() && budget_ms > 0 && start.elapsed().as_millis() as u64 > budget_ms {
            debug!(evaluated = results.len(), "portfolio time budget exhausted");
            break;
        }
        results.push(run_candidate(sizes, width, height, base, m)?);
    }
    pick_best(results)
}

fn pick_best(results: Vec<Candidate>) -> Result<PortfolioOutcome> {
    let mut best: Option<(Candidate, (usize, usize, u64))> = None;
    for cand in results {
        let score = cand.score();
        debug!(metric = ?cand.metric, ?score, "portfolio candidate");
        if best.as_ref().is_none_or(|(_, s)| score < *s) {
            best = Some((cand, score));
        }
    }
    best.map(|(c, _)| PortfolioOutcome {
        metric: c.metric,
        packed: c.packed,
        session: c.session,
    })
    .ok_or_else(|| TilePackerError::WrongParameters("no portfolio candidate ran".into()))
}
