//! Parallel evaluation of the field at many points.

use crate::{
    cell::FieldCellCache,
    error::{FieldError, Result},
    geometry::Point3,
    interpolation::{
        ComputeDerivatives, FieldEvaluation, FieldInterpolator, FieldQuery, InterpolatorScheme,
        SchemeInterpolator,
    },
    num::fbf,
};
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use ndarray::prelude::*;
use rayon::prelude::*;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

const PROGRESS_TEMPLATE: &str = "Progress: {bar:40}  {percent}% | ETA: {eta}";

/// How much to report while performing long-running operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verbosity {
    /// Print nothing.
    Quiet,
    /// Print non-critical status messages.
    Messages,
    /// Print status messages and show a progress bar.
    Progress,
}

impl Verbosity {
    pub fn print_messages(&self) -> bool {
        match self {
            Verbosity::Quiet => false,
            Verbosity::Messages | Verbosity::Progress => true,
        }
    }

    pub fn show_progress(&self) -> bool {
        *self == Verbosity::Progress
    }

    /// Creates a progress bar for the given number of items, which is
    /// hidden unless progress should be shown.
    pub fn create_progress_bar(&self, n_items: usize) -> ProgressBar {
        if !self.show_progress() {
            return ProgressBar::hidden();
        }
        let progress_bar = ProgressBar::new(n_items as u64);
        if let Ok(style) = ProgressStyle::default_bar().template(PROGRESS_TEMPLATE) {
            progress_bar.set_style(style);
        }
        progress_bar
    }
}

/// Defines the interface to a field map that can locate the cell
/// containing a point and fill a cache with its samples.
pub trait FieldCellLookup: Sync {
    /// Fills the given cache with the cell containing the given cylindrical
    /// coordinates.
    ///
    /// # Returns
    ///
    /// `false` if the point lies outside the field map, in which case the
    /// content of the cache is unspecified.
    fn fill_cache(&self, z: fbf, r: fbf, phi: fbf, cache: &mut FieldCellCache) -> bool;

    /// Whether the given cache holds the cell that [`fill_cache`](Self::fill_cache)
    /// would produce for the given cylindrical coordinates.
    ///
    /// The default accepts any cache containing the coordinates. A lookup
    /// assigning points on shared cell faces to one particular cell must
    /// override this to reject the neighbouring cells.
    fn cache_covers(&self, cache: &FieldCellCache, z: fbf, r: fbf, phi: fbf) -> bool {
        cache.contains(z, r, phi)
    }
}

/// A single cell acts as a field map covering only its own bounds.
impl FieldCellLookup for FieldCellCache {
    fn fill_cache(&self, z: fbf, r: fbf, phi: fbf, cache: &mut FieldCellCache) -> bool {
        if self.contains(z, r, phi) {
            *cache = *self;
            true
        } else {
            false
        }
    }
}

/// Configuration parameters for batch evaluators.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct BatchEvaluatorConfig {
    /// Interpolation scheme to use.
    pub scheme: InterpolatorScheme,
    /// Whether to compute the Jacobian at every point.
    pub derivatives: ComputeDerivatives,
}

impl BatchEvaluatorConfig {
    pub const DEFAULT_SCHEME: InterpolatorScheme = InterpolatorScheme::Lanes;
    pub const DEFAULT_DERIVATIVES: ComputeDerivatives = ComputeDerivatives::No;
}

impl Default for BatchEvaluatorConfig {
    fn default() -> Self {
        BatchEvaluatorConfig {
            scheme: Self::DEFAULT_SCHEME,
            derivatives: Self::DEFAULT_DERIVATIVES,
        }
    }
}

/// Field values, and optionally Jacobians, sampled at a set of points.
#[derive(Clone, Debug)]
pub struct FieldSamples {
    fields: Array2<fbf>,
    jacobians: Option<Array2<fbf>>,
    outside: Vec<usize>,
}

impl FieldSamples {
    /// Returns the field vectors as an array of shape `(n, 3)`.
    ///
    /// Rows for points outside the field map are NaN.
    pub fn fields(&self) -> &Array2<fbf> {
        &self.fields
    }

    /// Returns the row-major Jacobians as an array of shape `(n, 9)`, if computed.
    ///
    /// Rows for points outside the field map are NaN.
    pub fn jacobians(&self) -> Option<&Array2<fbf>> {
        self.jacobians.as_ref()
    }

    /// Returns the indices of the points lying outside the field map, in increasing order.
    pub fn outside_indices(&self) -> &[usize] {
        &self.outside
    }

    /// Returns the number of sampled points.
    pub fn number_of_points(&self) -> usize {
        self.fields.nrows()
    }
}

/// Evaluator of the field at batches of points, using a field map to
/// look up the cell of each point.
#[derive(Clone, Debug)]
pub struct BatchEvaluator {
    config: BatchEvaluatorConfig,
    interpolator: SchemeInterpolator,
}

impl BatchEvaluator {
    /// Creates a new batch evaluator with the given configuration.
    pub fn new(config: BatchEvaluatorConfig) -> Self {
        let interpolator = SchemeInterpolator::new(config.scheme);
        Self {
            config,
            interpolator,
        }
    }

    pub fn config(&self) -> &BatchEvaluatorConfig {
        &self.config
    }

    /// Evaluates the field at each of the given queries.
    ///
    /// The queries are processed in parallel. Every worker keeps its own
    /// cell cache and only asks the lookup to refill it when the lookup
    /// reports that the cached cell does not cover the query.
    ///
    /// # Returns
    ///
    /// One entry per query, `None` for queries outside the field map.
    pub fn evaluate_queries<L: FieldCellLookup>(
        &self,
        queries: &[FieldQuery],
        lookup: &L,
        verbosity: &Verbosity,
    ) -> Vec<Option<FieldEvaluation>> {
        if verbosity.print_messages() {
            println!(
                "Evaluating field at {} points with {} interpolation",
                queries.len(),
                self.config.scheme
            );
        }
        let derivatives = self.config.derivatives;

        let evaluations: Vec<_> = queries
            .par_iter()
            .progress_with(verbosity.create_progress_bar(queries.len()))
            .map_init(FieldCellCache::default, |cache, query| {
                let (z, r, phi) = (query.z(), query.r(), query.phi());
                if !lookup.cache_covers(cache, z, r, phi)
                    && !lookup.fill_cache(z, r, phi, cache)
                {
                    cache.invalidate();
                    return None;
                }
                Some(self.interpolator.evaluate(query, cache, derivatives))
            })
            .collect();

        if verbosity.print_messages() {
            let n_outside = evaluations
                .iter()
                .filter(|evaluation| evaluation.is_none())
                .count();
            if n_outside > 0 {
                println!(
                    "{} of {} points were outside the field map",
                    n_outside,
                    queries.len()
                );
            }
        }
        evaluations
    }

    /// Evaluates the field at the Cartesian points given as the rows of
    /// an array of shape `(n, 3)`.
    pub fn evaluate_points<L: FieldCellLookup>(
        &self,
        points: ArrayView2<fbf>,
        lookup: &L,
        verbosity: &Verbosity,
    ) -> Result<FieldSamples> {
        let (rows, columns) = points.dim();
        if columns != 3 {
            return Err(FieldError::PointShape { rows, columns });
        }
        let queries: Vec<_> = points
            .outer_iter()
            .map(|point| FieldQuery::from_cartesian(Point3::new(point[0], point[1], point[2])))
            .collect();

        let evaluations = self.evaluate_queries(&queries, lookup, verbosity);

        let mut fields = Array2::from_elem((rows, 3), fbf::NAN);
        let mut jacobians = if self.config.derivatives.is_yes() {
            Some(Array2::from_elem((rows, 9), fbf::NAN))
        } else {
            None
        };
        let mut outside = Vec::new();

        for (idx, evaluation) in evaluations.iter().enumerate() {
            match evaluation {
                Some(evaluation) => {
                    fields
                        .row_mut(idx)
                        .assign(&aview1(&evaluation.field().to_array()));
                    if let (Some(jacobians), Some(elements)) =
                        (jacobians.as_mut(), evaluation.jacobian_row_major())
                    {
                        jacobians.row_mut(idx).assign(&aview1(&elements));
                    }
                }
                None => outside.push(idx),
            }
        }
        Ok(FieldSamples {
            fields,
            jacobians,
            outside,
        })
    }
}

impl Default for BatchEvaluator {
    fn default() -> Self {
        Self::new(BatchEvaluatorConfig::default())
    }
}
