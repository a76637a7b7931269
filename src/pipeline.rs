// Load a field, trace every configured run, collect the results

use anyhow::{Context, Result};
use glam::DVec2;
use log::info;
use streamflow::{
    BilinearSampler, RunConfig, Scheme, StreamflowConfig, Streamline, StreamlineIntegrator,
    Termination, VectorField,
};

/// Streamlines for one `(scheme, step_size, steps)` combination, one per seed
#[derive(Debug, Clone)]
pub struct RunResult {
    pub run: RunConfig,
    pub streamlines: Vec<Streamline>,
}

impl RunResult {
    pub fn left_domain(&self) -> usize {
        self.streamlines
            .iter()
            .filter(|s| s.termination == Termination::LeftDomain)
            .count()
    }

    pub fn mean_len(&self) -> f64 {
        if self.streamlines.is_empty() {
            return 0.0;
        }
        let total: usize = self.streamlines.iter().map(Streamline::len).sum();
        total as f64 / self.streamlines.len() as f64
    }

    /// Mean polyline length, in lattice units
    pub fn mean_arc_length(&self) -> f64 {
        if self.streamlines.is_empty() {
            return 0.0;
        }
        let total: f64 = self.streamlines.iter().map(Streamline::arc_length).sum();
        total / self.streamlines.len() as f64
    }
}

#[derive(Debug, Clone)]
pub struct Report {
    pub field: VectorField,
    pub seeds: Vec<DVec2>,
    pub runs: Vec<RunResult>,
}

impl Report {
    /// Largest end point distance between the Euler and RK4 runs that share
    /// `step_size` and `steps`, if both were traced
    pub fn scheme_gap(&self, step_size: f64, steps: usize) -> Option<f64> {
        let find = |scheme: Scheme| {
            self.runs.iter().find(|r| {
                r.run.scheme == scheme && r.run.step_size == step_size && r.run.steps == steps
            })
        };
        let euler = find(Scheme::Euler)?;
        let rk4 = find(Scheme::Rk4)?;

        Some(
            euler
                .streamlines
                .iter()
                .zip(&rk4.streamlines)
                .map(|(a, b)| a.endpoint_distance(b))
                .fold(0.0, f64::max),
        )
    }
}

/// Load the configured field and trace every run
pub fn run(config: &StreamflowConfig) -> Result<Report> {
    let field = config
        .field
        .load()
        .context("failed to load vector field")?;
    let seeds = config.seeds.resolve(field.width(), field.height());
    info!("Using {} seed points", seeds.len());

    Ok(trace_runs(field, seeds, &config.runs))
}

pub fn trace_runs(field: VectorField, seeds: Vec<DVec2>, runs: &[RunConfig]) -> Report {
    let sampler = BilinearSampler::new(&field);

    let results: Vec<RunResult> = runs
        .iter()
        .map(|run| {
            let integrator =
                StreamlineIntegrator::new(&sampler, run.scheme, run.step_size, run.steps);
            let result = RunResult {
                run: *run,
                streamlines: integrator.trace_all(&seeds),
            };
            info!(
                "{}: mean length {:.1} points ({:.2} arc), {} of {} left the domain",
                run.label(),
                result.mean_len(),
                result.mean_arc_length(),
                result.left_domain(),
                result.streamlines.len()
            );
            result
        })
        .collect();

    let report = Report {
        field,
        seeds,
        runs: results,
    };

    for run in report.runs.iter().filter(|r| r.run.scheme == Scheme::Euler) {
        if let Some(gap) = report.scheme_gap(run.run.step_size, run.run.steps) {
            info!(
                "step_size {} x {} steps: euler/rk4 end points differ by up to {:.4}",
                run.run.step_size, run.run.steps, gap
            );
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use streamflow::{FieldSource, OutputConfig, SeedConfig};

    fn uniform_config() -> StreamflowConfig {
        StreamflowConfig {
            field: FieldSource::Constant {
                width: 20,
                height: 20,
                vector: [1.0, 0.0],
            },
            seeds: SeedConfig::Points {
                points: vec![[5.0, 5.0], [17.0, 2.0], [19.0, 19.0]],
            },
            runs: RunConfig::ladder(Scheme::Euler, 0.3, 8, 2)
                .into_iter()
                .chain(RunConfig::ladder(Scheme::Rk4, 0.3, 8, 2))
                .collect(),
            output: OutputConfig {
                path: "unused.json".into(),
                pretty: false,
            },
        }
    }

    #[test]
    fn test_run_traces_every_seed_for_every_run() {
        let report = run(&uniform_config()).unwrap();

        assert_eq!(report.runs.len(), 4);
        for result in &report.runs {
            assert_eq!(result.streamlines.len(), 3);
            for (line, seed) in result.streamlines.iter().zip(&report.seeds) {
                assert_eq!(line.seed(), *seed);
            }
        }
    }

    #[test]
    fn test_run_summaries() {
        let report = run(&uniform_config()).unwrap();
        let euler = &report.runs[0];

        // (5,5) stays inside, (17,2) crosses x = 19, (19,19) starts outside
        assert_eq!(euler.left_domain(), 2);
        assert_eq!(euler.streamlines[0].len(), 9);
        assert_eq!(euler.streamlines[2].len(), 1);

        // 8 x 0.3 from (5,5), 7 x 0.3 from (17,2) until x = 19.1, nothing from (19,19)
        assert!((euler.mean_arc_length() - 4.5 / 3.0).abs() < 1e-9);
    }

    #[rstest]
    #[case(0, 1)] // euler 0.3 x 8 stops at once
    #[case(1, 1)] // euler 0.15 x 16
    #[case(2, 9)] // rk4 0.3 x 8 spends its budget in place
    #[case(3, 17)] // rk4 0.15 x 16
    fn test_seed_outside_domain(#[case] run_index: usize, #[case] expected_len: usize) {
        let report = run(&uniform_config()).unwrap();
        let line = &report.runs[run_index].streamlines[2];

        assert_eq!(line.len(), expected_len);
        assert_eq!(line.end(), DVec2::new(19.0, 19.0));
        assert_eq!(line.termination, Termination::LeftDomain);
    }

    #[test]
    fn test_scheme_gap_on_uniform_flow() {
        let report = run(&uniform_config()).unwrap();
        let gap = report.scheme_gap(0.3, 8).unwrap();
        // Seed (19,19) never moves and (5,5) only differs by rounding.
        // The gap comes from (17,2), where RK4 loses its k4 stage at the edge.
        assert!(gap < 1.0, "gap was {gap}");
        assert!(report.scheme_gap(0.2, 8).is_none());
    }

    #[test]
    fn test_degenerate_field_is_reported() {
        let mut config = uniform_config();
        config.field = FieldSource::Constant {
            width: 1,
            height: 20,
            vector: [0.0, 0.0],
        };
        let err = run(&config).unwrap_err();
        assert!(format!("{err:#}").contains("invalid field dimensions"));
    }
}
