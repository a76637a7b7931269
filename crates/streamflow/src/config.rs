use crate::error::{ConfigError, ConfigResult};
use crate::field::RawFormat;
use crate::integrator::Scheme;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "windviz.toml";

/// Largest step budget a config may request per streamline
pub const MAX_STEPS: usize = 1 << 24;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamflowConfig {
    pub field: FieldSource,
    pub seeds: SeedConfig,
    pub runs: Vec<RunConfig>,
    pub output: OutputConfig,
}

/// Where the vector field comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum FieldSource {
    /// Flat little-endian float file
    Raw { path: PathBuf, format: RawFormat },
    /// Curl of a Perlin potential, see `synth::NoiseField`
    Noise {
        width: usize,
        height: usize,
        seed: u32,
        frequency: f64,
        amplitude: f64,
    },
    Constant {
        width: usize,
        height: usize,
        vector: [f64; 2],
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum SeedConfig {
    /// Random lattice nodes; a missing `rng_seed` draws a fresh one
    Random {
        count: usize,
        #[serde(default)]
        rng_seed: Option<u64>,
    },
    Grid { spacing: f64 },
    Points { points: Vec<[f64; 2]> },
}

/// One `(scheme, step_size, steps)` combination
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub scheme: Scheme,
    pub step_size: f64,
    pub steps: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub pretty: bool,
}

impl RunConfig {
    pub fn new(scheme: Scheme, step_size: f64, steps: usize) -> Self {
        Self {
            scheme,
            step_size,
            steps,
        }
    }

    /// `levels` runs, each halving the step size and doubling the step count of the previous,
    /// so every run covers the same integration time.
    pub fn ladder(scheme: Scheme, step_size: f64, steps: usize, levels: usize) -> Vec<Self> {
        (0..levels)
            .map(|level| Self::new(scheme, step_size / (1u64 << level) as f64, steps << level))
            .collect()
    }

    /// File-name friendly identifier, e.g. `euler_step_size_0.3_steps_8`
    pub fn label(&self) -> String {
        format!("{}_step_size_{}_steps_{}", self.scheme, self.step_size, self.steps)
    }
}

impl Default for StreamflowConfig {
    fn default() -> Self {
        let runs = Scheme::ALL
            .into_iter()
            .flat_map(|scheme| RunConfig::ladder(scheme, 0.3, 8, 4))
            .collect();

        Self {
            field: FieldSource::Raw {
                path: PathBuf::from("wind_vectors.raw"),
                format: RawFormat::new(20, 20),
            },
            seeds: SeedConfig::Random {
                count: 15,
                rng_seed: Some(42),
            },
            runs,
            output: OutputConfig {
                path: PathBuf::from("streamlines.json"),
                pretty: true,
            },
        }
    }
}

impl StreamflowConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: StreamflowConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path`, or fall back to defaults when the file doesn't exist
    pub fn load_or_default(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            info!("Loading config from {}", path.display());
            Self::load_from_file(path)
        } else {
            info!("{} not found, using default config", path.display());
            Ok(Self::default())
        }
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.runs.is_empty() {
            return Err(invalid("at least one run is required"));
        }
        for run in &self.runs {
            if !run.step_size.is_finite() || run.step_size == 0.0 {
                return Err(invalid(format!(
                    "step_size must be finite and non-zero, got {}",
                    run.step_size
                )));
            }
            if run.steps == 0 || run.steps > MAX_STEPS {
                return Err(invalid(format!(
                    "steps must be between 1 and {MAX_STEPS}, got {}",
                    run.steps
                )));
            }
        }

        match &self.seeds {
            SeedConfig::Grid { spacing } if !(spacing.is_finite() && *spacing > 0.0) => {
                return Err(invalid(format!("grid spacing must be positive, got {spacing}")));
            }
            SeedConfig::Points { points } if points.iter().flatten().any(|c| !c.is_finite()) => {
                return Err(invalid("seed points must be finite"));
            }
            _ => {}
        }

        Ok(())
    }
}

fn invalid(reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::ValueType;
    use rstest::rstest;

    #[test]
    fn test_default_ladder_matches_homework_runs() {
        let config = StreamflowConfig::default();
        let labels: Vec<String> = config.runs.iter().map(RunConfig::label).collect();
        assert_eq!(
            labels,
            vec![
                "euler_step_size_0.3_steps_8",
                "euler_step_size_0.15_steps_16",
                "euler_step_size_0.075_steps_32",
                "euler_step_size_0.0375_steps_64",
                "rk4_step_size_0.3_steps_8",
                "rk4_step_size_0.15_steps_16",
                "rk4_step_size_0.075_steps_32",
                "rk4_step_size_0.0375_steps_64",
            ]
        );
    }

    #[test]
    fn test_ladder_keeps_integration_time() {
        for run in RunConfig::ladder(Scheme::Rk4, 0.5, 3, 5) {
            assert!((run.step_size * run.steps as f64 - 1.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_default_round_trips_through_toml() {
        let config = StreamflowConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: StreamflowConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_parse_handwritten_config() {
        let text = r#"
            [field]
            source = "raw"
            path = "data/wind.raw"

            [field.format]
            width = 30
            height = 10
            value_type = "f32"

            [seeds]
            mode = "points"
            points = [[1, 2], [3.5, 4.0]]

            [[runs]]
            scheme = "rk4"
            step_size = 0.1
            steps = 50

            [output]
            path = "out.json"
        "#;
        let config: StreamflowConfig = toml::from_str(text).unwrap();
        config.validate().unwrap();

        match &config.field {
            FieldSource::Raw { path, format } => {
                assert_eq!(path, &PathBuf::from("data/wind.raw"));
                assert_eq!(format.width, 30);
                assert_eq!(format.value_type, ValueType::F32);
                assert!(format.transpose);
            }
            other => panic!("unexpected field source {other:?}"),
        }
        assert_eq!(
            config.seeds,
            SeedConfig::Points {
                points: vec![[1.0, 2.0], [3.5, 4.0]]
            }
        );
        assert_eq!(config.runs, vec![RunConfig::new(Scheme::Rk4, 0.1, 50)]);
        assert!(!config.output.pretty);
    }

    #[test]
    fn test_random_seeds_without_rng_seed() {
        let seeds: SeedConfig = toml::from_str("mode = \"random\"\ncount = 3\n").unwrap();
        assert_eq!(
            seeds,
            SeedConfig::Random {
                count: 3,
                rng_seed: None
            }
        );
    }

    #[test]
    fn test_validate_rejects_zero_step() {
        let mut config = StreamflowConfig::default();
        config.runs.push(RunConfig::new(Scheme::Euler, 0.0, 10));
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[rstest]
    #[case(0)]
    #[case(MAX_STEPS + 1)]
    #[case(usize::MAX)]
    fn test_validate_rejects_steps_out_of_range(#[case] steps: usize) {
        let mut config = StreamflowConfig::default();
        config.runs.push(RunConfig::new(Scheme::Euler, 0.3, steps));
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_validate_accepts_largest_budget() {
        let mut config = StreamflowConfig::default();
        config.runs = vec![RunConfig::new(Scheme::Rk4, 0.3, MAX_STEPS)];
        config.validate().unwrap();
    }

    #[test]
    fn test_zero_steps_in_file_is_rejected() {
        let text = r#"
            [field]
            source = "constant"
            width = 20
            height = 20
            vector = [1.0, 0.0]

            [seeds]
            mode = "grid"
            spacing = 2.0

            [[runs]]
            scheme = "euler"
            step_size = 0.3
            steps = 0

            [output]
            path = "out.json"
        "#;
        let config: StreamflowConfig = toml::from_str(text).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("steps must be between 1"), "{err}");
    }

    #[test]
    fn test_validate_rejects_empty_runs() {
        let mut config = StreamflowConfig::default();
        config.runs.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_validate_rejects_bad_spacing() {
        let mut config = StreamflowConfig::default();
        config.seeds = SeedConfig::Grid { spacing: -1.0 };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let config = StreamflowConfig::load_or_default("no/such/windviz.toml").unwrap();
        assert_eq!(config, StreamflowConfig::default());
    }
}
