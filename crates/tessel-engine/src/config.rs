//! Run configuration, validation, and error types.
//!
//! [`SimConfig`] is deserialised from YAML with every field optional;
//! [`validate()`](SimConfig::validate) checks it before any rank starts.
//! The time step actually used is [`effective_dt()`](SimConfig::effective_dt):
//! the requested `dt` clamped once to the stability bound.

use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tessel_core::Axis;
use tessel_grid::{BoundaryCondition, BoundaryConfig, ParseBoundaryError, Periodicity};
use tessel_stencil::{clamp_dt, StabilityLimit};

use crate::init::InitialCondition;
use crate::solver::StepParams;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors loading or validating a [`SimConfig`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// The configuration file could not be read.
    Read {
        /// The file.
        path: PathBuf,
        /// Underlying I/O failure.
        reason: String,
    },
    /// The YAML could not be parsed into a configuration.
    Parse {
        /// Parser message, including location.
        reason: String,
    },
    /// A numeric parameter is outside its allowed range.
    InvalidValue {
        /// Dotted path of the parameter, e.g. `grid.dx`.
        field: &'static str,
        /// The rejected value.
        value: f64,
        /// What the value must be.
        expected: &'static str,
    },
    /// A count that must be at least one is zero.
    ZeroCount {
        /// Dotted path of the parameter.
        field: &'static str,
    },
    /// A boundary-condition name is not recognised.
    UnknownBoundary(ParseBoundaryError),
    /// `periodic` on only one edge of an axis.
    UnpairedPeriodic {
        /// The axis with a single periodic edge.
        axis: Axis,
    },
    /// The initial-condition preset is not recognised.
    UnknownPreset {
        /// The rejected preset name.
        name: String,
    },
    /// The output format is not supported.
    UnsupportedFormat {
        /// The rejected format name.
        format: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, reason } => {
                write!(f, "cannot read config {}: {reason}", path.display())
            }
            Self::Parse { reason } => write!(f, "invalid config: {reason}"),
            Self::InvalidValue {
                field,
                value,
                expected,
            } => write!(f, "{field} must be {expected}, got {value}"),
            Self::ZeroCount { field } => write!(f, "{field} must be at least 1"),
            Self::UnknownBoundary(e) => write!(f, "{e}"),
            Self::UnpairedPeriodic { axis } => write!(
                f,
                "periodic boundary on only one {axis} edge; set both or neither"
            ),
            Self::UnknownPreset { name } => {
                write!(f, "unknown initial-condition preset '{name}'")
            }
            Self::UnsupportedFormat { format } => {
                write!(f, "unsupported output format '{format}' (only csv)")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::UnknownBoundary(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParseBoundaryError> for ConfigError {
    fn from(e: ParseBoundaryError) -> Self {
        Self::UnknownBoundary(e)
    }
}

// ── Sections ───────────────────────────────────────────────────────

/// Global grid extent and spacing.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct GridConfig {
    /// Global columns. Default: 64.
    pub nx: usize,
    /// Global rows. Default: 64.
    pub ny: usize,
    /// Cell width. Default: 1.0.
    pub dx: f64,
    /// Cell height. Default: 1.0.
    pub dy: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            nx: 64,
            ny: 64,
            dx: 1.0,
            dy: 1.0,
        }
    }
}

/// Transport coefficients.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Diffusivity. Default: 0.0.
    #[serde(alias = "D")]
    pub d: f64,
    /// Velocity along x. Default: 0.0.
    pub vx: f64,
    /// Velocity along y. Default: 0.0.
    pub vy: f64,
}

/// Time stepping and output cadence.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimeConfig {
    /// Requested time step, before stability clamping. Default: 0.1.
    pub dt: f64,
    /// Number of steps. Default: 100.
    pub steps: usize,
    /// Snapshot every this many steps. Default: 10.
    pub out_every: usize,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            dt: 0.1,
            steps: 100,
            out_every: 10,
        }
    }
}

/// Boundary conditions as written in YAML: one name for all four edges,
/// or a per-edge map. Missing edges default to `dirichlet`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum BcSpec {
    /// Same condition on every edge.
    Uniform(String),
    /// Per-edge conditions.
    PerEdge(EdgeBc),
}

impl Default for BcSpec {
    fn default() -> Self {
        Self::Uniform("dirichlet".to_string())
    }
}

/// Per-edge boundary names.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct EdgeBc {
    /// Edge at `x = 0`.
    pub left: Option<String>,
    /// Edge at `x = Lx`.
    pub right: Option<String>,
    /// Edge at `y = 0`.
    pub bottom: Option<String>,
    /// Edge at `y = Ly`.
    pub top: Option<String>,
}

/// Initial-condition selection.
///
/// A `file` selects the global binary reader; otherwise `preset` is one of
/// `constant_zero`, `constant` (uses `value`) or `gaussian_hotspot`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct IcConfig {
    /// Preset name. Default: `gaussian_hotspot`.
    pub preset: String,
    /// Hotspot peak. Default: 1.0.
    #[serde(alias = "A")]
    pub amplitude: f64,
    /// Hotspot width as a fraction of `min(Lx, Ly)`. Default: 0.05.
    pub sigma_frac: f64,
    /// Hotspot centre as a fraction of `Lx`. Default: 0.5.
    pub xc_frac: f64,
    /// Hotspot centre as a fraction of `Ly`. Default: 0.5.
    pub yc_frac: f64,
    /// Fill value for the `constant` preset. Default: 0.0.
    pub value: f64,
    /// Global little-endian `f64` field file.
    #[serde(alias = "path")]
    pub file: Option<PathBuf>,
}

impl Default for IcConfig {
    fn default() -> Self {
        Self {
            preset: "gaussian_hotspot".to_string(),
            amplitude: 1.0,
            sigma_frac: 0.05,
            xc_frac: 0.5,
            yc_frac: 0.5,
            value: 0.0,
            file: None,
        }
    }
}

/// Where and how snapshots are written.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory. Default: `outputs`.
    pub prefix: PathBuf,
    /// Snapshot format. Only `csv`. Default: `csv`.
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            prefix: PathBuf::from("outputs"),
            format: "csv".to_string(),
        }
    }
}

// ── SimConfig ──────────────────────────────────────────────────────

/// Everything a run needs.
///
/// # Examples
///
/// ```
/// use tessel_engine::SimConfig;
///
/// let cfg = SimConfig::from_yaml_str(
///     "grid: { nx: 32, ny: 16 }\nphysics: { D: 0.1 }\nbc: neumann\nranks: 4\n",
/// )
/// .unwrap();
/// cfg.validate().unwrap();
/// assert_eq!(cfg.grid.nx, 32);
/// assert_eq!(cfg.physics.d, 0.1);
/// assert_eq!(cfg.ranks, 4);
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    /// Grid extent and spacing.
    pub grid: GridConfig,
    /// Transport coefficients.
    pub physics: PhysicsConfig,
    /// Time stepping.
    pub time: TimeConfig,
    /// Boundary conditions.
    pub bc: BcSpec,
    /// Value for every Dirichlet edge. Default: 0.0.
    pub bc_value: f64,
    /// Initial condition.
    pub ic: IcConfig,
    /// Output location.
    pub output: OutputConfig,
    /// Number of ranks. Default: 1.
    pub ranks: usize,
    /// Receive deadline in seconds; a rank waiting longer on a peer fails
    /// with a timeout. Failing ranks abort their peers regardless, so this
    /// only bounds a peer that stalls without failing. `0` waits forever.
    /// Default: 60.
    pub recv_timeout_secs: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            physics: PhysicsConfig::default(),
            time: TimeConfig::default(),
            bc: BcSpec::default(),
            bc_value: 0.0,
            ic: IcConfig::default(),
            output: OutputConfig::default(),
            ranks: 1,
            recv_timeout_secs: 60.0,
        }
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            value,
            expected: "finite and positive",
        })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            value,
            expected: "finite and non-negative",
        })
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            value,
            expected: "finite",
        })
    }
}

fn at_least_one(field: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        Err(ConfigError::ZeroCount { field })
    } else {
        Ok(())
    }
}

impl SimConfig {
    /// Parse YAML. Missing keys take their defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(text).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })
    }

    /// Read and parse a YAML file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_yaml_str(&text)
    }

    /// Check every parameter.
    ///
    /// Called once before any rank starts; a config that passes cannot
    /// produce a [`ConfigError`] from the accessors below.
    pub fn validate(&self) -> Result<(), ConfigError> {
        at_least_one("grid.nx", self.grid.nx)?;
        at_least_one("grid.ny", self.grid.ny)?;
        positive("grid.dx", self.grid.dx)?;
        positive("grid.dy", self.grid.dy)?;
        non_negative("physics.D", self.physics.d)?;
        finite("physics.vx", self.physics.vx)?;
        finite("physics.vy", self.physics.vy)?;
        positive("time.dt", self.time.dt)?;
        at_least_one("time.steps", self.time.steps)?;
        at_least_one("time.out_every", self.time.out_every)?;
        at_least_one("ranks", self.ranks)?;
        finite("bc_value", self.bc_value)?;
        non_negative("recv_timeout_secs", self.recv_timeout_secs)?;

        let bc = self.boundary_config()?;
        if let Some(axis) = bc.unpaired_periodic() {
            return Err(ConfigError::UnpairedPeriodic { axis });
        }

        if let InitialCondition::GaussianHotspot { .. } = self.initial_condition()? {
            finite("ic.amplitude", self.ic.amplitude)?;
            positive("ic.sigma_frac", self.ic.sigma_frac)?;
            finite("ic.xc_frac", self.ic.xc_frac)?;
            finite("ic.yc_frac", self.ic.yc_frac)?;
        }
        finite("ic.value", self.ic.value)?;

        if !self.output.format.eq_ignore_ascii_case("csv") {
            return Err(ConfigError::UnsupportedFormat {
                format: self.output.format.clone(),
            });
        }
        Ok(())
    }

    /// Resolve the four edge conditions. Dirichlet edges take `bc_value`.
    pub fn boundary_config(&self) -> Result<BoundaryConfig, ConfigError> {
        let parse = |name: Option<&str>| -> Result<BoundaryCondition, ConfigError> {
            match name.unwrap_or("dirichlet").parse::<BoundaryCondition>()? {
                BoundaryCondition::Dirichlet(_) => Ok(BoundaryCondition::Dirichlet(self.bc_value)),
                other => Ok(other),
            }
        };
        match &self.bc {
            BcSpec::Uniform(name) => Ok(BoundaryConfig::uniform(parse(Some(name))?)),
            BcSpec::PerEdge(e) => Ok(BoundaryConfig {
                left: parse(e.left.as_deref())?,
                right: parse(e.right.as_deref())?,
                bottom: parse(e.bottom.as_deref())?,
                top: parse(e.top.as_deref())?,
            }),
        }
    }

    /// Axes that wrap in the process topology: those with both edges
    /// periodic.
    pub fn periodicity(&self) -> Result<Periodicity, ConfigError> {
        Ok(self.boundary_config()?.periodicity())
    }

    /// The configured initial condition.
    pub fn initial_condition(&self) -> Result<InitialCondition, ConfigError> {
        if let Some(path) = &self.ic.file {
            return Ok(InitialCondition::BinaryFile(path.clone()));
        }
        match self.ic.preset.to_ascii_lowercase().as_str() {
            "constant_zero" | "zero" => Ok(InitialCondition::ConstantZero),
            "constant" => Ok(InitialCondition::Constant(self.ic.value)),
            "gaussian_hotspot" | "gaussian" => Ok(InitialCondition::GaussianHotspot {
                amplitude: self.ic.amplitude,
                sigma_frac: self.ic.sigma_frac,
                xc_frac: self.ic.xc_frac,
                yc_frac: self.ic.yc_frac,
            }),
            _ => Err(ConfigError::UnknownPreset {
                name: self.ic.preset.clone(),
            }),
        }
    }

    /// Advective and diffusive time-step limits for this grid and physics.
    pub fn stability_limit(&self) -> StabilityLimit {
        StabilityLimit::new(
            self.grid.dx,
            self.grid.dy,
            self.physics.vx,
            self.physics.vy,
            self.physics.d,
        )
    }

    /// The requested `dt`, clamped to the stability bound. Logs a warning
    /// when clamping happens.
    pub fn effective_dt(&self) -> f64 {
        let bound = self.stability_limit().dt();
        let (dt, clamped) = clamp_dt(self.time.dt, bound);
        if clamped {
            tracing::warn!(
                requested = self.time.dt,
                limit = bound,
                "dt exceeds stability limit; clamping"
            );
        }
        dt
    }

    /// Physics with the clamped time step.
    pub fn step_params(&self) -> StepParams {
        StepParams {
            d: self.physics.d,
            vx: self.physics.vx,
            vy: self.physics.vy,
            dt: self.effective_dt(),
        }
    }

    /// Receive deadline, if any. Zero, and values too large for a
    /// [`Duration`], wait forever.
    pub fn recv_timeout(&self) -> Option<Duration> {
        Duration::try_from_secs_f64(self.recv_timeout_secs)
            .ok()
            .filter(|d| !d.is_zero())
    }

    /// Global domain size `(Lx, Ly)`.
    pub fn domain_size(&self) -> (f64, f64) {
        (
            self.grid.nx as f64 * self.grid.dx,
            self.grid.ny as f64 * self.grid.dy,
        )
    }

    /// Directory receiving per-rank snapshots.
    pub fn snapshot_dir(&self) -> PathBuf {
        self.output.prefix.join("snapshots")
    }

    /// The rank-layout CSV.
    pub fn layout_path(&self) -> PathBuf {
        self.output.prefix.join("rank_layout.csv")
    }
}
