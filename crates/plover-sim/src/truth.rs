use crate::error::{Result, SimError};
use chrono::{DateTime, TimeDelta, Utc};
use nalgebra::{Cholesky, Matrix2, Matrix4, Vector2, Vector4};
use plover_core::{GroundTruthPath, GroundTruthState};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Exp, StandardNormal};
use tracing::debug;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------
const MIN_INTERVAL_MS: i64 = 1;
/// Upper bound on the expected number of truth samples in one run.
pub const MAX_SAMPLES: usize = 10_000_000;

/// Indices of the position components in the `[x, vx, y, vy]` state.
pub const POSITION_INDICES: [usize; 2] = [0, 2];

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------
#[derive(Debug, Clone)]
pub struct TruthConfig {
    pub start: DateTime<Utc>,
    pub duration_s: f64,
    /// Mean gap between samples; gaps are exponentially distributed.
    pub mean_interval_s: f64,
    /// `[x, vx, y, vy]` in m and m/s
    pub initial_state: [f64; 4],
    /// Continuous white-noise acceleration intensity (m²/s³)
    pub process_noise: f64,
    pub seed: u64,
}

impl Default for TruthConfig {
    fn default() -> Self {
        Self {
            start: DateTime::<Utc>::UNIX_EPOCH + TimeDelta::seconds(1_700_000_000),
            duration_s: 60.0,
            mean_interval_s: 2.0,
            initial_state: [0.0, 10.0, 0.0, 5.0],
            process_noise: 0.05,
            seed: 42,
        }
    }
}

impl TruthConfig {
    /// Last instant a sample may fall on. `None` when it is not representable.
    pub fn end(&self) -> Option<DateTime<Utc>> {
        let ms = self.duration_s * 1000.0;
        if !ms.is_finite() || ms < 0.0 || ms >= i64::MAX as f64 {
            return None;
        }
        TimeDelta::try_milliseconds(ms as i64).and_then(|d| self.start.checked_add_signed(d))
    }

    /// Rejects parameters the sampling loop cannot honor.
    pub fn validate(&self) -> Result<DateTime<Utc>> {
        if !self.duration_s.is_finite() || self.duration_s < 0.0 {
            return Err(SimError::InvalidParameter {
                name: "duration_s",
                value: self.duration_s,
            });
        }
        if !self.mean_interval_s.is_finite() || self.mean_interval_s <= 0.0 {
            return Err(SimError::InvalidParameter {
                name: "mean_interval_s",
                value: self.mean_interval_s,
            });
        }

        let end = self.end().ok_or(SimError::TimeOverflow {
            start: self.start,
            duration_s: self.duration_s,
        })?;

        let expected = self.duration_s / self.mean_interval_s.max(MIN_INTERVAL_MS as f64 / 1000.0);
        if expected > MAX_SAMPLES as f64 {
            return Err(SimError::TooManySamples {
                duration_s: self.duration_s,
                mean_interval_s: self.mean_interval_s,
                expected,
                limit: MAX_SAMPLES,
            });
        }
        Ok(end)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "start": self.start.to_rfc3339(),
            "duration_s": self.duration_s,
            "mean_interval_s": self.mean_interval_s,
            "initial_state": self.initial_state,
            "process_noise": self.process_noise,
            "seed": self.seed,
        })
    }
}

// ---------------------------------------------------------------------------
// Motion model
// ---------------------------------------------------------------------------

/// Nearly-constant-velocity transition for one `dt` (seconds).
fn transition(dt: f64) -> Matrix4<f64> {
    Matrix4::new(
        1.0, dt, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, dt, //
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Per-axis discretized process noise covariance.
fn axis_noise(q: f64, dt: f64) -> Matrix2<f64> {
    Matrix2::new(
        dt.powi(3) / 3.0,
        dt.powi(2) / 2.0,
        dt.powi(2) / 2.0,
        dt,
    ) * q
}

fn sample_axis_noise(rng: &mut StdRng, q: f64, dt: f64) -> Vector2<f64> {
    match Cholesky::new(axis_noise(q, dt)) {
        Some(chol) => {
            let z: Vector2<f64> =
                Vector2::new(StandardNormal.sample(rng), StandardNormal.sample(rng));
            chol.l() * z
        }
        None => Vector2::zeros(),
    }
}

// ---------------------------------------------------------------------------
// Main loop
// ---------------------------------------------------------------------------

/// Simulates a single target's ground truth at irregular sample times.
///
/// Deterministic for a given `seed`. The first sample sits at `start`; the
/// last one at or before `start + duration_s`.
pub fn simulate_truth(cfg: &TruthConfig) -> Result<GroundTruthPath<GroundTruthState>> {
    let end = cfg.validate()?;
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let mut path = GroundTruthPath::new(format!("truth-{}", cfg.seed));

    let gaps = Exp::new(1.0 / cfg.mean_interval_s.max(1e-3)).ok();

    let mut time = cfg.start;
    let mut x = Vector4::from(cfg.initial_state);

    while time <= end {
        let state = GroundTruthState::new(time, nalgebra::DVector::from_column_slice(x.as_slice()))
            .with_metadata("source", "simulated");
        path.push(state);

        let gap_s = gaps
            .as_ref()
            .map(|d| d.sample(&mut rng))
            .unwrap_or(cfg.mean_interval_s);
        let gap_ms = ((gap_s * 1000.0).round() as i64).max(MIN_INTERVAL_MS);
        let dt = gap_ms as f64 / 1000.0;

        x = transition(dt) * x;
        let nx = sample_axis_noise(&mut rng, cfg.process_noise, dt);
        let ny = sample_axis_noise(&mut rng, cfg.process_noise, dt);
        x += Vector4::new(nx.x, nx.y, ny.x, ny.y);

        match TimeDelta::try_milliseconds(gap_ms).and_then(|d| time.checked_add_signed(d)) {
            Some(next) => time = next,
            None => break,
        }
    }

    debug!(samples = path.states.len(), seed = cfg.seed, "simulated ground truth");
    Ok(path)
}
