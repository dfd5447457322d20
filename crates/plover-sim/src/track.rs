use crate::truth::POSITION_INDICES;
use plover_core::{GaussianState, GroundTruthPath, GroundTruthState, Metadata, Track};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct TrackConfig {
    pub position_noise_std: f64, // m
    pub velocity_noise_std: f64, // m/s
    /// Chance that a truth sample produces a track state at all.
    pub detection_probability: f64,
    pub seed: u64,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            position_noise_std: 2.0,
            velocity_noise_std: 0.5,
            detection_probability: 0.8,
            seed: 42,
        }
    }
}

impl TrackConfig {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "position_noise_std": self.position_noise_std,
            "velocity_noise_std": self.velocity_noise_std,
            "detection_probability": self.detection_probability,
            "seed": self.seed,
        })
    }

    fn variance(&self, component: usize) -> f64 {
        if POSITION_INDICES.contains(&component) {
            self.position_noise_std.powi(2)
        } else {
            self.velocity_noise_std.powi(2)
        }
    }
}

/// Builds a noisy estimate track from a ground truth path.
///
/// Each truth sample survives with `detection_probability`; survivors get
/// Gaussian noise on every component and a diagonal covariance matching that
/// noise. The per-state metadata records which truth sample it came from.
pub fn generate_track(
    truth: &GroundTruthPath<GroundTruthState>,
    cfg: &TrackConfig,
) -> Track<GaussianState> {
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let mut track = Track::new(format!("track-{}", truth.id));

    let d_pos = Normal::new(0.0, cfg.position_noise_std.max(0.0)).ok();
    let d_vel = Normal::new(0.0, cfg.velocity_noise_std.max(0.0)).ok();

    for (idx, truth_state) in truth.iter().enumerate() {
        if rng.gen::<f64>() >= cfg.detection_probability {
            continue;
        }

        let ndim = truth_state.state_vector.len();
        let mut noisy = truth_state.state_vector.clone();
        for (component, value) in noisy.iter_mut().enumerate() {
            let dist = if POSITION_INDICES.contains(&component) {
                d_pos.as_ref()
            } else {
                d_vel.as_ref()
            };
            if let Some(dist) = dist {
                *value += dist.sample(&mut rng);
            }
        }

        let variances: Vec<f64> = (0..ndim).map(|c| cfg.variance(c)).collect();
        let state = GaussianState::with_variances(truth_state.timestamp, noisy, &variances);

        let mut meta = Metadata::new();
        meta.insert("truth_index".to_string(), idx.to_string());
        track.push_with_metadata(state, meta);
    }

    debug!(
        truth = truth.states.len(),
        detected = track.states.len(),
        "generated track"
    );
    track
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::truth::{simulate_truth, TruthConfig};

    #[test]
    fn test_full_detection_keeps_every_sample() {
        let truth = simulate_truth(&TruthConfig::default()).unwrap();
        let cfg = TrackConfig {
            detection_probability: 1.0,
            ..TrackConfig::default()
        };
        let track = generate_track(&truth, &cfg);

        assert_eq!(track.states.len(), truth.states.len());
        assert_eq!(track.metadatas.len(), track.states.len());
        assert_eq!(track.metadatas[3].get("truth_index").map(String::as_str), Some("3"));
        assert_eq!(track.states[0].covar[(0, 0)], 4.0);
        assert_eq!(track.states[0].covar[(1, 1)], 0.25);
    }

    #[test]
    fn test_zero_noise_copies_truth() {
        let truth = simulate_truth(&TruthConfig::default()).unwrap();
        let cfg = TrackConfig {
            position_noise_std: 0.0,
            velocity_noise_std: 0.0,
            detection_probability: 1.0,
            seed: 1,
        };
        let track = generate_track(&truth, &cfg);

        for (est, gt) in track.iter().zip(truth.iter()) {
            assert_eq!(est.timestamp, gt.timestamp);
            assert_eq!(est.state_vector, gt.state_vector);
        }
    }

    #[test]
    fn test_dropouts_thin_the_track() {
        let truth = simulate_truth(&TruthConfig {
            duration_s: 600.0,
            ..TruthConfig::default()
        })
        .unwrap();
        let cfg = TrackConfig {
            detection_probability: 0.5,
            ..TrackConfig::default()
        };
        let track = generate_track(&truth, &cfg);

        assert!(track.states.len() < truth.states.len());
        assert!(!track.states.is_empty());
    }
}
