use crate::truth::POSITION_INDICES;
use plover_core::{
    resample, GaussianState, GroundTruthPath, GroundTruthState, Result, StateSequence, Track,
};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct ResampleMetrics {
    /// RMS of the 2-D position error over every compared sample.
    pub pos_rmse_m: f64,
    pub compared: usize,
    /// Truth samples that fell outside the track's time span.
    pub discarded: usize,
}

/// Resamples `track` at the truth sample times and scores the position error.
pub fn resample_error(
    truth: &GroundTruthPath<GroundTruthState>,
    track: &Track<GaussianState>,
) -> Result<ResampleMetrics> {
    let times = truth.timestamps();
    let resampled = resample(track, &times)?;

    let truth_at: HashMap<_, _> = truth.iter().map(|s| (s.timestamp, s)).collect();

    let mut pos_err_sq = 0.0;
    let mut compared = 0;
    for est in resampled.sequence.iter() {
        let Some(gt) = truth_at.get(&est.timestamp) else {
            continue;
        };
        pos_err_sq += POSITION_INDICES
            .iter()
            .map(|&i| (est.state_vector[i] - gt.state_vector[i]).powi(2))
            .sum::<f64>();
        compared += 1;
    }

    let pos_rmse_m = if compared > 0 {
        (pos_err_sq / compared as f64).sqrt()
    } else {
        0.0
    };

    Ok(ResampleMetrics {
        pos_rmse_m,
        compared,
        discarded: resampled.discarded.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::{generate_track, TrackConfig};
    use crate::truth::{simulate_truth, TruthConfig};

    #[test]
    fn test_perfect_track_scores_zero() {
        let truth = simulate_truth(&TruthConfig::default()).unwrap();
        let track = generate_track(
            &truth,
            &TrackConfig {
                position_noise_std: 0.0,
                velocity_noise_std: 0.0,
                detection_probability: 1.0,
                seed: 3,
            },
        );

        let m = resample_error(&truth, &track).unwrap();
        assert_eq!(m.compared, truth.len());
        assert_eq!(m.discarded, 0);
        assert!(m.pos_rmse_m < 1e-12);
    }

    #[test]
    fn test_noisy_track_has_bounded_error() {
        let truth = simulate_truth(&TruthConfig {
            process_noise: 0.0,
            ..TruthConfig::default()
        })
        .unwrap();
        let track = generate_track(&truth, &TrackConfig::default());

        let m = resample_error(&truth, &track).unwrap();
        assert!(m.compared + m.discarded <= truth.len());
        assert!(m.compared > 0);
        // Straight-line truth: interpolation error comes only from the noise.
        assert!(m.pos_rmse_m > 0.0 && m.pos_rmse_m < 10.0, "rmse {}", m.pos_rmse_m);
    }

    #[test]
    fn test_single_state_track_reports_drops() {
        let truth = simulate_truth(&TruthConfig::default()).unwrap();
        let mut track = Track::new("lone");
        track.push(GaussianState::with_variances(
            truth[3].timestamp,
            truth[3].state_vector.clone(),
            &[1.0; 4],
        ));

        let m = resample_error(&truth, &track).unwrap();
        assert_eq!(m.compared, 1);
        assert_eq!(m.discarded, truth.len() - 1);
        assert_eq!(m.pos_rmse_m, 0.0);
    }
}
