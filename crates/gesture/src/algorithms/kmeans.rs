use rand::{Rng, RngCore};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GestureError, Result};

/// Stop after `max_iterations` or once no center moves further than `epsilon`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TermCriteria {
    pub max_iterations: usize,
    pub epsilon: f32,
}

impl Default for TermCriteria {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            epsilon: 0.85,
        }
    }
}

/// Outcome of the best clustering attempt
#[derive(Debug, Clone)]
pub struct Clustering {
    /// Cluster index of every sample, in input order
    pub labels: Vec<usize>,
    pub centers: Vec<[f32; 3]>,
    /// Sum of squared distances from each sample to its center
    pub compactness: f64,
}

/// Lloyd's k-means over 3-channel samples with random initial centers.
///
/// Runs `attempts` independent initialisations and keeps the most compact one.
pub fn kmeans(
    samples: &[[f32; 3]],
    k: usize,
    criteria: TermCriteria,
    attempts: usize,
    rng: &mut dyn RngCore,
) -> Result<Clustering> {
    if k == 0 || attempts == 0 {
        return Err(GestureError::InvalidConfiguration(format!(
            "kmeans needs at least one cluster and one attempt (k={k}, attempts={attempts})"
        )));
    }
    if samples.len() < k {
        return Err(GestureError::InvalidConfiguration(format!(
            "kmeans needs at least {k} samples, got {}",
            samples.len()
        )));
    }

    let bounds = sample_bounds(samples);
    let mut best: Option<Clustering> = None;

    for attempt in 0..attempts {
        let centers: Vec<[f32; 3]> = (0..k).map(|_| random_center(&bounds, rng)).collect();
        let clustering = run_attempt(samples, centers, criteria);
        debug!(attempt, compactness = clustering.compactness, "kmeans attempt finished");

        let improves = best
            .as_ref()
            .is_none_or(|current| clustering.compactness < current.compactness);
        if improves {
            best = Some(clustering);
        }
    }

    best.ok_or_else(|| GestureError::InvalidConfiguration("kmeans produced no clustering".to_string()))
}

fn sample_bounds(samples: &[[f32; 3]]) -> [(f32, f32); 3] {
    let mut bounds = [(f32::INFINITY, f32::NEG_INFINITY); 3];
    for sample in samples {
        for (channel, &value) in sample.iter().enumerate() {
            bounds[channel].0 = bounds[channel].0.min(value);
            bounds[channel].1 = bounds[channel].1.max(value);
        }
    }
    bounds
}

/// Uniform point in the sample bounding box, widened by a margin of 1/3 per side.
fn random_center(bounds: &[(f32, f32); 3], rng: &mut dyn RngCore) -> [f32; 3] {
    let margin = 1.0 / 3.0;
    let mut center = [0.0; 3];
    for (channel, &(low, high)) in bounds.iter().enumerate() {
        let t: f32 = rng.gen_range(-margin..1.0 + margin);
        center[channel] = low + (high - low) * t;
    }
    center
}

fn squared_distance(a: &[f32; 3], b: &[f32; 3]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn nearest(sample: &[f32; 3], centers: &[[f32; 3]]) -> (usize, f32) {
    centers
        .iter()
        .enumerate()
        .map(|(index, center)| (index, squared_distance(sample, center)))
        .fold((0, f32::INFINITY), |best, candidate| {
            if candidate.1 < best.1 { candidate } else { best }
        })
}

fn run_attempt(samples: &[[f32; 3]], mut centers: Vec<[f32; 3]>, criteria: TermCriteria) -> Clustering {
    let k = centers.len();
    let mut labels = vec![0usize; samples.len()];
    let epsilon_sq = criteria.epsilon.max(0.0).powi(2);

    for _ in 0..criteria.max_iterations {
        for (label, sample) in labels.iter_mut().zip(samples) {
            *label = nearest(sample, &centers).0;
        }

        let mut sums = vec![[0.0f64; 3]; k];
        let mut counts = vec![0usize; k];
        for (&label, sample) in labels.iter().zip(samples) {
            counts[label] += 1;
            for channel in 0..3 {
                sums[label][channel] += sample[channel] as f64;
            }
        }

        let mut updated = centers.clone();
        for cluster in 0..k {
            if counts[cluster] > 0 {
                let n = counts[cluster] as f64;
                updated[cluster] = [
                    (sums[cluster][0] / n) as f32,
                    (sums[cluster][1] / n) as f32,
                    (sums[cluster][2] / n) as f32,
                ];
            }
        }

        // An empty cluster takes over the sample lying furthest from its own center
        for cluster in 0..k {
            if counts[cluster] > 0 {
                continue;
            }
            let donor = labels
                .iter()
                .zip(samples)
                .enumerate()
                .filter(|&(_, (&label, _))| counts[label] > 1)
                .map(|(index, (&label, sample))| (index, squared_distance(sample, &updated[label])))
                .fold(None, |best: Option<(usize, f32)>, candidate| match best {
                    Some(current) if current.1 >= candidate.1 => Some(current),
                    _ => Some(candidate),
                });
            if let Some((index, _)) = donor {
                counts[labels[index]] -= 1;
                labels[index] = cluster;
                counts[cluster] = 1;
                updated[cluster] = samples[index];
            }
        }

        let max_shift = centers
            .iter()
            .zip(&updated)
            .map(|(old, new)| squared_distance(old, new))
            .fold(0.0f32, f32::max);
        centers = updated;

        if max_shift <= epsilon_sq {
            break;
        }
    }

    let mut compactness = 0.0f64;
    for (label, sample) in labels.iter_mut().zip(samples) {
        let (index, distance) = nearest(sample, &centers);
        *label = index;
        compactness += distance as f64;
    }

    Clustering {
        labels,
        centers,
        compactness,
    }
}
