//! Population-normalized entity fingerprints.
//!
//! Each entity's traffic and token counters are reduced to a fixed
//! 8-dimension vector in [0, 1], normalized against the *current*
//! population's per-dimension min and max. The fingerprint expresses
//! relative standing among currently-observed peers — absolute traffic
//! volume is meaningless across sessions.
//!
//! Heavy-tailed quantities (packet counts, byte averages, sub-entity
//! counts) pass through `ln(1 + x)` before normalization. Without the log
//! transform a single outlier compresses every other entity into a sliver
//! of the range; this is a correctness requirement, not a style choice.
//!
//! Anomaly scoring is distance-from-centroid: `weirdness` is the Euclidean
//! distance of a fingerprint from the population's average profile, and
//! `max_dev_metric` names the dimension that contributed most — the "why"
//! behind an anomaly flag.

use serde::{Deserialize, Serialize};

/// Number of fingerprint dimensions.
pub const METRIC_COUNT: usize = 8;

/// Fingerprint dimensions, in vector order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Share of packets that are outbound.
    IoPackets,
    /// Share of bytes that are outbound.
    IoVolume,
    /// Outbound bytes per outbound packet (log scale).
    Upload,
    /// Inbound bytes per inbound packet (log scale).
    Download,
    /// Total packet count (log scale).
    Density,
    /// Bytes per packet across both directions (log scale).
    Heaviness,
    /// Sub-entity count (log scale).
    Sprawl,
    /// Unique tokens over total token weight.
    Lingo,
}

impl Metric {
    pub const ALL: [Metric; METRIC_COUNT] = [
        Metric::IoPackets,
        Metric::IoVolume,
        Metric::Upload,
        Metric::Download,
        Metric::Density,
        Metric::Heaviness,
        Metric::Sprawl,
        Metric::Lingo,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Metric::IoPackets => "io_pkt",
            Metric::IoVolume => "io_vol",
            Metric::Upload => "upload",
            Metric::Download => "download",
            Metric::Density => "density",
            Metric::Heaviness => "heaviness",
            Metric::Sprawl => "sprawl",
            Metric::Lingo => "lingo",
        }
    }
}

/// Per-entity counter snapshot consumed at fingerprinting time.
///
/// Internal counters are outbound (request) traffic, external counters
/// inbound (response) traffic.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawEntityStat {
    pub packet_count: f64,
    pub internal_bytes: f64,
    pub external_bytes: f64,
    pub internal_packets: f64,
    pub external_packets: f64,
    pub unique_tokens: usize,
    pub token_weight: f64,
    /// Number of sub-entities (e.g. sub-domains) under this entity.
    pub sub_entity_count: usize,
}

/// One entity's normalized fingerprint with anomaly attribution.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Fingerprint {
    pub entity: String,
    /// Normalized metric values in [0, 1], ordered per [`Metric::ALL`].
    pub metrics: [f64; METRIC_COUNT],
    /// Signed per-dimension distance from the population average.
    pub deviations: [f64; METRIC_COUNT],
    /// Euclidean distance from the population centroid.
    pub weirdness: f64,
    /// Dimension with the largest absolute deviation.
    pub max_dev_metric: Metric,
}

/// Output of one fingerprinting pass over a population snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FingerprintReport {
    pub fingerprints: Vec<Fingerprint>,
    /// Per-dimension mean of the normalized fingerprints. All zeros for an
    /// empty population.
    pub average_profile: [f64; METRIC_COUNT],
}

/// Stateless fingerprint computation over population snapshots.
#[derive(Clone, Copy, Debug, Default)]
pub struct EntityFingerprinter;

/// Ranges below this have no usable variance; such dimensions read as a
/// neutral 0.5 for every entity.
const RANGE_EPSILON: f64 = 1e-6;

impl EntityFingerprinter {
    /// Compute fingerprints, the average profile, and anomaly scores for a
    /// population snapshot.
    ///
    /// A single-entity population has no variance on any dimension, so
    /// every value reads 0.5 and its weirdness is 0.
    pub fn compute(&self, population: &[(String, RawEntityStat)]) -> FingerprintReport {
        if population.is_empty() {
            return FingerprintReport {
                fingerprints: Vec::new(),
                average_profile: [0.0; METRIC_COUNT],
            };
        }

        // Pass 1: raw metric vectors plus per-dimension extremes.
        let raw: Vec<[f64; METRIC_COUNT]> = population
            .iter()
            .map(|(_, stat)| Self::raw_metrics(stat))
            .collect();

        let mut min = [f64::INFINITY; METRIC_COUNT];
        let mut max = [f64::NEG_INFINITY; METRIC_COUNT];
        for vector in &raw {
            for dim in 0..METRIC_COUNT {
                min[dim] = min[dim].min(vector[dim]);
                max[dim] = max[dim].max(vector[dim]);
            }
        }

        // Pass 2: min-max normalize against the current population.
        let normalized: Vec<[f64; METRIC_COUNT]> = raw
            .iter()
            .map(|vector| {
                let mut out = [0.0; METRIC_COUNT];
                for dim in 0..METRIC_COUNT {
                    let range = max[dim] - min[dim];
                    out[dim] = if range < RANGE_EPSILON {
                        0.5
                    } else {
                        ((vector[dim] - min[dim]) / range).clamp(0.0, 1.0)
                    };
                }
                out
            })
            .collect();

        let mut average_profile = [0.0; METRIC_COUNT];
        for vector in &normalized {
            for dim in 0..METRIC_COUNT {
                average_profile[dim] += vector[dim];
            }
        }
        for value in &mut average_profile {
            *value /= normalized.len() as f64;
        }

        // Pass 3: deviations from the centroid and anomaly attribution.
        let fingerprints = population
            .iter()
            .zip(normalized)
            .map(|((entity, _), metrics)| {
                let mut deviations = [0.0; METRIC_COUNT];
                let mut sum_sq = 0.0;
                let mut max_dev = 0.0;
                let mut max_dev_metric = Metric::ALL[0];
                for dim in 0..METRIC_COUNT {
                    let dev = metrics[dim] - average_profile[dim];
                    deviations[dim] = dev;
                    sum_sq += dev * dev;
                    if dev.abs() > max_dev {
                        max_dev = dev.abs();
                        max_dev_metric = Metric::ALL[dim];
                    }
                }
                Fingerprint {
                    entity: entity.clone(),
                    metrics,
                    deviations,
                    weirdness: sum_sq.sqrt(),
                    max_dev_metric,
                }
            })
            .collect();

        FingerprintReport {
            fingerprints,
            average_profile,
        }
    }

    /// Derive the raw (pre-normalization) metric vector for one entity.
    fn raw_metrics(stat: &RawEntityStat) -> [f64; METRIC_COUNT] {
        let total_packets = stat.internal_packets + stat.external_packets;
        let total_bytes = stat.internal_bytes + stat.external_bytes;

        // Directional ratios read neutral when there is no traffic at all.
        let io_pkt = if total_packets > 0.0 {
            stat.internal_packets / total_packets
        } else {
            0.5
        };
        let io_vol = if total_bytes > 0.0 {
            stat.internal_bytes / total_bytes
        } else {
            0.5
        };

        let upload_avg = if stat.internal_packets > 0.0 {
            stat.internal_bytes / stat.internal_packets
        } else {
            0.0
        };
        let download_avg = if stat.external_packets > 0.0 {
            stat.external_bytes / stat.external_packets
        } else {
            0.0
        };
        let heaviness_avg = if stat.packet_count > 0.0 {
            total_bytes / stat.packet_count
        } else {
            0.0
        };

        let lingo = if stat.token_weight > 0.0 {
            stat.unique_tokens as f64 / stat.token_weight
        } else {
            0.0
        };

        [
            io_pkt,
            io_vol,
            upload_avg.ln_1p(),
            download_avg.ln_1p(),
            stat.packet_count.ln_1p(),
            heaviness_avg.ln_1p(),
            (stat.sub_entity_count as f64).ln_1p(),
            lingo,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(packets: f64, bytes: f64) -> RawEntityStat {
        RawEntityStat {
            packet_count: packets,
            internal_bytes: bytes / 2.0,
            external_bytes: bytes / 2.0,
            internal_packets: packets / 2.0,
            external_packets: packets / 2.0,
            unique_tokens: 10,
            token_weight: 40.0,
            sub_entity_count: 2,
        }
    }

    fn population(stats: &[(&str, RawEntityStat)]) -> Vec<(String, RawEntityStat)> {
        stats
            .iter()
            .map(|(name, s)| (name.to_string(), s.clone()))
            .collect()
    }

    #[test]
    fn test_empty_population() {
        let report = EntityFingerprinter.compute(&[]);
        assert!(report.fingerprints.is_empty());
        assert_eq!(report.average_profile, [0.0; METRIC_COUNT]);
    }

    #[test]
    fn test_single_entity_is_neutral() {
        let report =
            EntityFingerprinter.compute(&population(&[("solo.com", stat(100.0, 50_000.0))]));
        assert_eq!(report.fingerprints.len(), 1);
        let fp = &report.fingerprints[0];
        for dim in 0..METRIC_COUNT {
            assert_eq!(fp.metrics[dim], 0.5, "dim {dim} not neutral");
        }
        assert_eq!(fp.weirdness, 0.0);
    }

    #[test]
    fn test_uniform_population_is_neutral_with_zero_weirdness() {
        let report = EntityFingerprinter.compute(&population(&[
            ("a.com", stat(100.0, 50_000.0)),
            ("b.com", stat(100.0, 50_000.0)),
            ("c.com", stat(100.0, 50_000.0)),
        ]));
        for fp in &report.fingerprints {
            for dim in 0..METRIC_COUNT {
                assert_eq!(fp.metrics[dim], 0.5);
            }
            assert_eq!(fp.weirdness, 0.0);
        }
        assert_eq!(report.average_profile, [0.5; METRIC_COUNT]);
    }

    #[test]
    fn test_values_stay_in_unit_interval() {
        let report = EntityFingerprinter.compute(&population(&[
            ("a.com", stat(3.0, 900.0)),
            ("b.com", stat(900.0, 50.0)),
            ("c.com", stat(12_000.0, 9e9)),
        ]));
        for fp in &report.fingerprints {
            for &v in &fp.metrics {
                assert!((0.0..=1.0).contains(&v), "out of range: {v}");
            }
        }
    }

    #[test]
    fn test_density_outlier_dominates_weirdness() {
        // packet counts [10, 10, 1000]: after log + min-max the low entities
        // land at 0 and the outlier at 1 on the density dimension. Bytes
        // scale with packets so byte-per-packet dimensions stay flat and
        // density is the only variance source.
        let low_a = stat(10.0, 10_000.0);
        let low_b = stat(10.0, 10_000.0);
        let high = stat(1000.0, 1_000_000.0);

        let report = EntityFingerprinter.compute(&population(&[
            ("a.com", low_a),
            ("b.com", low_b),
            ("heavy.com", high),
        ]));

        let density = Metric::ALL
            .iter()
            .position(|m| *m == Metric::Density)
            .unwrap();
        let heavy = report
            .fingerprints
            .iter()
            .find(|f| f.entity == "heavy.com")
            .unwrap();
        let low = report
            .fingerprints
            .iter()
            .find(|f| f.entity == "a.com")
            .unwrap();

        assert_eq!(heavy.metrics[density], 1.0);
        assert_eq!(low.metrics[density], 0.0);

        let max_weirdness = report
            .fingerprints
            .iter()
            .map(|f| f.weirdness)
            .fold(0.0, f64::max);
        assert_eq!(heavy.weirdness, max_weirdness);
        assert_eq!(heavy.max_dev_metric, Metric::Density);
    }

    #[test]
    fn test_ten_x_outlier_detected_and_attributed() {
        let mut entities: Vec<(String, RawEntityStat)> = (0..8)
            .map(|i| (format!("node{i}.com"), stat(100.0 + i as f64, 50_000.0)))
            .collect();
        let mut outlier = stat(100.0, 50_000.0);
        outlier.sub_entity_count = 200; // ~10x the population's sprawl
        entities.push(("sprawler.com".to_string(), outlier));

        let report = EntityFingerprinter.compute(&entities);
        let weirdest = report
            .fingerprints
            .iter()
            .max_by(|a, b| a.weirdness.partial_cmp(&b.weirdness).unwrap())
            .unwrap();

        assert_eq!(weirdest.entity, "sprawler.com");
        assert_eq!(weirdest.max_dev_metric, Metric::Sprawl);
        assert!(weirdest.weirdness > 0.0);
    }

    #[test]
    fn test_zero_traffic_entity_reads_neutral_ratios() {
        let idle = RawEntityStat::default();
        let busy = stat(100.0, 50_000.0);
        let report =
            EntityFingerprinter.compute(&population(&[("idle.com", idle), ("busy.com", busy)]));
        let fp = report
            .fingerprints
            .iter()
            .find(|f| f.entity == "idle.com")
            .unwrap();
        // io ratios were 0.5 raw for both entities: no variance, so the
        // normalized dimension is neutral rather than divided by ~zero
        assert_eq!(fp.metrics[0], 0.5);
        assert_eq!(fp.metrics[1], 0.5);
    }

    #[test]
    fn test_report_serializes() {
        let report =
            EntityFingerprinter.compute(&population(&[("a.com", stat(10.0, 1000.0))]));
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("average_profile"));
        assert!(json.contains("a.com"));
        let back: FingerprintReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.fingerprints.len(), 1);
    }
}
