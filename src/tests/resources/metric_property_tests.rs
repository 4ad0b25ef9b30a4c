use crate::{
    AlertThresholds, Metric, UserSettings, build_snapshot, create_cpu_metric, evaluate_alerts,
    evaluate_with_settings,
};
use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rand::{SeedableRng, rngs::StdRng};

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn expected_percentage(metric: &Metric) -> f64 {
    if metric.total > 0.0 {
        round_to_tenth(metric.used / metric.total * 100.0)
    } else {
        0.0
    }
}

proptest! {
    #[test]
    fn metric_percentage_stays_in_range(used in 0.0f64..10_000.0, total in 0.0f64..10_000.0) {
        let metric = Metric::new(used, total, "GB");
        prop_assert!(metric.percentage >= 0.0);
        if total <= 0.0 {
            prop_assert_eq!(metric.percentage, 0.0);
        }
        if used <= total {
            prop_assert!(metric.percentage <= 100.0);
        }
    }

    #[test]
    fn cpu_metric_has_one_load_per_core(seed in any::<u64>(), cores in 1u32..64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let cpu = create_cpu_metric(&mut rng, cores);
        prop_assert_eq!(cpu.load_per_core.len(), cores as usize);
        prop_assert!(cpu.load_per_core.iter().all(|load| *load >= 0.0));
        prop_assert!((5.0..=70.0).contains(&cpu.average_load));
    }

    #[test]
    fn generated_snapshots_are_well_formed(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let snapshot = build_snapshot(&mut rng, "endpoint-1", at);

        prop_assert_eq!(snapshot.id.as_str(), "endpoint-1");
        prop_assert!((1..=3).contains(&snapshot.nodes.len()));
        for guest in snapshot.vms.iter().chain(&snapshot.lxcs) {
            prop_assert!(snapshot.node(&guest.node_id).is_some());
        }
        for node in &snapshot.nodes {
            prop_assert!((0.0..=100.0).contains(&node.memory.percentage));
            prop_assert_eq!(node.cpu.load_per_core.len(), node.cpu.cores as usize);
        }
    }

    #[test]
    fn generated_gauges_derive_their_percentage(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let snapshot = build_snapshot(&mut rng, "endpoint-1", Utc::now());

        let mut gauges: Vec<(String, &Metric)> = Vec::new();
        for node in &snapshot.nodes {
            gauges.push((format!("{} cpu", node.id), &node.cpu.metric));
            gauges.push((format!("{} memory", node.id), &node.memory));
            gauges.push((format!("{} swap", node.id), &node.swap));
            for pool in &node.storage_pools {
                gauges.push((format!("{} pool {}", node.id, pool.id), &pool.metric));
            }
        }
        for guest in snapshot.vms.iter().chain(&snapshot.lxcs) {
            gauges.push((format!("{} memory", guest.id), &guest.memory));
            gauges.push((format!("{} disk", guest.id), &guest.disk));
        }

        prop_assert!(!gauges.is_empty());
        for (label, metric) in gauges {
            prop_assert_eq!(metric.percentage, expected_percentage(metric), "{}", label);
        }
    }

    #[test]
    fn alert_evaluation_is_deterministic(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let snapshot = build_snapshot(&mut rng, "endpoint-1", Utc::now());
        let thresholds = AlertThresholds::default();

        let first = evaluate_alerts(&snapshot, &thresholds);
        let second = evaluate_alerts(&snapshot, &thresholds);
        prop_assert_eq!(&first, &second);
        prop_assert!(first.iter().all(|alert| alert.timestamp == snapshot.last_updated));

        let settings = UserSettings { alert_on_containers: true, ..UserSettings::default() };
        prop_assert!(evaluate_with_settings(&snapshot, &settings).len() >= first.len());
    }
}
