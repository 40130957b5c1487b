use kmeval::{KMeans, KMeansConfig, KMeansError, Point, State};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::thread;

fn two_pairs() -> Vec<Point> {
    vec![
        Point::labeled(vec![0.0, 0.0], 0),
        Point::labeled(vec![0.0, 1.0], 0),
        Point::labeled(vec![10.0, 10.0], 1),
        Point::labeled(vec![10.0, 11.0], 1),
    ]
}

/// Three square blobs of side 2 around (0,0), (8,0) and (0,8)
fn blobs(per_blob: usize, seed: u64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    let origins = [(0.0, 0.0), (8.0, 0.0), (0.0, 8.0)];
    let mut points = Vec::with_capacity(per_blob * origins.len());
    for (class, &(x, y)) in origins.iter().enumerate() {
        for _ in 0..per_blob {
            let dx: f64 = rng.gen_range(-1.0..1.0);
            let dy: f64 = rng.gen_range(-1.0..1.0);
            points.push(Point::labeled(vec![x + dx, y + dy], class));
        }
    }
    points
}

fn engine(k: usize, seed: u64) -> KMeans {
    KMeans::new(k, 3, KMeansConfig::default().with_seed(seed))
}

#[test]
fn two_pairs_separate_for_any_start() {
    let points = two_pairs();
    for seed in 0..24 {
        let mut engine = KMeans::new(2, 2, KMeansConfig::default().with_seed(seed));
        engine.fit(&points).unwrap();
        assert!(engine.is_convergent());
        assert_eq!(engine.state(), State::Converged);

        let mut clusters = engine.clusters().to_vec();
        clusters.sort_by(|a, b| a.centroid[0].total_cmp(&b.centroid[0]));
        assert_eq!(clusters[0].centroid, vec![0.0, 0.5]);
        assert_eq!(clusters[1].centroid, vec![10.0, 10.5]);
        assert_eq!(clusters[0].members.len(), 2);
        assert_eq!(clusters[1].members.len(), 2);
        for cluster in &clusters {
            assert!((cluster.scatter(&points).unwrap() - 0.5).abs() < 1e-12);
        }

        let a = engine.assignments();
        assert_eq!(a[0], a[1]);
        assert_eq!(a[2], a[3]);
        assert_ne!(a[0], a[2]);
        assert!((engine.cluster_scatter(&points).unwrap() - 1.0).abs() < 1e-12);
    }
}

#[test]
fn converged_clusters_are_never_empty() {
    let points = blobs(20, 7);
    for k in 1..=8 {
        for seed in 0..4 {
            let mut engine = engine(k, seed);
            engine.fit(&points).unwrap();
            assert_eq!(engine.clusters().len(), k);
            assert!(engine.clusters().iter().all(|c| !c.is_empty()));
            assert_eq!(engine.cluster_sizes().iter().sum::<usize>(), points.len());
            assert!(engine.assignments().iter().all(|a| a.is_some_and(|c| c < k)));
        }
    }
}

// Duplicated centers leave a cluster empty until a restart picks distinct ones
#[test]
fn empty_cluster_recovers_by_restarting() {
    let mut points = vec![Point::labeled(vec![0.0, 0.0], 0); 8];
    points.push(Point::labeled(vec![5.0, 5.0], 1));
    points.push(Point::labeled(vec![6.0, 5.0], 1));

    let mut recovered = 0;
    for seed in 0..64 {
        let config = KMeansConfig::default()
            .with_seed(seed)
            .with_max_restarts(100);
        let mut engine = KMeans::new(2, 2, config);
        engine.fit(&points).unwrap();
        assert!(engine.is_convergent());
        assert!(engine.clusters().iter().all(|c| !c.is_empty()));
        if engine.restarts() > 0 {
            recovered += 1;
        }
    }
    assert!(recovered > 0);
}

#[test]
fn repeated_assignment_is_stable() {
    let points = blobs(15, 3);
    let mut engine = engine(3, 1);
    engine.fit(&points).unwrap();
    let before = engine.assignments().to_vec();

    assert_eq!(engine.assign(&points).unwrap(), 0);
    assert_eq!(engine.assign(&points).unwrap(), 0);
    assert_eq!(engine.assignments(), &before[..]);
    assert!(engine.is_convergent());
}

#[test]
fn scatter_never_increases() {
    let points = blobs(30, 11);
    for seed in 0..6 {
        let mut engine = engine(3, seed);
        engine.initialize(&points).unwrap();
        engine.assign(&points).unwrap();

        let mut steps = 0;
        while !engine.is_convergent() && steps < 100 {
            let before = engine.cluster_scatter(&points).unwrap();
            let restarts = engine.restarts();
            engine.update(&points).unwrap();
            // a reinitialization starts the objective over
            if engine.restarts() == restarts {
                let after = engine.cluster_scatter(&points).unwrap();
                assert!(after <= before + 1e-9, "{} > {}", after, before);
            }
            steps += 1;
        }
        assert!(engine.is_convergent());
    }
}

#[test]
fn same_seed_same_result() {
    let points = blobs(25, 5);
    let mut a = KMeans::with_rng(4, 3, KMeansConfig::default(), StdRng::seed_from_u64(42));
    let mut b = KMeans::with_rng(4, 3, KMeansConfig::default(), StdRng::seed_from_u64(42));
    a.fit(&points).unwrap();
    b.fit(&points).unwrap();
    assert_eq!(a.assignments(), b.assignments());
    assert_eq!(a.clusters(), b.clusters());
}

#[test]
fn threaded_assignment_matches_serial() {
    let points = blobs(40, 9);
    let serial = KMeansConfig::default().with_seed(3);
    let threaded = serial.clone().with_threads(4);

    let mut a = KMeans::new(3, 3, serial);
    let mut b = KMeans::new(3, 3, threaded);
    a.fit(&points).unwrap();
    b.fit(&points).unwrap();
    assert_eq!(a.assignments(), b.assignments());
    assert_eq!(a.iterations(), b.iterations());
}

// Engines keep their own assignments, so runs can share the points
#[test]
fn concurrent_runs_share_points() {
    let points = blobs(20, 2);
    let results: Vec<Vec<Option<usize>>> = thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|seed| {
                let points = &points;
                s.spawn(move || {
                    let mut engine = engine(3, seed);
                    engine.fit(points).unwrap();
                    engine.assignments().to_vec()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for (seed, assignments) in results.iter().enumerate() {
        let mut engine = engine(3, seed as u64);
        engine.fit(&points).unwrap();
        assert_eq!(engine.assignments(), &assignments[..]);
    }
}

#[test]
fn reinitialize_starts_over() {
    let points = blobs(10, 4);
    let mut engine = engine(3, 8);
    engine.fit(&points).unwrap();
    assert!(engine.iterations() > 0);

    engine.initialize(&points).unwrap();
    assert_eq!(engine.iterations(), 0);
    assert_eq!(engine.restarts(), 0);
    assert!(!engine.is_convergent());
    assert!(engine.assignments().iter().all(Option::is_none));
    assert!(engine.clusters().iter().all(|c| c.is_empty()));
}

#[test]
fn k_above_point_count_is_rejected() {
    let points = two_pairs();
    let mut engine = KMeans::new(5, 2, KMeansConfig::default());
    assert!(matches!(
        engine.fit(&points),
        Err(KMeansError::InvalidClusterCount { k: 5, n: 4 })
    ));
}
