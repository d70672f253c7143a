use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstar_disk::SpatialPoint;
use rstar_disk_int_test::test_util::{cleanup, create_test_context, point, run_test};

#[test]
fn test_nearest_on_grid() {
    run_test(
        create_test_context,
        |ctx| {
            let mut tree = ctx.create_tree()?;
            for x in 0..10 {
                for y in 0..10 {
                    tree.insert(point(x as f64, y as f64))?;
                }
            }

            let found = tree.nearest(&point(3.1, 6.9), 1)?;
            assert_eq!(found.len(), 1);
            assert_eq!(found[0].0, point(3.0, 7.0));

            let found = tree.nearest(&point(-5.0, 0.0), 2)?;
            assert_eq!(found[0], (point(0.0, 0.0), 5.0));
            assert_eq!(found[1].0, point(0.0, 1.0));
            tree.close()
        },
        cleanup,
    )
}

#[test]
fn test_nearest_after_reopen_matches_brute_force() {
    run_test(
        create_test_context,
        |ctx| {
            let mut rng = StdRng::seed_from_u64(9);
            let points: Vec<SpatialPoint> = (0..400)
                .map(|_| point(rng.random_range(0.0..1000.0), rng.random_range(0.0..1000.0)))
                .collect();
            {
                let mut tree = ctx.create_tree()?;
                for p in &points {
                    tree.insert(p.clone())?;
                }
                tree.close()?;
            }

            let mut tree = ctx.open_tree()?;
            for _ in 0..10 {
                let query = point(rng.random_range(0.0..1000.0), rng.random_range(0.0..1000.0));
                let found = tree.nearest(&query, 8)?;

                let mut expected: Vec<f64> = points
                    .iter()
                    .map(|p| p.distance_squared(&query).sqrt())
                    .collect();
                expected.sort_by(|a, b| a.total_cmp(b));
                let distances: Vec<f64> = found.iter().map(|(_, d)| *d).collect();
                assert_eq!(distances, expected[..8].to_vec());
            }
            tree.close()
        },
        cleanup,
    )
}
