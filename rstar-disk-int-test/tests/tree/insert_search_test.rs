use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstar_disk::{HyperRectangle, SpatialError, SpatialPoint};
use rstar_disk_int_test::test_util::{
    cleanup, create_test_context, create_test_context_with, point, region, run_test,
    search_sorted, sort_points,
};

#[test]
fn test_fourth_point_splits_root_leaf() {
    run_test(
        || create_test_context_with(2, 3),
        |ctx| {
            let mut tree = ctx.create_tree()?;
            for p in [point(0.0, 0.0), point(1.0, 1.0), point(5.0, 5.0)] {
                tree.insert(p)?;
            }
            assert_eq!(tree.stats().splits, 0);

            tree.insert(point(6.0, 6.0))?;
            assert_eq!(tree.stats().splits, 1);
            assert_eq!(tree.height(), 2);

            let found = search_sorted(&mut tree, &region([0.0, 0.0], [2.0, 2.0]))?;
            assert_eq!(found, vec![point(0.0, 0.0), point(1.0, 1.0)]);

            let found = search_sorted(&mut tree, &region([4.0, 4.0], [7.0, 7.0]))?;
            assert_eq!(found, vec![point(5.0, 5.0), point(6.0, 6.0)]);
            tree.close()
        },
        cleanup,
    )
}

#[test]
fn test_search_boundaries() {
    run_test(
        create_test_context,
        |ctx| {
            let mut tree = ctx.create_tree()?;
            for x in 0..10 {
                for y in 0..10 {
                    tree.insert(point(x as f64, y as f64))?;
                }
            }

            // region covering everything
            let all = search_sorted(&mut tree, &region([-1.0, -1.0], [10.0, 10.0]))?;
            assert_eq!(all.len(), 100);

            // disjoint region
            let none = search_sorted(&mut tree, &region([20.0, 20.0], [30.0, 30.0]))?;
            assert!(none.is_empty());

            // partial overlap, boundaries included
            let some = search_sorted(&mut tree, &region([2.0, 3.0], [4.0, 3.0]))?;
            assert_eq!(some, vec![point(2.0, 3.0), point(3.0, 3.0), point(4.0, 3.0)]);

            // a gap between grid points
            let gap = search_sorted(&mut tree, &region([2.2, 2.2], [2.8, 2.8]))?;
            assert!(gap.is_empty());

            assert!(tree.check_integrity()?.is_valid);
            tree.close()
        },
        cleanup,
    )
}

#[test]
fn test_random_points_against_brute_force() {
    run_test(
        || create_test_context_with(3, 12),
        |ctx| {
            let mut tree = ctx.create_tree()?;
            let mut rng = StdRng::seed_from_u64(42);
            let points: Vec<SpatialPoint> = (0..1500)
                .map(|_| {
                    SpatialPoint::from([
                        rng.random_range(-50.0..50.0),
                        rng.random_range(-50.0..50.0),
                        rng.random_range(-50.0..50.0),
                    ])
                })
                .collect();
            for p in &points {
                tree.insert(p.clone())?;
            }

            for _ in 0..25 {
                let mut low = Vec::new();
                let mut high = Vec::new();
                for _ in 0..3 {
                    let a: f64 = rng.random_range(-60.0..60.0);
                    let b: f64 = rng.random_range(-60.0..60.0);
                    low.push(a.min(b));
                    high.push(a.max(b));
                }
                let query = HyperRectangle::from_bounds(low, high)?;
                let mut expected: Vec<SpatialPoint> = points
                    .iter()
                    .filter(|p| query.contains_point(p))
                    .cloned()
                    .collect();
                sort_points(&mut expected);
                assert_eq!(search_sorted(&mut tree, &query)?, expected);
            }

            let report = tree.check_integrity()?;
            assert!(report.is_valid, "{:?}", report.errors);
            assert!(report.underfull_nodes.is_empty());
            assert_eq!(report.points_counted, 1500);
            tree.close()
        },
        cleanup,
    )
}

#[test]
fn test_search_is_lazy() {
    run_test(
        create_test_context,
        |ctx| {
            let mut tree = ctx.create_tree()?;
            for i in 0..64 {
                tree.insert(point(i as f64, 0.0))?;
            }
            tree.close()?;

            let mut tree = ctx.open_tree()?;
            let query = region([0.0, 0.0], [63.0, 0.0]);
            let first = tree.search(&query)?.take(1).collect::<Result<Vec<_>, _>>()?;
            assert_eq!(first.len(), 1);
            let loads_for_one = tree.stats().node_loads;

            let all = search_sorted(&mut tree, &query)?;
            assert_eq!(all.len(), 64);
            assert!(tree.stats().node_loads > loads_for_one);
            tree.close()
        },
        cleanup,
    )
}

#[test]
fn test_wrong_dimension_rejected() {
    run_test(
        create_test_context,
        |ctx| {
            let mut tree = ctx.create_tree()?;
            let err = tree.insert(SpatialPoint::from([1.0, 2.0, 3.0])).unwrap_err();
            assert!(matches!(err, SpatialError::InvalidOperation(_)));
            assert!(tree.search(&HyperRectangle::new(1)).is_err());
            assert_eq!(tree.len(), 0);
            tree.close()
        },
        cleanup,
    )
}

#[test]
fn test_non_finite_point_rejected() {
    run_test(
        create_test_context,
        |ctx| {
            let mut tree = ctx.create_tree()?;
            tree.insert(point(1.0, 1.0))?;
            let err = tree.insert(point(f64::NAN, 1.0)).unwrap_err();
            assert!(matches!(err, SpatialError::InvalidOperation(_)));
            assert!(tree.insert(point(f64::INFINITY, 0.0)).is_err());
            assert_eq!(tree.len(), 1);

            let found = search_sorted(&mut tree, &region([0.0, 0.0], [2.0, 2.0]))?;
            assert_eq!(found, vec![point(1.0, 1.0)]);
            assert!(tree.check_integrity()?.is_valid);
            tree.close()
        },
        cleanup,
    )
}
