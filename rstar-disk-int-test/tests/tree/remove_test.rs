use rstar_disk::StorageManager;
use rstar_disk_int_test::test_util::{
    cleanup, create_test_context, point, region, run_test, search_sorted,
};

#[test]
fn test_remove_single_point() {
    run_test(
        create_test_context,
        |ctx| {
            let mut tree = ctx.create_tree()?;
            for i in 0..12 {
                tree.insert(point(i as f64, 0.0))?;
            }

            assert!(tree.remove(&point(4.0, 0.0))?);
            assert!(!tree.remove(&point(4.0, 0.0))?);
            assert_eq!(tree.len(), 11);

            let found = search_sorted(&mut tree, &region([3.0, 0.0], [5.0, 0.0]))?;
            assert_eq!(found, vec![point(3.0, 0.0), point(5.0, 0.0)]);
            assert!(tree.check_integrity()?.is_valid);
            tree.close()
        },
        cleanup,
    )
}

#[test]
fn test_remove_everything_collapses_tree() {
    run_test(
        create_test_context,
        |ctx| {
            let mut tree = ctx.create_tree()?;
            let points: Vec<_> = (0..50).map(|i| point((i * 7 % 50) as f64, (i % 5) as f64)).collect();
            for p in &points {
                tree.insert(p.clone())?;
            }
            assert!(tree.height() > 1);

            for (removed, p) in points.iter().enumerate() {
                assert!(tree.remove(p)?);
                assert_eq!(tree.len(), 49 - removed as u64);
            }
            assert!(tree.is_empty());
            assert_eq!(tree.height(), 1);

            let root_id = tree.root_id();
            tree.close()?;

            let storage = StorageManager::open(&ctx.config())?;
            assert_eq!(storage.node_ids_on_disk()?, vec![root_id]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_interleaved_insert_remove() {
    run_test(
        create_test_context,
        |ctx| {
            let mut tree = ctx.create_tree()?;
            for round in 0..5 {
                for i in 0..20 {
                    tree.insert(point(i as f64, round as f64))?;
                }
                for i in (0..20).step_by(2) {
                    assert!(tree.remove(&point(i as f64, round as f64))?);
                }
            }
            assert_eq!(tree.len(), 50);
            tree.close()?;

            let mut tree = ctx.open_tree()?;
            let found = search_sorted(&mut tree, &region([0.0, 0.0], [20.0, 5.0]))?;
            assert_eq!(found.len(), 50);
            assert!(found.iter().all(|p| p.coord(0) as i64 % 2 == 1));

            let report = tree.check_integrity()?;
            assert!(report.is_valid, "{:?}", report.errors);
            tree.close()
        },
        cleanup,
    )
}
