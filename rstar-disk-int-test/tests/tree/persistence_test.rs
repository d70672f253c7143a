use std::fs;

use rstar_disk::{RStarTree, SpatialError, StorageManager, TreeConfig};
use rstar_disk_int_test::test_util::{
    cleanup, create_test_context, point, region, run_test, search_sorted,
};

#[test]
fn test_reopen_restores_tree() {
    run_test(
        create_test_context,
        |ctx| {
            let (height, root_id) = {
                let mut tree = ctx.create_tree()?;
                for i in 0..200 {
                    tree.insert(point((i % 20) as f64, (i / 20) as f64))?;
                }
                let shape = (tree.height(), tree.root_id());
                tree.close()?;
                shape
            };

            let mut tree = ctx.open_tree()?;
            assert_eq!(tree.len(), 200);
            assert_eq!(tree.height(), height);
            assert_eq!(tree.root_id(), root_id);
            assert_eq!(tree.stats().resident_nodes, 0);

            let found = search_sorted(&mut tree, &region([0.0, 0.0], [4.0, 1.0]))?;
            assert_eq!(found.len(), 10);

            let report = tree.check_integrity()?;
            assert!(report.is_valid, "{:?}", report.errors);
            tree.close()
        },
        cleanup,
    )
}

#[test]
fn test_reopened_tree_accepts_inserts() {
    run_test(
        create_test_context,
        |ctx| {
            {
                let mut tree = ctx.create_tree()?;
                for i in 0..30 {
                    tree.insert(point(i as f64, i as f64))?;
                }
                tree.close()?;
            }
            {
                let mut tree = ctx.open_tree()?;
                for i in 30..60 {
                    tree.insert(point(i as f64, i as f64))?;
                }
                tree.close()?;
            }

            let mut tree = ctx.open_tree()?;
            assert_eq!(tree.len(), 60);
            let found = search_sorted(&mut tree, &region([0.0, 0.0], [100.0, 100.0]))?;
            assert_eq!(found, (0..60).map(|i| point(i as f64, i as f64)).collect::<Vec<_>>());
            assert!(tree.check_integrity()?.is_valid);
            tree.close()
        },
        cleanup,
    )
}

#[test]
fn test_write_through_without_close() {
    run_test(
        create_test_context,
        |ctx| {
            let mut tree = ctx.create_tree()?;
            for i in 0..25 {
                tree.insert(point(i as f64, 1.0))?;
            }
            // keep the first tree alive: everything must already be on disk
            let mut reader = ctx.open_tree()?;
            assert_eq!(reader.len(), 25);
            let found = search_sorted(&mut reader, &region([0.0, 0.0], [24.0, 2.0]))?;
            assert_eq!(found.len(), 25);
            reader.close()?;
            tree.close()
        },
        cleanup,
    )
}

#[test]
fn test_node_files_follow_naming() {
    run_test(
        create_test_context,
        |ctx| {
            let config = ctx.config().with_node_file_naming("n", ".bin");
            let mut tree = RStarTree::create(config.clone())?;
            for i in 0..10 {
                tree.insert(point(i as f64, 0.0))?;
            }
            let root_id = tree.root_id();
            tree.close()?;

            let storage = StorageManager::open(&config)?;
            let ids = storage.node_ids_on_disk()?;
            assert!(ids.contains(&root_id));
            for id in ids {
                let path = storage.node_path(id);
                let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
                assert_eq!(name, format!("n{}.bin", id));
                assert_eq!(storage.node_id_from_path(&path)?, id);
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_corrupt_node_reported() {
    run_test(
        create_test_context,
        |ctx| {
            let root_path = {
                let mut tree = ctx.create_tree()?;
                for i in 0..20 {
                    tree.insert(point(i as f64, 0.0))?;
                }
                let storage = StorageManager::open(&ctx.config())?;
                let path = storage.node_path(tree.root_id());
                tree.close()?;
                path
            };

            let mut bytes = fs::read(&root_path)?;
            let last = bytes.len() - 1;
            bytes[last] ^= 0xFF;
            fs::write(&root_path, bytes)?;

            let mut tree = ctx.open_tree()?;
            let mut search = tree.search(&region([0.0, -1.0], [20.0, 1.0]))?;
            assert!(matches!(search.next(), Some(Err(SpatialError::CorruptRecord(_)))));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_open_rejects_mismatched_config() {
    run_test(
        create_test_context,
        |ctx| {
            ctx.create_tree()?.close()?;
            let wider = TreeConfig::new(ctx.path(), 3).with_capacity(ctx.config().capacity);
            assert!(matches!(
                RStarTree::open(wider),
                Err(SpatialError::InvalidConfig(_))
            ));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_open_rejects_other_min_fill() {
    run_test(
        create_test_context,
        |ctx| {
            ctx.create_tree()?.close()?;
            let looser = ctx.config().with_min_fill(0.25);
            assert!(matches!(
                RStarTree::open(looser),
                Err(SpatialError::InvalidConfig(_))
            ));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_failed_split_leaves_tree_readable() {
    run_test(
        create_test_context,
        |ctx| {
            let blocked = {
                let mut tree = ctx.create_tree()?;
                let blocked = StorageManager::open(&ctx.config())?.node_path(2);
                for i in 0..4 {
                    tree.insert(point(i as f64, i as f64))?;
                }
                // the first split writes node 2
                fs::create_dir(&blocked)?;
                assert!(matches!(
                    tree.insert(point(9.0, 9.0)),
                    Err(SpatialError::Io(_))
                ));
                assert_eq!(tree.len(), 4);
                assert_eq!(tree.height(), 1);
                blocked
            };
            fs::remove_dir(&blocked)?;

            let mut tree = ctx.open_tree()?;
            assert_eq!(tree.len(), 4);
            let found = search_sorted(&mut tree, &region([-1.0, -1.0], [10.0, 10.0]))?;
            assert_eq!(found, (0..4).map(|i| point(i as f64, i as f64)).collect::<Vec<_>>());
            let report = tree.check_integrity()?;
            assert!(report.is_valid, "{:?}", report.errors);

            tree.insert(point(9.0, 9.0))?;
            assert_eq!(tree.height(), 2);
            assert!(tree.check_integrity()?.is_valid);
            tree.close()
        },
        cleanup,
    )
}
