use std::path::Path;

use rstar_disk::{RStarTree, SaveStatus, StorageManager};
use rstar_disk_int_test::test_util::{cleanup, create_test_context, point, run_test};

#[test]
fn test_export_and_import_snapshot() {
    run_test(
        create_test_context,
        |ctx| {
            let mut tree = ctx.create_tree()?;
            for i in 0..40 {
                tree.insert(point(i as f64, (i * i) as f64))?;
            }

            let export = Path::new(ctx.path()).join("export.tree");
            assert_eq!(tree.save_tree(&export), SaveStatus::Saved);
            // an existing destination is replaced
            assert_eq!(tree.save_tree(&export), SaveStatus::Saved);

            let snapshot = StorageManager::load_tree(&export)?;
            assert_eq!(snapshot, tree.snapshot());
            assert_eq!(snapshot.entry_count, 40);
            assert_eq!(snapshot.root_id, tree.root_id());
            tree.close()?;

            // reattach the node store through the exported snapshot
            let config = ctx.config().with_tree_file("export.tree");
            let mut tree = RStarTree::open(config)?;
            assert_eq!(tree.len(), 40);
            assert!(tree.check_integrity()?.is_valid);
            tree.close()
        },
        cleanup,
    )
}

#[test]
fn test_unwritable_destination_is_status() {
    run_test(
        create_test_context,
        |ctx| {
            let tree = ctx.create_tree()?;
            let missing = Path::new(ctx.path()).join("no").join("such").join("dir.tree");
            assert_eq!(tree.save_tree(&missing), SaveStatus::DestinationUnwritable);
            assert!(!tree.save_tree(&missing).is_saved());
            tree.close()
        },
        cleanup,
    )
}
