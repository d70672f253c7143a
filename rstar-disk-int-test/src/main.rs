use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstar_disk::{HyperRectangle, SpatialPoint, SpatialResult};
use rstar_disk_int_test::test_util::{cleanup, create_test_context_with};

fn main() -> SpatialResult<()> {
    colog::init();
    println!("Starting stress test...");
    let ctx = create_test_context_with(2, 64)?;

    let count = 100000;
    let mut rng = StdRng::seed_from_u64(2024);
    let mut tree = ctx.create_tree()?;

    let start = std::time::Instant::now();
    for _ in 0..count {
        tree.insert(SpatialPoint::from([
            rng.random_range(0.0..10000.0),
            rng.random_range(0.0..10000.0),
        ]))?;
    }
    let elapsed = start.elapsed();
    println!(
        "Inserted {} points in {:?} (height {}, {} splits)",
        count,
        elapsed,
        tree.height(),
        tree.stats().splits
    );
    tree.close()?;

    let mut tree = ctx.open_tree()?;
    let start = std::time::Instant::now();
    let mut found = 0usize;
    for _ in 0..1000 {
        let x = rng.random_range(0.0..9900.0);
        let y = rng.random_range(0.0..9900.0);
        let query = HyperRectangle::from_bounds(vec![x, y], vec![x + 100.0, y + 100.0])?;
        for point in tree.search(&query)? {
            point?;
            found += 1;
        }
    }
    println!(
        "Ran 1000 region queries in {:?} ({} hits, {} nodes loaded)",
        start.elapsed(),
        found,
        tree.stats().node_loads
    );

    let start = std::time::Instant::now();
    for _ in 0..1000 {
        let query = SpatialPoint::from([
            rng.random_range(0.0..10000.0),
            rng.random_range(0.0..10000.0),
        ]);
        tree.nearest(&query, 10)?;
    }
    println!("Ran 1000 nearest-10 queries in {:?}", start.elapsed());

    let start = std::time::Instant::now();
    let report = tree.check_integrity()?;
    println!(
        "Checked {} nodes in {:?}: {}",
        report.nodes_checked,
        start.elapsed(),
        if report.is_valid { "valid" } else { "INVALID" }
    );
    for error in &report.errors {
        println!("  {}", error);
    }

    tree.close()?;
    cleanup(ctx)?;
    println!("Stress test completed.");
    Ok(())
}
