use rstar_disk::{HyperRectangle, RStarTree, SpatialPoint, SpatialResult, TreeConfig};
use std::backtrace::Backtrace;
use std::path::Path;
use std::time::{Duration, Instant};
use std::{env, fs, thread};

/// Runs a test with retry logic and error handling.
/// Tests run on the current thread so a panic is caught and reported with
/// the attempt it happened on.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> SpatialResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> SpatialResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> SpatialResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    const MAX_RETRIES: u32 = 3;
    let mut last_error: Option<String> = None;
    let mut last_backtrace: Option<String> = None;

    for attempt in 1..=MAX_RETRIES {
        let start_time = Instant::now();

        let result = std::panic::catch_unwind(|| {
            let backtrace = Backtrace::capture();
            match before() {
                Ok(ctx) => match test(ctx.clone()) {
                    Ok(_) => match after(ctx) {
                        Ok(_) => Ok(()),
                        Err(e) => Err((format!("After run failed: {:?}", e), backtrace.to_string())),
                    },
                    Err(e) => {
                        let _ = after(ctx);
                        Err((format!("Test failed: {:?}", e), backtrace.to_string()))
                    }
                },
                Err(e) => Err((format!("Before run failed: {:?}", e), backtrace.to_string())),
            }
        });

        let elapsed = start_time.elapsed();

        let failure = match result {
            Ok(Ok(_)) => return,
            Ok(Err((e, bt))) => {
                last_backtrace = Some(bt);
                e
            }
            Err(panic_err) => {
                let err_msg = if let Some(s) = panic_err.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_err.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                last_backtrace = Some(Backtrace::capture().to_string());
                format!("Panic: {}", err_msg)
            }
        };

        if attempt < MAX_RETRIES {
            eprintln!(
                "\n========== Test Attempt {}/{} Failed (took {:?}) ==========",
                attempt, MAX_RETRIES, elapsed
            );
            eprintln!("Error: {}", failure);
            eprintln!("Retrying in {}ms...\n", 100 * attempt);
            thread::sleep(Duration::from_millis(100 * attempt as u64));
        }
        last_error = Some(failure);
    }

    // All retries exhausted - print full details
    eprintln!("\n==================== TEST FAILED ====================");
    eprintln!("Failed after {} attempts", MAX_RETRIES);
    eprintln!("Last error: {}", last_error.as_deref().unwrap_or("Unknown"));
    if let Some(bt) = &last_backtrace {
        if !bt.is_empty() && !bt.contains("disabled") {
            eprintln!("\nBacktrace:\n{}", bt);
        }
    }
    eprintln!("=====================================================\n");

    panic!(
        "Test failed after {} attempts. Last error: {}",
        MAX_RETRIES,
        last_error.unwrap_or_default()
    );
}

/// A fresh tree directory and the configuration pointing at it.
///
/// The context does not hold the tree itself: each test creates or reopens
/// it so persistence across reopen can be exercised.
#[derive(Clone)]
pub struct TestContext {
    path: String,
    config: TreeConfig,
}

impl TestContext {
    pub fn new(path: String, config: TreeConfig) -> Self {
        Self { path, config }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn config(&self) -> TreeConfig {
        self.config.clone()
    }

    pub fn create_tree(&self) -> SpatialResult<RStarTree> {
        RStarTree::create(self.config())
    }

    pub fn open_tree(&self) -> SpatialResult<RStarTree> {
        RStarTree::open(self.config())
    }
}

pub fn random_path() -> String {
    let id = uuid::Uuid::new_v4();
    let temp_dir = env::temp_dir();
    temp_dir.join(format!("rstar_disk_{}", id)).to_string_lossy().into_owned()
}

/// Context for a 2-D tree with a small capacity, so a few dozen points
/// already build a multi-level tree.
pub fn create_test_context() -> SpatialResult<TestContext> {
    create_test_context_with(2, 4)
}

pub fn create_test_context_with(dimension: usize, capacity: usize) -> SpatialResult<TestContext> {
    let path = random_path();
    fs::create_dir_all(&path)?;
    let config = TreeConfig::new(&path, dimension)
        .with_capacity(capacity)
        .with_sync_writes(false);
    config.validate()?;
    Ok(TestContext::new(path, config))
}

pub fn cleanup(ctx: TestContext) -> SpatialResult<()> {
    let path = ctx.path().to_string();
    let max_retries = 5;

    for retry in 0..max_retries {
        if !Path::new(&path).exists() {
            return Ok(());
        }
        match fs::remove_dir_all(&path) {
            Ok(_) => return Ok(()),
            Err(e) if retry < max_retries - 1 => {
                log::warn!("Failed to remove {} (attempt {}): {}", path, retry + 1, e);
                thread::sleep(Duration::from_millis(50 * (retry as u64 + 1)));
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

pub fn point(x: f64, y: f64) -> SpatialPoint {
    SpatialPoint::from([x, y])
}

pub fn region(low: [f64; 2], high: [f64; 2]) -> HyperRectangle {
    // bounds in tests are always ordered
    HyperRectangle::from_bounds(low.to_vec(), high.to_vec()).unwrap_or_else(|e| panic!("{}", e))
}

/// Runs a region query to completion, sorted by coordinates.
pub fn search_sorted(
    tree: &mut RStarTree,
    query: &HyperRectangle,
) -> SpatialResult<Vec<SpatialPoint>> {
    let mut found = tree.search(query)?.collect::<SpatialResult<Vec<_>>>()?;
    sort_points(&mut found);
    Ok(found)
}

pub fn sort_points(points: &mut [SpatialPoint]) {
    points.sort_by(|a, b| {
        a.coords()
            .partial_cmp(b.coords())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
