//! 程序运行函数.

use crate::algos::{self, PHANTOMS};
use crate::result::AblationResult;
use std::thread;
use utils::loader::{self, PhantomLoader};

/// 实际运行.
pub fn run() -> AblationResult {
    let extent = loader::extent_from_env_or_default();
    let seed = loader::seed_from_env_or_default();

    // 短路判断
    assert!(
        PhantomLoader::new(extent, seed, PHANTOMS).any(|(_, r)| !r.is_empty()),
        "All phantoms are empty"
    );

    println!(
        "Running ablation studies on {PHANTOMS} phantoms (extent {extent}, seed {seed}, {} cpus)...",
        utils::cpus()
    );
    thread::scope(|s| {
        let tasks = [
            algos::dilation,
            algos::erosion,
            algos::algebra,
            algos::boundary,
        ];
        let handles = tasks.map(|t| s.spawn(t));

        AblationResult::from_iter(
            ["dilation", "erosion", "algebra", "boundary"].into_iter().zip(
                handles
                    .into_iter()
                    .map(|th| th.join().expect("Thread joining error")),
            ),
        )
    })
}
