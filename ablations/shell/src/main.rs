//! 在合成体模上比较行程编码算法与稠密体素参照的一致性与耗时.
//!
//! 体模规模与随机种子分别由 `$ROI_ABLATION_EXTENT` 与 `$ROI_ABLATION_SEED` 控制.

mod algos;
mod result;
mod runner;

fn main() {
    simple_logger::init_with_level(log::Level::Info).unwrap();

    let result = runner::run();
    result.analyze();
    if !result.all_matched() {
        log::warn!("Some results differ from the dense reference");
        std::process::exit(1);
    }
}
