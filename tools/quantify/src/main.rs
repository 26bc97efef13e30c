//! 命令行定量工具.
//!
//! 读取 `(c, z, h, w)` 或 `(c, h, w)` 的 npy 图像栈, 运行细胞核 (2D) 或体积 (3D) 流水线,
//! 打印结果表, 并可选地把叠加层写为 PNG.
//!
//! 用法:
//! ```text
//! cargo run --release -p quantify -- -i stack.npy --pipeline nuclei --pixel-width 0.325
//! cargo run --release -p quantify -- -i org_7_DAPI.npy --pipeline volume \
//!     --pixel-width 0.5 --voxel-depth 2 --overlay out/ -o org_7.tsv
//! ```

mod result;
mod runner;

use clap::Parser;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = runner::Args::parse();
    let level = if args.verbose {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    simple_logger::init_with_level(level)?;

    let report = runner::run(&args)?;
    report.analyze();
    if let Some(path) = args.output.as_deref() {
        report.save_tsv(path)?;
        log::info!("results written to {}", path.display());
    }
    Ok(())
}
