// ==========================================
// 车队数据集生成器
// ==========================================
// 用途: 生成可被 CsvFleetSource 读取的车队 CSV
// 用法: generate_fleet_dataset [out.csv] [size] [seed]
// 默认: tests/fixtures/datasets/fleet_25.csv 25 42
// ==========================================

use metro_fleet_dss::source::{write_fleet_csv, FleetDataSource, SyntheticFleetSource};
use std::error::Error;
use std::path::Path;

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let out = args
        .first()
        .cloned()
        .unwrap_or_else(|| "tests/fixtures/datasets/fleet_25.csv".to_string());
    let size: usize = match args.get(1) {
        Some(s) => s.parse()?,
        None => 25,
    };
    let seed: u64 = match args.get(2) {
        Some(s) => s.parse()?,
        None => 42,
    };

    if let Some(parent) = Path::new(&out).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let fleet = SyntheticFleetSource::new(size, seed).load_fleet()?;
    let rows = write_fleet_csv(&out, &fleet)?;

    println!("✓ 生成 {} ({} 列, seed={})", out, rows, seed);
    Ok(())
}
