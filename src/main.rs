// ==========================================
// 地铁列车编组诱导系统 - 命令行主入口
// ==========================================
// 用法: metro-fleet-dss [db_path] [fleet_csv] [export_dir]
// - db_path: 省略时取 METRO_FLEET_DSS_DB_PATH 或用户数据目录
// - fleet_csv: 省略或 "-" 时使用模拟车队
// - export_dir: 提供时导出 CSV/JSON
// 输出: 车队报告 JSON（stdout）
// ==========================================

use std::path::Path;

use metro_fleet_dss::api::{ApiError, FleetApi};
use metro_fleet_dss::app::{get_default_db_path, AppState};
use metro_fleet_dss::source::synthetic::DEFAULT_FLEET_SIZE;
use metro_fleet_dss::source::{CsvFleetSource, FleetDataSource, SyntheticFleetSource};
use metro_fleet_dss::logging;

const SYNTHETIC_SEED: u64 = 42;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let db_path = args
        .first()
        .cloned()
        .unwrap_or_else(get_default_db_path);
    let fleet_csv = args.get(1).filter(|s| s.as_str() != "-").cloned();
    let export_dir = args.get(2).cloned();

    tracing::info!("==================================================");
    tracing::info!("{} v{}", metro_fleet_dss::APP_NAME, metro_fleet_dss::VERSION);
    tracing::info!("==================================================");

    let source: Box<dyn FleetDataSource> = match &fleet_csv {
        Some(path) => Box::new(CsvFleetSource::new(path)),
        None => Box::new(SyntheticFleetSource::new(DEFAULT_FLEET_SIZE, SYNTHETIC_SEED)),
    };

    let mut state = AppState::new(&db_path, source)?;
    let api = FleetApi::new("cli");

    let count = api.load_fleet(&mut state)?;
    tracing::info!(count, db_path = %db_path, "车队加载完成");

    match api.train_predictor(&mut state).await {
        Ok(summary) => tracing::info!(
            samples = summary.samples,
            mae = summary.training_mae_days,
            "预测模型已训练"
        ),
        Err(ApiError::InsufficientTrainingData { samples, required }) => {
            tracing::warn!(samples, required, "历史样本不足, 使用启发式维修预测")
        }
        Err(e) => return Err(e.into()),
    }

    let report = api.run_induction(&mut state).await?;

    if let Some(dir) = export_dir {
        let summary = api.export_outputs(&state, Path::new(&dir))?;
        tracing::info!(dir = %dir, rows = summary.rows_written, "结果已导出");
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
