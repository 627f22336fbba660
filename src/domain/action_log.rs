// ==========================================
// 地铁列车编组诱导系统 - 操作日志领域模型
// ==========================================
// 红线: 人工干预必须留痕
// 对齐: action_log 表
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

// ==========================================
// ActionLog - 操作日志
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    pub action_id: String,
    pub action_type: ActionType,
    pub action_ts: NaiveDateTime,
    pub actor: String,
    pub trainset_id: Option<String>, // 车队级操作为 None
    pub payload_json: Option<JsonValue>,
    pub detail: Option<String>,
}

// ==========================================
// ActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    ManualOverride, // 人工指定编组
    ClearOverride,  // 撤销人工指定
    RunInduction,   // 执行编组诱导
    TrainModel,     // 训练维修预测模型
    RefreshFleet,   // 刷新车队数据
    ConfigUpdate,   // 配置更新
}

impl ActionType {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ActionType::ManualOverride => "MANUAL_OVERRIDE",
            ActionType::ClearOverride => "CLEAR_OVERRIDE",
            ActionType::RunInduction => "RUN_INDUCTION",
            ActionType::TrainModel => "TRAIN_MODEL",
            ActionType::RefreshFleet => "REFRESH_FLEET",
            ActionType::ConfigUpdate => "CONFIG_UPDATE",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "MANUAL_OVERRIDE" => Some(ActionType::ManualOverride),
            "CLEAR_OVERRIDE" => Some(ActionType::ClearOverride),
            "RUN_INDUCTION" => Some(ActionType::RunInduction),
            "TRAIN_MODEL" => Some(ActionType::TrainModel),
            "REFRESH_FLEET" => Some(ActionType::RefreshFleet),
            "CONFIG_UPDATE" => Some(ActionType::ConfigUpdate),
            _ => None,
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}
