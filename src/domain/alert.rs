// ==========================================
// 地铁列车编组诱导系统 - 告警领域模型
// ==========================================
// 用途: AlertManager 输出, 每次调用重新生成, 不做跨次去重
// ==========================================

use crate::domain::types::{AlertType, Priority};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub alert_id: String,
    pub alert_type: AlertType,
    pub priority: Priority,
    pub message: String,
    pub trainset_id: Option<String>, // 车队级告警为 None
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    pub fn new(
        alert_type: AlertType,
        priority: Priority,
        message: impl Into<String>,
        trainset_id: Option<&str>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            alert_id: Uuid::new_v4().to_string(),
            alert_type,
            priority,
            message: message.into(),
            trainset_id: trainset_id.map(|s| s.to_string()),
            timestamp,
        }
    }
}
