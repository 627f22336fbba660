// ==========================================
// 地铁列车编组诱导系统 - 领域类型定义
// ==========================================
// 职责: 编组建议、运营状态、保洁、工单、告警等枚举
// 红线: 编组建议只允许 Service / Standby / IBL 三种标签
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 编组建议 (Recommendation)
// ==========================================
// 红线: 任意时刻只能是三种标签之一
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Recommendation {
    Service, // 投入运营
    #[default]
    Standby, // 备用
    #[serde(rename = "IBL")]
    Ibl, // 入库检修 (In Bay/Line)
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Recommendation {
    /// 从字符串解析编组建议（大小写不敏感）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "SERVICE" => Some(Recommendation::Service),
            "STANDBY" => Some(Recommendation::Standby),
            "IBL" => Some(Recommendation::Ibl),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Service => "Service",
            Recommendation::Standby => "Standby",
            Recommendation::Ibl => "IBL",
        }
    }
}

// ==========================================
// 运营状态 (Operational Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationalStatus {
    Available,   // 可用
    Standby,     // 备用
    Maintenance, // 检修中
    #[serde(rename = "IBL")]
    Ibl, // 已入库
}

impl fmt::Display for OperationalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationalStatus::Available => write!(f, "Available"),
            OperationalStatus::Standby => write!(f, "Standby"),
            OperationalStatus::Maintenance => write!(f, "Maintenance"),
            OperationalStatus::Ibl => write!(f, "IBL"),
        }
    }
}

// ==========================================
// 保洁状态 (Cleaning Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CleaningStatus {
    Clean,
    #[serde(rename = "Requires Cleaning")]
    RequiresCleaning,
}

impl fmt::Display for CleaningStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleaningStatus::Clean => write!(f, "Clean"),
            CleaningStatus::RequiresCleaning => write!(f, "Requires Cleaning"),
        }
    }
}

// ==========================================
// 工单优先级 (Job Card Priority)
// ==========================================
// 顺序: Low < Medium < High < Critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum JobPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for JobPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobPriority::Low => write!(f, "Low"),
            JobPriority::Medium => write!(f, "Medium"),
            JobPriority::High => write!(f, "High"),
            JobPriority::Critical => write!(f, "Critical"),
        }
    }
}

// ==========================================
// 维修类型 (Maintenance Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaintenanceType {
    Preventive, // 预防性
    Corrective, // 纠正性
    Inspection, // 例行检查
    Overhaul,   // 大修
}

impl fmt::Display for MaintenanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaintenanceType::Preventive => write!(f, "Preventive"),
            MaintenanceType::Corrective => write!(f, "Corrective"),
            MaintenanceType::Inspection => write!(f, "Inspection"),
            MaintenanceType::Overhaul => write!(f, "Overhaul"),
        }
    }
}

// ==========================================
// 告警优先级 / 维修优先级 (Priority)
// ==========================================
// 顺序: Low < Medium < High < Critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "Low"),
            Priority::Medium => write!(f, "Medium"),
            Priority::High => write!(f, "High"),
            Priority::Critical => write!(f, "Critical"),
        }
    }
}

// ==========================================
// 告警类型 (Alert Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    FitnessExpiry,      // 适用证书即将到期
    ComponentWear,      // 部件磨损严重
    BrandingDeficit,    // 广告曝光不足
    ServiceShortfall,   // 可上线列车不足
    AssignmentConflict, // 编组冲突
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertType::FitnessExpiry => write!(f, "FITNESS_EXPIRY"),
            AlertType::ComponentWear => write!(f, "COMPONENT_WEAR"),
            AlertType::BrandingDeficit => write!(f, "BRANDING_DEFICIT"),
            AlertType::ServiceShortfall => write!(f, "SERVICE_SHORTFALL"),
            AlertType::AssignmentConflict => write!(f, "ASSIGNMENT_CONFLICT"),
        }
    }
}
