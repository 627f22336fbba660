// ==========================================
// 地铁列车编组诱导系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::config_reader::FleetConfigReader;
use crate::config::error::{ConfigError, ConfigResult};
use crate::config::settings::{AlertThresholds, FleetConstraints, ForestSettings, ObjectiveWeights};
use crate::db::{ensure_schema, open_in_memory_connection, open_sqlite_connection};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 基于内存库创建（不落盘）
    pub fn in_memory() -> ConfigResult<Self> {
        let conn = open_in_memory_connection()?;
        ensure_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接执行建表（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| ConfigError::LockError(e.to_string()))?;
            ensure_schema(&guard)?;
        }

        Ok(Self { conn })
    }

    /// 共享连接（供操作日志仓储复用）
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    pub fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入配置值（UPSERT）
    ///
    /// # 说明
    /// - 只接受 config_keys 中登记过的键
    /// - 写入前按键的类型做解析校验, 非法值直接拒绝
    pub fn update_config(&self, key: &str, value: &str) -> ConfigResult<()> {
        config_keys::validate(key, value)?;

        let conn = self
            .conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value.trim()],
        )?;

        info!(key, value, "配置已更新");
        Ok(())
    }

    /// 整组更新六项目标权重
    ///
    /// # 说明
    /// - 先校验整组权重 (非负、合计为 1.0), 不合法时不写入任何键
    /// - 六个键在同一事务内写入
    pub fn update_objective_weights(&self, weights: &ObjectiveWeights) -> ConfigResult<()> {
        weights.validate()?;

        let conn = self
            .conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))?;

        let tx = conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
                 ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            )?;
            for (key, value) in [
                (config_keys::WEIGHT_PUNCTUALITY, weights.punctuality),
                (config_keys::WEIGHT_COST_EFFICIENCY, weights.cost_efficiency),
                (config_keys::WEIGHT_BRANDING_COMPLIANCE, weights.branding_compliance),
                (config_keys::WEIGHT_MAINTENANCE_RISK, weights.maintenance_risk),
                (config_keys::WEIGHT_ENERGY_EFFICIENCY, weights.energy_efficiency),
                (config_keys::WEIGHT_OPERATIONAL_FLEXIBILITY, weights.operational_flexibility),
            ] {
                stmt.execute(params![key, value.to_string()])?;
            }
        }
        tx.commit()?;

        info!(sum = weights.sum(), "目标权重已整组更新");
        Ok(())
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 编组诱导运行时写入操作日志, 便于事后复盘
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&config_map)?)
    }

    /// 读取并解析配置, 缺失时返回默认值
    fn get_parsed_or<T>(&self, key: &str, default: T) -> ConfigResult<T>
    where
        T: FromStr,
    {
        match self.get_config_value(key)? {
            Some(raw) => parse_value(key, &raw),
            None => {
                debug!(key, "配置缺失, 使用默认值");
                Ok(default)
            }
        }
    }
}

/// 解析配置字符串
fn parse_value<T: FromStr>(key: &str, raw: &str) -> ConfigResult<T> {
    raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("无法解析配置值 '{}'", raw),
    })
}

#[async_trait]
impl FleetConfigReader for ConfigManager {
    async fn get_fleet_constraints(&self) -> ConfigResult<FleetConstraints> {
        let defaults = FleetConstraints::default();
        Ok(FleetConstraints {
            target_service: self
                .get_parsed_or(config_keys::TARGET_SERVICE_COUNT, defaults.target_service)?,
            max_ibl: self.get_parsed_or(config_keys::MAX_IBL_COUNT, defaults.max_ibl)?,
            strict_partition: self
                .get_parsed_or(config_keys::STRICT_PARTITION, defaults.strict_partition)?,
        })
    }

    async fn get_objective_weights(&self) -> ConfigResult<ObjectiveWeights> {
        let d = ObjectiveWeights::default();
        let weights = ObjectiveWeights {
            punctuality: self.get_parsed_or(config_keys::WEIGHT_PUNCTUALITY, d.punctuality)?,
            cost_efficiency: self
                .get_parsed_or(config_keys::WEIGHT_COST_EFFICIENCY, d.cost_efficiency)?,
            branding_compliance: self
                .get_parsed_or(config_keys::WEIGHT_BRANDING_COMPLIANCE, d.branding_compliance)?,
            maintenance_risk: self
                .get_parsed_or(config_keys::WEIGHT_MAINTENANCE_RISK, d.maintenance_risk)?,
            energy_efficiency: self
                .get_parsed_or(config_keys::WEIGHT_ENERGY_EFFICIENCY, d.energy_efficiency)?,
            operational_flexibility: self.get_parsed_or(
                config_keys::WEIGHT_OPERATIONAL_FLEXIBILITY,
                d.operational_flexibility,
            )?,
        };
        weights.validate()?;
        Ok(weights)
    }

    async fn get_alert_thresholds(&self) -> ConfigResult<AlertThresholds> {
        let d = AlertThresholds::default();
        Ok(AlertThresholds {
            fitness_expiry_days: self
                .get_parsed_or(config_keys::ALERT_FITNESS_EXPIRY_DAYS, d.fitness_expiry_days)?,
            wear_critical_pct: self
                .get_parsed_or(config_keys::ALERT_WEAR_CRITICAL_PCT, d.wear_critical_pct)?,
            branding_deficit_hours: self.get_parsed_or(
                config_keys::ALERT_BRANDING_DEFICIT_HOURS,
                d.branding_deficit_hours,
            )?,
            min_service_ready: self
                .get_parsed_or(config_keys::ALERT_MIN_SERVICE_READY, d.min_service_ready)?,
        })
    }

    async fn get_forest_settings(&self) -> ConfigResult<ForestSettings> {
        let d = ForestSettings::default();
        let settings = ForestSettings {
            tree_count: self.get_parsed_or(config_keys::FOREST_TREE_COUNT, d.tree_count)?,
            max_depth: self.get_parsed_or(config_keys::FOREST_MAX_DEPTH, d.max_depth)?,
            min_samples_split: self
                .get_parsed_or(config_keys::FOREST_MIN_SAMPLES_SPLIT, d.min_samples_split)?,
            seed: self.get_parsed_or(config_keys::FOREST_SEED, d.seed)?,
        };
        if settings.tree_count == 0 {
            return Err(ConfigError::InvalidValue {
                key: config_keys::FOREST_TREE_COUNT.to_string(),
                message: "随机森林至少需要 1 棵树".to_string(),
            });
        }
        Ok(settings)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    use crate::config::error::{ConfigError, ConfigResult};

    // 编组约束
    pub const TARGET_SERVICE_COUNT: &str = "target_service_count";
    pub const MAX_IBL_COUNT: &str = "max_ibl_count";
    pub const STRICT_PARTITION: &str = "strict_partition";

    // 六目标权重
    pub const WEIGHT_PUNCTUALITY: &str = "weight_punctuality";
    pub const WEIGHT_COST_EFFICIENCY: &str = "weight_cost_efficiency";
    pub const WEIGHT_BRANDING_COMPLIANCE: &str = "weight_branding_compliance";
    pub const WEIGHT_MAINTENANCE_RISK: &str = "weight_maintenance_risk";
    pub const WEIGHT_ENERGY_EFFICIENCY: &str = "weight_energy_efficiency";
    pub const WEIGHT_OPERATIONAL_FLEXIBILITY: &str = "weight_operational_flexibility";

    // 告警阈值
    pub const ALERT_FITNESS_EXPIRY_DAYS: &str = "alert_fitness_expiry_days";
    pub const ALERT_WEAR_CRITICAL_PCT: &str = "alert_wear_critical_pct";
    pub const ALERT_BRANDING_DEFICIT_HOURS: &str = "alert_branding_deficit_hours";
    pub const ALERT_MIN_SERVICE_READY: &str = "alert_min_service_ready";

    // 随机森林
    pub const FOREST_TREE_COUNT: &str = "forest_tree_count";
    pub const FOREST_MAX_DEPTH: &str = "forest_max_depth";
    pub const FOREST_MIN_SAMPLES_SPLIT: &str = "forest_min_samples_split";
    pub const FOREST_SEED: &str = "forest_seed";

    enum ValueKind {
        Count,
        Real,
        Flag,
        Days,
    }

    fn kind_of(key: &str) -> Option<ValueKind> {
        match key {
            TARGET_SERVICE_COUNT | MAX_IBL_COUNT | ALERT_MIN_SERVICE_READY | FOREST_TREE_COUNT
            | FOREST_MAX_DEPTH | FOREST_MIN_SAMPLES_SPLIT | FOREST_SEED => Some(ValueKind::Count),
            WEIGHT_PUNCTUALITY
            | WEIGHT_COST_EFFICIENCY
            | WEIGHT_BRANDING_COMPLIANCE
            | WEIGHT_MAINTENANCE_RISK
            | WEIGHT_ENERGY_EFFICIENCY
            | WEIGHT_OPERATIONAL_FLEXIBILITY
            | ALERT_WEAR_CRITICAL_PCT
            | ALERT_BRANDING_DEFICIT_HOURS => Some(ValueKind::Real),
            STRICT_PARTITION => Some(ValueKind::Flag),
            ALERT_FITNESS_EXPIRY_DAYS => Some(ValueKind::Days),
            _ => None,
        }
    }

    /// 校验键是否已登记, 值是否可解析
    pub fn validate(key: &str, value: &str) -> ConfigResult<()> {
        let invalid = |message: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        };

        let v = value.trim();
        match kind_of(key) {
            None => Err(invalid("未登记的配置键")),
            Some(ValueKind::Count) => v.parse::<u64>().map(|_| ()).map_err(|_| invalid("需要非负整数")),
            Some(ValueKind::Days) => v.parse::<i64>().map(|_| ()).map_err(|_| invalid("需要整数天数")),
            Some(ValueKind::Flag) => v.parse::<bool>().map(|_| ()).map_err(|_| invalid("需要 true/false")),
            Some(ValueKind::Real) => match v.parse::<f64>() {
                Ok(x) if x.is_finite() && x >= 0.0 => Ok(()),
                _ => Err(invalid("需要非负实数")),
            },
        }
    }
}
