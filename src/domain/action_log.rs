// ==========================================
// 车辆租赁库存系统 - 操作日志领域模型
// ==========================================
// 用途: 管理操作审计（导入 / 清空）
// 对齐: action_log 表
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ==========================================
// ActionLog - 操作日志
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    pub action_id: String,
    pub action_type: String, // 操作类型 (存储为字符串)
    pub action_ts: NaiveDateTime,
    pub actor: String,
    pub payload_json: Option<JsonValue>,
    pub detail: Option<String>,
}

// ==========================================
// ActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    ImportVehicles,  // 导入车辆报价
    ClearImportData, // 清空导入数据
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::ImportVehicles => "IMPORT_VEHICLES",
            ActionType::ClearImportData => "CLEAR_IMPORT_DATA",
        }
    }
}

impl ActionLog {
    pub fn new(
        action_type: ActionType,
        actor: &str,
        payload_json: Option<JsonValue>,
        detail: Option<String>,
    ) -> Self {
        Self {
            action_id: uuid::Uuid::new_v4().to_string(),
            action_type: action_type.as_str().to_string(),
            action_ts: chrono::Utc::now().naive_utc(),
            actor: actor.to_string(),
            payload_json,
            detail,
        }
    }
}
