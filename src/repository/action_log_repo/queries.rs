use super::core::{ActionLogRepository, ACTION_TS_FORMAT};
use crate::domain::action_log::{ActionLog, ActionType};
use crate::repository::error::RepositoryResult;
use chrono::NaiveDateTime;
use rusqlite::{params, Result as SqliteResult, Row};

impl ActionLogRepository {
    // ==========================================
    // 查询操作
    // ==========================================

    /// 最近 N 条操作日志（时间倒序）
    pub fn find_recent(&self, limit: usize) -> RepositoryResult<Vec<ActionLog>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT action_id, action_type, action_ts, actor, payload_json, detail
            FROM action_log
            ORDER BY action_ts DESC, rowid DESC
            LIMIT ?1
            "#,
        )?;

        let logs = stmt
            .query_map(params![limit as i64], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(logs)
    }

    /// 按操作类型查询
    pub fn find_by_type(&self, action_type: ActionType) -> RepositoryResult<Vec<ActionLog>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT action_id, action_type, action_ts, actor, payload_json, detail
            FROM action_log
            WHERE action_type = ?1
            ORDER BY action_ts DESC, rowid DESC
            "#,
        )?;

        let logs = stmt
            .query_map(params![action_type.as_str()], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(logs)
    }
}

fn map_row(row: &Row) -> SqliteResult<ActionLog> {
    let action_ts_str: String = row.get(2)?;
    let payload_json_str: Option<String> = row.get(4)?;

    // 解析时间戳
    let action_ts = NaiveDateTime::parse_from_str(&action_ts_str, ACTION_TS_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(ActionLog {
        action_id: row.get(0)?,
        action_type: row.get(1)?,
        action_ts,
        actor: row.get(3)?,
        payload_json: payload_json_str.and_then(|s| serde_json::from_str(&s).ok()),
        detail: row.get(5)?,
    })
}
