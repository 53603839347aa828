// ==========================================
// 车辆租赁库存系统 - 操作日志数据仓储
// ==========================================
// 对齐: action_log 表
// 红线: 导入 / 清空 操作均需记录
// ==========================================

mod core;
mod queries;


pub use core::ActionLogRepository;
