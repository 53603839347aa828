// ==========================================
// 车辆租赁库存系统 - 操作限流
// ==========================================
// 职责: 按用户的滑动窗口计数，限制操作日志写入频率
// 约束: 跟踪用户数有上限，超限淘汰最久未出现的用户
// 说明: 时间来源通过 Clock 注入，测试可控
// ==========================================

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::debug;

/// 默认最多跟踪的用户数
pub const DEFAULT_MAX_TRACKED_USERS: usize = 1_000;

// ==========================================
// Clock - 时间来源
// ==========================================
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// 系统单调时钟
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// 手动推进的时钟
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(|e| e.into_inner());
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = self.offset.lock().unwrap_or_else(|e| e.into_inner());
        self.base + *offset
    }
}

#[derive(Debug)]
struct UserWindow {
    events: VecDeque<Instant>,
    last_seen: Instant,
}

// ==========================================
// ActivityThrottle - 按用户限流
// ==========================================
pub struct ActivityThrottle<C: Clock = SystemClock> {
    clock: C,
    window: Duration,
    max_events: usize,
    max_users: usize,
    users: Mutex<HashMap<String, UserWindow>>,
}

impl ActivityThrottle<SystemClock> {
    pub fn with_system_clock(window: Duration, max_events: usize) -> Self {
        Self::new(SystemClock, window, max_events, DEFAULT_MAX_TRACKED_USERS)
    }
}

impl<C: Clock> ActivityThrottle<C> {
    /// # 参数
    /// - window: 计数窗口
    /// - max_events: 窗口内单用户最多允许次数
    /// - max_users: 最多跟踪的用户数（至少 1）
    pub fn new(clock: C, window: Duration, max_events: usize, max_users: usize) -> Self {
        Self {
            clock,
            window,
            max_events,
            max_users: max_users.max(1),
            users: Mutex::new(HashMap::new()),
        }
    }

    /// 记录一次操作；窗口内已达上限时返回 false（本次不计数）
    pub fn allow(&self, user_id: &str) -> bool {
        let now = self.clock.now();
        let mut users = self.users.lock().unwrap_or_else(|e| e.into_inner());

        if !users.contains_key(user_id) && users.len() >= self.max_users {
            let oldest = users
                .iter()
                .min_by_key(|(_, w)| w.last_seen)
                .map(|(id, _)| id.clone());
            if let Some(id) = oldest {
                debug!(user_id = %id, "淘汰最久未活动用户");
                users.remove(&id);
            }
        }

        let entry = users.entry(user_id.to_string()).or_insert_with(|| UserWindow {
            events: VecDeque::new(),
            last_seen: now,
        });

        while entry
            .events
            .front()
            .map_or(false, |ts| now.duration_since(*ts) >= self.window)
        {
            entry.events.pop_front();
        }
        entry.last_seen = now;

        if entry.events.len() < self.max_events {
            entry.events.push_back(now);
            true
        } else {
            false
        }
    }

    /// 当前跟踪的用户数
    pub fn tracked_users(&self) -> usize {
        self.users.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
