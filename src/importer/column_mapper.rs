// ==========================================
// 航空器残值台账 - 表头列角色映射
// ==========================================
// 职责: 按表头名定位 日期 / TIS / 工作类型 三个角色列
// 规则: 表头小写后做子串匹配；规则按顺序，每个角色取第一个命中的列
// 容错: 角色缺失不报错，由解析器以默认值填充
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 列角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnRole {
    Date,
    TimeInService,
    WorkType,
}

impl ColumnRole {
    pub const ALL: [ColumnRole; 3] = [
        ColumnRole::Date,
        ColumnRole::TimeInService,
        ColumnRole::WorkType,
    ];
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRole::Date => write!(f, "date"),
            ColumnRole::TimeInService => write!(f, "tis"),
            ColumnRole::WorkType => write!(f, "work type"),
        }
    }
}

/// 列角色识别规则（模式均为小写）
pub const COLUMN_ROLE_RULES: [(&str, ColumnRole); 6] = [
    ("date", ColumnRole::Date),
    ("tis", ColumnRole::TimeInService),
    ("time in service", ColumnRole::TimeInService),
    ("work type", ColumnRole::WorkType),
    ("work_type", ColumnRole::WorkType),
    ("worktype", ColumnRole::WorkType),
];

// ==========================================
// ColumnLayout - 列布局
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnLayout {
    pub date: Option<usize>,
    pub time_in_service: Option<usize>,
    pub work_type: Option<usize>,
}

impl ColumnLayout {
    /// 从表头行构造列布局
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Self {
        let lowered: Vec<String> = headers
            .iter()
            .map(|h| h.as_ref().trim().to_lowercase())
            .collect();

        let mut layout = Self::default();
        for (pattern, role) in COLUMN_ROLE_RULES {
            if layout.index_of(role).is_some() {
                continue;
            }
            if let Some(idx) = lowered.iter().position(|h| h.contains(pattern)) {
                *layout.slot_mut(role) = Some(idx);
            }
        }
        layout
    }

    /// 角色对应的列下标
    pub fn index_of(&self, role: ColumnRole) -> Option<usize> {
        match role {
            ColumnRole::Date => self.date,
            ColumnRole::TimeInService => self.time_in_service,
            ColumnRole::WorkType => self.work_type,
        }
    }

    /// 未找到的角色
    pub fn missing_roles(&self) -> Vec<ColumnRole> {
        ColumnRole::ALL
            .into_iter()
            .filter(|role| self.index_of(*role).is_none())
            .collect()
    }

    fn slot_mut(&mut self, role: ColumnRole) -> &mut Option<usize> {
        match role {
            ColumnRole::Date => &mut self.date,
            ColumnRole::TimeInService => &mut self.time_in_service,
            ColumnRole::WorkType => &mut self.work_type,
        }
    }
}
