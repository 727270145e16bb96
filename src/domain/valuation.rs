// ==========================================
// 航空器残值台账 - 估值记录
// ==========================================
// 职责: 引擎单次运行的输出行 (ValuationRecord)
// 约束: 与输入事件一一对应、同序；创建后不可变
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationRecord {
    /// 事件日期（原始文本）
    pub date: String,

    /// 累计在役时间
    pub time_in_service: f64,

    /// 工作类型
    pub work_type: String,

    /// 残值（RV），不做下限截断，可为负
    pub residual_value: f64,

    /// 维修储备金余额（MR）
    pub reserve_balance: f64,

    /// 备注，仅在本行发生储备金回收时非空
    pub note: String,
}

impl ValuationRecord {
    /// 本行是否发生了储备金回收
    pub fn is_recapture(&self) -> bool {
        !self.note.is_empty()
    }
}
