// ==========================================
// 航空器残值台账 - 折旧计算引擎
// ==========================================
// 职责: 对按文件顺序排列的维修事件做有状态折叠，输出残值曲线
// 输入: Vec<MaintenanceEvent> + AssetTypeParameters
// 输出: Vec<ValuationRecord>（与输入等长、同序）
// ==========================================
// 计算规则（逐事件）:
// 1) delta_tis = tis - last_tis（不做下限截断）
// 2) 永久折旧 = delta_tis * permanent_rate → 直接从残值扣减
// 3) 可变折旧 = delta_tis * variable_rate → 计入维修储备金
// 4) 经济折旧 = initial_price * annual_rate * (delta_tis / 2000) → 直接从残值扣减
// 5) 大修检（B/C/D-Check）→ 储备金回收至残值，储备金清零
// 红线: 引擎无失败路径，负值如实保留
// ==========================================

use crate::domain::event::{EventDate, MaintenanceEvent};
use crate::domain::params::AssetTypeParameters;
use crate::domain::valuation::ValuationRecord;
use tracing::instrument;

/// 默认大修检标记（区分大小写，任一命中即视为大修检）
pub const DEFAULT_MAJOR_CHECK_MARKERS: [&str; 3] = ["B-Check", "C-Check", "D-Check"];

/// 经过日历年数的换算天数
const DAYS_PER_YEAR: f64 = 365.0;

/// 生成储备金回收备注（金额取整到整数货币单位）
pub fn format_recapture_note(amount: f64) -> String {
    format!("Recaptured ${:.0} MR", amount.round())
}

// ==========================================
// EngineState - 单次运行状态
// ==========================================
/// 由一次 run 独占，运行结束即丢弃
#[derive(Debug, Clone)]
struct EngineState {
    current_residual_value: f64,
    accumulated_reserve: f64,
    last_time_in_service: f64,
    reference_start_date: Option<EventDate>,
}

impl EngineState {
    fn new(params: &AssetTypeParameters) -> Self {
        Self {
            current_residual_value: params.initial_price,
            accumulated_reserve: 0.0,
            last_time_in_service: 0.0,
            reference_start_date: None,
        }
    }

    /// 自首个事件以来经过的日历年数（仅用于诊断，不参与估值）
    fn years_since_start(&self, date: &EventDate) -> Option<f64> {
        let start = self.reference_start_date.as_ref()?.calendar()?;
        let current = date.calendar()?;
        Some((current - start).num_days() as f64 / DAYS_PER_YEAR)
    }
}

// ==========================================
// DepreciationEngine - 折旧计算引擎
// ==========================================
#[derive(Debug, Clone)]
pub struct DepreciationEngine {
    major_check_markers: Vec<String>,
}

impl DepreciationEngine {
    /// 使用默认大修检标记创建引擎
    pub fn new() -> Self {
        Self::with_major_check_markers(DEFAULT_MAJOR_CHECK_MARKERS.iter().map(|m| m.to_string()))
    }

    /// 使用自定义大修检标记创建引擎（空标记会被忽略）
    pub fn with_major_check_markers<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            major_check_markers: markers
                .into_iter()
                .map(Into::into)
                .filter(|m: &String| !m.is_empty())
                .collect(),
        }
    }

    pub fn major_check_markers(&self) -> &[String] {
        &self.major_check_markers
    }

    /// 工作类型是否为大修检
    pub fn is_major_check(&self, work_type: &str) -> bool {
        self.major_check_markers
            .iter()
            .any(|marker| work_type.contains(marker.as_str()))
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 执行一次完整估值
    ///
    /// 纯函数：相同事件序列与参数总是得到相同输出
    #[instrument(skip(self, events, params), fields(count = events.len()))]
    pub fn run(
        &self,
        events: &[MaintenanceEvent],
        params: &AssetTypeParameters,
    ) -> Vec<ValuationRecord> {
        let mut state = EngineState::new(params);
        let records: Vec<ValuationRecord> = events
            .iter()
            .map(|event| self.step(&mut state, event, params))
            .collect();

        tracing::debug!(
            final_residual_value = state.current_residual_value,
            final_reserve = state.accumulated_reserve,
            "估值完成"
        );

        records
    }

    /// 处理单个事件
    fn step(
        &self,
        state: &mut EngineState,
        event: &MaintenanceEvent,
        params: &AssetTypeParameters,
    ) -> ValuationRecord {
        if state.reference_start_date.is_none() {
            state.reference_start_date = Some(event.date.clone());
        }

        // 1. 利用小时增量
        let delta_tis = event.time_in_service - state.last_time_in_service;
        if delta_tis < 0.0 {
            tracing::warn!(
                row = event.row_number,
                delta_tis,
                "TIS 回退，折旧为负（按原值保留）"
            );
        }

        // 2~4. 永久折旧 / 可变折旧 / 经济折旧
        let permanent_amount = delta_tis * params.permanent_depreciation_rate;
        let variable_amount = delta_tis * params.variable_depreciation_rate;
        let economic_amount = params.economic_depreciation(delta_tis);

        state.current_residual_value -= permanent_amount + economic_amount;
        state.accumulated_reserve += variable_amount;

        // 5. 大修检回收储备金
        let mut note = String::new();
        if self.is_major_check(&event.work_type) {
            let recaptured = state.accumulated_reserve;
            state.current_residual_value += recaptured;
            state.accumulated_reserve = 0.0;
            note = format_recapture_note(recaptured);

            tracing::debug!(
                row = event.row_number,
                work_type = %event.work_type,
                recaptured,
                "大修检回收维修储备金"
            );
        }

        tracing::trace!(
            row = event.row_number,
            delta_tis,
            years_since_start = ?state.years_since_start(&event.date),
            residual_value = state.current_residual_value,
            "事件处理完成"
        );

        // 6. 输出记录
        let record = ValuationRecord {
            date: event.date.as_str().to_string(),
            time_in_service: event.time_in_service,
            work_type: event.work_type.clone(),
            residual_value: state.current_residual_value,
            reserve_balance: state.accumulated_reserve,
            note,
        };

        // 7. 推进 TIS
        state.last_time_in_service = event.time_in_service;

        record
    }
}

impl Default for DepreciationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// 使用默认大修检标记执行估值
pub fn run(events: &[MaintenanceEvent], params: &AssetTypeParameters) -> Vec<ValuationRecord> {
    DepreciationEngine::new().run(events, params)
}
