// ==========================================
// 航空器残值台账 - 机队批量估值
// ==========================================
// 职责: 多架航空器的独立估值并发执行
// 说明: 每架一次独立 run，互不共享状态；输出顺序与输入一致
// ==========================================

use crate::domain::event::MaintenanceEvent;
use crate::domain::params::AssetTypeParameters;
use crate::domain::valuation::ValuationRecord;
use crate::engine::depreciation::DepreciationEngine;
use futures::future::join_all;
use std::sync::Arc;
use tokio::task::JoinError;

/// 单架航空器的估值输入
#[derive(Debug, Clone)]
pub struct FleetAsset {
    /// 标识（注册号 / 文件名）
    pub label: String,
    pub events: Vec<MaintenanceEvent>,
    pub params: AssetTypeParameters,
}

/// 单架航空器的估值输出
#[derive(Debug, Clone, PartialEq)]
pub struct FleetValuation {
    pub label: String,
    pub records: Vec<ValuationRecord>,
}

impl FleetValuation {
    /// 最新残值（无事件时为 None）
    pub fn latest_residual_value(&self) -> Option<f64> {
        self.records.last().map(|r| r.residual_value)
    }
}

/// 并发估值整个机队
///
/// 引擎计算为 CPU 密集型，放入 blocking 线程池执行
pub async fn value_fleet(
    engine: Arc<DepreciationEngine>,
    assets: Vec<FleetAsset>,
) -> Result<Vec<FleetValuation>, JoinError> {
    tracing::info!(assets = assets.len(), "开始机队估值");

    let handles = assets.into_iter().map(|asset| {
        let engine = Arc::clone(&engine);
        tokio::task::spawn_blocking(move || FleetValuation {
            records: engine.run(&asset.events, &asset.params),
            label: asset.label,
        })
    });

    join_all(handles).await.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::EventDate;
    use crate::domain::params::ModelParameterTable;
    use crate::domain::types::AssetTypeKey;

    fn asset(label: &str, key: AssetTypeKey, tis: &[f64]) -> FleetAsset {
        FleetAsset {
            label: label.to_string(),
            events: tis
                .iter()
                .map(|t| MaintenanceEvent::new(EventDate::parse("2024-01-01"), *t, "Line"))
                .collect(),
            params: *ModelParameterTable::builtin().get(key),
        }
    }

    #[tokio::test]
    async fn test_value_fleet_matches_sequential_runs() {
        let engine = Arc::new(DepreciationEngine::new());
        let assets = vec![
            asset("HL7001", AssetTypeKey::B787, &[0.0, 500.0, 1500.0]),
            asset("HL7002", AssetTypeKey::A320, &[100.0]),
            asset("HL7003", AssetTypeKey::Default, &[]),
        ];

        let expected: Vec<Vec<ValuationRecord>> = assets
            .iter()
            .map(|a| engine.run(&a.events, &a.params))
            .collect();

        let results = value_fleet(Arc::clone(&engine), assets).await.unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].label, "HL7001");
        assert_eq!(results[2].label, "HL7003");
        for (result, records) in results.iter().zip(expected) {
            assert_eq!(result.records, records);
        }
        assert_eq!(results[2].latest_residual_value(), None);
        assert!(results[0].latest_residual_value().unwrap() < 190_000_000.0);
    }
}
