// ==========================================
// 航空器残值台账 - 估值 API
// ==========================================
// 职责: 履历处理、估值产物存证、按记录 ID 回取
// 流程: 机型识别 → 履历解析 → 折旧计算 → 序列化 → 内容存储 → 索引追加
// ==========================================

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::config::valuation_config_trait::ValuationConfigReader;
use crate::domain::types::AssetTypeKey;
use crate::domain::valuation::ValuationRecord;
use crate::engine::depreciation::DepreciationEngine;
use crate::engine::fleet::{value_fleet, FleetAsset, FleetValuation};
use crate::engine::model_detector::ModelDetector;
use crate::exporter::valuation_csv::{from_delimited_text, to_delimited_text};
use crate::importer::file_parser::UniversalLogReader;
use crate::importer::log_parser::{MaintenanceLogParser, ParseWarning};
use crate::repository::record_index_repo::RecordIndexRepository;
use crate::storage::content_store::ContentStore;

/// 产物存储名前缀
pub const PROCESSED_ARTIFACT_PREFIX: &str = "PROCESSED_";

// ==========================================
// 返回类型
// ==========================================

/// 履历处理结果（未存证）
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedLog {
    pub model_key: AssetTypeKey,
    pub records: Vec<ValuationRecord>,
    pub warnings: Vec<ParseWarning>,
    /// 序列化后的估值产物
    pub artifact: String,
}

/// 存证回执
#[derive(Debug, Clone, Serialize)]
pub struct AnchorReceipt {
    pub record_id: i64,
    pub content_id: String,
    pub run_id: String,
    pub model_key: AssetTypeKey,
    pub records: Vec<ValuationRecord>,
    pub warnings: Vec<ParseWarning>,
}

/// 回取结果
#[derive(Debug, Clone, Serialize)]
pub struct FetchedValuation {
    pub record_id: i64,
    pub content_id: String,
    pub records: Vec<ValuationRecord>,
}

// ==========================================
// ValuationApi - 估值 API
// ==========================================

/// 估值API
///
/// 职责：
/// 1. 履历处理（解析 + 估值 + 序列化）
/// 2. 估值产物存证（内容存储 + 索引追加，仅管理员）
/// 3. 按记录 ID 回取并解码估值产物
/// 4. 索引哈希链校验
pub struct ValuationApi {
    config: Arc<dyn ValuationConfigReader>,
    content_store: Arc<dyn ContentStore>,
    record_index: Arc<RecordIndexRepository>,
    detector: ModelDetector,
}

impl ValuationApi {
    /// 创建新的ValuationApi实例
    pub fn new(
        config: Arc<dyn ValuationConfigReader>,
        content_store: Arc<dyn ContentStore>,
        record_index: Arc<RecordIndexRepository>,
    ) -> Self {
        Self {
            config,
            content_store,
            record_index,
            detector: ModelDetector::new(),
        }
    }

    async fn build_engine(&self) -> ApiResult<DepreciationEngine> {
        let markers = self.config.get_major_check_markers().await?;
        Ok(DepreciationEngine::with_major_check_markers(markers))
    }

    /// 处理一份维修履历文本
    ///
    /// # 参数
    /// - label: 航空器标识（通常为文件名），用于机型识别
    /// - raw_text: 履历分隔符文本
    ///
    /// # 返回
    /// - Ok(ProcessedLog): 估值记录、解析告警与序列化产物
    /// - Err(ApiError): 配置读取或序列化失败
    #[instrument(skip(self, raw_text), fields(bytes = raw_text.len()))]
    pub async fn process_log(&self, label: &str, raw_text: &str) -> ApiResult<ProcessedLog> {
        let table = self.config.get_parameter_table().await?;
        let engine = self.build_engine().await?;

        let model_key = self.detector.detect(label);
        let parsed = MaintenanceLogParser.parse(raw_text);
        let records = engine.run(&parsed.events, table.get(model_key));
        let artifact = to_delimited_text(&records)?;

        tracing::info!(
            %model_key,
            records = records.len(),
            recaptures = records.iter().filter(|r| r.is_recapture()).count(),
            warnings = parsed.warnings.len(),
            "履历处理完成"
        );

        Ok(ProcessedLog {
            model_key,
            records,
            warnings: parsed.warnings,
            artifact,
        })
    }

    /// 处理一个履历文件（CSV / Excel），文件名作为机型识别标识
    pub async fn process_file<P: AsRef<Path>>(&self, path: P) -> ApiResult<ProcessedLog> {
        let path = path.as_ref();
        let raw_text = UniversalLogReader.read(path)?;
        self.process_log(&file_label(path), &raw_text).await
    }

    /// 处理并存证一份维修履历
    ///
    /// 先校验调用方权限，再上传产物，避免无权限调用方在存储中留下孤立内容
    ///
    /// # 返回
    /// - Ok(AnchorReceipt): 新记录 ID 与内容标识
    /// - Err(ApiError::Unauthorized): 调用方不是管理员
    #[instrument(skip(self, raw_text))]
    pub async fn anchor_log(
        &self,
        caller: &str,
        label: &str,
        raw_text: &str,
    ) -> ApiResult<AnchorReceipt> {
        if !self.record_index.is_admin(caller)? {
            return Err(ApiError::Unauthorized(caller.to_string()));
        }

        let processed = self.process_log(label, raw_text).await?;

        let artifact_name = format!("{}{}", PROCESSED_ARTIFACT_PREFIX, label);
        let content_id = self
            .content_store
            .put(&artifact_name, processed.artifact.as_bytes())
            .await?;

        let run_id = Uuid::new_v4().to_string();
        let record_id = self.record_index.append(caller, &content_id, &run_id)?;

        tracing::info!(record_id, %content_id, %run_id, "估值产物已存证");

        Ok(AnchorReceipt {
            record_id,
            content_id,
            run_id,
            model_key: processed.model_key,
            records: processed.records,
            warnings: processed.warnings,
        })
    }

    /// 处理并存证一个履历文件
    pub async fn anchor_file<P: AsRef<Path>>(
        &self,
        caller: &str,
        path: P,
    ) -> ApiResult<AnchorReceipt> {
        let path = path.as_ref();
        let raw_text = UniversalLogReader.read(path)?;
        self.anchor_log(caller, &file_label(path), &raw_text).await
    }

    /// 按记录 ID 回取估值产物
    ///
    /// # 返回
    /// - Err(ApiError::NotFound): 记录 ID 未分配
    /// - Err(ApiError::IntegrityViolation): 存储内容与内容标识不符
    #[instrument(skip(self))]
    pub async fn fetch_valuation(&self, record_id: i64) -> ApiResult<FetchedValuation> {
        let content_id = self.record_index.require_content_id(record_id)?;
        let bytes = self.content_store.get(&content_id).await?;

        let text = String::from_utf8(bytes).map_err(|e| {
            ApiError::IntegrityViolation(format!("内容 {} 不是合法 UTF-8: {}", content_id, e))
        })?;
        let records = from_delimited_text(&text)?;

        Ok(FetchedValuation {
            record_id,
            content_id,
            records,
        })
    }

    /// 校验索引哈希链，返回已校验的记录数
    pub fn verify_index(&self) -> ApiResult<usize> {
        Ok(self.record_index.verify_chain()?)
    }

    /// 授予写入权限
    pub fn grant_admin(&self, address: &str) -> ApiResult<()> {
        if address.trim().is_empty() {
            return Err(ApiError::InvalidInput("管理员地址不能为空".to_string()));
        }
        Ok(self.record_index.grant_admin(address)?)
    }

    /// 机队批量估值
    ///
    /// # 参数
    /// - logs: (航空器标识, 履历文本) 列表
    ///
    /// # 返回
    /// 与输入顺序一致的估值结果
    #[instrument(skip(self, logs), fields(assets = logs.len()))]
    pub async fn value_fleet_logs(
        &self,
        logs: Vec<(String, String)>,
    ) -> ApiResult<Vec<FleetValuation>> {
        let table = self.config.get_parameter_table().await?;
        let engine = Arc::new(self.build_engine().await?);

        let assets = logs
            .into_iter()
            .map(|(label, raw_text)| {
                let params = *table.get(self.detector.detect(&label));
                FleetAsset {
                    events: MaintenanceLogParser.parse(&raw_text).events,
                    label,
                    params,
                }
            })
            .collect();

        value_fleet(engine, assets)
            .await
            .map_err(|e| ApiError::InternalError(format!("机队估值任务失败: {}", e)))
    }
}

/// 文件名作为航空器标识
fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_label_uses_file_name() {
        assert_eq!(file_label(Path::new("/data/logs/N787AB.csv")), "N787AB.csv");
        assert_eq!(file_label(Path::new("a320.xlsx")), "a320.xlsx");
    }
}
