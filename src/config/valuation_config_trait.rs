// ==========================================
// 航空器残值台账 - 估值配置读取 Trait
// ==========================================
// 职责: 定义估值流程所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::error::ConfigResult;
use crate::domain::params::ModelParameterTable;
use async_trait::async_trait;

// ==========================================
// ValuationConfigReader Trait
// ==========================================
// 用途: 估值 API 所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ValuationConfigReader: Send + Sync {
    /// 获取机型参数表
    ///
    /// # 返回
    /// - 内置参数表叠加 config_kv 中 asset_params/{机型键} 的覆写
    async fn get_parameter_table(&self) -> ConfigResult<ModelParameterTable>;

    /// 获取大修检标记列表
    ///
    /// # 默认值
    /// - ["B-Check", "C-Check", "D-Check"]
    async fn get_major_check_markers(&self) -> ConfigResult<Vec<String>>;
}
