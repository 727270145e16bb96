// ==========================================
// 航空器残值台账 - 机型折旧参数表
// ==========================================
// 职责: 机型键 → 折旧参数 的静态映射
// 约束: initial_price > 0，所有费率 >= 0
// ==========================================

use crate::domain::types::AssetTypeKey;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 经济折旧的基准年利用小时（2000 TIS 视为一个名义运营年）
pub const REFERENCE_ANNUAL_TIS: f64 = 2000.0;

/// 参数校验错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("初始价格必须为正数: {0}")]
    NonPositivePrice(f64),

    #[error("费率不能为负 (field={field}): {value}")]
    NegativeRate { field: &'static str, value: f64 },

    #[error("参数不是有限数值 (field={0})")]
    NonFinite(&'static str),
}

// ==========================================
// AssetTypeParameters - 单机型折旧参数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssetTypeParameters {
    /// 初始账面价值（USD）
    #[serde(alias = "initialPrice")]
    pub initial_price: f64,

    /// 永久折旧率（USD / TIS），不可回收
    #[serde(alias = "permDepr", alias = "permanentDepreciationRate")]
    pub permanent_depreciation_rate: f64,

    /// 可变折旧率（USD / TIS），计入维修储备金，大修时回收
    #[serde(alias = "varDepr", alias = "variableDepreciationRate")]
    pub variable_depreciation_rate: f64,

    /// 年经济折旧率（按 REFERENCE_ANNUAL_TIS 归一化）
    #[serde(alias = "annualEconRate", alias = "annualEconomicRate")]
    pub annual_economic_rate: f64,
}

impl AssetTypeParameters {
    /// 创建并校验参数
    pub fn new(
        initial_price: f64,
        permanent_depreciation_rate: f64,
        variable_depreciation_rate: f64,
        annual_economic_rate: f64,
    ) -> Result<Self, ParameterError> {
        let params = Self {
            initial_price,
            permanent_depreciation_rate,
            variable_depreciation_rate,
            annual_economic_rate,
        };
        params.validate()?;
        Ok(params)
    }

    /// 校验参数不变量
    pub fn validate(&self) -> Result<(), ParameterError> {
        let fields = [
            ("initial_price", self.initial_price),
            ("permanent_depreciation_rate", self.permanent_depreciation_rate),
            ("variable_depreciation_rate", self.variable_depreciation_rate),
            ("annual_economic_rate", self.annual_economic_rate),
        ];

        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ParameterError::NonFinite(field));
            }
        }

        if self.initial_price <= 0.0 {
            return Err(ParameterError::NonPositivePrice(self.initial_price));
        }

        for (field, value) in &fields[1..] {
            if *value < 0.0 {
                return Err(ParameterError::NegativeRate {
                    field: *field,
                    value: *value,
                });
            }
        }

        Ok(())
    }

    /// TIS 增量对应的经济折旧额（年经济折旧率按 REFERENCE_ANNUAL_TIS 折算）
    pub fn economic_depreciation(&self, delta_tis: f64) -> f64 {
        self.initial_price * self.annual_economic_rate * (delta_tis / REFERENCE_ANNUAL_TIS)
    }
}

const fn builtin(
    initial_price: f64,
    permanent_depreciation_rate: f64,
    variable_depreciation_rate: f64,
    annual_economic_rate: f64,
) -> AssetTypeParameters {
    AssetTypeParameters {
        initial_price,
        permanent_depreciation_rate,
        variable_depreciation_rate,
        annual_economic_rate,
    }
}

/// 内置参数表
const BUILTIN_PARAMETERS: [(AssetTypeKey, AssetTypeParameters); 7] = [
    (AssetTypeKey::B787, builtin(190_000_000.0, 1185.36, 2406.64, 0.04)),
    (AssetTypeKey::B737Ng, builtin(80_000_000.0, 715.61, 1452.90, 0.04)),
    (AssetTypeKey::A320, builtin(77_000_000.0, 796.79, 1617.72, 0.04)),
    (AssetTypeKey::B777, builtin(140_000_000.0, 1568.66, 3184.85, 0.04)),
    (AssetTypeKey::A330, builtin(175_000_000.0, 1291.46, 2622.05, 0.04)),
    (AssetTypeKey::B767, builtin(150_000_000.0, 1101.38, 2236.13, 0.04)),
    (AssetTypeKey::Default, builtin(80_000_000.0, 700.00, 1400.00, 0.04)),
];

static FALLBACK_PARAMETERS: AssetTypeParameters = builtin(80_000_000.0, 700.00, 1400.00, 0.04);

// ==========================================
// ModelParameterTable - 机型参数表
// ==========================================
/// 每个 AssetTypeKey 恰有一项；DEFAULT 始终存在，因此查询是全函数
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParameterTable {
    entries: Vec<(AssetTypeKey, AssetTypeParameters)>,
}

impl ModelParameterTable {
    /// 内置参数表
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_PARAMETERS.to_vec(),
        }
    }

    /// 查询机型参数
    pub fn get(&self, key: AssetTypeKey) -> &AssetTypeParameters {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .or_else(|| self.entries.iter().find(|(k, _)| *k == AssetTypeKey::Default))
            .map(|(_, params)| params)
            .unwrap_or(&FALLBACK_PARAMETERS)
    }

    /// 覆写单个机型参数（校验后生效）
    pub fn set(
        &mut self,
        key: AssetTypeKey,
        params: AssetTypeParameters,
    ) -> Result<(), ParameterError> {
        params.validate()?;
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = params,
            None => self.entries.push((key, params)),
        }
        Ok(())
    }

    /// 参数表中的机型键
    pub fn keys(&self) -> impl Iterator<Item = AssetTypeKey> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    pub fn contains(&self, key: AssetTypeKey) -> bool {
        self.entries.iter().any(|(k, _)| *k == key)
    }
}

impl Default for ModelParameterTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_parameters_are_valid() {
        let table = ModelParameterTable::builtin();
        for key in AssetTypeKey::ALL {
            assert!(table.contains(key));
            assert!(table.get(key).validate().is_ok());
        }
    }

    #[test]
    fn test_builtin_values() {
        let table = ModelParameterTable::builtin();
        let b787 = table.get(AssetTypeKey::B787);
        assert_eq!(b787.initial_price, 190_000_000.0);
        assert_eq!(b787.permanent_depreciation_rate, 1185.36);

        let default = table.get(AssetTypeKey::Default);
        assert_eq!(default.initial_price, 80_000_000.0);
        assert_eq!(default.variable_depreciation_rate, 1400.0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert_eq!(
            AssetTypeParameters::new(0.0, 1.0, 1.0, 0.04),
            Err(ParameterError::NonPositivePrice(0.0))
        );
        assert!(matches!(
            AssetTypeParameters::new(1.0, -1.0, 1.0, 0.04),
            Err(ParameterError::NegativeRate {
                field: "permanent_depreciation_rate",
                ..
            })
        ));
        assert_eq!(
            AssetTypeParameters::new(1.0, 1.0, f64::NAN, 0.04),
            Err(ParameterError::NonFinite("variable_depreciation_rate"))
        );
    }

    #[test]
    fn test_set_overrides_entry() {
        let mut table = ModelParameterTable::builtin();
        let custom = AssetTypeParameters::new(100.0, 1.0, 2.0, 0.0).unwrap();
        table.set(AssetTypeKey::A320, custom).unwrap();
        assert_eq!(table.get(AssetTypeKey::A320), &custom);

        let invalid = builtin(-5.0, 1.0, 1.0, 0.0);
        assert!(table.set(AssetTypeKey::A320, invalid).is_err());
        assert_eq!(table.get(AssetTypeKey::A320), &custom);
    }

    #[test]
    fn test_deserialize_accepts_legacy_field_names() {
        let json = r#"{"initialPrice": 5000, "permDepr": 1.5, "varDepr": 2.5, "annualEconRate": 0.03}"#;
        let params: AssetTypeParameters = serde_json::from_str(json).unwrap();
        assert_eq!(params.initial_price, 5000.0);
        assert_eq!(params.variable_depreciation_rate, 2.5);
        assert_eq!(params.annual_economic_rate, 0.03);
    }

    #[test]
    fn test_economic_depreciation() {
        let params = builtin(80_000_000.0, 700.0, 1400.0, 0.04);
        assert_eq!(params.economic_depreciation(2000.0), 3_200_000.0);
        assert_eq!(params.economic_depreciation(1000.0), 1_600_000.0);
        assert!(params.economic_depreciation(-500.0) < 0.0);
        assert_eq!(params.economic_depreciation(0.0), 0.0);
    }
}
