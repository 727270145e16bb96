// ==========================================
// 航空器残值台账 - 领域类型定义
// ==========================================
// 职责: 机型键 (AssetTypeKey)
// 说明: 机型键的字符串形式与参数表、配置键、产物保持一致
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 机型键 (Asset Type Key)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetTypeKey {
    #[serde(rename = "B787")]
    B787,
    #[serde(rename = "B737 NG")]
    B737Ng,
    #[serde(rename = "A320")]
    A320,
    #[serde(rename = "B777")]
    B777,
    #[serde(rename = "A330")]
    A330,
    #[serde(rename = "B767")]
    B767,
    /// 未识别机型时的兜底参数
    #[serde(rename = "DEFAULT")]
    Default,
}

impl AssetTypeKey {
    /// 全部机型键（参数表顺序）
    pub const ALL: [AssetTypeKey; 7] = [
        AssetTypeKey::B787,
        AssetTypeKey::B737Ng,
        AssetTypeKey::A320,
        AssetTypeKey::B777,
        AssetTypeKey::A330,
        AssetTypeKey::B767,
        AssetTypeKey::Default,
    ];

    /// 转换为字符串标识
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetTypeKey::B787 => "B787",
            AssetTypeKey::B737Ng => "B737 NG",
            AssetTypeKey::A320 => "A320",
            AssetTypeKey::B777 => "B777",
            AssetTypeKey::A330 => "A330",
            AssetTypeKey::B767 => "B767",
            AssetTypeKey::Default => "DEFAULT",
        }
    }

    /// 从字符串标识解析（大小写不敏感）
    pub fn from_key(key: &str) -> Option<Self> {
        let upper = key.trim().to_uppercase();
        Self::ALL.iter().copied().find(|k| k.as_str() == upper)
    }
}

impl fmt::Display for AssetTypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_key_roundtrip() {
        for key in AssetTypeKey::ALL {
            assert_eq!(AssetTypeKey::from_key(key.as_str()), Some(key));
        }
        assert_eq!(AssetTypeKey::from_key("b737 ng"), Some(AssetTypeKey::B737Ng));
        assert_eq!(AssetTypeKey::from_key("A350"), None);
    }

    #[test]
    fn test_serde_uses_display_names() {
        let json = serde_json::to_string(&AssetTypeKey::B737Ng).unwrap();
        assert_eq!(json, "\"B737 NG\"");
        let back: AssetTypeKey = serde_json::from_str("\"DEFAULT\"").unwrap();
        assert_eq!(back, AssetTypeKey::Default);
    }
}
