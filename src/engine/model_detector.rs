// ==========================================
// 航空器残值台账 - 机型识别
// ==========================================
// 职责: 从自由文本标签（通常为文件名）推断机型键
// 规则: 大小写不敏感的子串匹配，按规则顺序命中即返回，未命中 → DEFAULT
// ==========================================

use crate::domain::types::AssetTypeKey;

/// 机型识别规则（顺序即优先级）
pub const MODEL_DETECTION_RULES: [(&str, AssetTypeKey); 6] = [
    ("B787", AssetTypeKey::B787),
    ("B737", AssetTypeKey::B737Ng),
    ("A320", AssetTypeKey::A320),
    ("B777", AssetTypeKey::B777),
    ("A330", AssetTypeKey::A330),
    ("B767", AssetTypeKey::B767),
];

// ==========================================
// ModelDetector - 机型识别器
// ==========================================
#[derive(Debug, Clone)]
pub struct ModelDetector {
    rules: Vec<(String, AssetTypeKey)>,
}

impl ModelDetector {
    /// 使用内置规则创建识别器
    pub fn new() -> Self {
        Self::with_rules(MODEL_DETECTION_RULES.iter().map(|(p, k)| (p.to_string(), *k)))
    }

    /// 使用自定义规则创建识别器（模式统一转为大写）
    pub fn with_rules<I, S>(rules: I) -> Self
    where
        I: IntoIterator<Item = (S, AssetTypeKey)>,
        S: AsRef<str>,
    {
        Self {
            rules: rules
                .into_iter()
                .map(|(pattern, key)| (pattern.as_ref().to_uppercase(), key))
                .filter(|(pattern, _)| !pattern.is_empty())
                .collect(),
        }
    }

    /// 识别机型（全函数，不会失败）
    pub fn detect(&self, label: &str) -> AssetTypeKey {
        let upper = label.to_uppercase();
        self.rules
            .iter()
            .find(|(pattern, _)| upper.contains(pattern.as_str()))
            .map(|(_, key)| *key)
            .unwrap_or(AssetTypeKey::Default)
    }
}

impl Default for ModelDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// 使用内置规则识别机型
pub fn detect_model(label: &str) -> AssetTypeKey {
    ModelDetector::new().detect(label)
}
