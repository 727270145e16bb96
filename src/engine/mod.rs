// ==========================================
// 航空器残值台账 - 引擎层
// ==========================================
// 职责: 机型识别、折旧计算、机队批量估值
// 红线: 引擎不做 I/O，不读写数据库，结果只由输入决定
// ==========================================

pub mod depreciation;
pub mod fleet;
pub mod model_detector;

// 重导出核心引擎
pub use depreciation::{format_recapture_note, run, DepreciationEngine, DEFAULT_MAJOR_CHECK_MARKERS};
pub use fleet::{value_fleet, FleetAsset, FleetValuation};
pub use model_detector::{detect_model, ModelDetector, MODEL_DETECTION_RULES};
