/// 达到该等级即视为已掌握，不再出现在练习视图中
pub const MASTERY_LEVEL: u32 = 5;

/// 笔画简化：与上一个保留点距离超过该值才保留
pub const SIMPLIFY_DISTANCE: f64 = 10.0;

/// 笔画切分：相邻点距离超过该值视为抬笔
pub const STROKE_GAP_DISTANCE: f64 = 30.0;

/// 直线度阈值（直线距离 / 路径长度）
pub const STRAIGHTNESS_THRESHOLD: f64 = 0.9;

/// 识别结果置信度上限
pub const MAX_CONFIDENCE: u8 = 100;

/// 朗读日文后再朗读释义前的默认停顿（毫秒）
pub const DEFAULT_TRANSLATION_DELAY_MS: u64 = 1500;

/// 朗读语速，略慢以便学习
pub const DEFAULT_SPEECH_RATE: f32 = 0.75;

pub const JAPANESE_LANGUAGE_TAG: &str = "ja-JP";

pub const ENGLISH_LANGUAGE_TAG: &str = "en-US";

/// 内容生成默认温度
pub const ENRICHMENT_TEMPERATURE: f32 = 0.5;

/// 手写识别使用更低温度
pub const RECOGNITION_TEMPERATURE: f32 = 0.3;

/// 每个汉字解锁时请求的词汇数量
pub const WORDS_PER_UNLOCK: usize = 5;
