use serde::{Deserialize, Serialize};

/// 目标语言类型
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetLanguage {
    #[serde(rename = "en")]
    #[default]
    English,
    #[serde(rename = "hi")]
    Hindi,
    #[serde(rename = "ta")]
    Tamil,
    #[serde(rename = "te")]
    Telugu,
    #[serde(rename = "bn")]
    Bengali,
    #[serde(rename = "mr")]
    Marathi,
    #[serde(rename = "kn")]
    Kannada,
    #[serde(rename = "gu")]
    Gujarati,
    #[serde(rename = "ml")]
    Malayalam,
    #[serde(rename = "pa")]
    Punjabi,
}

impl std::fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetLanguage::English => write!(f, "en"),
            TargetLanguage::Hindi => write!(f, "hi"),
            TargetLanguage::Tamil => write!(f, "ta"),
            TargetLanguage::Telugu => write!(f, "te"),
            TargetLanguage::Bengali => write!(f, "bn"),
            TargetLanguage::Marathi => write!(f, "mr"),
            TargetLanguage::Kannada => write!(f, "kn"),
            TargetLanguage::Gujarati => write!(f, "gu"),
            TargetLanguage::Malayalam => write!(f, "ml"),
            TargetLanguage::Punjabi => write!(f, "pa"),
        }
    }
}

impl std::str::FromStr for TargetLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(TargetLanguage::English),
            "hi" | "hindi" | "हिन्दी" | "हिंदी" => Ok(TargetLanguage::Hindi),
            "ta" | "tamil" | "தமிழ்" => Ok(TargetLanguage::Tamil),
            "te" | "telugu" | "తెలుగు" => Ok(TargetLanguage::Telugu),
            "bn" | "bengali" | "bangla" | "বাংলা" => Ok(TargetLanguage::Bengali),
            "mr" | "marathi" | "मराठी" => Ok(TargetLanguage::Marathi),
            "kn" | "kannada" | "ಕನ್ನಡ" => Ok(TargetLanguage::Kannada),
            "gu" | "gujarati" | "ગુજરાતી" => Ok(TargetLanguage::Gujarati),
            "ml" | "malayalam" | "മലയാളം" => Ok(TargetLanguage::Malayalam),
            "pa" | "punjabi" | "ਪੰਜਾਬੀ" => Ok(TargetLanguage::Punjabi),
            _ => Err(format!("Unknown target language: {}", s)),
        }
    }
}

impl TargetLanguage {
    /// 所有支持的语言
    pub const ALL: [TargetLanguage; 10] = [
        TargetLanguage::English,
        TargetLanguage::Hindi,
        TargetLanguage::Tamil,
        TargetLanguage::Telugu,
        TargetLanguage::Bengali,
        TargetLanguage::Marathi,
        TargetLanguage::Kannada,
        TargetLanguage::Gujarati,
        TargetLanguage::Malayalam,
        TargetLanguage::Punjabi,
    ];

    /// 语言的英文名称，用于拼接到提示词中
    pub fn english_name(&self) -> &'static str {
        match self {
            TargetLanguage::English => "English",
            TargetLanguage::Hindi => "Hindi",
            TargetLanguage::Tamil => "Tamil",
            TargetLanguage::Telugu => "Telugu",
            TargetLanguage::Bengali => "Bengali",
            TargetLanguage::Marathi => "Marathi",
            TargetLanguage::Kannada => "Kannada",
            TargetLanguage::Gujarati => "Gujarati",
            TargetLanguage::Malayalam => "Malayalam",
            TargetLanguage::Punjabi => "Punjabi",
        }
    }

    /// 获取语言的描述性名称
    pub fn display_name(&self) -> &'static str {
        match self {
            TargetLanguage::English => "English",
            TargetLanguage::Hindi => "हिन्दी",
            TargetLanguage::Tamil => "தமிழ்",
            TargetLanguage::Telugu => "తెలుగు",
            TargetLanguage::Bengali => "বাংলা",
            TargetLanguage::Marathi => "मराठी",
            TargetLanguage::Kannada => "ಕನ್ನಡ",
            TargetLanguage::Gujarati => "ગુજરાતી",
            TargetLanguage::Malayalam => "മലയാളം",
            TargetLanguage::Punjabi => "ਪੰਜਾਬੀ",
        }
    }

    /// 获取写作阶段使用的语言指令
    pub fn prompt_instruction(&self) -> String {
        format!("Write in {}.", self.english_name())
    }
}
