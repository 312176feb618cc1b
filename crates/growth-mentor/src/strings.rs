//! Localized strings surfaced by the library (welcome, notices, status lines)

use crate::types::Language;

/// User-visible strings for one language
#[derive(Debug)]
pub struct UiStrings {
    pub welcome: &'static str,
    pub generation_error: &'static str,
    pub not_configured: &'static str,
    pub processing: &'static str,
    pub processing_page: &'static str,
    pub upload_error: &'static str,
}

static EN: UiStrings = UiStrings {
    welcome: "**Hello! I am your Growth Marketing Mentor.**\n\nI can help you build comprehensive growth systems, solve specific marketing cases, and provide detailed execution plans involving SEO, Ads, and Python/SQL analysis.\n\n**Select a mode below or start typing:**\n- **Deep Reasoning:** For complex strategy & math models.\n- **Web Search:** For latest market trends.\n- **Fast Answers:** For quick definitions.",
    generation_error: "**Error:** I encountered an issue connecting to the Growth Knowledge Base. Please try again.",
    not_configured: "**System error:** no Gemini API key is configured. Set GEMINI_API_KEY or add `api_key` to the [gemini] config section.",
    processing: "Processing",
    processing_page: "Processing page",
    upload_error: "Parse failed:",
};

static ZH: UiStrings = UiStrings {
    welcome: "**你好！我是你的增长营销导师。**\n\n我可以帮助你构建全面的增长体系，解决具体的营销难题，并提供包含SEO、广告投放及Python/SQL分析的详细执行计划。\n\n**请选择模式或直接输入：**\n- **深度思考:** 适合复杂策略与数学模型。\n- **联网搜索:** 适合获取最新市场趋势。\n- **快速问答:** 适合快速获取定义。",
    generation_error: "**错误:** 连接知识库时出现问题，请重试。",
    not_configured: "**系统错误：** 未检测到 Gemini API Key。请设置 GEMINI_API_KEY 环境变量或在配置文件 [gemini] 中填写 `api_key`。",
    processing: "正在解析",
    processing_page: "正在解析页面",
    upload_error: "解析失败：",
};

/// Strings for a language
pub fn ui_strings(language: Language) -> &'static UiStrings {
    match language {
        Language::En => &EN,
        Language::Zh => &ZH,
    }
}

/// Quick-start prompt offered on the empty conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topic {
    pub id: &'static str,
    pub title: &'static str,
    pub prompt: &'static str,
}

static EN_TOPICS: [Topic; 3] = [
    Topic {
        id: "system",
        title: "Build Growth System",
        prompt: "Help me build a comprehensive growth marketing system for a [Business Type]. Include SEO, Ads, and Retention strategies.",
    },
    Topic {
        id: "case",
        title: "Solve Growth Case",
        prompt: "I have a problem with [Specific Metric, e.g., low retention] in my e-commerce app. Analyze the potential causes and provide solutions with SQL queries to diagnose it.",
    },
    Topic {
        id: "execution",
        title: "Execution Plan",
        prompt: "Create a detailed execution plan for a [Campaign Type] campaign with a budget of $[Amount]. Include budget allocation math and Python code for tracking.",
    },
];

static ZH_TOPICS: [Topic; 3] = [
    Topic {
        id: "system",
        title: "构建增长体系",
        prompt: "帮我为[业务类型]构建一个全面的增长营销体系，包括SEO、广告投放和用户留存策略。",
    },
    Topic {
        id: "case",
        title: "解决增长难题",
        prompt: "我的电商应用在[具体指标，如留存率]方面遇到问题。请分析潜在原因，并提供SQL查询语句来诊断问题。",
    },
    Topic {
        id: "execution",
        title: "制定执行计划",
        prompt: "为预算$[金额]的[活动类型]活动创建一个详细的执行计划。包括预算分配数学模型和用于追踪的Python代码。",
    },
];

/// Quick-start topics for a language
pub fn marketing_topics(language: Language) -> &'static [Topic] {
    match language {
        Language::En => &EN_TOPICS,
        Language::Zh => &ZH_TOPICS,
    }
}
