//! Prompt rendering for the title downgrade request.
//!
//! Only two templates exist: English for `en` and Chinese for every other
//! language code. Non-English, non-Chinese languages currently receive the
//! Chinese template as well.

use crate::generation::{Intensity, Language};

fn intensity_description_en(intensity: Intensity) -> &'static str {
    match intensity {
        Intensity::Mild => "gentle downgrade, still somewhat positive",
        Intensity::Normal => "normal downgrade, just say it plainly",
        Intensity::Brutal => "brutal downgrade, extremely mundane, borderline depressing",
    }
}

fn intensity_description_zh(intensity: Intensity) -> &'static str {
    match intensity {
        Intensity::Mild => "温和降级，保留一点体面",
        Intensity::Normal => "正常降级，说人话",
        Intensity::Brutal => "暴力降级，极度平淡，甚至有点丧",
    }
}

/// Render the model prompt for a title, intensity and language.
///
/// Deterministic: the same inputs always produce the same text. The prompt
/// asks for a single compact JSON object with `downgraded` and `hype_score`.
pub fn build_prompt(title: &str, intensity: Intensity, language: Language) -> String {
    match language {
        Language::En => {
            let desc = intensity_description_en(intensity);
            format!(
                r#"You are a title downgrader. Take exaggerated, clickbait, or marketing titles and rewrite them to be plain, honest, and mundane.

Intensity: {desc}

Exaggerated title: "{title}"

Respond in this EXACT JSON format (no markdown, no code blocks):
{{"downgraded": "the plain version", "hype_score": 7}}

hype_score = how exaggerated the original is (1=normal, 10=absurdly hyped).
Make the downgraded version funny by being aggressively ordinary."#
            )
        }
        _ => {
            let desc = intensity_description_zh(intensity);
            format!(
                r#"你是一个标题降级器。把夸张的标题/营销文案/点击诱饵还原成平实、诚实、甚至有点无聊的描述。

降级强度：{desc}

夸张标题："{title}"

请严格按以下 JSON 格式回答（不要 markdown，不要代码块）：
{{"downgraded": "平实版本", "hype_score": 7}}

hype_score = 原标题的夸张程度（1=正常, 10=极度夸张）。
降级版本要通过极度平淡来制造反差幽默。"#
            )
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
