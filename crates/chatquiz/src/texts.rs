//! User-facing strings in the two supported languages.

use chatquiz_core::PlaceholderKind;

/// Display language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Lang {
    #[default]
    Zh,
    En,
}

impl Lang {
    pub fn texts(self) -> &'static Texts {
        match self {
            Lang::Zh => &ZH,
            Lang::En => &EN,
        }
    }
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lang::Zh => write!(f, "zh"),
            Lang::En => write!(f, "en"),
        }
    }
}

impl std::str::FromStr for Lang {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zh" | "zh-cn" | "cn" => Ok(Lang::Zh),
            "en" | "en-us" | "en-gb" => Ok(Lang::En),
            _ => Err(format!("Unsupported language: {} (expected zh or en)", s)),
        }
    }
}

/// Fixed strings for one language
#[derive(Debug)]
pub struct Texts {
    pub title: &'static str,
    pub music_placeholder: &'static str,
    pub post_placeholder: &'static str,
    pub image_placeholder: &'static str,
    pub blob_placeholder: &'static str,
    pub question_placeholder: &'static str,
    pub start_hint: &'static str,
    pub regenerate: &'static str,
    pub stop: &'static str,
    pub reanswer: &'static str,
    pub new_chat: &'static str,
    pub send: &'static str,
    pub quit: &'static str,
    pub options: &'static str,
    pub newline: &'static str,
    pub search_results: &'static str,
    pub thinking: &'static str,
    pub completed: &'static str,
    pub you: &'static str,
    pub assistant: &'static str,
}

impl Texts {
    pub fn placeholder(&self, kind: PlaceholderKind) -> &'static str {
        match kind {
            PlaceholderKind::None => "",
            PlaceholderKind::MusicOrName => self.music_placeholder,
            PlaceholderKind::PersonalPost => self.post_placeholder,
            PlaceholderKind::ImageChoice => self.image_placeholder,
            PlaceholderKind::BlobChoice => self.blob_placeholder,
            PlaceholderKind::Question => self.question_placeholder,
        }
    }
}

static ZH: Texts = Texts {
    title: "问卷评测",
    music_placeholder: "请输入您的名字和最近常听的歌曲（可搜索）。",
    post_placeholder: "请输入您的个人动态（以换行符分隔）。",
    image_placeholder: "请选择您喜欢的图片选项。(1-9)",
    blob_placeholder: "请输入您的选择的 blob 数字（1-21）。",
    question_placeholder: "选择上面的选项或输入您自己的答案。",
    start_hint: "输入任意内容开始评测。",
    regenerate: "重新生成回复",
    stop: "停止生成",
    reanswer: "重新回答",
    new_chat: "新评测",
    send: "发送回复",
    quit: "退出",
    options: "选项",
    newline: "换行",
    search_results: "歌曲搜索",
    thinking: "正在生成回复…",
    completed: "评测已完成。",
    you: "你",
    assistant: "助手",
};

static EN: Texts = Texts {
    title: "Questionnaire",
    music_placeholder: "Please enter your name and a song you have on repeat (searchable).",
    post_placeholder: "Please enter your personal posts (separated by newlines).",
    image_placeholder: "Please select your favourite images options (1-9).",
    blob_placeholder: "Please enter the blob number of your choice (1-21).",
    question_placeholder: "Select above options or enter your own answer.",
    start_hint: "Type anything to start.",
    regenerate: "Regenerate response",
    stop: "Stop generating",
    reanswer: "Reanswer",
    new_chat: "New Chat",
    send: "Send Message",
    quit: "Quit",
    options: "Options",
    newline: "Newline",
    search_results: "Song search",
    thinking: "Generating reply...",
    completed: "Questionnaire complete.",
    you: "You",
    assistant: "Assistant",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lang() {
        assert_eq!("EN".parse::<Lang>().unwrap(), Lang::En);
        assert_eq!("zh".parse::<Lang>().unwrap(), Lang::Zh);
        assert!("fr".parse::<Lang>().is_err());
        assert_eq!(Lang::default(), Lang::Zh);
    }

    #[test]
    fn test_placeholders_per_stage() {
        let en = Lang::En.texts();
        assert_eq!(en.placeholder(PlaceholderKind::None), "");
        assert!(en.placeholder(PlaceholderKind::ImageChoice).contains("(1-9)"));
        assert!(en.placeholder(PlaceholderKind::BlobChoice).contains("(1-21)"));
        assert_eq!(
            Lang::Zh.texts().placeholder(PlaceholderKind::PersonalPost),
            "请输入您的个人动态（以换行符分隔）。"
        );
    }
}
