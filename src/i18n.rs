// src/i18n.rs
// 界面文案（中文 / English）

use crate::session::Status;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lang {
    #[default]
    Zh,
    En,
}

impl Lang {
    pub fn toggled(self) -> Self {
        match self {
            Lang::Zh => Lang::En,
            Lang::En => Lang::Zh,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Text {
    WindowTitle,
    HeaderTitle,
    Hint,
    SelectHint,
    MsgBoxTitle,
    /// Contains a `{path}` placeholder.
    MsgBoxContent,
    InvalidRatioTitle,
}

pub fn text(lang: Lang, key: Text) -> &'static str {
    match (lang, key) {
        (Lang::Zh, Text::WindowTitle) => "简易屏幕 GIF 录制",
        (Lang::Zh, Text::HeaderTitle) => "屏幕 GIF 录制工具",
        (Lang::Zh, Text::Hint) => {
            "Enter 选区 / F 固定比例 / Space 停止 / L English / O 打开文件夹"
        }
        (Lang::Zh, Text::SelectHint) => "拖拽或滚轮缩放选区，Esc 取消",
        (Lang::Zh, Text::MsgBoxTitle) => "完成",
        (Lang::Zh, Text::MsgBoxContent) => "GIF 已保存至:\n{path}",
        (Lang::Zh, Text::InvalidRatioTitle) => "比例格式错误",

        (Lang::En, Text::WindowTitle) => "Simple Screen GIF Recorder",
        (Lang::En, Text::HeaderTitle) => "Screen GIF Recorder",
        (Lang::En, Text::Hint) => {
            "Enter select / F fixed ratio / Space stop / L 中文 / O open folder"
        }
        (Lang::En, Text::SelectHint) => "Drag, or scroll to resize; Esc cancels",
        (Lang::En, Text::MsgBoxTitle) => "Done",
        (Lang::En, Text::MsgBoxContent) => "GIF saved at:\n{path}",
        (Lang::En, Text::InvalidRatioTitle) => "Invalid ratio",
    }
}

pub fn status_text(lang: Lang, status: Status) -> &'static str {
    match (lang, status) {
        (Lang::Zh, Status::Ready) => "准备就绪 - 按 Enter 选择区域",
        (Lang::Zh, Status::Selecting) => "请选择录制区域",
        (Lang::Zh, Status::Recording) => "正在录制... (Space 停止)",
        (Lang::Zh, Status::Processing) => "正在合成 GIF，请稍候...",
        (Lang::Zh, Status::Saved) => "保存成功！",
        (Lang::Zh, Status::Error) => "保存失败",

        (Lang::En, Status::Ready) => "Ready - Press Enter to Select",
        (Lang::En, Status::Selecting) => "Select the area to record",
        (Lang::En, Status::Recording) => "Recording... (Space to Stop)",
        (Lang::En, Status::Processing) => "Processing GIF, please wait...",
        (Lang::En, Status::Saved) => "Saved Successfully!",
        (Lang::En, Status::Error) => "Save Failed",
    }
}

/// Fills the saved-file dialog with the file name only.
pub fn saved_message(lang: Lang, file_name: &str) -> String {
    text(lang, Text::MsgBoxContent).replace("{path}", file_name)
}
