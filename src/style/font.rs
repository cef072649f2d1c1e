//! フォントと配置の抽出

use crate::color::{ColorResolver, ColorTarget};
use crate::types::{AlignmentDescriptor, FontDescriptor, FontStyle, FontWeight, HexColor, TextDecoration};

pub const DEFAULT_FONT_SIZE: &str = "11pt";
pub const DEFAULT_FONT_FAMILY: &str = "Calibri";
pub const DEFAULT_TEXT_ALIGN: &str = "left";
pub const DEFAULT_VERTICAL_ALIGN: &str = "top";

/// フォントと配置から得られるスタイル項目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextStyle {
    pub color: HexColor,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub text_decoration: TextDecoration,
    pub font_size: String,
    pub font_family: String,
    pub text_align: String,
    pub vertical_align: String,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: HexColor::black(),
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            text_decoration: TextDecoration::None,
            font_size: DEFAULT_FONT_SIZE.to_string(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            text_align: DEFAULT_TEXT_ALIGN.to_string(),
            vertical_align: DEFAULT_VERTICAL_ALIGN.to_string(),
        }
    }
}

/// フォントと配置の書式をスタイル項目へ変換する
///
/// 記述子や個々の属性が欠けている場合は既定値（黒、標準、11pt、Calibri、左・上揃え）を使います。
/// 配置の値は検証せずにそのまま渡します。
pub fn extract_font_and_alignment(
    resolver: &ColorResolver,
    font: Option<&FontDescriptor>,
    alignment: Option<&AlignmentDescriptor>,
) -> TextStyle {
    let mut style = TextStyle::default();

    if let Some(font) = font {
        style.color = resolver.resolve(font.color.as_ref(), ColorTarget::Font);

        if font.bold {
            style.font_weight = FontWeight::Bold;
        }
        if font.italic {
            style.font_style = FontStyle::Italic;
        }
        if is_underlined(font.underline.as_deref()) {
            style.text_decoration = TextDecoration::Underline;
        }
        if let Some(size) = font_size_points(font.size) {
            style.font_size = format!("{}pt", size);
        }
        if let Some(name) = font.name.as_deref().filter(|n| !n.is_empty()) {
            style.font_family = name.to_string();
        }
    }

    if let Some(alignment) = alignment {
        if let Some(horizontal) = alignment.horizontal.as_deref().filter(|s| !s.is_empty()) {
            style.text_align = horizontal.to_string();
        }
        if let Some(vertical) = alignment.vertical.as_deref().filter(|s| !s.is_empty()) {
            style.vertical_align = vertical.to_string();
        }
    }

    style
}

/// 下線の種類（single, double, singleAccounting, ...）はすべて下線として扱う
fn is_underlined(underline: Option<&str>) -> bool {
    matches!(underline, Some(kind) if !kind.is_empty() && kind != "none")
}

/// 小数部は切り捨てる（四捨五入しない）。0以下や非有限値は未指定と同じ。
fn font_size_points(size: Option<f64>) -> Option<i64> {
    size.filter(|s| s.is_finite() && *s > 0.0)
        .map(|s| s.trunc() as i64)
        .filter(|s| *s > 0)
}
