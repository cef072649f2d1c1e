//! Color Resolution Module
//!
//! ワークブック内の色表現（RGB・テーマ・インデックスパレット）を`#RRGGBB`へ解決する。
//!
//! 解決は失敗しません。解釈できない入力は、フォント色なら黒、塗りつぶし色なら白
//! （またはセルの位置・内容から推定した色）に置き換えられます。

use crate::types::{CellCoord, ColorSource, HexColor};

/// 既定のテーマパレット（インデックス 0〜11）
///
/// 白・黒・グレー2色・アクセント8色の近似値です。ファイル形式のバージョンによって
/// テーマスロットの並びは異なるため、正確な対応表ではありません。
/// tint/shade による明度補正は行いません。
pub const THEME_PALETTE: [&str; 12] = [
    "#FFFFFF", // 0: 白
    "#000000", // 1: 黒
    "#E7E6E6", // 2: ライトグレー
    "#44546A", // 3: ダークグレー
    "#4472C4", // 4: 青
    "#ED7D31", // 5: オレンジ
    "#A5A5A5", // 6: グレー
    "#FFC000", // 7: 黄
    "#5B9BD5", // 8: ライトブルー
    "#70AD47", // 9: 緑
    "#FF0000", // 10: 赤
    "#7030A0", // 11: 紫
];

/// ヘッダー行（1行目）の推定色
pub const HEADER_FILL: &str = "#0070C0";

/// カテゴリ列（2列目）の推定色
pub const CATEGORY_FILL: &str = "#D6DCE4";

/// 内容列（3〜4列目）のキーワード分類。先に一致したものが優先される。
const KEYWORD_FILLS: [(&[&str], &str); 4] = [
    (&["preferred", "primary", "recommended", "best"], "#FFFF00"),
    (
        &["prohibited", "forbidden", "not allowed", "restricted"],
        "#FF6B6B",
    ),
    (&["optional", "suggested", "alternative"], "#E3F2FD"),
    (&["required", "mandatory", "must", "shall"], "#C8E6C9"),
];

/// テーマ参照の解決結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeLookup {
    Resolved(HexColor),
    /// 数値でない、または既定パレットの範囲外
    Unresolved,
}

/// 推定に使うセルの文脈（位置と表示テキスト）
#[derive(Debug, Clone, Copy)]
pub struct CellContext<'a> {
    pub coord: CellCoord,
    pub text: &'a str,
}

impl<'a> CellContext<'a> {
    pub fn new(coord: CellCoord, text: &'a str) -> Self {
        Self { coord, text }
    }
}

/// 解決対象の色の用途
///
/// 用途ごとに既定色とテーマ参照失敗時の扱いが異なります。
#[derive(Debug, Clone, Copy)]
pub enum ColorTarget<'a> {
    /// 文字色: 既定は黒。テーマ参照に失敗した場合も黒。
    Font,
    /// 背景色: 既定は白。テーマ参照に失敗した場合はセルの文脈から推定する。
    Fill(CellContext<'a>),
}

impl ColorTarget<'_> {
    fn default_color(&self) -> HexColor {
        match self {
            ColorTarget::Font => HexColor::black(),
            ColorTarget::Fill(_) => HexColor::white(),
        }
    }
}

/// 色解決のファサード
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorResolver;

impl ColorResolver {
    pub fn new() -> Self {
        Self
    }

    /// 色の参照元を`#RRGGBB`へ解決する
    ///
    /// 優先順位は RGB > テーマ > インデックスパレット。
    /// インデックスパレットは再現しないため、背景色では白として扱います。
    /// 文字色はRGBとテーマのみを参照し、それ以外は黒になります。
    pub fn resolve(&self, source: Option<&ColorSource>, target: ColorTarget<'_>) -> HexColor {
        let Some(source) = source else {
            return target.default_color();
        };

        if let Some(rgb) = source.rgb.as_deref().filter(|s| !s.trim().is_empty()) {
            // 文字色の`00000000`は黒。白への読み替えは背景色だけに適用する
            if matches!(target, ColorTarget::Font) && rgb.trim() == "00000000" {
                return HexColor::black();
            }
            return resolve_rgb(rgb).unwrap_or_else(|| target.default_color());
        }

        if let Some(theme) = source.theme.as_deref() {
            return match (resolve_theme(theme), target) {
                (ThemeLookup::Resolved(color), _) => color,
                (ThemeLookup::Unresolved, ColorTarget::Font) => HexColor::black(),
                (ThemeLookup::Unresolved, ColorTarget::Fill(context)) => {
                    guess_fill_from_context(&context)
                }
            };
        }

        if source.indexed.is_some() {
            return match target {
                ColorTarget::Font => HexColor::black(),
                ColorTarget::Fill(_) => HexColor::white(),
            };
        }

        target.default_color()
    }
}

/// RGB文字列を`#RRGGBB`へ変換する
///
/// - `AARRGGBB`（8桁すべてが16進数）: 先頭2桁のアルファ値を捨てる（`FF`も`00`も同じ扱い）
/// - `00000000`: 白
/// - `RRGGBB`（6桁）: `#`を付与
/// - `#RRGGBB`: そのまま
///
/// それ以外の形式は`None`。
pub fn resolve_rgb(rgb: &str) -> Option<HexColor> {
    let rgb = rgb.trim();
    if rgb.starts_with('#') {
        return HexColor::parse(rgb);
    }
    if !rgb.is_ascii() {
        return None;
    }
    if rgb == "00000000" {
        return Some(HexColor::white());
    }
    if !rgb.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match rgb.len() {
        8 => HexColor::from_digits(&rgb[2..]),
        6 => HexColor::from_digits(rgb),
        _ => None,
    }
}

/// テーマインデックスを既定パレットで引く
pub fn resolve_theme(theme: &str) -> ThemeLookup {
    theme
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|index| THEME_PALETTE.get(index))
        .map(|color| ThemeLookup::Resolved(HexColor::from_static(color)))
        .unwrap_or(ThemeLookup::Unresolved)
}

/// セルの位置と内容から背景色を推定する
///
/// 1行目はヘッダー、2列目はカテゴリ、3〜4列目は内容列とみなし、
/// 内容列ではキーワードで色を選びます。
pub fn guess_fill_from_context(context: &CellContext<'_>) -> HexColor {
    if context.coord.row == 1 {
        return HexColor::from_static(HEADER_FILL);
    }

    match context.coord.col {
        2 => HexColor::from_static(CATEGORY_FILL),
        3 | 4 => keyword_fill(context.text),
        _ => HexColor::white(),
    }
}

fn keyword_fill(text: &str) -> HexColor {
    let text = text.to_lowercase();
    KEYWORD_FILLS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|keyword| text.contains(keyword)))
        .map(|(_, color)| HexColor::from_static(color))
        .unwrap_or_else(HexColor::white)
}
