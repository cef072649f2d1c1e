//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。
//!
//! 入力側の型（`ColorSource`, `FontDescriptor`, `FillDescriptor`,
//! `AlignmentDescriptor`, `CellFormat`）はワークブックから読み取った生の書式情報で、
//! 欠落や不正値をそのまま表現できます。出力側の型（`StyleRecord`, `SheetGrid`,
//! `SheetDocument`）はすべてのフィールドが解決済みの値を持ちます。

use serde::ser::SerializeTuple;
use serde::{Serialize, Serializer};
use std::fmt;

/// ワークシートの最大行番号
pub const MAX_ROW_NUMBER: u32 = 1_048_576;

/// ワークシートの最大列番号（XFD）
pub const MAX_COLUMN_NUMBER: u32 = 16_384;

/// セル座標（1始まり）
///
/// 行1・列1がA1セルに対応します。出力グリッドでは0始まりの添字に変換されます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    pub row: u32,
    pub col: u32,
}

impl CellCoord {
    /// 新しい座標を生成
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// A1形式の参照をパース（例: "B3" -> (3, 2)）
    ///
    /// `$`による絶対参照記号は無視します。形式が不正な場合や、
    /// シートの上限（1,048,576行・16,384列）を超える場合は`None`。
    pub fn from_a1(reference: &str) -> Option<Self> {
        let reference = reference.trim().replace('$', "");
        let split = reference.find(|c: char| c.is_ascii_digit())?;
        let (letters, digits) = reference.split_at(split);
        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }

        let mut col: u32 = 0;
        for ch in letters.chars() {
            let value = (ch.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
            col = col.checked_mul(26)?.checked_add(value)?;
        }

        let row: u32 = digits.parse().ok()?;
        let coord = Self::new(row, col);
        coord.is_within_sheet().then_some(coord)
    }

    /// シートの範囲内（A1〜XFD1048576）にあるかどうか
    pub fn is_within_sheet(&self) -> bool {
        (1..=MAX_ROW_NUMBER).contains(&self.row) && (1..=MAX_COLUMN_NUMBER).contains(&self.col)
    }

    /// A1形式の文字列に変換（例: (1, 1) -> "A1"）
    pub fn to_a1(&self) -> String {
        let mut letters = Vec::new();
        let mut col = self.col;
        while col > 0 {
            let remainder = (col - 1) % 26;
            letters.push((b'A' + remainder as u8) as char);
            col = (col - 1) / 26;
        }
        letters.iter().rev().collect::<String>() + &self.row.to_string()
    }
}

/// `#RRGGBB`形式の色文字列
///
/// 常に7文字（先頭`#` + 16進数6桁）であることを構築時に保証します。
/// 大文字・小文字は抽出元の表記を保持します。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HexColor(String);

impl HexColor {
    /// `#RRGGBB`形式の文字列を検証して生成する
    pub fn parse(value: &str) -> Option<Self> {
        let hex = value.strip_prefix('#')?;
        if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
            Some(Self(value.to_string()))
        } else {
            None
        }
    }

    /// 16進数6桁（`#`なし）から生成する
    pub(crate) fn from_digits(digits: &str) -> Option<Self> {
        if digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit()) {
            Some(Self(format!("#{}", digits)))
        } else {
            None
        }
    }

    /// 既知の定数から生成する（呼び出し側で形式が保証されている場合のみ）
    pub(crate) fn from_static(value: &'static str) -> Self {
        debug_assert!(Self::parse(value).is_some(), "malformed color constant");
        Self(value.to_string())
    }

    /// 白（`#FFFFFF`）
    pub fn white() -> Self {
        Self::from_static("#FFFFFF")
    }

    /// 黒（`#000000`）
    pub fn black() -> Self {
        Self::from_static("#000000")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for HexColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// 色の参照元（ワークブック内の生の表現）
///
/// OOXMLの`<color>`/`<fgColor>`要素の`rgb`・`theme`・`indexed`属性に対応します。
/// `theme`は不正値（数値でない、範囲外）も表現できるよう、属性値の文字列のまま保持します。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorSource {
    pub rgb: Option<String>,
    pub theme: Option<String>,
    pub indexed: Option<u32>,
}

impl ColorSource {
    /// RGB（`AARRGGBB`または`RRGGBB`）指定の色
    pub fn rgb(value: impl Into<String>) -> Self {
        Self {
            rgb: Some(value.into()),
            ..Self::default()
        }
    }

    /// テーマインデックス指定の色
    pub fn theme(value: impl Into<String>) -> Self {
        Self {
            theme: Some(value.into()),
            ..Self::default()
        }
    }

    /// インデックスパレット指定の色
    pub fn indexed(index: u32) -> Self {
        Self {
            indexed: Some(index),
            ..Self::default()
        }
    }
}

/// フォントの書式情報（`<font>`要素）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontDescriptor {
    pub color: Option<ColorSource>,
    pub bold: bool,
    pub italic: bool,
    /// 下線の種類（`single`, `double`, ... / `none`）
    pub underline: Option<String>,
    /// フォントサイズ（ポイント）
    pub size: Option<f64>,
    pub name: Option<String>,
}

/// 塗りつぶしの書式情報（`<fill><patternFill>`要素）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillDescriptor {
    /// パターン種別（`none`, `solid`, `gray125`, ...）
    pub pattern_type: Option<String>,
    /// 前景色（OOXMLの`<fgColor>`）
    pub start_color: Option<ColorSource>,
}

/// 配置の書式情報（`<alignment>`要素）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignmentDescriptor {
    pub horizontal: Option<String>,
    pub vertical: Option<String>,
}

/// セル1つ分の書式（フォント・塗りつぶし・配置）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellFormat {
    pub font: Option<FontDescriptor>,
    pub fill: Option<FillDescriptor>,
    pub alignment: Option<AlignmentDescriptor>,
}

/// フォントの太さ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Normal,
    Bold,
}

/// フォントのスタイル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    Normal,
    Italic,
}

/// テキストの装飾
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDecoration {
    None,
    Underline,
}

/// セル1つ分の解決済みスタイル
///
/// JSONでは、フィールド名を持つオブジェクトではなく、次の順序の12要素配列として出力されます:
///
/// `[value, color, backgroundColor, fontWeight, fontStyle, textDecoration,
///   fontSize, fontFamily, textAlign, verticalAlign, columnWidth, rowHeight]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRecord {
    pub value: String,
    pub color: HexColor,
    pub background_color: HexColor,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub text_decoration: TextDecoration,
    pub font_size: String,
    pub font_family: String,
    pub text_align: String,
    pub vertical_align: String,
    pub column_width: u32,
    pub row_height: u32,
}

impl Serialize for StyleRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(12)?;
        tuple.serialize_element(&self.value)?;
        tuple.serialize_element(&self.color)?;
        tuple.serialize_element(&self.background_color)?;
        tuple.serialize_element(&self.font_weight)?;
        tuple.serialize_element(&self.font_style)?;
        tuple.serialize_element(&self.text_decoration)?;
        tuple.serialize_element(&self.font_size)?;
        tuple.serialize_element(&self.font_family)?;
        tuple.serialize_element(&self.text_align)?;
        tuple.serialize_element(&self.vertical_align)?;
        tuple.serialize_element(&self.column_width)?;
        tuple.serialize_element(&self.row_height)?;
        tuple.end()
    }
}

/// 行優先のスタイルグリッド
///
/// 構築後は変更されず、元のワークブックへの参照も保持しません。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SheetGrid {
    rows: Vec<Vec<StyleRecord>>,
}

impl SheetGrid {
    pub(crate) fn from_rows(rows: Vec<Vec<StyleRecord>>) -> Self {
        Self { rows }
    }

    /// 行数
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// 列数（先頭行の要素数。空のグリッドでは0）
    pub fn col_count(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    /// 0始まりの添字でセルを取得
    pub fn get(&self, row: usize, col: usize) -> Option<&StyleRecord> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    pub fn rows(&self) -> &[Vec<StyleRecord>] {
        &self.rows
    }
}

/// 1ファイル分の出力ドキュメント
///
/// `{ "name": "<元のファイル名>", "data": [[...], ...] }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetDocument {
    pub name: String,
    pub data: SheetGrid,
}
