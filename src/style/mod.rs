//! Style Module
//!
//! セルの書式（フォント・塗りつぶし・配置）を解決済みのスタイルへ変換するモジュール。
//! 列幅と行の高さはここでは扱わず、グリッド構築時にシート単位の値で上書きされます。

mod fill;
mod font;

pub use fill::extract_background;
pub use font::{extract_font_and_alignment, TextStyle};

use crate::color::{CellContext, ColorResolver};
use crate::dimension::{DEFAULT_COLUMN_WIDTH, DEFAULT_ROW_HEIGHT};
use crate::types::{CellCoord, CellFormat, StyleRecord};

/// セルスタイラー
///
/// フォント・配置の抽出と背景色の抽出をまとめるファサードです。
#[derive(Debug, Clone, Default)]
pub(crate) struct CellStyler {
    resolver: ColorResolver,
}

impl CellStyler {
    pub fn new() -> Self {
        Self {
            resolver: ColorResolver::new(),
        }
    }

    /// セル1つ分のスタイルを解決する
    ///
    /// 寸法は既定値（幅100px・高さ20px）で埋めて返します。
    pub fn style_cell(
        &self,
        coord: CellCoord,
        value: &str,
        format: Option<&CellFormat>,
    ) -> StyleRecord {
        let text = extract_font_and_alignment(
            &self.resolver,
            format.and_then(|f| f.font.as_ref()),
            format.and_then(|f| f.alignment.as_ref()),
        );
        let background_color = extract_background(
            &self.resolver,
            format.and_then(|f| f.fill.as_ref()),
            CellContext::new(coord, value),
        );

        StyleRecord {
            value: value.to_string(),
            color: text.color,
            background_color,
            font_weight: text.font_weight,
            font_style: text.font_style,
            text_decoration: text.text_decoration,
            font_size: text.font_size,
            font_family: text.font_family,
            text_align: text.text_align,
            vertical_align: text.vertical_align,
            column_width: DEFAULT_COLUMN_WIDTH,
            row_height: DEFAULT_ROW_HEIGHT,
        }
    }
}
