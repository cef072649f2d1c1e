//! Dimension Module
//!
//! 列幅と行の高さをピクセル単位で計算するモジュール。
//!
//! 列幅はシートに設定された幅を換算するか、ヘッダー行と先頭のデータ行の文字数から推定します。
//! 推定に使う行は1行目と続く最大8行だけで、シート全体で1回だけ計算されます。

use crate::sheet::WorksheetSource;
use crate::types::CellCoord;

/// 列幅の単位（シート固有の幅単位）あたりのピクセル数
pub const PIXELS_PER_WIDTH_UNIT: f64 = 7.0;

/// 推定時の1文字あたりのピクセル数
pub const PIXELS_PER_CHARACTER: u32 = 10;

/// 推定列幅の下限
pub const MIN_COLUMN_WIDTH: u32 = 100;

/// 推定列幅の上限
pub const MAX_COLUMN_WIDTH: u32 = 500;

/// セル単位の抽出で使う仮の列幅
pub const DEFAULT_COLUMN_WIDTH: u32 = 100;

/// 高さが設定されていない行の高さ
pub const DEFAULT_ROW_HEIGHT: u32 = 20;

/// ポイントからピクセルへの換算比
pub const POINTS_TO_PIXELS_RATIO: f64 = 0.75;

/// 列幅の推定でヘッダー行に続けて調べるデータ行の数
pub const WIDTH_SAMPLE_ROWS: u32 = 8;

/// 使用範囲のすべての列について列幅を計算する（添字0が1列目）
pub fn column_widths<S: WorksheetSource + ?Sized>(sheet: &S) -> Vec<u32> {
    (1..=sheet.used_cols())
        .map(|col| column_width(sheet, col))
        .collect()
}

/// 1列分の列幅
pub fn column_width<S: WorksheetSource + ?Sized>(sheet: &S, col: u32) -> u32 {
    match sheet.declared_column_width(col).filter(|w| w.is_finite() && *w >= 0.0) {
        Some(width) => width_from_declared(width),
        None => estimate_width(sampled_max_chars(sheet, col)),
    }
}

/// 行の高さ
pub fn row_height<S: WorksheetSource + ?Sized>(sheet: &S, row: u32) -> u32 {
    match sheet.declared_row_height(row).filter(|h| h.is_finite() && *h > 0.0) {
        Some(height) => height_from_declared(height),
        None => DEFAULT_ROW_HEIGHT,
    }
}

/// 設定された列幅をピクセルへ換算する
pub fn width_from_declared(width: f64) -> u32 {
    (width * PIXELS_PER_WIDTH_UNIT).round() as u32
}

/// 文字数から列幅を推定する（下限100px、上限500px）
pub fn estimate_width(max_chars: usize) -> u32 {
    let chars = u32::try_from(max_chars).unwrap_or(u32::MAX);
    chars
        .saturating_mul(PIXELS_PER_CHARACTER)
        .clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
}

/// 設定された行の高さ（ポイント）をピクセルへ換算する
pub fn height_from_declared(height: f64) -> u32 {
    (height * POINTS_TO_PIXELS_RATIO).round() as u32
}

/// 1行目と続く最大8行のうち、最も長いテキストの文字数
fn sampled_max_chars<S: WorksheetSource + ?Sized>(sheet: &S, col: u32) -> usize {
    let last_row = sheet.used_rows().min(1 + WIDTH_SAMPLE_ROWS);
    (1..=last_row)
        .map(|row| sheet.value_text(CellCoord::new(row, col)).chars().count())
        .max()
        .unwrap_or(0)
}
