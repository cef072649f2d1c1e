//! Worksheet Abstraction Module
//!
//! スタイル解決の入力となるワークシートの抽象と、そのメモリ上の実装。

use std::collections::HashMap;

use crate::types::{CellCoord, CellFormat};

/// スタイル解決に必要なワークシートの情報
///
/// 座標はすべて1始まりです。使用範囲はA1から`(used_rows, used_cols)`までの矩形です。
pub trait WorksheetSource {
    /// 使用範囲の行数
    fn used_rows(&self) -> u32;

    /// 使用範囲の列数
    fn used_cols(&self) -> u32;

    /// セルの表示テキスト（値がない場合は空文字列）
    fn value_text(&self, coord: CellCoord) -> &str;

    /// セルの書式（書式情報がない場合は`None`）
    fn cell_format(&self, coord: CellCoord) -> Option<&CellFormat>;

    /// 列に明示的に設定された幅（シート固有の単位）
    fn declared_column_width(&self, col: u32) -> Option<f64>;

    /// 行に明示的に設定された高さ（ポイント）
    fn declared_row_height(&self, row: u32) -> Option<f64>;
}

/// メモリ上に展開されたワークシート
///
/// ワークブックリーダーが構築するほか、テストや他の読み込み手段から直接組み立てることもできます。
/// 書式はスタイルテーブル（`styles`）とセルごとの添字で共有されます。
#[derive(Debug, Clone, Default)]
pub struct SheetModel {
    name: String,
    rows: u32,
    cols: u32,
    values: HashMap<CellCoord, String>,
    styles: Vec<CellFormat>,
    cell_styles: HashMap<CellCoord, usize>,
    default_style: Option<usize>,
    column_widths: HashMap<u32, f64>,
    row_heights: HashMap<u32, f64>,
}

impl SheetModel {
    /// 空のシートを生成
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 使用範囲を明示的に広げる（値も書式もないセルを範囲に含める場合）
    pub fn extend_used_range(&mut self, rows: u32, cols: u32) {
        self.rows = self.rows.max(rows);
        self.cols = self.cols.max(cols);
    }

    /// セルの値を設定し、使用範囲を広げる
    pub fn set_value(&mut self, coord: CellCoord, text: impl Into<String>) {
        let text = text.into();
        self.extend_used_range(coord.row, coord.col);
        if text.is_empty() {
            self.values.remove(&coord);
        } else {
            self.values.insert(coord, text);
        }
    }

    /// スタイルテーブルに書式を追加し、その添字を返す
    pub fn add_style(&mut self, format: CellFormat) -> usize {
        self.styles.push(format);
        self.styles.len() - 1
    }

    /// セルにスタイルテーブルの添字を割り当て、使用範囲を広げる
    pub fn set_style_index(&mut self, coord: CellCoord, index: usize) {
        self.extend_used_range(coord.row, coord.col);
        self.cell_styles.insert(coord, index);
    }

    /// セルに書式を設定する（スタイルテーブルへの追加と割り当てを同時に行う）
    pub fn set_format(&mut self, coord: CellCoord, format: CellFormat) {
        let index = self.add_style(format);
        self.set_style_index(coord, index);
    }

    /// 個別の書式を持たないセルに適用される書式の添字
    pub fn set_default_style(&mut self, index: Option<usize>) {
        self.default_style = index;
    }

    pub fn set_column_width(&mut self, col: u32, width: f64) {
        self.column_widths.insert(col, width);
    }

    pub fn set_row_height(&mut self, row: u32, height: f64) {
        self.row_heights.insert(row, height);
    }
}

impl WorksheetSource for SheetModel {
    fn used_rows(&self) -> u32 {
        self.rows
    }

    fn used_cols(&self) -> u32 {
        self.cols
    }

    fn value_text(&self, coord: CellCoord) -> &str {
        self.values.get(&coord).map(String::as_str).unwrap_or("")
    }

    fn cell_format(&self, coord: CellCoord) -> Option<&CellFormat> {
        self.cell_styles
            .get(&coord)
            .copied()
            .or(self.default_style)
            .and_then(|index| self.styles.get(index))
    }

    fn declared_column_width(&self, col: u32) -> Option<f64> {
        self.column_widths.get(&col).copied()
    }

    fn declared_row_height(&self, row: u32) -> Option<f64> {
        self.row_heights.get(&row).copied()
    }
}
