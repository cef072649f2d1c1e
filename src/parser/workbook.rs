//! Workbook Parser Module
//!
//! calamineによるセル値の読み込みと、XMLメタデータ（書式・寸法）を組み合わせて、
//! 1シート分の`SheetModel`を構築するモジュール。

use calamine::{open_workbook_auto_from_rs, Reader, Sheets, Xlsx};
use std::io::{Cursor, Read};

use crate::api::SheetSelector;
use crate::error::XlsxStyleError;
use crate::formatter::ValueFormatter;
use crate::parser::XlsxMetadataParser;
use crate::security::SecurityConfig;
use crate::sheet::{SheetModel, WorksheetSource};
use crate::types::CellCoord;

/// ワークブックパーサー
///
/// calamineのラッパーとして、ワークブックレベルの操作を提供します。
pub(crate) struct WorkbookParser {
    /// calamineのワークブック（XLSX形式のみサポート）
    workbook: Xlsx<Cursor<Vec<u8>>>,
    /// XMLメタデータパーサー
    metadata: XlsxMetadataParser,
}

impl WorkbookParser {
    /// ワークブックを開き、XMLメタデータも解析する
    ///
    /// # 引数
    ///
    /// * `reader` - Excelファイルを読み込むためのリーダー
    /// * `security` - セキュリティ設定
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookParser)` - ワークブックとメタデータの読み込みに成功した場合
    /// * `Err(XlsxStyleError::UnsupportedFormat)` - XLSX以外の形式の場合
    /// * `Err(XlsxStyleError)` - その他の読み込みエラー
    pub fn open<R: Read>(mut reader: R, security: &SecurityConfig) -> Result<Self, XlsxStyleError> {
        // 上限を1バイト超えた時点で読み込みを打ち切る
        let mut buffer = Vec::new();
        reader
            .by_ref()
            .take(security.max_input_file_size.saturating_add(1))
            .read_to_end(&mut buffer)?;
        security.check_input_size(buffer.len() as u64)?;

        // calamineに渡す前にアーカイブを検証する（ZIPでない入力の判定はcalamineに任せる）
        let metadata = match XlsxMetadataParser::new(buffer.clone(), security) {
            Err(e @ XlsxStyleError::SecurityViolation(_)) => return Err(e),
            other => other,
        };

        let sheets = open_workbook_auto_from_rs(Cursor::new(buffer))?;
        let workbook = match sheets {
            Sheets::Xlsx(workbook) => workbook,
            Sheets::Xls(_) => {
                return Err(XlsxStyleError::UnsupportedFormat(
                    "legacy .xls workbooks carry no readable style table".to_string(),
                ))
            }
            _ => {
                return Err(XlsxStyleError::UnsupportedFormat(
                    "only XLSX workbooks are supported".to_string(),
                ))
            }
        };

        let metadata = metadata?;

        Ok(WorkbookParser { workbook, metadata })
    }

    /// すべてのシート名を取得（ワークブック内の順）
    pub fn sheet_names(&self) -> Vec<String> {
        let names: Vec<String> = self
            .metadata
            .sheets()
            .iter()
            .map(|entry| entry.name.clone())
            .collect();
        if names.is_empty() {
            self.workbook.sheet_names().to_vec()
        } else {
            names
        }
    }

    /// シート選択方式に基づいてシートを選択
    ///
    /// # 戻り値
    ///
    /// * `Ok(String)` - 選択されたシート名
    /// * `Err(XlsxStyleError::SheetNotFound)` - シートが見つからない、またはインデックスが範囲外の場合
    pub fn select_sheet(&self, selector: &SheetSelector) -> Result<String, XlsxStyleError> {
        let names = self.sheet_names();

        match selector {
            SheetSelector::Active => {
                // 記録されたアクティブシートが範囲外なら最初のシート
                let index = self.metadata.active_tab();
                names
                    .get(index)
                    .or_else(|| names.first())
                    .cloned()
                    .ok_or_else(|| {
                        XlsxStyleError::SheetNotFound("workbook contains no sheets".to_string())
                    })
            }
            SheetSelector::Index(index) => names.get(*index).cloned().ok_or_else(|| {
                XlsxStyleError::SheetNotFound(format!(
                    "index {} is out of range (total: {})",
                    index,
                    names.len()
                ))
            }),
            SheetSelector::Name(name) => {
                if names.contains(name) {
                    Ok(name.clone())
                } else {
                    Err(XlsxStyleError::SheetNotFound(format!("'{}'", name)))
                }
            }
        }
    }

    /// シートを読み込み、値・書式・寸法を持つ`SheetModel`を構築
    ///
    /// 使用範囲はA1から、値を持つセルと`<c>`要素が現れたセルの最大行・最大列までです。
    pub fn read_sheet(&mut self, sheet_name: &str) -> Result<SheetModel, XlsxStyleError> {
        // 不正なセル参照はcalamineに読ませる前にレイアウトの解析で弾く
        let layout = self.metadata.worksheet_layout(sheet_name)?;
        let range = self
            .workbook
            .worksheet_range(sheet_name)
            .map_err(|e| XlsxStyleError::Parse(e.into()))?;
        let formatter = ValueFormatter::new(self.metadata.is_1904());

        let mut sheet = SheetModel::new(sheet_name);

        for format in self.metadata.styles() {
            sheet.add_style(format.clone());
        }
        // s属性を持たないセルはcellXfsの先頭の書式
        if !self.metadata.styles().is_empty() {
            sheet.set_default_style(Some(0));
        }

        if let Some((start_row, start_col)) = range.start() {
            for (row, col, value) in range.used_cells() {
                let text = formatter.format(value);
                if text.is_empty() {
                    continue;
                }
                let coord = CellCoord::new(
                    start_row + row as u32 + 1,
                    start_col + col as u32 + 1,
                );
                sheet.set_value(coord, text);
            }
        }

        sheet.extend_used_range(layout.max_row, layout.max_col);
        for (coord, index) in layout.cell_styles {
            sheet.set_style_index(coord, index);
        }
        for (col, width) in layout.column_widths {
            sheet.set_column_width(col, width);
        }
        for (row, height) in layout.row_heights {
            sheet.set_row_height(row, height);
        }

        log::debug!(
            "Read sheet '{}': used range {}x{}, {} cell formats",
            sheet_name,
            sheet.used_rows(),
            sheet.used_cols(),
            self.metadata.styles().len()
        );

        Ok(sheet)
    }
}

// 実際のXLSXファイルが必要なため、テストは統合テスト（tests/）で実装します。
