//! Grid Builder Module
//!
//! ワークシートから行優先のスタイルグリッドを構築するモジュール。
//!
//! 構築は2パスで行います:
//! 1. 使用範囲のすべての列について列幅を計算する（1行目と続く最大8行のみを参照）
//! 2. 行ごとに高さを計算し、各セルのスタイルを解決して列幅・行の高さを上書きする

use crate::dimension::{column_widths, row_height};
use crate::sheet::WorksheetSource;
use crate::style::CellStyler;
use crate::types::{CellCoord, SheetGrid};

/// ワークシート全体のスタイルグリッドを構築する
pub fn build_grid<S: WorksheetSource + ?Sized>(sheet: &S) -> SheetGrid {
    GridBuilder::new().build(sheet)
}

/// グリッドビルダー
#[derive(Debug, Clone, Default)]
pub(crate) struct GridBuilder {
    styler: CellStyler,
}

impl GridBuilder {
    pub fn new() -> Self {
        Self {
            styler: CellStyler::new(),
        }
    }

    pub fn build<S: WorksheetSource + ?Sized>(&self, sheet: &S) -> SheetGrid {
        let widths = column_widths(sheet);

        let rows: Vec<Vec<_>> = (1..=sheet.used_rows())
            .map(|row| {
                let height = row_height(sheet, row);
                widths
                    .iter()
                    .zip(1u32..)
                    .map(|(&width, col)| {
                        let coord = CellCoord::new(row, col);
                        let mut record = self.styler.style_cell(
                            coord,
                            sheet.value_text(coord),
                            sheet.cell_format(coord),
                        );
                        record.column_width = width;
                        record.row_height = height;
                        record
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        SheetGrid::from_rows(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::SheetModel;
    use crate::types::{CellFormat, ColorSource, FillDescriptor, FontDescriptor, FontWeight};

    fn solid(color: ColorSource) -> Option<FillDescriptor> {
        Some(FillDescriptor {
            pattern_type: Some("solid".to_string()),
            start_color: Some(color),
        })
    }

    #[test]
    fn test_empty_sheet_yields_empty_grid() {
        let grid = build_grid(&SheetModel::new("Empty"));
        assert_eq!(grid.row_count(), 0);
        assert_eq!(grid.col_count(), 0);
    }

    #[test]
    fn test_grid_covers_used_range() {
        let mut sheet = SheetModel::new("Sheet1");
        sheet.set_value(CellCoord::new(3, 4), "last");
        let grid = build_grid(&sheet);

        assert_eq!(grid.row_count(), 3);
        assert_eq!(grid.col_count(), 4);
        assert!(grid.rows().iter().all(|row| row.len() == 4));
        assert_eq!(grid.get(2, 3).unwrap().value, "last");
        assert_eq!(grid.get(0, 0).unwrap().value, "");
    }

    #[test]
    fn test_dimensions_applied_row_and_column_wide() {
        let mut sheet = SheetModel::new("Sheet1");
        sheet.set_value(CellCoord::new(1, 1), "Header");
        sheet.set_value(CellCoord::new(2, 2), "x".repeat(25));
        sheet.set_value(CellCoord::new(12, 2), "y".repeat(60));
        sheet.set_column_width(1, 10.0);
        sheet.set_row_height(2, 15.0);

        let grid = build_grid(&sheet);
        for row in grid.rows() {
            assert_eq!(row[0].column_width, 70);
            assert_eq!(row[1].column_width, 250);
        }
        assert!(grid.rows()[1].iter().all(|cell| cell.row_height == 11));
        assert!(grid.rows()[0].iter().all(|cell| cell.row_height == 20));
    }

    #[test]
    fn test_header_and_keyword_cells() {
        let mut sheet = SheetModel::new("Sheet1");
        sheet.set_value(CellCoord::new(1, 1), "Name");
        sheet.set_format(
            CellCoord::new(1, 1),
            CellFormat {
                font: Some(FontDescriptor {
                    bold: true,
                    ..FontDescriptor::default()
                }),
                fill: solid(ColorSource::theme("4")),
                alignment: None,
            },
        );
        sheet.set_value(CellCoord::new(2, 3), "preferred option");
        sheet.set_format(
            CellCoord::new(2, 3),
            CellFormat {
                fill: solid(ColorSource::theme("99")),
                ..CellFormat::default()
            },
        );

        let grid = build_grid(&sheet);
        let header = grid.get(0, 0).unwrap();
        assert_eq!(header.font_weight, FontWeight::Bold);
        assert_eq!(header.background_color.as_str(), "#4472C4");

        let keyword = grid.get(1, 2).unwrap();
        assert_eq!(keyword.background_color.as_str(), "#FFFF00");
    }
}
