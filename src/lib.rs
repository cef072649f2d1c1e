//! xlsxstyle - Pure-Rust Excel reader that converts worksheets into styled JSON grids
//!
//! This crate reads an XLSX workbook, resolves every cell of the selected sheet
//! into a fully-specified visual style (text and background color, font,
//! alignment, column width, row height), and emits one JSON document per file
//! for a spreadsheet-like web renderer.
//!
//! Each cell becomes a 12-element array:
//!
//! ```text
//! [value, color, backgroundColor, fontWeight, fontStyle, textDecoration,
//!  fontSize, fontFamily, textAlign, verticalAlign, columnWidth, rowHeight]
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::fs::File;
//! use xlsxstyle::ConverterBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = ConverterBuilder::new().build()?;
//!
//!     let input = File::open("report.xlsx")?;
//!     let output = File::create("report.json")?;
//!     converter.convert("report.xlsx", input, output)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Batch Conversion
//!
//! ```rust,no_run
//! use xlsxstyle::ConverterBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = ConverterBuilder::new().build()?;
//!     let report = converter.convert_dir("Analysis", "excel_data")?;
//!     println!("{} of {} files converted", report.succeeded(), report.found());
//!     Ok(())
//! }
//! ```
//!
//! # Custom Worksheets
//!
//! The style pipeline does not depend on the XLSX reader. Anything implementing
//! [`WorksheetSource`] can be turned into a grid, for example a [`SheetModel`]
//! assembled in memory:
//!
//! ```rust
//! use xlsxstyle::{build_grid, CellCoord, SheetModel};
//!
//! let mut sheet = SheetModel::new("Sheet1");
//! sheet.set_value(CellCoord::new(1, 1), "Name");
//! sheet.set_column_width(1, 10.0);
//!
//! let grid = build_grid(&sheet);
//! assert_eq!(grid.get(0, 0).unwrap().column_width, 70);
//! ```

mod api;
mod batch;
mod builder;
mod color;
mod dimension;
mod error;
mod formatter;
mod grid;
mod output;
mod parser;
mod security;
mod sheet;
mod style;
mod types;

// 公開API
pub use api::{JsonLayout, SheetSelector};
pub use batch::{
    discover_workbooks, sanitize_file_name, BatchEntry, BatchReport, FailureStage, FileOutcome,
};
pub use builder::{Converter, ConverterBuilder};
pub use color::{
    guess_fill_from_context, resolve_rgb, resolve_theme, CellContext, ColorResolver, ColorTarget,
    ThemeLookup, CATEGORY_FILL, HEADER_FILL, THEME_PALETTE,
};
pub use dimension::{
    column_width, column_widths, estimate_width, height_from_declared, row_height,
    width_from_declared, DEFAULT_ROW_HEIGHT, MAX_COLUMN_WIDTH, MIN_COLUMN_WIDTH,
};
pub use error::XlsxStyleError;
pub use grid::build_grid;
pub use security::SecurityConfig;
pub use sheet::{SheetModel, WorksheetSource};
pub use style::{extract_background, extract_font_and_alignment, TextStyle};
pub use types::{
    AlignmentDescriptor, CellCoord, CellFormat, ColorSource, FillDescriptor, FontDescriptor,
    FontStyle, FontWeight, HexColor, SheetDocument, SheetGrid, StyleRecord, TextDecoration,
};
