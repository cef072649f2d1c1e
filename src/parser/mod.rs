//! Parser Module
//!
//! calamineとquick-xmlを使用したExcelファイル解析の実装。
//! セル値はcalamineから、書式と寸法はパッケージ内のXMLから直接読み取ります。

mod metadata;
mod workbook;

pub(crate) use metadata::XlsxMetadataParser;
pub(crate) use workbook::WorkbookParser;
