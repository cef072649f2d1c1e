//! Output Module
//!
//! シートドキュメントをJSONとして書き出すモジュール。
//!
//! 出力形式は `{"name": "<ファイル名>", "data": [[<12要素の配列>, ...], ...]}` です。
//! 非ASCII文字はエスケープせずUTF-8のまま出力します。

use std::io::Write;

use crate::api::JsonLayout;
use crate::error::XlsxStyleError;
use crate::types::SheetDocument;

/// JSONライター
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct JsonWriter {
    layout: JsonLayout,
}

impl JsonWriter {
    pub fn new(layout: JsonLayout) -> Self {
        Self { layout }
    }

    /// ドキュメントをライターへ書き出す
    pub fn write<W: Write>(
        &self,
        document: &SheetDocument,
        mut writer: W,
    ) -> Result<(), XlsxStyleError> {
        match self.layout {
            JsonLayout::Pretty => serde_json::to_writer_pretty(&mut writer, document)?,
            JsonLayout::Compact => serde_json::to_writer(&mut writer, document)?,
        }
        writer.flush()?;
        Ok(())
    }

    /// ドキュメントを文字列に変換
    pub fn to_string(&self, document: &SheetDocument) -> Result<String, XlsxStyleError> {
        let json = match self.layout {
            JsonLayout::Pretty => serde_json::to_string_pretty(document)?,
            JsonLayout::Compact => serde_json::to_string(document)?,
        };
        Ok(json)
    }
}
