//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。
//!
//! セル単位のスタイル解決（色・フォント・寸法）はエラーを返さず、常に既定値へ
//! フォールバックします。このエラー型が使われるのはファイル単位の処理
//! （ワークブックの読み込み、解析、JSON出力）だけです。

use thiserror::Error;

/// xlsxstyleクレート全体で使用するエラー型
///
/// # エラーの種類
///
/// - `Io`: I/O操作中に発生したエラー（ファイル読み込み・書き込み失敗など）
/// - `Parse`: セル値の読み込み中に発生したエラー（calamine由来）
/// - `Xml`: スタイル・シート定義XMLの解析エラー
/// - `Json`: JSONシリアライズのエラー
/// - `Config`: 設定の検証に失敗したエラー
/// - `UnsupportedFormat`: XLSX以外の形式が入力された
/// - `SheetNotFound`: 指定されたシートが存在しない
/// - `SecurityViolation`: ZIPアーカイブのセキュリティ制限違反
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxstyle::XlsxStyleError;
/// use std::fs::File;
///
/// fn read_excel_file(path: &str) -> Result<(), XlsxStyleError> {
///     let file = File::open(path)?;  // Ioエラーが自動的に変換される
///     // ... 処理 ...
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum XlsxStyleError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Excelファイルの解析中に発生したエラー
    ///
    /// calamineクレートがセル値を読み込む際に発生したエラーです。
    /// ファイル形式が不正、破損したファイルなどが原因となります。
    #[error("Failed to parse Excel file: {0}")]
    Parse(#[from] calamine::Error),

    /// UTF-8文字列の変換エラー
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// ZIPアーカイブの解析エラー
    #[error("ZIP archive error: {0}")]
    Zip(String),

    /// XMLパーツ（styles.xml, workbook.xml, sheet*.xml）の解析エラー
    #[error("XML error in '{part}': {message}")]
    Xml {
        /// パッケージ内のパーツ名（例: `xl/styles.xml`）
        part: String,
        /// エラーの詳細
        message: String,
    },

    /// JSONシリアライズのエラー
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// 設定の検証に失敗したエラー
    ///
    /// `ConverterBuilder::build()`時に設定を検証し、無効な設定が検出された
    /// 場合に発生します。
    ///
    /// # 例
    ///
    /// ```rust,no_run
    /// use xlsxstyle::{ConverterBuilder, SheetSelector, XlsxStyleError};
    ///
    /// let result = ConverterBuilder::new()
    ///     .with_sheet_selector(SheetSelector::Name(String::new()))
    ///     .build();
    ///
    /// match result {
    ///     Err(XlsxStyleError::Config(msg)) => {
    ///         println!("設定エラー: {}", msg);
    ///     }
    ///     _ => {}
    /// }
    /// ```
    #[error("Configuration error: {0}")]
    Config(String),

    /// XLSX以外の形式（.xls, .ods など）が入力された
    ///
    /// スタイル情報はOOXMLのstyles.xmlからしか読み込めないため、
    /// 旧形式のワークブックはこのエラーで拒否されます。
    #[error("Unsupported workbook format: {0}")]
    UnsupportedFormat(String),

    /// 指定されたシートがワークブックに存在しない
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// セキュリティ制限に違反したエラー
    ///
    /// ZIP bomb攻撃、パストラバーサル攻撃、ファイルサイズ制限などの
    /// セキュリティ制限に違反した場合に発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}

impl XlsxStyleError {
    /// XMLパーツの解析エラーを生成する
    pub(crate) fn xml(part: &str, message: impl std::fmt::Display) -> Self {
        XlsxStyleError::Xml {
            part: part.to_string(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: XlsxStyleError = io_err.into();

        match error {
            XlsxStyleError::Io(e) => {
                assert_eq!(e.kind(), io::ErrorKind::NotFound);
                assert_eq!(e.to_string(), "File not found");
            }
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_parse_error_display() {
        let parse_err = calamine::Error::Msg("Corrupted file");
        let error: XlsxStyleError = parse_err.into();

        let error_msg = error.to_string();
        assert!(error_msg.contains("Failed to parse Excel file"));
        assert!(error_msg.contains("Corrupted file"));
    }

    #[test]
    fn test_xml_error_display() {
        let error = XlsxStyleError::xml("xl/styles.xml", "unexpected end of file");
        assert_eq!(
            error.to_string(),
            "XML error in 'xl/styles.xml': unexpected end of file"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: XlsxStyleError = json_err.into();
        assert!(matches!(error, XlsxStyleError::Json(_)));
        assert!(error.to_string().starts_with("JSON serialization error"));
    }

    #[test]
    fn test_error_conversion_with_question_mark() {
        fn io_operation() -> Result<(), XlsxStyleError> {
            let _file = std::fs::File::open("nonexistent_file.xlsx")?;
            Ok(())
        }

        match io_operation() {
            Err(XlsxStyleError::Io(_)) => {}
            _ => panic!("Expected Io error from ? operator"),
        }
    }

    #[test]
    fn test_all_error_formats() {
        let io_err: XlsxStyleError = io::Error::other("test io").into();
        assert!(io_err.to_string().starts_with("IO error"));

        let config_err = XlsxStyleError::Config("test config".to_string());
        assert!(config_err.to_string().starts_with("Configuration error"));

        let unsupported = XlsxStyleError::UnsupportedFormat("xls".to_string());
        assert!(unsupported
            .to_string()
            .starts_with("Unsupported workbook format"));

        let missing = XlsxStyleError::SheetNotFound("Data".to_string());
        assert_eq!(missing.to_string(), "Sheet not found: Data");

        let security = XlsxStyleError::SecurityViolation("too many files".to_string());
        assert!(security.to_string().starts_with("Security violation"));
    }
}
