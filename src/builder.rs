//! Builder Module
//!
//! Fluent Builder APIを提供し、`Converter`インスタンスを段階的に構築する。

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use crate::api::{JsonLayout, SheetSelector};
use crate::error::XlsxStyleError;
use crate::grid::build_grid;
use crate::output::JsonWriter;
use crate::parser::WorkbookParser;
use crate::security::SecurityConfig;
use crate::types::SheetDocument;

/// 変換処理の設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct ConversionConfig {
    /// シート選択方式
    pub sheet_selector: SheetSelector,

    /// JSONの出力レイアウト
    pub json_layout: JsonLayout,

    /// ディレクトリ一括変換でファイルを並列に処理するか
    pub parallel: bool,

    /// セキュリティ制限
    pub security: SecurityConfig,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            sheet_selector: SheetSelector::Active,
            json_layout: JsonLayout::Pretty,
            parallel: true,
            security: SecurityConfig::default(),
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// `Converter`インスタンスを段階的に構築するためのビルダーです。
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxstyle::{ConverterBuilder, SheetSelector};
///
/// # fn main() -> Result<(), xlsxstyle::XlsxStyleError> {
/// let converter = ConverterBuilder::new()
///     .with_sheet_selector(SheetSelector::Index(0))
///     .with_pretty_json(false)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConverterBuilder {
    /// 内部設定（構築中）
    config: ConversionConfig,
}

impl ConverterBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - シート選択: アクティブシート
    /// - JSON: 2スペースインデントで整形
    /// - ディレクトリ一括変換: 並列処理
    /// - 入力ファイルの上限: 2GB
    pub fn new() -> Self {
        Self {
            config: ConversionConfig::default(),
        }
    }

    /// 変換対象のシートを選択する
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use xlsxstyle::{ConverterBuilder, SheetSelector};
    ///
    /// // 2番目のシート
    /// let builder = ConverterBuilder::new()
    ///     .with_sheet_selector(SheetSelector::Index(1));
    ///
    /// // シート名で指定
    /// let builder = ConverterBuilder::new()
    ///     .with_sheet_selector(SheetSelector::Name("Analysis".to_string()));
    /// ```
    pub fn with_sheet_selector(mut self, selector: SheetSelector) -> Self {
        self.config.sheet_selector = selector;
        self
    }

    /// JSONを整形して出力するかを指定する
    ///
    /// * `true`: 2スペースインデント（デフォルト）
    /// * `false`: 改行・インデントなし
    pub fn with_pretty_json(mut self, pretty: bool) -> Self {
        self.config.json_layout = if pretty {
            JsonLayout::Pretty
        } else {
            JsonLayout::Compact
        };
        self
    }

    /// ディレクトリ一括変換でファイルを並列に処理するかを指定する
    ///
    /// 並列に処理した場合も、結果は検出順に報告されます。
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// 入力ファイルの最大サイズ（バイト）を指定する
    pub fn with_max_input_size(mut self, bytes: u64) -> Self {
        self.config.security.max_input_file_size = bytes;
        self
    }

    /// ZIPアーカイブと入力ファイルのセキュリティ制限をまとめて指定する
    pub fn with_security_config(mut self, security: SecurityConfig) -> Self {
        self.config.security = security;
        self
    }

    /// 設定を検証し、`Converter`インスタンスを生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `XlsxStyleError::Config(String)`: 設定の検証に失敗した場合
    ///   * 入力ファイルの最大サイズが0
    ///   * シート名指定が空文字列
    pub fn build(self) -> Result<Converter, XlsxStyleError> {
        if self.config.security.max_input_file_size == 0 {
            return Err(XlsxStyleError::Config(
                "Maximum input size must be greater than zero".to_string(),
            ));
        }

        if let SheetSelector::Name(ref name) = self.config.sheet_selector {
            if name.is_empty() {
                return Err(XlsxStyleError::Config(
                    "Sheet name must not be empty".to_string(),
                ));
            }
        }

        Ok(Converter::new(self.config))
    }
}

/// 変換処理のファサード
///
/// ワークブックをスタイル付きJSONドキュメントに変換するためのメインエントリーポイントです。
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxstyle::ConverterBuilder;
/// use std::fs::File;
///
/// # fn main() -> Result<(), xlsxstyle::XlsxStyleError> {
/// let converter = ConverterBuilder::new().build()?;
/// let input = File::open("report.xlsx")?;
/// let output = File::create("report.json")?;
/// converter.convert("report.xlsx", input, output)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Converter {
    /// 変換設定
    pub(crate) config: ConversionConfig,
}

impl Converter {
    pub(crate) fn new(config: ConversionConfig) -> Self {
        Self { config }
    }

    /// ワークブックを読み込み、選択されたシートのドキュメントを構築する
    ///
    /// # 引数
    ///
    /// * `name` - ドキュメントの`name`に記録する名前（通常は元のファイル名）
    /// * `input` - XLSXファイルを読み込むためのリーダー
    ///
    /// # 処理フロー
    ///
    /// 1. ワークブックとXMLメタデータの読み込み
    /// 2. シート選択
    /// 3. セル値・書式・寸法の読み込み
    /// 4. スタイルグリッドの構築
    pub fn convert_document<R: Read>(
        &self,
        name: &str,
        input: R,
    ) -> Result<SheetDocument, XlsxStyleError> {
        let mut parser = WorkbookParser::open(input, &self.config.security)?;
        let sheet_name = parser.select_sheet(&self.config.sheet_selector)?;
        log::debug!("Converting '{}' (sheet '{}')", name, sheet_name);

        let sheet = parser.read_sheet(&sheet_name)?;
        let data = build_grid(&sheet);
        log::debug!(
            "Built grid for '{}': {} rows x {} columns",
            name,
            data.row_count(),
            data.col_count()
        );

        Ok(SheetDocument {
            name: name.to_string(),
            data,
        })
    }

    /// ワークブックをJSONに変換してライターへ書き出す
    pub fn convert<R: Read, W: Write>(
        &self,
        name: &str,
        input: R,
        output: W,
    ) -> Result<(), XlsxStyleError> {
        let document = self.convert_document(name, input)?;
        self.write_document(&document, output)
    }

    /// ワークブックをJSON文字列に変換
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use std::fs::File;
    /// use xlsxstyle::ConverterBuilder;
    ///
    /// # fn main() -> Result<(), xlsxstyle::XlsxStyleError> {
    /// let converter = ConverterBuilder::new().with_pretty_json(false).build()?;
    /// let json = converter.convert_to_string("report.xlsx", File::open("report.xlsx")?)?;
    /// println!("{}", json);
    /// # Ok(())
    /// # }
    /// ```
    pub fn convert_to_string<R: Read>(&self, name: &str, input: R) -> Result<String, XlsxStyleError> {
        let document = self.convert_document(name, input)?;
        JsonWriter::new(self.config.json_layout).to_string(&document)
    }

    /// ファイルを読み込み、ファイル名を`name`としたドキュメントを構築する
    pub fn convert_file(&self, path: impl AsRef<Path>) -> Result<SheetDocument, XlsxStyleError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let file = File::open(path)?;
        self.convert_document(&name, BufReader::new(file))
    }

    /// ドキュメントを設定されたレイアウトのJSONで書き出す
    pub fn write_document<W: Write>(
        &self,
        document: &SheetDocument,
        output: W,
    ) -> Result<(), XlsxStyleError> {
        JsonWriter::new(self.config.json_layout).write(document, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converter_builder_new() {
        let builder = ConverterBuilder::new();
        assert_eq!(builder.config.sheet_selector, SheetSelector::Active);
        assert_eq!(builder.config.json_layout, JsonLayout::Pretty);
        assert!(builder.config.parallel);
        assert_eq!(builder.config.security, SecurityConfig::default());
    }

    #[test]
    fn test_with_sheet_selector() {
        let builder = ConverterBuilder::new().with_sheet_selector(SheetSelector::Index(2));
        assert_eq!(builder.config.sheet_selector, SheetSelector::Index(2));

        let builder = ConverterBuilder::new()
            .with_sheet_selector(SheetSelector::Name("Analysis".to_string()));
        assert!(matches!(
            builder.config.sheet_selector,
            SheetSelector::Name(ref name) if name == "Analysis"
        ));
    }

    #[test]
    fn test_with_pretty_json() {
        let builder = ConverterBuilder::new().with_pretty_json(false);
        assert_eq!(builder.config.json_layout, JsonLayout::Compact);
        let builder = builder.with_pretty_json(true);
        assert_eq!(builder.config.json_layout, JsonLayout::Pretty);
    }

    #[test]
    fn test_builder_method_chaining() {
        let builder = ConverterBuilder::new()
            .with_sheet_selector(SheetSelector::Index(0))
            .with_pretty_json(false)
            .with_parallel(false)
            .with_max_input_size(1024);

        assert_eq!(builder.config.sheet_selector, SheetSelector::Index(0));
        assert_eq!(builder.config.json_layout, JsonLayout::Compact);
        assert!(!builder.config.parallel);
        assert_eq!(builder.config.security.max_input_file_size, 1024);
    }

    #[test]
    fn test_with_security_config() {
        let security = SecurityConfig {
            max_file_count: 10,
            ..SecurityConfig::default()
        };
        let builder = ConverterBuilder::new().with_security_config(security.clone());
        assert_eq!(builder.config.security, security);
    }

    #[test]
    fn test_build_success() {
        assert!(ConverterBuilder::new().build().is_ok());
    }

    #[test]
    fn test_build_with_zero_input_size() {
        let result = ConverterBuilder::new().with_max_input_size(0).build();
        match result {
            Err(XlsxStyleError::Config(msg)) => assert!(msg.contains("greater than zero")),
            _ => panic!("Expected Config error"),
        }
    }

    #[test]
    fn test_build_with_empty_sheet_name() {
        let result = ConverterBuilder::new()
            .with_sheet_selector(SheetSelector::Name(String::new()))
            .build();
        match result {
            Err(XlsxStyleError::Config(msg)) => assert!(msg.contains("Sheet name")),
            _ => panic!("Expected Config error"),
        }
    }

    #[test]
    fn test_convert_with_invalid_input() {
        let converter = ConverterBuilder::new().build().unwrap();
        let result = converter.convert_to_string("empty.xlsx", std::io::Cursor::new(Vec::new()));
        assert!(result.is_err());
    }

    #[test]
    fn test_convert_rejects_oversized_input() {
        let converter = ConverterBuilder::new().with_max_input_size(4).build().unwrap();
        let result = converter.convert_document("big.xlsx", std::io::Cursor::new(vec![0u8; 16]));
        assert!(matches!(result, Err(XlsxStyleError::SecurityViolation(_))));
    }

    #[test]
    fn test_convert_file_missing() {
        let converter = ConverterBuilder::new().build().unwrap();
        let result = converter.convert_file("definitely/not/here.xlsx");
        assert!(matches!(result, Err(XlsxStyleError::Io(_))));
    }
}
