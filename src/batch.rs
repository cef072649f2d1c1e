//! Batch Conversion Module
//!
//! 入力ディレクトリ内のワークブックを検出し、1ファイルにつき1つのJSONを書き出すモジュール。
//!
//! 1ファイルの失敗は一括処理を中断しません。読み込みの失敗と書き込みの失敗は
//! 区別して記録され、処理結果は検出順のレポートとして返されます。

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use rayon::prelude::*;
use regex::Regex;

use crate::builder::Converter;
use crate::error::XlsxStyleError;
use crate::types::SheetDocument;

/// 検出対象の拡張子（大文字・小文字は区別しない）
const WORKBOOK_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

/// サニタイズ後に空になったファイル名の代わりに使う名前
const FALLBACK_STEM: &str = "sheet";

/// 処理に失敗した段階
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// ワークブックの読み込み・解析
    Read,
    /// JSONファイルの書き込み
    Write,
}

/// 1ファイル分の処理結果
#[derive(Debug)]
pub enum FileOutcome {
    /// JSONを書き出した
    Converted {
        /// 書き出したJSONファイルのパス
        output: PathBuf,
        /// グリッドの行数
        rows: usize,
        /// グリッドの列数
        cols: usize,
    },
    /// 処理に失敗した
    Failed {
        stage: FailureStage,
        error: XlsxStyleError,
    },
}

/// 検出された1ファイルと、その処理結果
#[derive(Debug)]
pub struct BatchEntry {
    pub source: PathBuf,
    pub outcome: FileOutcome,
}

impl BatchEntry {
    /// 元のファイル名
    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// 一括変換のレポート
#[derive(Debug)]
pub struct BatchReport {
    /// 出力ディレクトリ
    pub output_dir: PathBuf,
    /// 出力ディレクトリを新規に作成したか
    pub created_output_dir: bool,
    /// 検出順の処理結果
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    /// 検出されたファイル数
    pub fn found(&self) -> usize {
        self.entries.len()
    }

    /// JSONを書き出せたファイル数
    pub fn succeeded(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, FileOutcome::Converted { .. }))
            .count()
    }

    /// 失敗したファイル数（読み込み・書き込みの合計）
    pub fn failed(&self) -> usize {
        self.found() - self.succeeded()
    }

    /// 指定した段階で失敗したファイル数
    pub fn failed_at(&self, stage: FailureStage) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, FileOutcome::Failed { stage: s, .. } if s == stage))
            .count()
    }
}

/// ディレクトリ直下のワークブック（`.xlsx`・`.xls`）を検出する
///
/// サブディレクトリは探索しません。ドットで始まる隠しファイルは除外し、
/// 結果はファイル名順に並べます。
pub fn discover_workbooks(dir: &Path) -> Result<Vec<PathBuf>, XlsxStyleError> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let hidden = path
            .file_name()
            .map_or(true, |n| n.to_string_lossy().starts_with('.'));
        if !hidden && has_workbook_extension(&path) {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

fn has_workbook_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            WORKBOOK_EXTENSIONS
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        })
}

/// 元のファイル名から出力JSONのファイル名を生成する
///
/// 拡張子を除いた名前の`[A-Za-z0-9_&-]`以外の文字を`_`に置き換え、連続する`_`を1つにまとめ、
/// 先頭・末尾の`_`を取り除いてから`.json`を付けます。
///
/// ```
/// use xlsxstyle::sanitize_file_name;
///
/// assert_eq!(sanitize_file_name("Q3 Report (final).xlsx"), "Q3_Report_final.json");
/// assert_eq!(sanitize_file_name("R&D-plan.xlsx"), "R&D-plan.json");
/// ```
pub fn sanitize_file_name(file_name: &str) -> String {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    static UNDERSCORES: OnceLock<Regex> = OnceLock::new();
    let unsafe_chars = UNSAFE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_&-]").unwrap());
    let underscores = UNDERSCORES.get_or_init(|| Regex::new(r"_+").unwrap());

    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let replaced = unsafe_chars.replace_all(&stem, "_");
    let collapsed = underscores.replace_all(&replaced, "_");
    let trimmed = collapsed.trim_matches('_');

    let stem = if trimmed.is_empty() {
        FALLBACK_STEM
    } else {
        trimmed
    };
    format!("{}.json", stem)
}

impl Converter {
    /// 入力ディレクトリ内のすべてのワークブックを変換し、出力ディレクトリへJSONを書き出す
    ///
    /// 出力ディレクトリが存在しない場合は作成します。入力ディレクトリが存在しない場合は
    /// 警告を記録し、0件のレポートを返します。
    ///
    /// # 戻り値
    ///
    /// * `Ok(BatchReport)` - 検出順の処理結果（個々のファイルの失敗を含む）
    /// * `Err(XlsxStyleError::Io)` - 出力ディレクトリの作成、または入力ディレクトリの走査に失敗した場合
    pub fn convert_dir(
        &self,
        input_dir: impl AsRef<Path>,
        output_dir: impl AsRef<Path>,
    ) -> Result<BatchReport, XlsxStyleError> {
        let input_dir = input_dir.as_ref();
        let output_dir = output_dir.as_ref();

        let created_output_dir = !output_dir.exists();
        if created_output_dir {
            fs::create_dir_all(output_dir)?;
        }

        let sources = if input_dir.is_dir() {
            discover_workbooks(input_dir)?
        } else {
            log::warn!("Input directory '{}' does not exist", input_dir.display());
            Vec::new()
        };
        log::debug!("Found {} workbooks in '{}'", sources.len(), input_dir.display());

        // ファイルごとに変換と書き込みを完結させる。結果は検出順に並ぶ
        let entries: Vec<BatchEntry> = if self.config.parallel {
            sources
                .par_iter()
                .map(|source| self.process_file(source, output_dir))
                .collect()
        } else {
            sources
                .iter()
                .map(|source| self.process_file(source, output_dir))
                .collect()
        };

        Ok(BatchReport {
            output_dir: output_dir.to_path_buf(),
            created_output_dir,
            entries,
        })
    }

    /// 1ファイルを変換してJSONを書き出す
    fn process_file(&self, source: &Path, output_dir: &Path) -> BatchEntry {
        let outcome = match self.convert_file(source) {
            Ok(document) => self.write_json_file(source, &document, output_dir),
            Err(error) => {
                log::warn!("Failed to read '{}': {}", source.display(), error);
                FileOutcome::Failed {
                    stage: FailureStage::Read,
                    error,
                }
            }
        };
        BatchEntry {
            source: source.to_path_buf(),
            outcome,
        }
    }

    fn write_json_file(
        &self,
        source: &Path,
        document: &SheetDocument,
        output_dir: &Path,
    ) -> FileOutcome {
        let output = output_dir.join(sanitize_file_name(&document.name));

        let written = File::create(&output)
            .map_err(XlsxStyleError::from)
            .and_then(|file| self.write_document(document, BufWriter::new(file)));

        match written {
            Ok(()) => FileOutcome::Converted {
                output,
                rows: document.data.row_count(),
                cols: document.data.col_count(),
            },
            Err(error) => {
                log::warn!(
                    "Failed to write '{}' for '{}': {}",
                    output.display(),
                    source.display(),
                    error
                );
                FileOutcome::Failed {
                    stage: FailureStage::Write,
                    error,
                }
            }
        }
    }
}
