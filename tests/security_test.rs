//! Security Tests
//!
//! ZIP bomb、パストラバーサル、入力サイズ制限への対策を検証します。

use rust_xlsxwriter::Workbook;
use std::io::{Cursor, Write};
use xlsxstyle::{ConverterBuilder, SecurityConfig, XlsxStyleError};
use zip::write::{FileOptions, ZipWriter};
use zip::{CompressionMethod, ZipArchive};

/// 正常なワークブック
fn valid_workbook() -> Vec<u8> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, "data").unwrap();
    workbook.save_to_buffer().unwrap()
}

/// 正常なワークブックに任意のエントリを追加する
fn workbook_with_extra_entry(name: &str) -> Vec<u8> {
    let source = valid_workbook();
    let mut archive = ZipArchive::new(Cursor::new(source)).unwrap();

    let mut zip_data = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut zip_data));
        for i in 0..archive.len() {
            let file = archive.by_index_raw(i).unwrap();
            zip.raw_copy_file(file).unwrap();
        }

        let options = FileOptions::default().compression_method(CompressionMethod::Stored);
        zip.start_file(name, options).unwrap();
        zip.write_all(b"test").unwrap();
        zip.finish().unwrap();
    }
    zip_data
}

fn convert_with(security: SecurityConfig, data: Vec<u8>) -> Result<String, XlsxStyleError> {
    let converter = ConverterBuilder::new()
        .with_security_config(security)
        .build()
        .unwrap();
    converter.convert_to_string("input.xlsx", Cursor::new(data))
}

fn expect_violation(result: Result<String, XlsxStyleError>, needle: &str) {
    match result {
        Err(XlsxStyleError::SecurityViolation(msg)) => {
            assert!(msg.contains(needle), "unexpected message: {}", msg);
        }
        other => panic!("Expected SecurityViolation, got {:?}", other),
    }
}

/// ZIP bomb攻撃のテスト: エントリ数が上限を超える
#[test]
fn test_too_many_files() {
    let security = SecurityConfig {
        max_file_count: 3,
        ..SecurityConfig::default()
    };
    expect_violation(convert_with(security, valid_workbook()), "too many files");
}

/// ZIP bomb攻撃のテスト: 大量のエントリを含むアーカイブ（既定の上限）
#[test]
fn test_zip_bomb_too_many_files_default_limit() {
    let mut zip_data = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut zip_data));
        let options = FileOptions::default().compression_method(CompressionMethod::Stored);
        for i in 0..10_001 {
            zip.start_file(format!("xl/file{}.xml", i), options).unwrap();
            zip.write_all(b"test").unwrap();
        }
        zip.finish().unwrap();
    }

    // アーカイブの検証はcalamineによる解析より先に行われる
    expect_violation(
        convert_with(SecurityConfig::default(), zip_data),
        "too many files",
    );
}

/// 展開後の合計サイズが上限を超える
#[test]
fn test_decompressed_size_limit() {
    let security = SecurityConfig {
        max_decompressed_size: 1_000,
        ..SecurityConfig::default()
    };
    expect_violation(
        convert_with(security, valid_workbook()),
        "Total decompressed size",
    );
}

/// 単一エントリのサイズが上限を超える
#[test]
fn test_single_file_size_limit() {
    let security = SecurityConfig {
        max_file_size: 100,
        ..SecurityConfig::default()
    };
    expect_violation(convert_with(security, valid_workbook()), "exceeds maximum size");
}

/// パストラバーサル攻撃のテスト: `..`を含むパス
#[test]
fn test_path_traversal_dotdot() {
    let data = workbook_with_extra_entry("xl/../../etc/passwd");
    expect_violation(convert_with(SecurityConfig::default(), data), "Invalid ZIP path");
}

/// パストラバーサル攻撃のテスト: 絶対パス
#[test]
fn test_path_traversal_absolute_path() {
    let data = workbook_with_extra_entry("/etc/passwd");
    expect_violation(convert_with(SecurityConfig::default(), data), "Invalid ZIP path");
}

/// 入力サイズ制限
#[test]
fn test_input_file_size_limit() {
    let data = valid_workbook();
    let security = SecurityConfig {
        max_input_file_size: (data.len() - 1) as u64,
        ..SecurityConfig::default()
    };
    expect_violation(convert_with(security, data), "Input file size");
}

/// 上限ちょうどの入力は許可される
#[test]
fn test_input_file_size_at_limit() {
    let data = valid_workbook();
    let security = SecurityConfig {
        max_input_file_size: data.len() as u64,
        ..SecurityConfig::default()
    };
    assert!(convert_with(security, data).is_ok());
}

/// 正常なファイルの処理が成功することを確認
#[test]
fn test_valid_file_processing() {
    let json = convert_with(SecurityConfig::default(), valid_workbook()).unwrap();
    assert!(json.contains("\"data\""));
}

/// 名前が`..`を含むだけのエントリは許可される
#[test]
fn test_dotted_file_name_is_allowed() {
    let data = workbook_with_extra_entry("xl/media/image..png");
    assert!(convert_with(SecurityConfig::default(), data).is_ok());
}
