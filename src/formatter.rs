//! Formatter Module
//!
//! calamineが読み取ったセル値を、出力JSONの`value`に入る表示テキストへ変換するモジュール。
//!
//! 数値書式（Number Format String）は適用しません。整数値の浮動小数点数は整数として、
//! 日時シリアル値はワークブックの日付システム（1900年/1904年）に従って
//! `YYYY-MM-DD HH:MM:SS`形式で表示します。

use calamine::{Data, ExcelDateTime};
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// 整数として表示する浮動小数点数の絶対値の上限
const MAX_INTEGRAL_FLOAT: f64 = 1e15;

/// 日付として解釈するシリアル値の上限（9999-12-31）
const MAX_DATE_SERIAL: f64 = 2_958_465.0;

/// 1日あたりの秒数
const SECONDS_PER_DAY: f64 = 86_400.0;

/// セル値フォーマッター
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ValueFormatter {
    /// 1904年エポックを使用するかどうか
    is_1904: bool,
}

impl ValueFormatter {
    pub fn new(is_1904: bool) -> Self {
        Self { is_1904 }
    }

    /// セル値を表示テキストに変換
    ///
    /// # 引数
    ///
    /// * `value` - calamineのセル値
    ///
    /// # 戻り値
    ///
    /// 表示テキスト。空セルは空文字列。
    pub fn format(&self, value: &Data) -> String {
        match value {
            Data::Empty => String::new(),
            Data::String(s) => s.clone(),
            Data::Int(i) => i.to_string(),
            Data::Float(f) => format_number(*f),
            Data::Bool(b) => if *b { "True" } else { "False" }.to_string(),
            Data::Error(e) => e.to_string(),
            Data::DateTime(dt) => self.format_date_time(dt),
            Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        }
    }

    fn format_date_time(&self, dt: &ExcelDateTime) -> String {
        let serial = dt.as_f64();
        if dt.is_duration() {
            return format_duration(serial);
        }
        match serial_to_datetime(serial, self.is_1904) {
            // 日付部分を持たないシリアル値は時刻のみ
            Some(datetime) if serial < 1.0 && serial >= 0.0 => {
                datetime.format("%H:%M:%S").to_string()
            }
            Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => format_number(serial),
        }
    }
}

/// 数値を表示テキストに変換（整数値なら小数部なし）
pub(crate) fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < MAX_INTEGRAL_FLOAT {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// 日時シリアル値をNaiveDateTimeに変換
///
/// 1900年システムでは存在しない1900年2月29日（シリアル値60）が数えられているため、
/// 61未満のシリアル値は起点を1日ずらして補正します。
fn serial_to_datetime(serial: f64, is_1904: bool) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(0.0..=MAX_DATE_SERIAL).contains(&serial) {
        return None;
    }

    let epoch = if is_1904 {
        NaiveDate::from_ymd_opt(1904, 1, 1)?
    } else if serial < 61.0 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };

    let days = serial.trunc();
    let seconds = ((serial - serial.trunc()) * SECONDS_PER_DAY).round();
    let base = epoch.and_hms_opt(0, 0, 0)?;
    base.checked_add_signed(Duration::days(days as i64))?
        .checked_add_signed(Duration::seconds(seconds as i64))
}

/// 経過時間を`H:MM:SS`形式に変換
fn format_duration(serial: f64) -> String {
    // `as`は範囲外の値を飽和させる
    let total = (serial * SECONDS_PER_DAY).round() as i64;
    let sign = if total < 0 { "-" } else { "" };
    let total = total.unsigned_abs();
    format!(
        "{}{}:{:02}:{:02}",
        sign,
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{CellErrorType, ExcelDateTimeType};

    fn date_time(serial: f64) -> Data {
        Data::DateTime(ExcelDateTime::new(serial, ExcelDateTimeType::DateTime, false))
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(2.0), "2");
        assert_eq!(format_number(-7.0), "-7");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(0.1), "0.1");
        assert_eq!(format_number(f64::NAN), "NaN");
    }

    #[test]
    fn test_format_scalars() {
        let formatter = ValueFormatter::new(false);
        assert_eq!(formatter.format(&Data::Empty), "");
        assert_eq!(formatter.format(&Data::String("Name".to_string())), "Name");
        assert_eq!(formatter.format(&Data::Int(42)), "42");
        assert_eq!(formatter.format(&Data::Float(3.0)), "3");
        assert_eq!(formatter.format(&Data::Bool(true)), "True");
        assert_eq!(formatter.format(&Data::Bool(false)), "False");
        assert_eq!(formatter.format(&Data::Error(CellErrorType::Div0)), "#DIV/0!");
    }

    #[test]
    fn test_format_iso_strings_verbatim() {
        let formatter = ValueFormatter::new(false);
        assert_eq!(
            formatter.format(&Data::DateTimeIso("2024-01-15T10:30:00".to_string())),
            "2024-01-15T10:30:00"
        );
        assert_eq!(
            formatter.format(&Data::DurationIso("PT1H30M".to_string())),
            "PT1H30M"
        );
    }

    #[test]
    fn test_serial_to_datetime_1900() {
        let dt = serial_to_datetime(45306.0, false).unwrap();
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "2024-01-15");

        let dt = serial_to_datetime(1.0, false).unwrap();
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "1900-01-01");

        let dt = serial_to_datetime(61.0, false).unwrap();
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "1900-03-01");
    }

    #[test]
    fn test_serial_to_datetime_1904() {
        let dt = serial_to_datetime(0.0, true).unwrap();
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "1904-01-01");
    }

    #[test]
    fn test_out_of_range_serial_falls_back_to_number() {
        assert!(serial_to_datetime(-1.0, false).is_none());
        let formatter = ValueFormatter::new(false);
        assert_eq!(formatter.format(&date_time(1e12)), "1000000000000");
    }

    #[test]
    fn test_format_date_time() {
        let formatter = ValueFormatter::new(false);
        assert_eq!(formatter.format(&date_time(45306.5)), "2024-01-15 12:00:00");
        assert_eq!(formatter.format(&date_time(0.5)), "12:00:00");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(1.0625), "25:30:00");
        assert_eq!(format_duration(0.0), "0:00:00");
    }
}
