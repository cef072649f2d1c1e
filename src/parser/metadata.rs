//! XML Metadata Parser Module
//!
//! XLSX内部のXMLファイルから、calamineで取得不可能な情報を抽出するモジュール。
//! セル書式（フォント・塗りつぶし・配置）、シート定義とアクティブシート、
//! 1904年エポック判定、列幅・行の高さ・セルごとのスタイル番号を提供します。
//!
//! 各パーツの解析関数はバイト列を受け取るため、ZIPアーカイブなしで単体テストできます。

use std::collections::HashMap;
use std::io::{Cursor, Read};

use quick_xml::escape::unescape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::XlsxStyleError;
use crate::security::SecurityConfig;
use crate::types::{
    AlignmentDescriptor, CellCoord, CellFormat, ColorSource, FillDescriptor, FontDescriptor,
    MAX_COLUMN_NUMBER, MAX_ROW_NUMBER,
};

const STYLES_PART: &str = "xl/styles.xml";
const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";

/// ワークブック内のシート定義
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SheetEntry {
    /// シート名
    pub name: String,
    /// パッケージ内のワークシートXMLのパス（例: `xl/worksheets/sheet1.xml`）
    pub path: Option<String>,
}

/// workbook.xmlから読み取る情報
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct WorkbookInfo {
    /// シート定義（`<sheet>`要素の順）と関連付けID
    pub sheets: Vec<(String, Option<String>)>,
    /// アクティブシートの添字（`<workbookView activeTab>`）
    pub active_tab: usize,
    /// 1904年エポックを使用するかどうか
    pub is_1904: bool,
}

/// ワークシートXMLから読み取るレイアウト情報
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct WorksheetLayout {
    /// 列番号（1始まり）-> 列幅
    pub column_widths: HashMap<u32, f64>,
    /// 行番号（1始まり）-> 行の高さ（ポイント）
    pub row_heights: HashMap<u32, f64>,
    /// セル座標 -> cellXfsの添字
    pub cell_styles: HashMap<CellCoord, usize>,
    /// `<c>`要素が現れた最大の行番号
    pub max_row: u32,
    /// `<c>`要素が現れた最大の列番号
    pub max_col: u32,
}

/// XLSXメタデータパーサー
///
/// XLSXファイル（ZIPアーカイブ）からXMLを直接解析し、
/// calamineで取得できない情報を抽出します。
pub(crate) struct XlsxMetadataParser {
    archive: ZipArchive<Cursor<Vec<u8>>>,
    security: SecurityConfig,
    /// cellXfsの添字順に並んだセル書式
    styles: Vec<CellFormat>,
    /// シート定義
    sheets: Vec<SheetEntry>,
    active_tab: usize,
    is_1904: bool,
}

impl XlsxMetadataParser {
    /// XLSXファイル（ZIPアーカイブ）からメタデータを解析
    ///
    /// # 引数
    ///
    /// * `buffer` - XLSXファイル全体のバイト列
    /// * `security` - セキュリティ設定
    ///
    /// # 戻り値
    ///
    /// * `Ok(XlsxMetadataParser)` - メタデータの解析に成功した場合
    /// * `Err(XlsxStyleError)` - セキュリティ制限違反、または解析エラーが発生した場合
    pub fn new(buffer: Vec<u8>, security: &SecurityConfig) -> Result<Self, XlsxStyleError> {
        let mut archive =
            ZipArchive::new(Cursor::new(buffer)).map_err(|e| XlsxStyleError::Zip(e.to_string()))?;
        security.check_archive(&mut archive)?;

        let styles = match read_part(&mut archive, STYLES_PART, security)? {
            Some(xml) => parse_styles(&xml)?,
            None => Vec::new(),
        };

        let info = match read_part(&mut archive, WORKBOOK_PART, security)? {
            Some(xml) => parse_workbook(&xml)?,
            None => WorkbookInfo::default(),
        };

        let relationships = match read_part(&mut archive, WORKBOOK_RELS_PART, security)? {
            Some(xml) => parse_relationships(&xml, WORKBOOK_RELS_PART)?,
            None => HashMap::new(),
        };

        let sheets = info
            .sheets
            .into_iter()
            .map(|(name, rel_id)| SheetEntry {
                path: rel_id
                    .and_then(|id| relationships.get(&id))
                    .map(|target| resolve_target(target)),
                name,
            })
            .collect();

        Ok(Self {
            archive,
            security: security.clone(),
            styles,
            sheets,
            active_tab: info.active_tab,
            is_1904: info.is_1904,
        })
    }

    /// cellXfsの添字順に並んだセル書式
    pub fn styles(&self) -> &[CellFormat] {
        &self.styles
    }

    /// シート定義（ワークブック内の順）
    pub fn sheets(&self) -> &[SheetEntry] {
        &self.sheets
    }

    /// アクティブシートの添字
    pub fn active_tab(&self) -> usize {
        self.active_tab
    }

    /// 1904年エポックを使用するかどうかを取得
    pub fn is_1904(&self) -> bool {
        self.is_1904
    }

    /// シートのレイアウト情報を解析
    ///
    /// シートのパスが解決できない、またはパーツが存在しない場合は空のレイアウトを返します。
    pub fn worksheet_layout(&mut self, sheet_name: &str) -> Result<WorksheetLayout, XlsxStyleError> {
        let path = self
            .sheets
            .iter()
            .find(|entry| entry.name == sheet_name)
            .and_then(|entry| entry.path.clone());

        let Some(path) = path else {
            log::debug!("No worksheet part for sheet '{}'", sheet_name);
            return Ok(WorksheetLayout::default());
        };

        match read_part(&mut self.archive, &path, &self.security)? {
            Some(xml) => parse_worksheet_layout(&xml, &path),
            None => Ok(WorksheetLayout::default()),
        }
    }
}

/// アーカイブからパーツを読み込む（存在しない場合は`None`）
fn read_part(
    archive: &mut ZipArchive<Cursor<Vec<u8>>>,
    name: &str,
    security: &SecurityConfig,
) -> Result<Option<Vec<u8>>, XlsxStyleError> {
    let file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(XlsxStyleError::Zip(e.to_string())),
    };

    // 申告サイズを信用せず、実際の展開量でも制限する
    let mut content = Vec::new();
    file.take(security.max_file_size.saturating_add(1))
        .read_to_end(&mut content)?;
    if content.len() as u64 > security.max_file_size {
        return Err(XlsxStyleError::SecurityViolation(format!(
            "File '{}' exceeds maximum size when decompressed (max: {} bytes)",
            name, security.max_file_size
        )));
    }

    Ok(Some(content))
}

/// リレーションシップのターゲットをパッケージ内のパスに変換
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

/// 属性値を取得（ローカル名で照合し、エスケープを解除する）
fn attr_value(
    e: &BytesStart<'_>,
    key: &[u8],
    part: &str,
) -> Result<Option<String>, XlsxStyleError> {
    for attr in e.attributes() {
        let attr: Attribute<'_> = attr.map_err(|err| XlsxStyleError::xml(part, err))?;
        if attr.key.local_name().as_ref() == key {
            let raw = std::str::from_utf8(&attr.value)?;
            let value = unescape(raw).map_err(|err| XlsxStyleError::xml(part, err))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// 数値属性を取得（不正な値は`None`）
fn attr_number<T: std::str::FromStr>(
    e: &BytesStart<'_>,
    key: &[u8],
    part: &str,
) -> Result<Option<T>, XlsxStyleError> {
    Ok(attr_value(e, key, part)?.and_then(|v| v.trim().parse().ok()))
}

/// 真偽値属性（`1`/`true`）
fn attr_flag(e: &BytesStart<'_>, key: &[u8], part: &str) -> Result<bool, XlsxStyleError> {
    Ok(matches!(
        attr_value(e, key, part)?.as_deref(),
        Some("1") | Some("true")
    ))
}

/// `<b/>`・`<i/>`のような真偽値要素（`val`が`0`/`false`の場合のみ偽）
fn element_flag(e: &BytesStart<'_>, part: &str) -> Result<bool, XlsxStyleError> {
    Ok(!matches!(
        attr_value(e, b"val", part)?.as_deref(),
        Some("0") | Some("false")
    ))
}

/// `<color>`・`<fgColor>`要素から色の参照元を読み取る
fn color_source(e: &BytesStart<'_>, part: &str) -> Result<ColorSource, XlsxStyleError> {
    Ok(ColorSource {
        rgb: attr_value(e, b"rgb", part)?,
        theme: attr_value(e, b"theme", part)?,
        indexed: attr_number(e, b"indexed", part)?,
    })
}

/// styles.xmlの現在のセクション
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StyleSection {
    None,
    Fonts,
    Fills,
    CellXfs,
    /// `cellStyleXfs`・`dxfs`など、セル書式として使わないセクション
    Other,
}

/// 解析中の`<xf>`要素
#[derive(Debug, Default)]
struct XfRecord {
    font_id: Option<usize>,
    fill_id: Option<usize>,
    alignment: Option<AlignmentDescriptor>,
}

/// xl/styles.xml の解析
///
/// `<fonts>`・`<fills>`・`<cellXfs>`を解析し、cellXfsの添字順にセル書式を構築します。
pub(crate) fn parse_styles(xml: &[u8]) -> Result<Vec<CellFormat>, XlsxStyleError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut section = StyleSection::None;
    let mut fonts: Vec<FontDescriptor> = Vec::new();
    let mut fills: Vec<FillDescriptor> = Vec::new();
    let mut xfs: Vec<XfRecord> = Vec::new();
    let mut current_font: Option<FontDescriptor> = None;
    let mut current_fill: Option<FillDescriptor> = None;
    let mut current_xf: Option<XfRecord> = None;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| XlsxStyleError::xml(STYLES_PART, e))?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                match e.local_name().as_ref() {
                    b"fonts" if !is_empty => section = StyleSection::Fonts,
                    b"fills" if !is_empty => section = StyleSection::Fills,
                    b"cellXfs" if !is_empty => section = StyleSection::CellXfs,
                    b"cellStyleXfs" | b"dxfs" | b"cellStyles" | b"tableStyles"
                        if !is_empty =>
                    {
                        section = StyleSection::Other
                    }

                    // フォント
                    b"font" if section == StyleSection::Fonts => {
                        if is_empty {
                            fonts.push(FontDescriptor::default());
                        } else {
                            current_font = Some(FontDescriptor::default());
                        }
                    }
                    b"b" if section == StyleSection::Fonts => {
                        if let Some(font) = current_font.as_mut() {
                            font.bold = element_flag(e, STYLES_PART)?;
                        }
                    }
                    b"i" if section == StyleSection::Fonts => {
                        if let Some(font) = current_font.as_mut() {
                            font.italic = element_flag(e, STYLES_PART)?;
                        }
                    }
                    b"u" if section == StyleSection::Fonts => {
                        if let Some(font) = current_font.as_mut() {
                            font.underline = Some(
                                attr_value(e, b"val", STYLES_PART)?
                                    .unwrap_or_else(|| "single".to_string()),
                            );
                        }
                    }
                    b"sz" if section == StyleSection::Fonts => {
                        if let Some(font) = current_font.as_mut() {
                            font.size = attr_number(e, b"val", STYLES_PART)?;
                        }
                    }
                    b"name" if section == StyleSection::Fonts => {
                        if let Some(font) = current_font.as_mut() {
                            font.name = attr_value(e, b"val", STYLES_PART)?;
                        }
                    }
                    b"color" if section == StyleSection::Fonts => {
                        if let Some(font) = current_font.as_mut() {
                            font.color = Some(color_source(e, STYLES_PART)?);
                        }
                    }

                    // 塗りつぶし
                    b"fill" if section == StyleSection::Fills => {
                        if is_empty {
                            fills.push(FillDescriptor::default());
                        } else {
                            current_fill = Some(FillDescriptor::default());
                        }
                    }
                    b"patternFill" if section == StyleSection::Fills => {
                        if let Some(fill) = current_fill.as_mut() {
                            fill.pattern_type = attr_value(e, b"patternType", STYLES_PART)?;
                        }
                    }
                    b"fgColor" if section == StyleSection::Fills => {
                        if let Some(fill) = current_fill.as_mut() {
                            fill.start_color = Some(color_source(e, STYLES_PART)?);
                        }
                    }

                    // セル書式
                    b"xf" if section == StyleSection::CellXfs => {
                        let xf = XfRecord {
                            font_id: attr_number(e, b"fontId", STYLES_PART)?,
                            fill_id: attr_number(e, b"fillId", STYLES_PART)?,
                            alignment: None,
                        };
                        if is_empty {
                            xfs.push(xf);
                        } else {
                            current_xf = Some(xf);
                        }
                    }
                    b"alignment" if section == StyleSection::CellXfs => {
                        if let Some(xf) = current_xf.as_mut() {
                            xf.alignment = Some(AlignmentDescriptor {
                                horizontal: attr_value(e, b"horizontal", STYLES_PART)?,
                                vertical: attr_value(e, b"vertical", STYLES_PART)?,
                            });
                        }
                    }
                    _ => {}
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"fonts" | b"fills" | b"cellXfs" | b"cellStyleXfs" | b"dxfs" | b"cellStyles"
                | b"tableStyles" => section = StyleSection::None,
                b"font" => {
                    if let Some(font) = current_font.take() {
                        fonts.push(font);
                    }
                }
                b"fill" => {
                    if let Some(fill) = current_fill.take() {
                        fills.push(fill);
                    }
                }
                b"xf" => {
                    if let Some(xf) = current_xf.take() {
                        xfs.push(xf);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(xfs
        .into_iter()
        .map(|xf| CellFormat {
            font: xf.font_id.and_then(|id| fonts.get(id).cloned()),
            fill: xf.fill_id.and_then(|id| fills.get(id).cloned()),
            alignment: xf.alignment,
        })
        .collect())
}

/// xl/workbook.xml の解析
///
/// シート定義、アクティブシート、1904年エポックフラグを取得します。
pub(crate) fn parse_workbook(xml: &[u8]) -> Result<WorkbookInfo, XlsxStyleError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut info = WorkbookInfo::default();
    let mut active_tab_seen = false;

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| XlsxStyleError::xml(WORKBOOK_PART, e))?
        {
            Event::Start(ref e) | Event::Empty(ref e) => match e.local_name().as_ref() {
                b"sheet" => {
                    if let Some(name) = attr_value(e, b"name", WORKBOOK_PART)? {
                        let rel_id = attr_value(e, b"id", WORKBOOK_PART)?;
                        info.sheets.push((name, rel_id));
                    }
                }
                // 複数のビューがある場合は最初のビューに従う
                b"workbookView" if !active_tab_seen => {
                    active_tab_seen = true;
                    if let Some(tab) = attr_number(e, b"activeTab", WORKBOOK_PART)? {
                        info.active_tab = tab;
                    }
                }
                b"workbookPr" => {
                    info.is_1904 = attr_flag(e, b"date1904", WORKBOOK_PART)?;
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(info)
}

/// リレーションシップファイルを解析（ID -> ターゲット）
pub(crate) fn parse_relationships(
    xml: &[u8],
    part: &str,
) -> Result<HashMap<String, String>, XlsxStyleError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut relationships = HashMap::new();

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| XlsxStyleError::xml(part, e))?
        {
            Event::Start(ref e) | Event::Empty(ref e)
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let id = attr_value(e, b"Id", part)?;
                let target = attr_value(e, b"Target", part)?;
                if let (Some(id), Some(target)) = (id, target) {
                    relationships.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(relationships)
}

/// ワークシートXMLからレイアウト情報を解析
///
/// `<col>`の幅は`min`〜`max`のすべての列に適用します。`r`属性を持たない
/// `<row>`・`<c>`は直前の行・列の次として扱います。
pub(crate) fn parse_worksheet_layout(
    xml: &[u8],
    part: &str,
) -> Result<WorksheetLayout, XlsxStyleError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut layout = WorksheetLayout::default();
    let mut in_sheet_data = false;
    let mut current_row: u32 = 0;
    let mut current_col: u32 = 0;

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| XlsxStyleError::xml(part, e))?
        {
            Event::Start(ref e) | Event::Empty(ref e) => match e.local_name().as_ref() {
                b"sheetData" => in_sheet_data = true,
                b"col" => {
                    let min: Option<u32> = attr_number(e, b"min", part)?;
                    let max: Option<u32> = attr_number(e, b"max", part)?;
                    let width: Option<f64> = attr_number(e, b"width", part)?;
                    if let (Some(min), Some(width)) = (min, width) {
                        let max = max.unwrap_or(min).max(min);
                        // 末尾列まで指定する`max="16384"`は使用範囲外を含むので上限を設ける
                        for col in min..=max.min(MAX_COLUMN_NUMBER) {
                            layout.column_widths.insert(col, width);
                        }
                    }
                }
                b"row" if in_sheet_data => {
                    current_row = attr_number(e, b"r", part)?
                        .unwrap_or_else(|| current_row.saturating_add(1));
                    if current_row > MAX_ROW_NUMBER {
                        return Err(XlsxStyleError::xml(
                            part,
                            format!("row {} exceeds the sheet limit", current_row),
                        ));
                    }
                    current_col = 0;
                    if let Some(height) = attr_number::<f64>(e, b"ht", part)? {
                        layout.row_heights.insert(current_row, height);
                    }
                }
                b"c" if in_sheet_data => {
                    let coord = match attr_value(e, b"r", part)? {
                        Some(reference) => CellCoord::from_a1(&reference).ok_or_else(|| {
                            XlsxStyleError::xml(
                                part,
                                format!("invalid cell reference '{}'", reference),
                            )
                        })?,
                        None => CellCoord::new(current_row.max(1), current_col.saturating_add(1)),
                    };
                    if !coord.is_within_sheet() {
                        return Err(XlsxStyleError::xml(
                            part,
                            format!("cell {} exceeds the sheet limit", coord.to_a1()),
                        ));
                    }
                    current_row = coord.row;
                    current_col = coord.col;

                    layout.max_row = layout.max_row.max(coord.row);
                    layout.max_col = layout.max_col.max(coord.col);
                    if let Some(style) = attr_number::<usize>(e, b"s", part)? {
                        layout.cell_styles.insert(coord, style);
                    }
                }
                _ => {}
            },
            Event::End(ref e) if e.local_name().as_ref() == b"sheetData" => {
                in_sheet_data = false;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(layout)
}
