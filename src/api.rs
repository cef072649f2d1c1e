//! Public API Types
//!
//! 公開APIで使用する列挙型を定義するモジュール。

/// シート選択方式
///
/// ワークブックのどのシートからスタイルグリッドを構築するかを指定します。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum SheetSelector {
    /// アクティブシート（デフォルト）
    ///
    /// ワークブックを開いたときに表示されるシート（`<workbookView activeTab>`）を選択します。
    /// アクティブシートが記録されていない場合は最初のシートです。
    #[default]
    Active,

    /// インデックス指定（0始まり）
    ///
    /// 例: `SheetSelector::Index(0)` は最初のシートを選択
    Index(usize),

    /// シート名指定
    ///
    /// 例: `SheetSelector::Name("Sheet1".to_string())`
    Name(String),
}

/// JSONの出力レイアウト
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonLayout {
    /// 2スペースインデントで整形（デフォルト）
    #[default]
    Pretty,

    /// 改行・インデントなし
    Compact,
}
