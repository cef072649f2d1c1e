//! 背景色（塗りつぶし）の抽出

use crate::color::{CellContext, ColorResolver, ColorTarget};
use crate::types::{FillDescriptor, HexColor};

/// 塗りつぶしの書式を背景色へ変換する
///
/// パターンが`none`または未指定なら白。`solid`とそれ以外のパターンは、
/// どちらも前景色（開始色）だけで近似します。
pub fn extract_background(
    resolver: &ColorResolver,
    fill: Option<&FillDescriptor>,
    context: CellContext<'_>,
) -> HexColor {
    let Some(fill) = fill else {
        return HexColor::white();
    };

    match fill.pattern_type.as_deref() {
        None | Some("") | Some("none") => HexColor::white(),
        Some(_) => resolver.resolve(fill.start_color.as_ref(), ColorTarget::Fill(context)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CellCoord, ColorSource};

    fn solid(color: ColorSource) -> FillDescriptor {
        FillDescriptor {
            pattern_type: Some("solid".to_string()),
            start_color: Some(color),
        }
    }

    fn background(fill: Option<&FillDescriptor>, row: u32, col: u32, text: &str) -> String {
        let context = CellContext::new(CellCoord::new(row, col), text);
        extract_background(&ColorResolver::new(), fill, context)
            .as_str()
            .to_string()
    }

    #[test]
    fn test_no_fill_is_white() {
        assert_eq!(background(None, 1, 1, ""), "#FFFFFF");
    }

    #[test]
    fn test_pattern_none_is_white_even_with_color() {
        let fill = FillDescriptor {
            pattern_type: Some("none".to_string()),
            start_color: Some(ColorSource::rgb("FFFF0000")),
        };
        assert_eq!(background(Some(&fill), 2, 2, ""), "#FFFFFF");

        let fill = FillDescriptor {
            pattern_type: None,
            start_color: Some(ColorSource::rgb("FFFF0000")),
        };
        assert_eq!(background(Some(&fill), 2, 2, ""), "#FFFFFF");
    }

    #[test]
    fn test_solid_rgb() {
        assert_eq!(background(Some(&solid(ColorSource::rgb("FFFFC7CE"))), 2, 1, ""), "#FFC7CE");
        assert_eq!(background(Some(&solid(ColorSource::rgb("00000000"))), 2, 1, ""), "#FFFFFF");
    }

    #[test]
    fn test_solid_theme() {
        assert_eq!(background(Some(&solid(ColorSource::theme("4"))), 5, 5, ""), "#4472C4");
    }

    #[test]
    fn test_solid_unresolved_theme_uses_context() {
        let fill = solid(ColorSource::theme("99"));
        assert_eq!(background(Some(&fill), 1, 5, ""), "#0070C0");
        assert_eq!(background(Some(&fill), 3, 2, ""), "#D6DCE4");
        assert_eq!(background(Some(&fill), 3, 3, "this is preferred"), "#FFFF00");
        assert_eq!(background(Some(&fill), 3, 4, "forbidden"), "#FF6B6B");
        assert_eq!(background(Some(&fill), 3, 1, "preferred"), "#FFFFFF");
    }

    #[test]
    fn test_solid_indexed_is_white() {
        assert_eq!(background(Some(&solid(ColorSource::indexed(10))), 2, 2, ""), "#FFFFFF");
    }

    #[test]
    fn test_solid_without_start_color_is_white() {
        let fill = FillDescriptor {
            pattern_type: Some("solid".to_string()),
            start_color: None,
        };
        assert_eq!(background(Some(&fill), 2, 2, ""), "#FFFFFF");
    }

    #[test]
    fn test_other_patterns_use_start_color() {
        let fill = FillDescriptor {
            pattern_type: Some("darkGray".to_string()),
            start_color: Some(ColorSource::rgb("FF808080")),
        };
        assert_eq!(background(Some(&fill), 2, 2, ""), "#808080");

        let fill = FillDescriptor {
            pattern_type: Some("gray125".to_string()),
            start_color: None,
        };
        assert_eq!(background(Some(&fill), 2, 2, ""), "#FFFFFF");

        let fill = FillDescriptor {
            pattern_type: Some("lightGrid".to_string()),
            start_color: Some(ColorSource::theme("abc")),
        };
        assert_eq!(background(Some(&fill), 2, 3, "mandatory"), "#C8E6C9");
    }
}
