//! Closed lookup tables that map sheet positions and free text onto head
//! categories. Both extractors go through these tables only.

pub const AHEAD_TEK: &str = "AHEAD - TEK";
pub const FEMTO: &str = "FEMTO";
pub const DFH: &str = "DFH";
pub const HFH_TIGER_3: &str = "HFH TIGER 3";
pub const WDB_WWH: &str = "WDB WWH";
pub const PMR6_PIH: &str = "PMR6 PIH";

/// Category assigned to one data row of the manual log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowCategory {
    pub row: u32,
    pub head_type: &'static str,
    /// Empty when the surface is read from column D instead.
    pub head_surface: &'static str,
}

const fn row(row: u32, head_type: &'static str, head_surface: &'static str) -> RowCategory {
    RowCategory {
        row,
        head_type,
        head_surface,
    }
}

/// Data rows of a manual sheet and the category each one records.
pub const MANUAL_ROWS: [RowCategory; 12] = [
    row(6, AHEAD_TEK, "3122"),
    row(7, AHEAD_TEK, "3125"),
    row(8, FEMTO, ""),
    row(9, FEMTO, ""),
    row(10, DFH, ""),
    row(11, DFH, ""),
    row(12, HFH_TIGER_3, ""),
    row(13, HFH_TIGER_3, ""),
    row(14, WDB_WWH, ""),
    row(15, WDB_WWH, ""),
    row(16, PMR6_PIH, ""),
    row(17, PMR6_PIH, ""),
];

/// Looks up the category of a manual-log row by its 1-based row number.
pub fn manual_row_category(row: u32) -> Option<&'static RowCategory> {
    MANUAL_ROWS.iter().find(|category| category.row == row)
}

/// A case-insensitive substring rule over the export's head description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordRule {
    /// Lowercase needle.
    pub needle: &'static str,
    pub head_type: &'static str,
    pub head_surface: &'static str,
}

const fn keyword(
    needle: &'static str,
    head_type: &'static str,
    head_surface: &'static str,
) -> KeywordRule {
    KeywordRule {
        needle,
        head_type,
        head_surface,
    }
}

/// Head-type rules in priority order; the first match wins.
pub const HEAD_TYPE_RULES: [KeywordRule; 5] = [
    keyword("pmr", PMR6_PIH, ""),
    keyword("06pt4e", DFH, ""),
    keyword("tiger", HFH_TIGER_3, ""),
    keyword("3122", AHEAD_TEK, "3122"),
    keyword("(burnish)", AHEAD_TEK, "3125"),
];

/// Surface rules over the export's surface description, in priority order.
pub const SURFACE_RULES: [(&str, &str); 2] = [("bot", "Bot"), ("top", "Top")];

/// Head type and surface decoded from free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadCategory {
    pub head_type: String,
    pub head_surface: String,
}

/// Classifies a head description. Unmatched text becomes the head type
/// verbatim with an empty surface.
pub fn classify_head_type(text: &str) -> HeadCategory {
    let lowered = text.to_lowercase();
    match HEAD_TYPE_RULES
        .iter()
        .find(|rule| lowered.contains(rule.needle))
    {
        Some(rule) => HeadCategory {
            head_type: rule.head_type.to_string(),
            head_surface: rule.head_surface.to_string(),
        },
        None => HeadCategory {
            head_type: text.to_string(),
            head_surface: String::new(),
        },
    }
}

/// Classifies a surface description into `Bot`, `Top`, or nothing.
pub fn classify_surface(text: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    SURFACE_RULES
        .iter()
        .find(|(needle, _)| lowered.contains(needle))
        .map(|(_, surface)| *surface)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_rows_cover_six_through_seventeen() {
        let rows: Vec<u32> = MANUAL_ROWS.iter().map(|c| c.row).collect();
        assert_eq!(rows, (6..=17).collect::<Vec<_>>());
        assert_eq!(manual_row_category(7).unwrap().head_surface, "3125");
        assert_eq!(manual_row_category(13).unwrap().head_type, HFH_TIGER_3);
        assert!(manual_row_category(5).is_none());
        assert!(manual_row_category(18).is_none());
    }

    #[test]
    fn head_type_rules_apply_in_priority_order() {
        // "pmr" outranks "tiger" when both appear.
        let category = classify_head_type("PMR tiger slider");
        assert_eq!(category.head_type, PMR6_PIH);

        let category = classify_head_type("Slider 3122 (Burnish)");
        assert_eq!(category.head_type, AHEAD_TEK);
        assert_eq!(category.head_surface, "3122");

        let category = classify_head_type("AT slider (BURNISH)");
        assert_eq!(category.head_surface, "3125");

        assert_eq!(classify_head_type("x06PT4E-y").head_type, DFH);
    }

    #[test]
    fn unmatched_head_text_is_kept_verbatim() {
        let category = classify_head_type("Mystery Head v2");
        assert_eq!(category.head_type, "Mystery Head v2");
        assert!(category.head_surface.is_empty());
    }

    #[test]
    fn surface_rules_match_case_insensitively() {
        assert_eq!(classify_surface("BOTTOM side"), Some("Bot"));
        assert_eq!(classify_surface("Top"), Some("Top"));
        assert_eq!(classify_surface("middle"), None);
    }
}
