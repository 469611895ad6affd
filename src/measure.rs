use unicode_width::UnicodeWidthStr;

use crate::graph::NodeColumn;

/// Text metrics used to size table nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMetrics {
    pub char_width: f64,
    pub line_height: f64,
    pub padding_x: f64,
    pub padding_y: f64,
    pub header_padding: f64,
    /// Width of one PK/FK badge including its gap.
    pub badge_width: f64,
    pub min_node_width: f64,
    pub min_node_height: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            char_width: 8.0,
            line_height: 20.0,
            padding_x: 12.0,
            padding_y: 8.0,
            header_padding: 4.0,
            badge_width: 28.0,
            min_node_width: 150.0,
            min_node_height: 60.0,
        }
    }
}

impl TextMetrics {
    pub fn text_width(&self, text: &str) -> f64 {
        let width = UnicodeWidthStr::width(text);
        width as f64 * self.char_width
    }

    fn row_width(&self, column: &NodeColumn) -> f64 {
        let badges = [column.primary_key, column.foreign_key]
            .iter()
            .filter(|b| **b)
            .count();
        self.text_width(&column.name)
            + badges as f64 * self.badge_width
            + self.text_width(&column.typ)
            + self.char_width * 2.0
    }

    /// Width and height of a table node: header row plus one row per column.
    pub fn node_size(&self, label: &str, columns: &[NodeColumn]) -> (f64, f64) {
        let header_width = self.text_width(label);
        let max_row_width = columns
            .iter()
            .map(|c| self.row_width(c))
            .fold(0.0, f64::max);

        let content_width = header_width.max(max_row_width) + self.padding_x * 2.0;
        let width = content_width.max(self.min_node_width);

        let header_height = self.line_height + self.header_padding * 2.0;
        let body_height = if columns.is_empty() {
            0.0
        } else {
            columns.len() as f64 * self.line_height + self.padding_y * 2.0
        };

        let height = (header_height + body_height).max(self.min_node_height);

        (width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, typ: &str, primary_key: bool, foreign_key: bool) -> NodeColumn {
        NodeColumn {
            name: name.to_string(),
            typ: typ.to_string(),
            primary_key,
            foreign_key,
        }
    }

    #[test]
    fn test_ascii_width() {
        let m = TextMetrics::default();
        assert_eq!(m.text_width("orders"), 6.0 * 8.0);
    }

    #[test]
    fn test_wide_characters_count_double() {
        let m = TextMetrics::default();
        // "注文" is two double-width characters
        assert_eq!(m.text_width("注文"), 4.0 * 8.0);
    }

    #[test]
    fn test_empty_table_uses_minimum_size() {
        let m = TextMetrics::default();
        let (w, h) = m.node_size("t", &[]);
        assert_eq!(w, m.min_node_width);
        assert_eq!(h, m.min_node_height);
    }

    #[test]
    fn test_badges_widen_rows() {
        let m = TextMetrics {
            min_node_width: 0.0,
            ..TextMetrics::default()
        };
        let plain = [column("a_very_long_column_name", "INT", false, false)];
        let keyed = [column("a_very_long_column_name", "INT", true, true)];

        let (plain_w, _) = m.node_size("t", &plain);
        let (keyed_w, _) = m.node_size("t", &keyed);
        assert_eq!(keyed_w - plain_w, m.badge_width * 2.0);
    }

    #[test]
    fn test_height_grows_with_columns() {
        let m = TextMetrics::default();
        let columns: Vec<NodeColumn> = (0..5)
            .map(|i| column(&format!("c{}", i), "INT", false, false))
            .collect();
        let (_, h) = m.node_size("t", &columns);
        assert_eq!(h, 20.0 + 8.0 + 5.0 * 20.0 + 16.0);
    }
}
