pub mod graph;
pub mod measure;
pub mod mermaid;
pub mod model;
pub mod sql;

use wasm_bindgen::prelude::*;

use graph::{Graph, GridLayout};
use measure::TextMetrics;
use model::ParseResult;
use sql::{ParseOptions, Parser};

/// Parse DDL text with default options.
pub fn parse(input: &str) -> ParseResult {
    Parser::default().parse(input)
}

pub fn parse_with(input: &str, options: &ParseOptions) -> ParseResult {
    Parser::new(options.clone()).parse(input)
}

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| js_sys::Error::new(&format!("Serialization error: {}", e)).into())
}

/// Parse DDL into `{ tables, relationships, diagramText }`
#[wasm_bindgen(js_name = "parseSql")]
pub fn parse_sql(source: &str) -> Result<JsValue, JsValue> {
    to_js(&parse(source))
}

/// Render DDL as Mermaid erDiagram text
#[wasm_bindgen(js_name = "sqlToMermaid")]
pub fn sql_to_mermaid(source: &str) -> String {
    parse(source).diagram_text
}

/// Parse DDL into grid-positioned `{ nodes, edges }`
#[wasm_bindgen(js_name = "sqlToGraph")]
pub fn sql_to_graph(
    source: &str,
    columns: Option<u32>,
    spacing_x: Option<f64>,
    spacing_y: Option<f64>,
) -> Result<JsValue, JsValue> {
    let defaults = GridLayout::default();
    let layout = GridLayout {
        columns: columns.map_or(defaults.columns, |c| c as usize),
        spacing_x: spacing_x.unwrap_or(defaults.spacing_x),
        spacing_y: spacing_y.unwrap_or(defaults.spacing_y),
        ..defaults
    };
    let graph = Graph::from_result(&parse(source), &layout, &TextMetrics::default());
    to_js(&graph)
}
