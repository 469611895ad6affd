use sqlerd::graph::{Graph, GridLayout};
use sqlerd::measure::TextMetrics;
use sqlerd::sql::{ParseOptions, Parser};
use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Mermaid,
    Json,
    Graph,
}

impl Format {
    fn from_str(s: &str) -> Option<Self> {
        match s {
            "mermaid" => Some(Self::Mermaid),
            "json" => Some(Self::Json),
            "graph" => Some(Self::Graph),
            _ => None,
        }
    }
}

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} <input.sql | -> [options]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -o, --output <file>    Output file (default: stdout)");
    eprintln!("  -f, --format <fmt>     Output format: mermaid, json, graph (default: mermaid)");
    eprintln!("      --no-infer         Do not infer relationships from <table>_id columns");
    eprintln!("      --columns <n>      Tables per grid row for graph output (default: 3)");
    eprintln!("      --spacing-x <px>   Horizontal grid spacing (default: 300)");
    eprintln!("      --spacing-y <px>   Vertical grid spacing (default: 400)");
    eprintln!();
    eprintln!("Set RUST_LOG=debug to see skipped statements and clauses.");
    process::exit(1);
}

fn option_value<'a>(args: &'a [String], i: usize) -> &'a str {
    match args.get(i) {
        Some(v) => v.as_str(),
        None => {
            eprintln!("Missing value for {}", args[i - 1]);
            process::exit(1);
        }
    }
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: &str) -> T {
    value.parse().unwrap_or_else(|_| {
        eprintln!("Invalid value for {}: {}", flag, value);
        process::exit(1);
    })
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args[1] == "-h" || args[1] == "--help" {
        usage(&args[0]);
    }

    let input_path = &args[1];
    let mut output_path: Option<String> = None;
    let mut format = Format::Mermaid;
    let mut options = ParseOptions::default();
    let mut layout = GridLayout::default();

    let mut i = 2;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "-o" | "--output" => {
                i += 1;
                output_path = Some(option_value(&args, i).to_string());
            }
            "-f" | "--format" => {
                i += 1;
                let value = option_value(&args, i);
                format = Format::from_str(value).unwrap_or_else(|| {
                    eprintln!("Invalid format: {}", value);
                    process::exit(1);
                });
            }
            "--no-infer" => options.infer_relationships = false,
            "--columns" => {
                i += 1;
                layout.columns = parse_number(flag, option_value(&args, i));
            }
            "--spacing-x" => {
                i += 1;
                layout.spacing_x = parse_number(flag, option_value(&args, i));
            }
            "--spacing-y" => {
                i += 1;
                layout.spacing_y = parse_number(flag, option_value(&args, i));
            }
            _ => {
                eprintln!("Unknown option: {}", flag);
                process::exit(1);
            }
        }
        i += 1;
    }

    let input = if input_path == "-" {
        let mut buf = String::new();
        if let Err(e) = io::stdin().read_to_string(&mut buf) {
            eprintln!("Failed to read stdin: {}", e);
            process::exit(1);
        }
        buf
    } else {
        match fs::read_to_string(input_path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Failed to read {}: {}", input_path, e);
                process::exit(1);
            }
        }
    };

    let result = Parser::new(options).parse(&input);

    let output = match format {
        Format::Mermaid => result.diagram_text,
        Format::Json => to_json(&result),
        Format::Graph => to_json(&Graph::from_result(&result, &layout, &TextMetrics::default())),
    };

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(&path, &output) {
                eprintln!("Failed to write {}: {}", path, e);
                process::exit(1);
            }
        }
        None => print!("{}", output),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    match serde_json::to_string_pretty(value) {
        Ok(mut s) => {
            s.push('\n');
            s
        }
        Err(e) => {
            eprintln!("Failed to serialize output: {}", e);
            process::exit(1);
        }
    }
}
