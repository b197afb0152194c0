use el::{json_to_value, json_variables, parse, value_to_json, Value, VariableContext};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
struct JsonOutput {
    result: serde_json::Value,
    #[serde(rename = "type")]
    type_name: &'static str,
    execution_time_ms: f64,
}

struct Options {
    expr: String,
    json_input: Option<String>,
    optimize: bool,
    output_json: bool,
    multiline: bool,
    verbose: bool,
    vars: HashMap<String, Value>,
}

fn usage() -> ! {
    eprintln!("Usage: el \"expression\" [options] [var=value ...]");
    eprintln!("       el --file PATH [options] [var=value ...]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --json JSON      Use a JSON object for variable values");
    eprintln!("  --file PATH      Read the expression from a file");
    eprintln!("  --optimize       Print the constant-folded expression before evaluating");
    eprintln!("  --output-json    Output result in JSON format with type and timing");
    eprintln!("  --multiline      Render arrays and maps over several lines");
    eprintln!("  --verbose        Log at debug level (see also EL_LOG)");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  el \"2 + 3 * 4\"");
    eprintln!("  el \"price * quantity\" price=19.99 quantity=3");
    eprintln!("  el \"user['name']\" --json '{{\"user\": {{\"name\": \"alice\"}}}}' --output-json");
    eprintln!("  el \"xs[1..]\" xs=[1,2,3]");
    std::process::exit(1);
}

fn fail(msg: &str) -> ! {
    eprintln!("Error: {}", msg);
    std::process::exit(1);
}

fn parse_args(args: &[String]) -> Options {
    let mut expr = None;
    let mut file = None;
    let mut opts = Options {
        expr: String::new(),
        json_input: None,
        optimize: false,
        output_json: false,
        multiline: false,
        verbose: false,
        vars: HashMap::new(),
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--json" => match iter.next() {
                Some(json) => opts.json_input = Some(json.clone()),
                None => fail("--json flag requires a JSON string argument"),
            },
            "--file" => match iter.next() {
                Some(path) => file = Some(path.clone()),
                None => fail("--file flag requires a path"),
            },
            "--optimize" => opts.optimize = true,
            "--output-json" => opts.output_json = true,
            "--multiline" => opts.multiline = true,
            "--verbose" => opts.verbose = true,
            "-h" | "--help" => usage(),
            _ if expr.is_none() && file.is_none() && !arg.starts_with("--") && !is_assignment(arg) => {
                expr = Some(arg.clone())
            }
            _ => match arg.split_once('=') {
                Some((name, value_str)) if is_assignment(arg) => {
                    opts.vars.insert(name.to_string(), parse_value(value_str));
                }
                _ => fail(&format!("Invalid argument: '{}'. Use format: var=value", arg)),
            },
        }
    }

    opts.expr = match (expr, file) {
        (Some(expr), None) => expr,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .unwrap_or_else(|e| fail(&format!("Cannot read '{}': {}", path, e))),
        (Some(_), Some(_)) => fail("Give either an expression or --file, not both"),
        (None, None) => usage(),
    };
    opts
}

/// `name=value` pairs have an identifier before the first '=' (and no `==`).
fn is_assignment(arg: &str) -> bool {
    match arg.split_once('=') {
        Some((name, value)) => {
            !name.is_empty()
                && !value.starts_with('=')
                && !name.starts_with(|c: char| c.is_ascii_digit())
                && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    }
}

fn parse_value(s: &str) -> Value {
    // Check for string (quoted)
    if s.len() >= 2 && ((s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\''))) {
        return Value::from(&s[1..s.len() - 1]);
    }

    match s {
        "true" => return Value::Boolean(true),
        "false" => return Value::Boolean(false),
        "null" => return Value::Null,
        _ => {}
    }

    // Arrays and maps as JSON
    if s.starts_with('[') || s.starts_with('{') {
        if let Ok(json) = serde_json::from_str(s) {
            return json_to_value(json);
        }
    }

    if let Ok(num) = s.parse::<f64>() {
        return Value::Number(num);
    }

    Value::from(s)
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("EL_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        usage();
    }
    let mut opts = parse_args(&args);
    init_logging(opts.verbose);

    if let Some(json) = &opts.json_input {
        match json_variables(json) {
            Ok(vars) => opts.vars.extend(vars),
            Err(e) => fail(&e.to_string()),
        }
    }

    let start_time = Instant::now();

    let mut node = match parse(&opts.expr) {
        Ok(node) => node,
        Err(e) => fail(&e.to_string()),
    };
    if opts.optimize {
        node = node.optimize();
        println!("{}", node);
    }
    let result = node.evaluate(&VariableContext::new(&opts.vars));

    let execution_time_ms = start_time.elapsed().as_secs_f64() * 1000.0;

    match result {
        Ok(val) => {
            if opts.output_json {
                println!("{}", format_json_output(&val, execution_time_ms));
            } else {
                println!("{}", val.as_string(opts.multiline));
            }
        }
        Err(e) => fail(&e.to_string()),
    }
}

fn format_json_output(value: &Value, execution_time_ms: f64) -> String {
    let result = match value_to_json(value) {
        Ok(json) => json,
        Err(_) if value.is_undefined() => serde_json::Value::Null,
        Err(_) => serde_json::Value::String(value.describe()),
    };
    let output = JsonOutput { result, type_name: value.type_name(), execution_time_ms };
    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}
