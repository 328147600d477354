use lgg::drawing::Drawing;
use lgg::layout::LayoutEngine;
use lgg::svg::SvgSurface;
use std::env;
use std::fs;
use std::process;

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} <expression> [options]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -f, --file <file>     Read the expression from a file instead");
    eprintln!("  -o, --output <file>   Output file (default: stdout)");
    eprintln!("  -t, --ticks <n>       Layout ticks to run before rendering (default: 300)");
    eprintln!("      --ease <f>        Fraction of the way merges move per tick (default: 0.2)");
    eprintln!("      --angle-step <f>  Input angle step in radians per tick (default: 0.01)");
    eprintln!("      --no-disambiguate Keep merges exactly on their projection target");
    process::exit(1);
}

fn parse_number(arg: &str, what: &str) -> f64 {
    match arg.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => {
            eprintln!("Invalid {}: {}", what, arg);
            process::exit(1);
        }
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        usage(&args[0]);
    }

    let mut expression: Option<String> = None;
    let mut input_path: Option<String> = None;
    let mut output_path: Option<String> = None;
    let mut ticks: usize = 300;
    let mut engine = LayoutEngine::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-f" | "--file" => {
                i += 1;
                if i < args.len() {
                    input_path = Some(args[i].clone());
                }
            }
            "-o" | "--output" => {
                i += 1;
                if i < args.len() {
                    output_path = Some(args[i].clone());
                }
            }
            "-t" | "--ticks" => {
                i += 1;
                if i < args.len() {
                    ticks = args[i].parse().unwrap_or_else(|_| {
                        eprintln!("Invalid tick count: {}", args[i]);
                        process::exit(1);
                    });
                }
            }
            "--ease" => {
                i += 1;
                if i < args.len() {
                    let ease = parse_number(&args[i], "ease");
                    engine = engine.with_ease(ease);
                }
            }
            "--angle-step" => {
                i += 1;
                if i < args.len() {
                    let step = parse_number(&args[i], "angle step");
                    engine = engine.with_angle_step(step);
                }
            }
            "--no-disambiguate" => {
                engine = engine.with_disambiguation(false);
            }
            "-h" | "--help" => usage(&args[0]),
            arg if expression.is_none() && !arg.starts_with('-') => {
                expression = Some(arg.to_string());
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let source = match (expression, input_path) {
        (_, Some(path)) => match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Failed to read {}: {}", path, e);
                process::exit(1);
            }
        },
        (Some(expr), None) => expr,
        (None, None) => usage(&args[0]),
    };

    let mut drawing = match Drawing::from_text(source.trim()) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    for _ in 0..ticks {
        drawing.tick(&engine);
    }
    log::info!("ran {} layout ticks", ticks);

    let svg = SvgSurface::render(drawing.graph());

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(&path, &svg) {
                eprintln!("Failed to write {}: {}", path, e);
                process::exit(1);
            }
        }
        None => print!("{}", svg),
    }
}
