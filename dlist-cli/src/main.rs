// Command-line interface for dlist
//
// This binary loads documents into the description-list engine and writes them back out. Every
// load goes through the same pipeline an editor uses: markup is upcast into flat list items,
// the post-fixer repairs indents, types and ids, and the view is rendered from the result.
//
// Usage:
//  dlist <input> --to <format> [--from <format>] [--output <file>]  - Convert between formats (default)
//  dlist convert <input> --to <format> [--from <format>] [--output <file>]  - Same as above (explicit)
//  dlist inspect <path> [<transform>]      - Dump the model or the view (defaults to "view-treeviz")
//  dlist fix <path> [--output <file>]      - Normalize HTML description lists
//  dlist --list-transforms                 - List available transforms and formats
//
// Extra Parameters:
//
// Format-specific parameters can be passed using --extra-<parameter-name> <value>.
// The CLI layer strips the "extra-" prefix. Keys that match a configuration setting override
// it; the rest are passed to the format or transform.
// Example:
//  dlist convert doc.html --to html --extra-type-attribute false

use dlist_cli::inspect::{self, InputKind, InspectDefaults};

use clap::{Arg, ArgAction, Command, ValueHint};
use dlist_config::{DlistConfig, Loader};
use dlist_engine::formats::html::serialize_view;
use dlist_engine::{Editor, EngineSettings, FormatRegistry, HtmlOptions, ListType};
use std::collections::HashMap;
use std::fs;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Parse extra-* arguments from command line args
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Supports both:
/// - `--extra-<key> <value>` (explicit value)
/// - `--extra-<key>` (boolean flag, defaults to "true")
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        if let Some(key) = arg.strip_prefix("--extra-") {
            let has_value = args.get(i + 1).is_some_and(|next| !next.starts_with('-'));

            if has_value {
                extra_params.insert(key.to_string(), args[i + 1].clone());
                i += 2;
            } else {
                extra_params.insert(key.to_string(), "true".to_string());
                i += 1;
            }
            continue;
        }

        cleaned_args.push(arg.clone());
        i += 1;
    }

    (cleaned_args, extra_params)
}

fn build_cli() -> Command {
    Command::new("dlist")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for normalizing and converting description lists")
        .long_about(
            "dlist loads documents into the description-list engine and writes them back out.\n\n\
            Commands:\n  \
            - convert: Transform between document formats (html, json, treeviz)\n  \
            - inspect: View the flat model or the rendered view\n  \
            - fix:     Normalize the description lists of an HTML file\n\n\
            Extra Parameters:\n  \
            Use --extra-<name> [value] to pass format-specific options.\n  \
            Boolean flags can omit the value (defaults to 'true').\n\n\
            Examples:\n  \
            dlist inspect doc.html                        # View tree visualization\n  \
            dlist inspect doc.html model-json             # Flat model as JSON\n  \
            dlist doc.html --to json                      # Convert to JSON (stdout)\n  \
            dlist fix doc.html -o clean.html              # Normalize into a new file",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-transforms")
                .long("list-transforms")
                .help("List available transforms")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a dlist.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .subcommand(
            Command::new("inspect")
                .about("Inspect the model and view of a document")
                .long_about(
                    "Load a document and dump one of its representations.\n\n\
                    Transforms:\n  \
                    - model-json:    the flat model as JSON blocks\n  \
                    - view-treeviz:  the view as a tree visualization (default)\n  \
                    - view-html:     the view as HTML\n\n\
                    Extra Parameters:\n  \
                    --extra-show-keys        Append model keys to view nodes\n  \
                    --extra-type-attribute   Write data-list-type (view-html)",
                )
                .arg(
                    Arg::new("path")
                        .help("Path to an HTML or JSON file")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("transform")
                        .help("Transform to apply. Defaults to 'view-treeviz'")
                        .required(false)
                        .value_parser(clap::builder::PossibleValuesParser::new(
                            inspect::AVAILABLE_TRANSFORMS,
                        ))
                        .index(2)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source format (auto-detected from file extension if not specified)")
                        .value_hint(ValueHint::Other),
                ),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between document formats (default command)")
                .long_about(
                    "Convert documents between different formats.\n\n\
                    Supported formats:\n  \
                    - html:     HTML with dl/dt/dd description lists (.html)\n  \
                    - json:     Flat model blocks (.json)\n  \
                    - treeviz:  Tree visualization of the rendered view (output only)\n\n\
                    The source format is auto-detected from the file extension.\n\
                    Output goes to stdout by default, or use -o to specify a file.",
                )
                .arg(
                    Arg::new("input")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source format (auto-detected from file extension if not specified)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format (required)")
                        .required(true)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("fix")
                .about("Normalize the description lists of an HTML file")
                .long_about(
                    "Load an HTML file the way an editor would and write it back.\n\n\
                    Loose list markup is cleaned up, indent jumps and mixed item types are\n\
                    repaired, and nested lists are rebuilt inside the item they belong to.\n\n\
                    Examples:\n  \
                    dlist fix doc.html                  # Normalized HTML to stdout\n  \
                    dlist fix doc.html -o clean.html    # Write to a file",
                )
                .arg(
                    Arg::new("input")
                        .help("Input HTML file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let (cleaned_args, mut extra_params) = parse_extra_args(&args);

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&cleaned_args) {
        Ok(m) => m,
        Err(e) => {
            // A bare path as first argument means "convert"
            if cleaned_args.len() > 1
                && !cleaned_args[1].starts_with('-')
                && !["inspect", "convert", "fix", "help"].contains(&cleaned_args[1].as_str())
            {
                let mut new_args = vec![cleaned_args[0].clone(), "convert".to_string()];
                new_args.extend_from_slice(&cleaned_args[1..]);
                match cli.try_get_matches_from(&new_args) {
                    Ok(m) => m,
                    Err(e2) => e2.exit(),
                }
            } else {
                e.exit();
            }
        }
    };

    if matches.get_flag("list-transforms") {
        handle_list_transforms_command();
        return;
    }

    let mut config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));
    apply_config_overrides(&mut config, &mut extra_params);
    debug!(target: "dlist::cli", ?config, "configuration loaded");

    match matches.subcommand() {
        Some(("inspect", sub_matches)) => {
            let Some(path) = sub_matches.get_one::<String>("path") else {
                fail("path is required");
            };
            let transform = sub_matches
                .get_one::<String>("transform")
                .map(|s| s.as_str())
                .unwrap_or("view-treeviz");
            let from = resolve_from(sub_matches.get_one::<String>("from"), path, &config);
            handle_inspect_command(path, &from, transform, &extra_params, &config);
        }
        Some(("convert", sub_matches)) => {
            let (Some(input), Some(to)) = (
                sub_matches.get_one::<String>("input"),
                sub_matches.get_one::<String>("to"),
            ) else {
                fail("input and --to are required");
            };
            let from = resolve_from(sub_matches.get_one::<String>("from"), input, &config);
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_convert_command(input, &from, to, output, &extra_params, &config);
        }
        Some(("fix", sub_matches)) => {
            let Some(input) = sub_matches.get_one::<String>("input") else {
                fail("input is required");
            };
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_fix_command(input, output, &config);
        }
        _ => fail("Unknown subcommand. Use --help for usage information."),
    }
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

fn read_input(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{path}': {e}");
        std::process::exit(1);
    })
}

fn write_output(output: Option<&str>, text: &str) {
    match output {
        Some(path) => fs::write(path, text).unwrap_or_else(|e| {
            eprintln!("Error writing file '{path}': {e}");
            std::process::exit(1);
        }),
        None => print!("{text}"),
    }
}

/// Explicit `--from`, else the format detected from the file extension.
fn resolve_from(explicit: Option<&String>, input: &str, config: &DlistConfig) -> String {
    if let Some(from) = explicit {
        return from.to_string();
    }
    match registry_from_config(config).detect_format_from_filename(input) {
        Some(detected) => detected,
        None => {
            eprintln!("Error: Could not detect format from filename '{input}'");
            eprintln!("Please specify --from explicitly");
            std::process::exit(1);
        }
    }
}

fn handle_inspect_command(
    path: &str,
    from: &str,
    transform: &str,
    extra_params: &HashMap<String, String>,
    config: &DlistConfig,
) {
    let Some(kind) = InputKind::from_format_name(from) else {
        fail(&format!("Cannot inspect '{from}' input; use html or json"));
    };
    let source = read_input(path);
    let defaults = InspectDefaults {
        settings: EngineSettings::from(&config.engine),
        html: HtmlOptions::from(&config.convert.html),
        show_keys: config.inspect.treeviz.show_keys,
    };

    let output = inspect::execute_transform(&source, kind, transform, &defaults, extra_params)
        .unwrap_or_else(|e| {
            eprintln!("Execution error: {e}");
            std::process::exit(1);
        });

    print!("{output}");
}

fn handle_convert_command(
    input: &str,
    from: &str,
    to: &str,
    output: Option<&str>,
    extra_params: &HashMap<String, String>,
    config: &DlistConfig,
) {
    let registry = registry_from_config(config);

    if let Err(e) = registry.get(from) {
        fail(&e.to_string());
    }
    if let Err(e) = registry.get(to) {
        fail(&e.to_string());
    }

    let source = read_input(input);

    let doc = registry.parse(&source, from).unwrap_or_else(|e| {
        eprintln!("Parse error: {e}");
        std::process::exit(1);
    });

    let mut result = registry
        .serialize_with_options(&doc, to, extra_params)
        .unwrap_or_else(|e| {
            eprintln!("Serialization error: {e}");
            std::process::exit(1);
        });
    if !result.ends_with('\n') {
        result.push('\n');
    }

    write_output(output, &result);
}

fn handle_fix_command(input: &str, output: Option<&str>, config: &DlistConfig) {
    let source = read_input(input);

    let mut editor = Editor::new(EngineSettings::from(&config.engine));
    editor.set_data(&source).unwrap_or_else(|e| {
        eprintln!("Parse error: {e}");
        std::process::exit(1);
    });

    let mut html = serialize_view(editor.view(), &HtmlOptions::from(&config.convert.html))
        .unwrap_or_else(|e| {
            eprintln!("Serialization error: {e}");
            std::process::exit(1);
        });
    html.push('\n');

    write_output(output, &html);
}

fn handle_list_transforms_command() {
    println!("Available transforms:\n");
    println!("Stages:");
    println!("  model  - Flat blocks after post-fixing");
    println!("  view   - Nested dl/dt/dd tree rendered from the model\n");

    println!("Available transform combinations:");
    for transform_name in inspect::AVAILABLE_TRANSFORMS {
        println!("  {transform_name}");
    }

    println!("\nConversion formats:");
    let registry = FormatRegistry::default();
    for format_name in registry.list_formats() {
        println!("  {format_name}");
    }
}

fn load_cli_config(explicit_path: Option<&str>) -> DlistConfig {
    let loader = Loader::new().with_optional_file("dlist.toml");
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader.with_environment().build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

/// The built-in formats, configured from `config`.
fn registry_from_config(config: &DlistConfig) -> FormatRegistry {
    FormatRegistry::configured(
        HtmlOptions::from(&config.convert.html),
        EngineSettings::from(&config.engine),
        config.inspect.treeviz.show_keys,
    )
}

/// Moves extras that name configuration settings into `config`.
fn apply_config_overrides(config: &mut DlistConfig, extra_params: &mut HashMap<String, String>) {
    if let Some(raw) = extra_params.remove("default-list-type") {
        config.engine.default_list_type = raw.parse::<ListType>().unwrap_or_else(|e| {
            eprintln!("Invalid value for --extra-default-list-type: {e}");
            std::process::exit(1);
        });
    }
    if let Some(raw) = extra_params.remove("max-postfix-iterations") {
        config.engine.max_postfix_iterations = raw.parse::<usize>().unwrap_or_else(|_| {
            eprintln!("Invalid value '{raw}' for --extra-max-postfix-iterations");
            std::process::exit(1);
        });
    }
    if let Some(raw) = extra_params.remove("type-attribute") {
        config.convert.html.type_attribute = parse_bool_arg("type-attribute", &raw);
    }
    if let Some(raw) = extra_params.remove("show-keys") {
        config.inspect.treeviz.show_keys = parse_bool_arg("show-keys", &raw);
    }
}

fn parse_bool_arg(flag: &str, raw: &str) -> bool {
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => true,
        "false" | "0" | "no" | "n" => false,
        other => {
            eprintln!("Invalid boolean value '{other}' for --extra-{flag}");
            std::process::exit(1);
        }
    }
}
