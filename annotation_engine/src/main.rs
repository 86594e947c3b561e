use annotation_engine::config::runtime::{LoggingPreferences, LogLevel};
use annotation_engine::pipeline::{ElementReport, PipelineResult};
use annotation_engine::{batch, logging, AnnotationRegistry, Workspace};
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Command-line options beyond the input path
#[derive(Debug, Default)]
struct CliOptions {
    batch: batch::BatchConfig,
    autoload: BTreeMap<String, Vec<PathBuf>>,
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <unit.toml|directory> [options]", args[0]);
        eprintln!("       {} --help", args[0]);
        std::process::exit(1);
    }

    if args[1] == "--help" {
        print_help(&args[0]);
        return Ok(());
    }

    let options = parse_options(&args[2..]);

    // JSON goes to stdout; keep plain log lines out of it
    if options.json {
        let preferences = LoggingPreferences {
            min_log_level: LogLevel::Error,
            ..LoggingPreferences::default()
        };
        logging::config::init_runtime_preferences(preferences)?;
    }
    logging::init_global_logging()?;

    let registry = Arc::new(AnnotationRegistry::new());
    registry.register_autoload_namespaces(options.autoload.clone());
    let workspace = Workspace::new(registry);

    let input_path = Path::new(&args[1]);
    if input_path.is_file() {
        process_single_file(input_path, &workspace, &options)?;
    } else if input_path.is_dir() {
        process_directory_batch(input_path, &workspace, &options)?;
    } else {
        eprintln!("Error: Input must be a source unit (.toml) or directory");
        eprintln!("  Path: {}", input_path.display());
        std::process::exit(1);
    }

    Ok(())
}

fn print_help(program_name: &str) {
    println!("Annotation Engine v{}", env!("CARGO_PKG_VERSION"));
    println!("Reads docblock annotations from TOML source units");
    println!();
    println!("USAGE:");
    println!("    {} <unit.toml> [options]          # Process single unit", program_name);
    println!("    {} <directory> [options]          # Process directory", program_name);
    println!();
    println!("OPTIONS:");
    println!("    --help              Show this help message");
    println!("    --autoload NS=DIR   Autoload classes of namespace NS from DIR (repeatable)");
    println!("    --json              Print results as JSON");
    println!("    --sequential        Force sequential processing (no parallelism)");
    println!("    --threads N         Set maximum number of threads (default: auto)");
    println!("    --no-recursive      Don't search subdirectories");
    println!("    --max-files N       Limit maximum files to process");
    println!("    --fail-fast         Stop at the first file with an error");
    println!();
    println!("EXAMPLES:");
    println!("    {} blog.toml --autoload Acme=./annotations", program_name);
    println!("    {} units/ --threads 4 --json", program_name);
    println!("    {} units/ --sequential --fail-fast", program_name);
}

fn parse_options(args: &[String]) -> CliOptions {
    let mut options = CliOptions::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--sequential" => {
                options.batch.max_threads = 1;
            }
            "--threads" => {
                if let Some(value) = args.get(i + 1) {
                    match value.parse::<usize>() {
                        Ok(threads) => options.batch.max_threads = threads.clamp(1, 32),
                        Err(_) => {
                            eprintln!("Warning: Invalid thread count '{}', using default", value)
                        }
                    }
                    i += 1;
                } else {
                    eprintln!("Warning: --threads requires a number");
                }
            }
            "--max-files" => {
                if let Some(value) = args.get(i + 1) {
                    match value.parse::<usize>() {
                        Ok(max_files) => options.batch.max_files = Some(max_files),
                        Err(_) => eprintln!("Warning: Invalid max files '{}', ignoring", value),
                    }
                    i += 1;
                } else {
                    eprintln!("Warning: --max-files requires a number");
                }
            }
            "--autoload" => {
                match args.get(i + 1).and_then(|value| value.split_once('=')) {
                    Some((namespace, dir)) => options
                        .autoload
                        .entry(namespace.trim_matches('\\').to_string())
                        .or_default()
                        .push(PathBuf::from(dir)),
                    None => eprintln!("Warning: --autoload expects NS=DIR"),
                }
                i += 1;
            }
            "--no-recursive" => {
                options.batch.recursive = false;
            }
            "--fail-fast" => {
                options.batch.fail_fast = true;
            }
            "--json" => {
                options.json = true;
            }
            _ => {
                eprintln!("Warning: Unknown option '{}'", args[i]);
            }
        }
        i += 1;
    }

    options
}

fn process_single_file(
    file_path: &Path,
    workspace: &Workspace,
    options: &CliOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    match workspace.process_file(file_path) {
        Ok(result) => {
            if options.json {
                println!("{}", serde_json::to_string_pretty(&result.to_json())?);
            } else {
                println!("Processing file: {}", file_path.display());
                print_file_result(&result);
            }
            if result.has_errors() {
                std::process::exit(1);
            }
        }
        Err(error) => {
            eprintln!("\nFAILED: {}", error);
            logging::print_cargo_style_summary();
            std::process::exit(1);
        }
    }

    Ok(())
}

fn process_directory_batch(
    dir_path: &Path,
    workspace: &Workspace,
    options: &CliOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = &options.batch;
    if !options.json {
        println!("Starting batch processing: {}", dir_path.display());
        println!(
            "Configuration: {} threads, recursive={}, fail_fast={}",
            config.max_threads, config.recursive, config.fail_fast
        );
    }

    match batch::process_directory_with_config(dir_path, config, workspace) {
        Ok(results) => {
            if options.json {
                println!("{}", serde_json::to_string_pretty(&results.to_json())?);
            } else {
                for (_, result) in &results.successful_files {
                    println!();
                    println!("{}", result.file_path.display());
                    print_file_result(result);
                }
                print_batch_results(&results);
            }

            if results.has_errors() {
                std::process::exit(1);
            }
        }
        Err(error) => {
            eprintln!("Batch processing failed: {}", error);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_file_result(result: &PipelineResult) {
    for report in &result.elements {
        print_element(report);
    }
    println!(
        "  {} classes, {} annotations, {} element errors ({:.2}ms)",
        result.classes.len(),
        result.annotation_count(),
        result.error_count(),
        result.processing_duration.as_secs_f64() * 1000.0
    );
}

fn print_element(report: &ElementReport) {
    match &report.outcome {
        Ok(annotations) if annotations.is_empty() => {}
        Ok(annotations) => {
            println!("  {}", report.element);
            for annotation in annotations {
                let properties = serde_json::to_string(&annotation.properties)
                    .unwrap_or_else(|_| String::from("{}"));
                println!("    @{} {}", annotation.class, properties);
            }
        }
        Err(error) => {
            println!("  {}", report.element);
            println!("    error[{}]: {}", error.error_code().as_str(), error);
        }
    }
}

fn print_batch_results(results: &batch::BatchResults) {
    println!();
    println!("Batch Processing Summary:");
    println!("  Files discovered: {}", results.files_discovered);
    println!("  Files processed: {}", results.files_processed);
    println!("  Read: {}", results.success_count());
    println!("  Failed: {}", results.failure_count());
    println!("  Annotations: {}", results.annotation_count());
    println!("  Element errors: {}", results.element_error_count());
    println!(
        "  Total time: {:.2}s",
        results.processing_duration.as_secs_f64()
    );

    let logged = logging::get_processing_summary();
    if logged.has_errors() || logged.total_warnings > 0 {
        println!(
            "  Logged: {} errors, {} warnings across {} units",
            logged.total_errors, logged.total_warnings, logged.total_files
        );
    }

    if results.failure_count() > 0 {
        println!("\nFailed Files:");
        for (file_path, error) in &results.failed_files {
            println!("  {}: {}", file_path.display(), error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_parse_options() {
        let options = parse_options(&args(&[
            "--threads",
            "4",
            "--fail-fast",
            "--no-recursive",
            "--json",
            "--autoload",
            "Acme=./lib",
            "--autoload",
            "\\Acme\\=./vendor",
        ]));

        assert_eq!(options.batch.max_threads, 4);
        assert!(options.batch.fail_fast);
        assert!(!options.batch.recursive);
        assert!(options.json);
        assert_eq!(
            options.autoload.get("Acme"),
            Some(&vec![PathBuf::from("./lib"), PathBuf::from("./vendor")])
        );
    }

    #[test]
    fn test_parse_options_invalid() {
        let options = parse_options(&args(&["--threads", "invalid", "--autoload", "nodir", "--unknown"]));
        assert_ne!(options.batch.max_threads, 0);
        assert!(options.autoload.is_empty());
    }
}
