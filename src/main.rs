use std::path::PathBuf;
use std::process::exit;

use tabflow_rust::commands::{explain_file, render_files};
use tabflow_rust::config::AppConfig;
use tabflow_rust::errors::CoreError;
use tabflow_rust::logging;

const DEMO_WORKFLOW: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/sample_workflow.json");

fn usage() -> ! {
    eprintln!("uso: tabflow render <workflow.json>... [--max-attempts <N>]");
    eprintln!("     tabflow explain <workflow.json>");
    eprintln!("     tabflow demo");
    exit(2);
}

fn catalog() -> Result<tab_core::ModuleCatalog, CoreError> {
    Ok(tab_adapters::default_catalog()?)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CoreError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| CoreError::Internal(e.to_string()))?;
    println!("{text}");
    Ok(())
}

/// Renderiza e imprime; devuelve cuántos documentos fallaron.
fn run_render(paths: &[PathBuf], cfg: &AppConfig) -> Result<usize, CoreError> {
    let mut failed = 0;
    for (path, result) in render_files(paths, catalog, cfg.render) {
        match result {
            Ok(output) => print_json(&output)?,
            Err(e) => {
                eprintln!("[tabflow render] {}: {e}", path.display());
                failed += 1;
            }
        }
    }
    Ok(failed)
}

fn main() {
    let mut cfg = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("[tabflow] {e}");
            exit(3);
        }
    };
    if let Err(e) = logging::init(&cfg.log_filter) {
        eprintln!("[tabflow] {e}");
    }

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        usage();
    }
    let command = args[1].as_str();
    let mut files: Vec<PathBuf> = Vec::new();
    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--max-attempts" => {
                i += 1;
                match args.get(i).and_then(|v| v.parse::<u32>().ok()).filter(|n| *n >= 1) {
                    Some(n) => cfg.render.max_attempts = n,
                    None => usage(),
                }
            }
            other => files.push(PathBuf::from(other)),
        }
        i += 1;
    }

    let outcome = match command {
        "render" if !files.is_empty() => run_render(&files, &cfg),
        "demo" if files.is_empty() => run_render(&[PathBuf::from(DEMO_WORKFLOW)], &cfg),
        "explain" if files.len() == 1 => catalog().and_then(|c| explain_file(&files[0], &c))
                                                  .and_then(|out| print_json(&out))
                                                  .map(|_| 0),
        _ => usage(),
    };
    match outcome {
        Ok(0) => {}
        Ok(_) => exit(1),
        Err(e) => {
            eprintln!("[tabflow {command}] {e}");
            exit(1);
        }
    }
}
