//! Entrada de línea de comandos: `mriflow <input_file>`.
//!
//! Traduce el resultado del pipeline a mensajes de usuario y a código de
//! salida del proceso. stdout queda reservado para el mensaje final.

use log::error;
use std::env;
use std::path::Path;
use std::sync::Arc;

use mri_adapters::MriPipeline;
use mri_core::CoreEngineError;
use mri_toolkit::CommandInvoker;

use crate::config::AppConfig;

pub const USAGE: &str = "Usage: mriflow <input_file>";
pub const USAGE_DETAIL: &str = "  <input_file> can be a .img or .nii.gz file.";
pub const EXIT_FAILURE: i32 = 1;

fn input_arg(args: &[String]) -> Option<&str> {
    match args {
        [_, input] => Some(input.as_str()),
        _ => None,
    }
}

fn print_usage() {
    eprintln!("{USAGE}");
    eprintln!("{USAGE_DETAIL}");
}

/// Punto de entrada del binario: configuración desde el entorno, directorio
/// actual y procesos reales.
pub fn run_from_env(args: &[String]) -> i32 {
    let Some(input) = input_arg(args) else {
        print_usage();
        return EXIT_FAILURE;
    };
    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return EXIT_FAILURE;
        }
    };
    let cwd = match env::current_dir() {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Cannot determine working directory: {e}");
            return EXIT_FAILURE;
        }
    };
    run_pipeline(MriPipeline::with_system_invoker(config.run_context(&cwd)), input, &config)
}

/// Corre el pipeline para `args` (`[programa, input]`) y devuelve el código
/// de salida.
pub fn execute(args: &[String], config: &AppConfig, working_dir: &Path, invoker: Arc<dyn CommandInvoker>) -> i32 {
    let Some(input) = input_arg(args) else {
        print_usage();
        return EXIT_FAILURE;
    };

    run_pipeline(MriPipeline::new(config.run_context(working_dir), invoker), input, config)
}

fn run_pipeline(mut pipeline: MriPipeline, input: &str, config: &AppConfig) -> i32 {
    match pipeline.run(input) {
        Ok(_) => {
            println!("\nAdvanced MRI analysis complete. Report saved to {}", config.report_file);
            0
        }
        Err(e) => {
            report_failure(&e);
            e.exit_code()
        }
    }
}

fn report_failure(e: &CoreEngineError) {
    match e {
        CoreEngineError::StageExecution { stderr, .. } => {
            eprintln!("Error running command:");
            eprintln!("STDERR: {stderr}");
        }
        CoreEngineError::OutputParse { stage, raw, .. } => {
            let tokens: Vec<&str> = raw.split_whitespace().collect();
            eprintln!("Unexpected fslstats output in {stage}: {tokens:?}");
        }
        other => eprintln!("Error: {other}"),
    }
    error!("analysis aborted: {e}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_arg_requires_exactly_one_positional() {
        let argv = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(input_arg(&argv(&["mriflow", "scan.img"])), Some("scan.img"));
        assert_eq!(input_arg(&argv(&["mriflow"])), None);
        assert_eq!(input_arg(&argv(&["mriflow", "a", "b"])), None);
    }
}
