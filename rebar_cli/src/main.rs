//! # Rebar Layout CLI
//!
//! Runs a saved layout job, or with no job file, prompts for a single beam
//! and previews its reinforcement.
//!
//! ```text
//! rebar_cli [JOB] [--scope all|type:<NAME>|id:<UUID>] [--apply] [--out PATH] [--json] [--verbose]
//! ```

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use rebar_core::batch::BatchReport;
use rebar_core::errors::{RebarError, RebarResult};
use rebar_core::file_io::{load_job_with_lock_check, report_path_for, save_report, FileLock};
use rebar_core::geometry::Point3;
use rebar_core::job::Scope;
use rebar_core::params::{FormValue, ReinforcementForm};
use rebar_core::settings::{LayoutMode, LayoutSettings};
use rebar_core::units::LengthUnit;
use rebar_core::{run_single, BeamSpan};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use uuid::Uuid;

const USAGE: &str =
    "Usage: rebar_cli [JOB] [--scope all|type:<NAME>|id:<UUID>] [--apply] [--out PATH] [--json] [--verbose]";

#[derive(Debug, PartialEq)]
struct CliArgs {
    job: Option<PathBuf>,
    scope: Scope,
    apply: bool,
    out: Option<PathBuf>,
    json: bool,
    verbose: bool,
}

fn parse_scope(value: &str) -> Result<Scope, String> {
    if value == "all" {
        return Ok(Scope::All);
    }
    if let Some(name) = value.strip_prefix("type:") {
        return Ok(Scope::ByType(name.to_string()));
    }
    if let Some(id) = value.strip_prefix("id:") {
        return Uuid::parse_str(id)
            .map(Scope::Single)
            .map_err(|e| format!("invalid beam id '{}': {}", id, e));
    }
    Err(format!("unknown scope '{}'", value))
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs, String> {
    let mut parsed = CliArgs {
        job: None,
        scope: Scope::All,
        apply: false,
        out: None,
        json: false,
        verbose: false,
    };

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--scope" => {
                let value = args.next().ok_or("--scope needs a value")?;
                parsed.scope = parse_scope(&value)?;
            }
            "--out" => parsed.out = Some(PathBuf::from(args.next().ok_or("--out needs a path")?)),
            "--apply" => parsed.apply = true,
            "--json" => parsed.json = true,
            "--verbose" | "-v" => parsed.verbose = true,
            flag if flag.starts_with('-') => return Err(format!("unknown option '{}'", flag)),
            _ if parsed.job.is_none() => parsed.job = Some(PathBuf::from(&arg)),
            _ => return Err(format!("unexpected argument '{}'", arg)),
        }
    }
    Ok(parsed)
}

fn prompt(prompt: &str, default: &str) -> String {
    print!("{} [{}]: ", prompt, default);
    if io::stdout().flush().is_err() {
        return default.to_string();
    }

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input).is_err() || input.trim().is_empty() {
        return default.to_string();
    }
    input.trim().to_string()
}

/// Demo beam along +X from typed length, width and depth (mm).
fn demo_beam(length: &str, width: &str, depth: &str) -> RebarResult<BeamSpan> {
    let mm = |field: &str, text: &str| FormValue::Text(text.to_string()).parse_length_mm(field, LengthUnit::Millimeters);
    let length = mm("length", length)?;
    let span = BeamSpan::new(
        "CLI-Demo",
        Point3::origin(),
        Point3::new(length, 0.0, 0.0),
        mm("width", width)?,
        mm("depth", depth)?,
    );
    span.validate()?;
    Ok(span)
}

fn interactive_preview() -> RebarResult<BatchReport> {
    println!("Rebar Layout CLI - single beam preview");
    println!("======================================");
    println!();

    let span = demo_beam(
        &prompt("Beam length (mm)", "4000"),
        &prompt("Beam width (mm)", "400"),
        &prompt("Beam depth (mm)", "600"),
    )?;

    let field = |label: &str, default: &str| FormValue::Text(prompt(label, default));
    let form = ReinforcementForm {
        bar_type: Some(prompt("Bar type", "")),
        top: field("Top bars", "2"),
        bottom: field("Bottom bars", "2"),
        cover: field("Cover (mm)", "30"),
        bar_diameter: field("Bar diameter (mm)", "16"),
        stirrup_diameter: field("Stirrup diameter (mm)", "8"),
        stirrup_spacing: field("Stirrup spacing (mm)", "150"),
    };
    let params = form.into_parameters(LengthUnit::Millimeters)?;
    println!();

    run_single(&span, &params, &LayoutSettings::default())
}

/// Returns the report and the unit it should be displayed in.
fn run_job(args: &CliArgs, path: &Path) -> RebarResult<(BatchReport, LengthUnit)> {
    let (mut job, holder) = load_job_with_lock_check(path)?;
    if let Some(holder) = &holder {
        if args.apply {
            return Err(RebarError::file_locked(
                path.display().to_string(),
                format!("{} ({})", holder.user_id, holder.machine),
                holder.locked_at.to_rfc3339(),
            ));
        }
        println!("Note: {} is locked by {}; previewing only", path.display(), holder.user_id);
    }

    if !args.apply {
        job.settings.mode = LayoutMode::Preview;
        return Ok((job.run(&args.scope)?, job.settings.geometry_unit));
    }

    let _lock = FileLock::acquire(path, whoami::username())?;

    job.settings.mode = LayoutMode::Apply;
    let report = job.run(&args.scope)?;
    let out = args.out.clone().unwrap_or_else(|| report_path_for(path));
    save_report(&report, &out)?;
    info!(path = %out.display(), "Layout applied");
    Ok((report, job.settings.geometry_unit))
}

fn print_report(report: &BatchReport, unit: LengthUnit) {
    println!("═══════════════════════════════════════");
    println!("  REINFORCEMENT LAYOUT");
    println!("═══════════════════════════════════════");
    for layout in &report.layouts {
        println!();
        println!("{}:", layout.beam.label);
        for group in layout.groups_in(unit) {
            let total: f64 = group.segments.iter().map(|s| s.length()).sum();
            println!(
                "  {:<18} {:>4} segment(s), {:.2} {} total",
                group.label.to_string(),
                group.segments.len(),
                total,
                unit.symbol()
            );
        }
        for warning in &layout.warnings {
            println!("  warning: {}", warning);
        }
    }
    if !report.failures.is_empty() {
        println!();
        println!("Failed:");
        for failure in &report.failures {
            println!("  {}: {}", failure.beam.label, failure.error);
        }
    }
    println!();
    println!("═══════════════════════════════════════");
    println!("  {}", report.summary);
    println!("═══════════════════════════════════════");
}

fn main() -> ExitCode {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!("{}", USAGE);
            return ExitCode::from(2);
        }
    };

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: logging unavailable: {}", e);
    }

    let result = match &args.job {
        Some(path) => run_job(&args, path),
        None => interactive_preview().map(|report| (report, LengthUnit::Millimeters)),
    };

    match result {
        Ok((report, unit)) => {
            print_report(&report, unit);
            if args.json {
                println!();
                println!("JSON Output:");
                if let Ok(json) = serde_json::to_string_pretty(&report) {
                    println!("{}", json);
                }
            }
            if report.failures.is_empty() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<CliArgs, String> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_no_arguments_is_interactive() {
        let parsed = args(&[]).unwrap();
        assert!(parsed.job.is_none());
        assert_eq!(parsed.scope, Scope::All);
        assert!(!parsed.apply);
    }

    #[test]
    fn test_full_command_line() {
        let parsed = args(&["level2.rbj", "--scope", "type:400x600", "--apply", "--out", "r.json", "--json"]).unwrap();
        assert_eq!(parsed.job, Some(PathBuf::from("level2.rbj")));
        assert_eq!(parsed.scope, Scope::ByType("400x600".to_string()));
        assert!(parsed.apply && parsed.json);
        assert_eq!(parsed.out, Some(PathBuf::from("r.json")));
    }

    #[test]
    fn test_scope_by_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_scope(&format!("id:{}", id)).unwrap(), Scope::Single(id));
        assert!(parse_scope("id:not-a-uuid").is_err());
        assert!(parse_scope("level:2").is_err());
    }

    #[test]
    fn test_demo_beam_rejects_non_numeric_dimensions() {
        let span = demo_beam("4000", " 400 ", "600").unwrap();
        assert_eq!(span.length_mm(), 4000.0);
        assert_eq!(span.width_mm, 400.0);

        for (inputs, field) in [(["abc", "400", "600"], "length"), (["4000", "4OO", "600"], "width"), (["4000", "400", ""], "depth")] {
            match demo_beam(inputs[0], inputs[1], inputs[2]) {
                Err(RebarError::InvalidParameter { field: f, .. }) => assert_eq!(f, field),
                other => panic!("expected InvalidParameter on {}, got {:?}", field, other),
            }
        }
        assert!(demo_beam("4000", "0", "600").is_err());
    }

    #[test]
    fn test_bad_arguments() {
        assert!(args(&["--frobnicate"]).is_err());
        assert!(args(&["a.rbj", "b.rbj"]).is_err());
        assert!(args(&["--scope"]).is_err());
    }
}
