//! `apiguard` command-line interface

use anyhow::Context;
use apiguard_checker::{
    plan_fixes, render, watch, CheckError, CheckerConfig, ConsistencyChecker, FixError,
    OutputFormat, DEFAULT_DEBOUNCE,
};
use apiguard_registry::{ApiConfig, OperationPath};
use apiguard_scanner::CallConvention;
use clap::{value_parser, Arg, ArgAction, ArgGroup, ArgMatches, Command};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const EXIT_BLOCKING: u8 = 1;
const EXIT_USAGE: u8 = 2;
const EXIT_RUNTIME: u8 = 3;

fn cli() -> Command {
    let config_arg = Arg::new("config")
        .long("config")
        .short('c')
        .global(true)
        .value_parser(value_parser!(PathBuf))
        .help("Registry config file (.toml, .json, .yaml); defaults to the built-in table");

    let object_arg = Arg::new("object")
        .long("object")
        .value_name("NAME")
        .help("Client object for member calls (default: api)");

    Command::new("apiguard")
        .version(apiguard_checker::VERSION)
        .about("Check remote-procedure calls against the API registry")
        .args_conflicts_with_subcommands(true)
        .arg(config_arg)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("Raise log level (-v info, -vv debug, -vvv trace)"),
        )
        .arg(
            Arg::new("root")
                .value_parser(value_parser!(PathBuf))
                .default_value(".")
                .help("Source tree to check"),
        )
        .arg(object_arg.clone())
        .arg(
            Arg::new("wrapper")
                .long("wrapper")
                .value_name("FN")
                .help("Wrapper function taking the endpoint URL first, e.g. ajax"),
        )
        .group(ArgGroup::new("convention").args(["object", "wrapper"]))
        .arg(
            Arg::new("ext")
                .long("ext")
                .action(ArgAction::Append)
                .help("File extension to scan (repeatable; replaces the defaults)"),
        )
        .arg(
            Arg::new("ignore")
                .long("ignore")
                .action(ArgAction::Append)
                .help("Extra directory name to skip (repeatable)"),
        )
        .arg(
            Arg::new("respect-gitignore")
                .long("respect-gitignore")
                .action(ArgAction::SetTrue)
                .help("Also skip files matched by .gitignore"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .value_parser(["text", "json"])
                .default_value("text")
                .help("Report format"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .value_parser(value_parser!(PathBuf))
                .help("Write the report to a file instead of stdout"),
        )
        .arg(
            Arg::new("watch")
                .long("watch")
                .action(ArgAction::SetTrue)
                .help("Re-run on every change"),
        )
        .subcommand(
            Command::new("resolve")
                .about("Resolve a dotted operation path to its method name")
                .arg(Arg::new("path").required(true).help("Operation path, e.g. categories.list")),
        )
        .subcommand(
            Command::new("methods")
                .about("List registered methods")
                .arg(
                    Arg::new("duplicates")
                        .long("duplicates")
                        .action(ArgAction::SetTrue)
                        .help("Only methods registered under several paths"),
                ),
        )
        .subcommand(
            Command::new("suggest")
                .about("Search registered paths and methods")
                .arg(Arg::new("term").required(true)),
        )
        .subcommand(
            Command::new("fix")
                .about("Rewrite deprecated calls to their replacements")
                .arg(
                    Arg::new("root")
                        .value_parser(value_parser!(PathBuf))
                        .default_value("."),
                )
                .arg(object_arg)
                .arg(
                    Arg::new("write")
                        .long("write")
                        .action(ArgAction::SetTrue)
                        .help("Apply the edits (default is a dry run)"),
                ),
        )
}

fn init_tracing(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<ApiConfig> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => {
            ApiConfig::from_path(path).with_context(|| format!("loading {}", path.display()))
        }
        None => Ok(ApiConfig::builtin()?),
    }
}

/// Subcommands define only some of the convention flags
fn convention(matches: &ArgMatches) -> anyhow::Result<CallConvention> {
    if let Ok(Some(function)) = matches.try_get_one::<String>("wrapper") {
        return Ok(CallConvention::wrapper(function.as_str())?);
    }
    match matches.try_get_one::<String>("object").ok().flatten() {
        Some(object) => Ok(CallConvention::member(object.as_str())?),
        None => Ok(CallConvention::default()),
    }
}

fn checker_config(matches: &ArgMatches, root: &Path) -> anyhow::Result<CheckerConfig> {
    let mut config = CheckerConfig::new(root).with_convention(convention(matches)?);
    if let Ok(Some(exts)) = matches.try_get_many::<String>("ext") {
        config = config.with_extensions(exts);
    }
    if let Ok(Some(dirs)) = matches.try_get_many::<String>("ignore") {
        for dir in dirs {
            config = config.add_ignore_dir(dir.as_str());
        }
    }
    if matches.try_get_one::<bool>("respect-gitignore").ok().flatten() == Some(&true) {
        config = config.respect_gitignore(true);
    }
    Ok(config)
}

fn emit(text: &str, output: Option<&PathBuf>) -> anyhow::Result<()> {
    match output {
        Some(path) => std::fs::write(path, text)
            .map_err(|e| CheckError::io_error(path, e))
            .with_context(|| "writing report")?,
        None => print!("{text}"),
    }
    Ok(())
}

fn run_check(matches: &ArgMatches) -> anyhow::Result<ExitCode> {
    let api = load_config(matches)?;
    let root = matches
        .get_one::<PathBuf>("root")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));
    let checker = ConsistencyChecker::new(api, checker_config(matches, &root)?)?;
    let format: OutputFormat = matches
        .get_one::<String>("format")
        .map_or(Ok(OutputFormat::Text), |f| f.parse())
        .map_err(anyhow::Error::msg)?;
    let output = matches.get_one::<PathBuf>("output");

    if matches.get_flag("watch") {
        watch(&checker, DEFAULT_DEBOUNCE, |result| {
            match result.map_err(anyhow::Error::from).and_then(|report| {
                let text = render(&report, format)?;
                emit(&text, output)
            }) {
                Ok(()) => {}
                Err(e) => eprintln!("error: {e:#}"),
            }
            ControlFlow::Continue(())
        })?;
        return Ok(ExitCode::SUCCESS);
    }

    let report = checker.run()?;
    emit(&render(&report, format)?, output)?;
    Ok(if report.has_blocking_issues() {
        ExitCode::from(EXIT_BLOCKING)
    } else {
        ExitCode::SUCCESS
    })
}

fn run_resolve(api: &ApiConfig, args: &ArgMatches) -> anyhow::Result<ExitCode> {
    let raw = args.get_one::<String>("path").map_or("", String::as_str);
    let path: OperationPath = raw.parse().with_context(|| format!("invalid path '{raw}'"))?;
    match api.registry().resolve(&path) {
        Ok(method) => {
            println!("{method}");
            if let Some(replacement) = api.deprecations().check_deprecated(method) {
                eprintln!("warning: {method} is deprecated; use {replacement}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{e}");
            Ok(ExitCode::from(EXIT_BLOCKING))
        }
    }
}

fn run_methods(api: &ApiConfig, args: &ArgMatches) {
    let registry = api.registry();
    if args.get_flag("duplicates") {
        for method in registry.find_duplicates() {
            let paths: Vec<String> =
                registry.paths_for(&method).iter().map(ToString::to_string).collect();
            println!("{method}: {}", paths.join(", "));
        }
        return;
    }
    for entry in registry.all_methods() {
        let note = api
            .deprecations()
            .check_deprecated(&entry.method)
            .map(|r| format!("  (deprecated, use {r})"))
            .unwrap_or_default();
        println!("{} -> {}{note}", entry.path, entry.method);
    }
}

fn run_suggest(api: &ApiConfig, args: &ArgMatches) {
    let term = args.get_one::<String>("term").map_or("", String::as_str);
    let registry = api.registry();
    let found = registry.suggest(term);
    if found.is_empty() {
        match registry.closest_method(term) {
            Some(close) => println!("no match for '{term}'; did you mean {close}?"),
            None => println!("no match for '{term}'"),
        }
        return;
    }
    for entry in found {
        println!("{} -> {}", entry.path, entry.method);
    }
}

fn run_fix(api: ApiConfig, args: &ArgMatches) -> anyhow::Result<ExitCode> {
    let root = args
        .get_one::<PathBuf>("root")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));
    let checker = ConsistencyChecker::new(api, checker_config(args, &root)?)?;
    let plan = plan_fixes(&checker)?;

    for file in &plan.files {
        for edit in &file.edits {
            println!("{}:{} {} -> {}", file.path.display(), edit.line, edit.from, edit.to);
        }
    }
    for skipped in &plan.skipped {
        eprintln!("skipped {}: {}", skipped.path.display(), skipped.reason);
    }

    if plan.is_empty() {
        println!("No deprecated calls to rewrite.");
    } else if args.get_flag("write") {
        let files = plan.apply(&root)?;
        println!("Rewrote {} call(s) in {files} file(s).", plan.edit_count());
    } else {
        println!(
            "{} call(s) in {} file(s) would be rewritten; pass --write to apply.",
            plan.edit_count(),
            plan.files.len()
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn run(matches: &ArgMatches) -> anyhow::Result<ExitCode> {
    match matches.subcommand() {
        Some(("resolve", args)) => run_resolve(&load_config(matches)?, args),
        Some(("methods", args)) => {
            run_methods(&load_config(matches)?, args);
            Ok(ExitCode::SUCCESS)
        }
        Some(("suggest", args)) => {
            run_suggest(&load_config(matches)?, args);
            Ok(ExitCode::SUCCESS)
        }
        Some(("fix", args)) => run_fix(load_config(matches)?, args),
        _ => run_check(matches),
    }
}

/// Exit code for a failed command: bad arguments or configuration versus
/// failures while reading or writing the tree
fn exit_code(err: &anyhow::Error) -> u8 {
    let usage = if let Some(e) = err.downcast_ref::<CheckError>() {
        e.is_usage_error()
    } else if let Some(e) = err.downcast_ref::<FixError>() {
        e.is_usage_error()
    } else {
        err.downcast_ref::<serde_json::Error>().is_none()
    };
    if usage {
        EXIT_USAGE
    } else {
        EXIT_RUNTIME
    }
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_tracing(matches.get_count("verbose"));

    match run(&matches) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn convention_flags_conflict() {
        let err = cli()
            .try_get_matches_from(["apiguard", "--object", "http", "--wrapper", "ajax"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn check_arguments() {
        let args = ["apiguard", "web", "--ext", "vue", "--ext", "js", "--ignore", "legacy", "-vv"];
        let matches = cli().try_get_matches_from(args).unwrap();
        let config = checker_config(&matches, Path::new("web")).unwrap();
        assert_eq!(config.extensions(), ["vue", "js"]);
        assert!(config.ignore_dirs().iter().any(|d| d == "legacy"));
        assert_eq!(matches.get_count("verbose"), 2);
    }

    #[test]
    fn subcommand_config_is_global() {
        let matches = cli()
            .try_get_matches_from(["apiguard", "resolve", "tags.list", "--config", "api.toml"])
            .unwrap();
        assert_eq!(
            matches.get_one::<PathBuf>("config"),
            Some(&PathBuf::from("api.toml"))
        );
    }

    #[test]
    fn exit_codes_split_usage_from_runtime() {
        let missing = anyhow::Error::from(CheckError::RootNotFound(PathBuf::from("nope")));
        assert_eq!(exit_code(&missing), EXIT_USAGE);

        let write = anyhow::Error::from(CheckError::io_error(
            "out/report.txt",
            std::io::ErrorKind::NotFound.into(),
        ))
        .context("writing report");
        assert_eq!(exit_code(&write), EXIT_RUNTIME);

        let fix = anyhow::Error::from(FixError::Io {
            path: PathBuf::from("src/a.js"),
            source: std::io::ErrorKind::PermissionDenied.into(),
        });
        assert_eq!(exit_code(&fix), EXIT_RUNTIME);

        let config = anyhow::Error::from(apiguard_registry::ConfigError::EmptyRegistryModule);
        assert_eq!(exit_code(&config), EXIT_USAGE);
    }
}
