use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use plate_client::{HttpImpactService, ImpactService, PlateApp};
use plate_core::{Catalog, ImpactSummary, LocalSummary, PlateConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

mod args;

use args::Selection;

fn select_arg() -> Arg {
    Arg::new("select")
        .long("select")
        .short('s')
        .action(ArgAction::Append)
        .value_name("ID[=GRAMS]")
        .value_parser(Selection::parse)
        .help("Select an ingredient, optionally with a quantity in grams")
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON")
}

fn cli() -> Command {
    Command::new("climate-plate")
        .version(plate_client::VERSION)
        .about("Build a plate and ask the impact service what it costs the planet")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .global(true)
                .help("Impact service root, overrides the config file"),
        )
        .arg(
            Arg::new("config-file")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("catalog-file")
                .long("catalog")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML ingredient catalog replacing the built-in one"),
        )
        .subcommand(
            Command::new("catalog")
                .about("List the ingredients you can put on the plate")
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("plate")
                .about("Show where the selected ingredients sit on the plate")
                .arg(select_arg())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("submit")
                .about("Calculate the impact of the selected ingredients")
                .arg(select_arg())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("remote-ingredients")
                .about("List the ingredients the impact service knows")
                .arg(json_arg()),
        )
        .subcommand(Command::new("health").about("Check the impact service is up"))
}

fn load_config(matches: &ArgMatches) -> Result<PlateConfig> {
    let config = match matches.get_one::<PathBuf>("config-file") {
        Some(path) => PlateConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => PlateConfig::default(),
    };
    let config = args::apply_overrides(config, matches.get_one::<String>("base-url"));
    config.validate()?;
    Ok(config)
}

fn load_catalog(matches: &ArgMatches) -> Result<Catalog> {
    match matches.get_one::<PathBuf>("catalog-file") {
        Some(path) => Catalog::load(path)
            .with_context(|| format!("loading catalog from {}", path.display())),
        None => Ok(Catalog::builtin()),
    }
}

fn build_app(sub: &ArgMatches) -> Result<PlateApp> {
    let catalog = load_catalog(sub)?;
    let config = load_config(sub)?;

    let selections: Vec<Selection> = sub
        .get_many::<Selection>("select")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    for id in args::unknown_ids(&catalog, &selections) {
        eprintln!("warning: {id} is not in the catalog and will be ignored");
    }

    let mut app = PlateApp::new(Arc::new(catalog), config);
    for selection in &selections {
        for action in selection.actions() {
            app.dispatch(&action);
        }
    }
    Ok(app)
}

fn print_local(local: &LocalSummary) {
    println!("Your plate");
    println!("==========");
    for line in &local.lines {
        println!("  {:<12} {:>5} g", line.name, line.grams);
    }
    println!("  {:<12} {:>5} g", "total", local.total_grams);
}

fn print_remote(summary: &ImpactSummary) {
    println!();
    println!("Impact (session {})", summary.session_id);
    println!("======");
    for item in &summary.items {
        println!(
            "  {:<24} {:>5} g  {:>8.3} kg CO2e  {:>8.1} L  {:>7.2} m2",
            item.name, item.quantity_g, item.co2_kg, item.freshwater_l, item.land_m2
        );
    }
    println!("  CO2e:        {:.3} kg", summary.total_co2_kg);
    println!("  Freshwater:  {:.1} L", summary.total_freshwater_l);
    println!("  Land use:    {:.2} m2", summary.total_land_m2);
    println!("  Score:       {:.1} / 10", summary.impact_score_1_to_10);
}

fn cmd_catalog(sub: &ArgMatches) -> Result<ExitCode> {
    let catalog = load_catalog(sub)?;
    if sub.get_flag("json") {
        let entries: Vec<_> = catalog.iter().collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for ingredient in catalog.iter() {
            println!(
                "{:<10} {:<10} remote #{:<3} {:?}",
                ingredient.id, ingredient.name, ingredient.remote_id, ingredient.category
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_plate(sub: &ArgMatches) -> Result<ExitCode> {
    let app = build_app(sub)?;
    let sprites = app.sprites();

    if sub.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&sprites)?);
    } else if sprites.is_empty() {
        println!("The plate is empty");
    } else {
        for sprite in &sprites {
            println!(
                "{:<10} at ({:>4.1}%, {:>4.1}%) size {:>5.1}px  {}",
                sprite.ingredient_id,
                sprite.x_pct,
                sprite.y_pct,
                sprite.rendered_size(),
                sprite.css_transform()
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn cmd_submit(sub: &ArgMatches) -> Result<ExitCode> {
    let mut app = build_app(sub)?;
    let service = HttpImpactService::new(&app.config().api)?;
    debug!("Using impact service at {}", service.base_url());

    let outcome = app.submit(&service).await;

    if sub.get_flag("json") {
        let report = serde_json::json!({
            "local": app.local_summary(),
            "remote": app.remote_summary(),
            "rejected": app
                .rejected()
                .iter()
                .map(|r| serde_json::json!({
                    "ingredient_id": r.item.remote_id,
                    "quantity_g": r.item.grams,
                    "status": r.status,
                }))
                .collect::<Vec<_>>(),
            "error": app.error_message().or_else(|| app.notice().map(str::to_string)),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        if let Some(local) = app.local_summary() {
            print_local(local);
        }
        if let Some(summary) = app.remote_summary() {
            print_remote(summary);
        }
        for rejected in app.rejected() {
            eprintln!(
                "warning: service refused ingredient #{} (HTTP {})",
                rejected.item.remote_id, rejected.status
            );
        }
    }

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) if err.is_validation() => {
            eprintln!("{err}");
            Ok(ExitCode::FAILURE)
        }
        Err(err) => {
            error!("Could not calculate impact: {}", err);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn cmd_remote_ingredients(sub: &ArgMatches) -> Result<ExitCode> {
    let config = load_config(sub)?;
    let service = HttpImpactService::new(&config.api)?;
    let ingredients = service.list_ingredients().await?;

    if sub.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&ingredients)?);
    } else {
        for ingredient in &ingredients {
            println!(
                "#{:<3} {:<28} {:<8} {:>7.2} kg CO2e/kg  portion {} g",
                ingredient.id,
                ingredient.name,
                ingredient.category,
                ingredient.co2_kg_per_kg,
                ingredient.default_portion_g
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn cmd_health(sub: &ArgMatches) -> Result<ExitCode> {
    let config = load_config(sub)?;
    let service = HttpImpactService::new(&config.api)?;
    let health = service.health().await?;
    println!("{}: {}", service.base_url(), health.status);

    if health.status == "ok" {
        Ok(ExitCode::SUCCESS)
    } else {
        bail!("impact service reported {:?}", health.status)
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("catalog", sub)) => cmd_catalog(sub),
        Some(("plate", sub)) => cmd_plate(sub),
        Some(("submit", sub)) => cmd_submit(sub).await,
        Some(("remote-ingredients", sub)) => cmd_remote_ingredients(sub).await,
        Some(("health", sub)) => cmd_health(sub).await,
        _ => Ok(ExitCode::SUCCESS),
    }
}
