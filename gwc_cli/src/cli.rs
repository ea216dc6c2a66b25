//! This module implements the subcommands of the CLI.

use std::{
    collections::BTreeSet,
    env::current_dir,
    fs::write,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use gwc_core::{
    calendar::{self, GenerationRequest},
    catalog::Catalog,
    summary::{preview, summarize},
};
use log::info;

#[derive(Debug, Parser)]
#[command(version, about = "Download Gjesdal's waste collection days as an iCalendar file")]
pub struct Arguments {
    /// read the catalog from this JSON file instead of the bundled one
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// write the calendar file of a route
    Calendar {
        #[command(flatten)]
        selection: Selection,
        /// remind with this alert preset, may be repeated
        #[arg(long = "alert")]
        alerts: Vec<String>,
        /// where to write the file, defaults to the suggested file name in the current directory
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// print how many collections the calendar contains
    Summary {
        #[command(flatten)]
        selection: Selection,
    },
    /// print the upcoming collections
    Preview {
        #[command(flatten)]
        selection: Selection,
        /// show at most this many collections
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// list all routes
    Routes,
}

#[derive(Debug, Args)]
pub struct Selection {
    /// the route number
    pub route: u32,
    /// include this waste type, may be repeated, defaults to all waste types
    #[arg(long = "waste-type")]
    pub waste_types: Vec<String>,
}

impl Selection {
    fn waste_type_ids(&self, catalog: &Catalog) -> BTreeSet<String> {
        if self.waste_types.is_empty() {
            catalog.waste_type_ids().into_iter().collect()
        } else {
            self.waste_types.iter().cloned().collect()
        }
    }
}

pub fn run(arguments: Arguments) -> Result<()> {
    let catalog = match &arguments.catalog {
        Some(path) => Catalog::load(path)?,
        None => Catalog::bundled()?,
    };
    match arguments.command {
        Command::Calendar {
            selection,
            alerts,
            output,
        } => {
            run_calendar(&catalog, &selection, &alerts, output)?;
        }
        Command::Summary { selection } => println!("{}", render_summary(&catalog, &selection)),
        Command::Preview { selection, limit } => {
            let today = Local::now().date_naive();
            println!("{}", render_preview(&catalog, &selection, limit, today))
        }
        Command::Routes => println!("{}", render_routes(&catalog)),
    };
    Ok(())
}

fn generation_request(
    catalog: &Catalog,
    selection: &Selection,
    alerts: &[String],
) -> Result<GenerationRequest> {
    let alerts = catalog.alert_presets(alerts.iter().map(String::as_str))?;
    Ok(GenerationRequest::new(
        selection.route,
        selection.waste_type_ids(catalog),
        alerts,
    ))
}

fn run_calendar(
    catalog: &Catalog,
    selection: &Selection,
    alerts: &[String],
    output: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(path) = &output {
        check_output(path)?;
    }
    let request = generation_request(catalog, selection, alerts)?;
    let document = calendar::generate(catalog, &request)?;
    let path = match output {
        Some(path) => path,
        None => {
            let mut path = current_dir()?;
            path.push(&document.file_name);
            path
        }
    };
    write(&path, &document.content)?;
    info!("wrote {} events to {}", document.event_count, path.display());
    println!("{}", path.display());
    Ok(path)
}

fn render_summary(catalog: &Catalog, selection: &Selection) -> String {
    let Some(summary) = summarize(catalog, selection.route, &selection.waste_type_ids(catalog))
    else {
        return format!("Route {} not found", selection.route);
    };
    let mut lines: Vec<String> = summary
        .types
        .iter()
        .map(|summary| {
            format!(
                "{} {}: {} days ({} to {})",
                summary.icon, summary.name, summary.count, summary.first_date, summary.last_date
            )
        })
        .collect();
    lines.push(format!("{} events in total", summary.total));
    lines.join("\n")
}

fn render_preview(
    catalog: &Catalog,
    selection: &Selection,
    limit: usize,
    today: NaiveDate,
) -> String {
    let Some(preview) = preview(
        catalog,
        selection.route,
        &selection.waste_type_ids(catalog),
        today,
    ) else {
        return format!("Route {} not found", selection.route);
    };
    let mut lines = vec![format!("Upcoming collections ({})", preview.upcoming.len())];
    lines.extend(preview.upcoming.iter().take(limit).map(|occurrence| {
        format!(
            "{} {} {}",
            occurrence.date.format("%a %d.%m."),
            occurrence.waste_type.icon,
            occurrence.waste_type.name
        )
    }));
    if preview.upcoming.len() > limit {
        lines.push(format!("...and {} more", preview.upcoming.len() - limit));
    }
    if preview.past > 0 {
        lines.push(format!(
            "{} collections have already passed and are included in the file",
            preview.past
        ));
    }
    lines.join("\n")
}

fn render_routes(catalog: &Catalog) -> String {
    catalog
        .routes
        .iter()
        .map(|route| {
            let status = if route.has_schedule() {
                format!("{} events", route.total_events())
            } else {
                String::from("no dates published yet")
            };
            format!(
                "{:>3}  {} ({}): {}",
                route.id,
                route.name,
                route.areas.join(", "),
                status
            )
        })
        .collect::<Vec<String>>()
        .join("\n")
}

/// Fail early if the output directory does not exist.
fn check_output(output: &Path) -> Result<()> {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            Err(anyhow!("directory {} does not exist", parent.display()))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeSet, env::temp_dir, fs::read_to_string, path::Path};

    use clap::{CommandFactory, Parser};
    use gwc_core::catalog::Catalog;

    use super::*;

    fn selection(route: u32, waste_types: &[&str]) -> Selection {
        Selection {
            route,
            waste_types: waste_types.iter().map(|id| id.to_string()).collect(),
        }
    }

    #[test]
    fn test_arguments() {
        Arguments::command().debug_assert();
        let arguments = Arguments::try_parse_from([
            "gwc_cli",
            "calendar",
            "3",
            "--waste-type",
            "matavfall",
            "--waste-type",
            "glass",
            "--alert",
            "evening-before",
        ])
        .unwrap();
        let Command::Calendar {
            selection, alerts, ..
        } = arguments.command
        else {
            panic!("expected the calendar command");
        };
        assert_eq!(selection.route, 3);
        assert_eq!(selection.waste_types, vec!["matavfall", "glass"]);
        assert_eq!(alerts, vec!["evening-before"]);
        assert!(Arguments::try_parse_from(["gwc_cli", "summary", "three"]).is_err());
    }

    #[test]
    fn test_waste_type_ids_default_to_all() {
        let catalog = Catalog::bundled().unwrap();
        let all: BTreeSet<String> = catalog.waste_type_ids().into_iter().collect();
        assert_eq!(selection(3, &[]).waste_type_ids(&catalog), all);
        assert_eq!(
            selection(3, &["papir"]).waste_type_ids(&catalog),
            BTreeSet::from([String::from("papir")])
        );
    }

    #[test]
    fn test_generation_request() {
        let catalog = Catalog::bundled().unwrap();
        let alerts = vec![String::from("morning-of"), String::from("evening-before")];
        let request = generation_request(&catalog, &selection(1, &["matavfall"]), &alerts).unwrap();
        assert_eq!(request.route_id, 1);
        assert_eq!(request.alerts[0].id, "morning-of");
        assert_eq!(request.alerts[1].id, "evening-before");
        let unknown = vec![String::from("never")];
        assert!(generation_request(&catalog, &selection(1, &[]), &unknown).is_err());
    }

    #[test]
    fn test_run_calendar() {
        let catalog = Catalog::bundled().unwrap();
        let output = temp_dir().join("gwc_cli_test_run_calendar.ics");
        let path = run_calendar(
            &catalog,
            &selection(3, &["matavfall"]),
            &[String::from("evening-before")],
            Some(output.clone()),
        )
        .unwrap();
        assert_eq!(path, output);
        let content = read_to_string(&output).unwrap();
        assert_eq!(content.matches("BEGIN:VEVENT").count(), 13);
        assert_eq!(content.matches("TRIGGER:-PT10H").count(), 13);
        assert!(run_calendar(&catalog, &selection(99, &[]), &[], Some(output)).is_err());
    }

    #[test]
    fn test_render_summary() {
        let catalog = Catalog::bundled().unwrap();
        let rendered = render_summary(&catalog, &selection(3, &["matavfall", "restavfall"]));
        assert!(rendered.contains("🍏 Matavfall: 13 days (2026-01-07 to 2026-12-09)"));
        assert!(rendered.ends_with("39 events in total"));
        assert_eq!(
            render_summary(&catalog, &selection(99, &[])),
            "Route 99 not found"
        );
    }

    #[test]
    fn test_render_preview_limit() {
        let catalog = Catalog::bundled().unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let rendered = render_preview(&catalog, &selection(3, &["matavfall"]), 2, today);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Upcoming collections (3)",
                "Wed 14.10. 🍏 Matavfall",
                "Wed 11.11. 🍏 Matavfall",
                "...and 1 more",
                "10 collections have already passed and are included in the file",
            ]
        );
        let rendered = render_preview(&catalog, &selection(3, &["matavfall"]), 20, today);
        assert_eq!(rendered.lines().count(), 5);
        assert!(!rendered.contains("more"));
    }

    #[test]
    fn test_render_preview_without_collections() {
        let catalog = Catalog::bundled().unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let rendered = render_preview(&catalog, &selection(99, &[]), 20, today);
        assert_eq!(rendered, "Route 99 not found");
        let rendered = render_preview(&catalog, &selection(4, &[]), 20, today);
        assert_eq!(rendered, "Upcoming collections (0)");
    }

    #[test]
    fn test_render_routes() {
        let catalog = Catalog::bundled().unwrap();
        let rendered = render_routes(&catalog);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].contains("Rute 3 (Gjesdal, Bærland, Figgjo, Søyland): 57 events"));
        assert!(lines[3].ends_with("no dates published yet"));
    }

    #[test]
    fn test_check_output() {
        assert!(check_output(Path::new("calendar.ics")).is_ok());
        assert!(check_output(&temp_dir().join("calendar.ics")).is_ok());
        assert!(check_output(Path::new("/does/not/exist/calendar.ics")).is_err());
    }
}
