//! Code table lookups.

use anyhow::Result;
use clap::{Args, Subcommand};
use pitchside_id::tables::{self, category_from_code, city_from_code, is_known_category, is_known_city};
use pitchside_id::{category_code, city_code, parse_location, Code};
use serde::Serialize;
use tabled::Tabled;

use super::CommandContext;
use crate::output::{print_output, print_row};

#[derive(Debug, Args)]
pub struct CodesCommand {
    #[command(subcommand)]
    command: CodesSubcommand,
}

#[derive(Debug, Subcommand)]
enum CodesSubcommand {
    /// Resolve a category name, or list the category table.
    Category(LookupArgs),

    /// Resolve a city name, or list the city table.
    City(LookupArgs),

    /// Split a free-text location into city and area codes.
    Location(LocationArgs),
}

#[derive(Debug, Args)]
struct LookupArgs {
    /// Name to resolve; omit to list the table.
    name: Option<String>,
}

#[derive(Debug, Args)]
struct LocationArgs {
    /// Location text, e.g. "Bangalore, Pallikaranai".
    text: String,
}

#[derive(Debug, Serialize, Tabled)]
struct LookupRow {
    #[tabled(rename = "Input")]
    input: String,

    #[tabled(rename = "Code")]
    code: Code,

    #[tabled(rename = "Name")]
    name: String,

    #[tabled(rename = "Fallback")]
    fallback: bool,
}

#[derive(Debug, Serialize, Tabled)]
struct TableRow {
    #[tabled(rename = "Name")]
    name: &'static str,

    #[tabled(rename = "Code")]
    code: Code,
}

#[derive(Debug, Serialize, Tabled)]
#[serde(rename_all = "camelCase")]
struct LocationRow {
    #[tabled(rename = "City")]
    city: String,

    #[tabled(rename = "City Code")]
    city_code: Code,

    #[tabled(rename = "Area")]
    area: String,

    #[tabled(rename = "Area Code")]
    area_code: Code,
}

impl CodesCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            CodesSubcommand::Category(args) => match args.name {
                Some(name) => print_row(category_row(&name), ctx.format),
                None => print_output(&table_rows(tables::categories()), ctx.format),
            },
            CodesSubcommand::City(args) => match args.name {
                Some(name) => print_row(city_row(&name), ctx.format),
                None => print_output(&table_rows(tables::cities()), ctx.format),
            },
            CodesSubcommand::Location(args) => print_row(location_row(&args.text), ctx.format),
        }
        Ok(())
    }
}

fn category_row(name: &str) -> LookupRow {
    let code = category_code(name);
    LookupRow {
        input: name.to_string(),
        code,
        name: category_from_code(code).to_string(),
        fallback: !is_known_category(name),
    }
}

fn city_row(name: &str) -> LookupRow {
    let code = city_code(name);
    LookupRow {
        input: name.to_string(),
        code,
        name: city_from_code(code).to_string(),
        fallback: !is_known_city(name),
    }
}

fn location_row(text: &str) -> LocationRow {
    let location = parse_location(text);
    LocationRow {
        city_code: location.city_code(),
        area_code: location.area_code(),
        city: location.city,
        area: location.area,
    }
}

fn table_rows(entries: impl Iterator<Item = (&'static str, Code)>) -> Vec<TableRow> {
    entries.map(|(name, code)| TableRow { name, code }).collect()
}
