use crate::infra::load_seed_records;
use clap::Args;
use company_reviews::catalog::{
    list_companies, AggregatedCompanyView, CompanyFilter, CompanyQuery, SortKey,
};
use company_reviews::error::AppError;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct CatalogReportArgs {
    /// Company CSV export (id,name,logo,location,city,founded_on,description)
    #[arg(long)]
    pub(crate) companies_csv: PathBuf,
    /// Review CSV export (company_id,full_name,subject,review_text,rating,created_at)
    #[arg(long)]
    pub(crate) reviews_csv: Option<PathBuf>,
    /// Case-insensitive substring of the company name
    #[arg(long)]
    pub(crate) search: Option<String>,
    /// Exact city, or "All"
    #[arg(long)]
    pub(crate) city: Option<String>,
    /// One of name, rating, location, foundedOn
    #[arg(long, default_value = "name", value_parser = parse_sort_key)]
    pub(crate) sort: SortKey,
}

fn parse_sort_key(raw: &str) -> Result<SortKey, String> {
    raw.parse::<SortKey>().map_err(|err| err.to_string())
}

pub(crate) fn run_catalog_report(args: CatalogReportArgs) -> Result<(), AppError> {
    let CatalogReportArgs {
        companies_csv,
        reviews_csv,
        search,
        city,
        sort,
    } = args;

    let (companies, reviews) =
        load_seed_records(Some(companies_csv.as_path()), reviews_csv.as_deref())?;
    let query = CompanyQuery {
        filter: CompanyFilter {
            name_contains: search,
            city,
        },
        sort,
    };
    let views = list_companies(&companies, &reviews, &query);

    let stdout = io::stdout();
    render_catalog_report(&mut stdout.lock(), &views, sort)?;
    Ok(())
}

fn render_catalog_report<W: Write>(
    out: &mut W,
    views: &[AggregatedCompanyView],
    sort: SortKey,
) -> io::Result<()> {
    writeln!(
        out,
        "Company catalog ({} companies, sorted by {})",
        views.len(),
        sort.label()
    )?;

    for view in views {
        let company = &view.company;
        let summary = &view.rating;
        let place = [company.location.as_deref(), company.city.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        let founded = company
            .founded_on
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "unknown".to_string());

        writeln!(
            out,
            "- {} [{}] {} {:.1} ({} reviews) | {} | founded {}",
            company.name,
            company.id,
            stars(summary.star_count()),
            summary.rounded_to_tenth(),
            summary.review_count,
            if place.is_empty() { "-" } else { place.as_str() },
            founded
        )?;
    }

    Ok(())
}

fn stars(filled: u8) -> String {
    let filled = usize::from(filled.min(5));
    format!("{}{}", "*".repeat(filled), ".".repeat(5 - filled))
}
