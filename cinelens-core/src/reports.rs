//! Report catalog: the fixed set of aggregate queries over the movie table.

use crate::canvas::ChartKind;
use crate::data::table::Table;
use crate::error::{CinelensError, Result};
use crate::store::{TableStore, quote_ident};
use serde::Serialize;

/// One catalog entry. `query` holds a `{table}` placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSpec {
    pub id: u8,
    pub title: &'static str,
    pub query: &'static str,
    pub x_column: &'static str,
    pub y_column: &'static str,
    pub default_chart: ChartKind,
}

impl ReportSpec {
    /// The query with the quoted table name substituted.
    pub fn sql(&self, table_name: &str) -> String {
        self.query.replace("{table}", &quote_ident(table_name))
    }
}

static REPORTS: [ReportSpec; 10] = [
    ReportSpec {
        id: 1,
        title: "Top IMDb Movies",
        query: "SELECT substr(movie_title, 1, 25) AS short_title, imdb_score \
                FROM {table} ORDER BY imdb_score DESC, short_title ASC LIMIT 10",
        x_column: "short_title",
        y_column: "imdb_score",
        default_chart: ChartKind::Bar,
    },
    ReportSpec {
        id: 2,
        title: "Average IMDb by Language",
        query: "SELECT language, ROUND(AVG(imdb_score), 2) AS avg_rating \
                FROM {table} GROUP BY language ORDER BY language ASC",
        x_column: "language",
        y_column: "avg_rating",
        default_chart: ChartKind::Bar,
    },
    ReportSpec {
        id: 3,
        title: "Average Gross by Country",
        query: "SELECT substr(country, 1, 20) AS short_country, ROUND(AVG(gross), 2) AS avg_gross \
                FROM {table} GROUP BY short_country \
                ORDER BY avg_gross DESC, short_country ASC LIMIT 6",
        x_column: "short_country",
        y_column: "avg_gross",
        default_chart: ChartKind::Bar,
    },
    ReportSpec {
        id: 4,
        title: "Top Directors by Movie Count",
        query: "SELECT substr(director_name, 1, 25) AS director, COUNT(*) AS movie_count \
                FROM {table} GROUP BY director \
                ORDER BY movie_count DESC, director ASC LIMIT 5",
        x_column: "director",
        y_column: "movie_count",
        default_chart: ChartKind::Bar,
    },
    ReportSpec {
        id: 5,
        title: "Top Genres by IMDb Score",
        query: "SELECT CASE WHEN instr(genres, '|') > 0 \
                THEN substr(genres, 1, instr(genres, '|') - 1) ELSE genres END AS genre, \
                ROUND(AVG(imdb_score), 2) AS avg_imdb \
                FROM {table} GROUP BY genre \
                ORDER BY avg_imdb DESC, genre ASC LIMIT 5",
        x_column: "genre",
        y_column: "avg_imdb",
        default_chart: ChartKind::Bar,
    },
    ReportSpec {
        id: 6,
        title: "Most Reviewed Movies",
        query: "SELECT substr(movie_title, 1, 25) AS short_title, num_user_for_reviews \
                FROM {table} ORDER BY num_user_for_reviews DESC, short_title ASC LIMIT 10",
        x_column: "short_title",
        y_column: "num_user_for_reviews",
        default_chart: ChartKind::Bar,
    },
    ReportSpec {
        id: 7,
        title: "Best Movies After 2010",
        query: "SELECT substr(movie_title, 1, 25) AS short_title, imdb_score \
                FROM {table} WHERE title_year > 2010 AND imdb_score > 8 \
                ORDER BY imdb_score DESC, short_title ASC LIMIT 10",
        x_column: "short_title",
        y_column: "imdb_score",
        default_chart: ChartKind::Bar,
    },
    ReportSpec {
        id: 8,
        title: "Top Actors by Facebook Likes",
        query: "SELECT substr(actor_1_name, 1, 20) AS actor, SUM(actor_1_facebook_likes) AS total_likes \
                FROM {table} GROUP BY actor \
                ORDER BY total_likes DESC, actor ASC LIMIT 5",
        x_column: "actor",
        y_column: "total_likes",
        default_chart: ChartKind::Bar,
    },
    ReportSpec {
        id: 9,
        title: "Avg Duration by Primary Genre",
        query: "SELECT CASE WHEN instr(genres, '|') > 0 \
                THEN substr(genres, 1, instr(genres, '|') - 1) ELSE genres END AS genre, \
                ROUND(AVG(duration), 2) AS avg_duration \
                FROM {table} GROUP BY genre \
                ORDER BY avg_duration DESC, genre ASC",
        x_column: "genre",
        y_column: "avg_duration",
        default_chart: ChartKind::Bar,
    },
    ReportSpec {
        id: 10,
        title: "Movies per Year",
        query: "SELECT title_year, COUNT(*) AS movie_count \
                FROM {table} GROUP BY title_year ORDER BY title_year ASC",
        x_column: "title_year",
        y_column: "movie_count",
        default_chart: ChartKind::Line,
    },
];

/// All reports, ids 1 to 10 in order.
pub fn list_reports() -> &'static [ReportSpec] {
    &REPORTS
}

pub fn find_report(id: u8) -> Result<&'static ReportSpec> {
    REPORTS.iter().find(|r| r.id == id).ok_or_else(|| {
        CinelensError::invalid_choice(format!("report {id}, choose 1 to {}", REPORTS.len()))
    })
}

/// Run report `id` against `table_name` in the store. An empty result is not
/// an error; callers decide how to present "no data".
pub fn execute<S: TableStore + ?Sized>(id: u8, store: &S, table_name: &str) -> Result<Table> {
    let report = find_report(id)?;
    let sql = report.sql(table_name);
    tracing::debug!(report = id, %sql, "running report query");
    let result = store.query(&sql)?;
    tracing::info!(report = id, rows = result.row_count(), "{}", report.title);
    Ok(result)
}
