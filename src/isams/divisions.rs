//! Year-group divisions, pulled one year group at a time

use super::endpoint::into_records;
use crate::client::IsamsClient;
use crate::etl::{Loader, Progress, RunOutcome, Transformer};
use crate::transform::AddColumn;
use crate::warehouse::TruncateOnce;
use eyre::{Result, WrapErr};
use owo_colors::OwoColorize;
use std::ops::RangeInclusive;

/// Name of the custom pipeline and of its destination table
pub const DIVISIONS: &str = "divisions";

/// Year-group ids whose divisions are pulled, in order
pub const YEAR_GROUP_IDS: RangeInclusive<i32> = -2..=14;

pub fn divisions_path(year_group_id: i32) -> String {
    format!("/api/school/yeargroups/{}/divisions", year_group_id)
}

/// Load the divisions of every year group into one table
///
/// Each record gets a `year_group_id` column. The first year group truncates
/// the table and every later one appends.
pub async fn run_divisions<L>(
    client: &IsamsClient,
    year_groups: RangeInclusive<i32>,
    loader: &L,
) -> Result<RunOutcome>
where
    L: Loader<Item = crate::etl::Record>,
{
    let mut latch = TruncateOnce::new();
    let mut rows = 0;
    let mut pages = 0;

    for id in year_groups {
        let path = divisions_path(id);
        let resource = client.endpoint(&path)?.to_string();

        let records = client.get_records(&path, DIVISIONS, None).await?;
        let records = into_records(records, &resource)?;
        let records = AddColumn::new("year_group_id", id).transform_many(records)?;
        log::debug!("Year group {}: {} division(s)", id, records.len());

        rows += loader
            .load(records, latch.mode())
            .await
            .wrap_err_with(|| format!("Failed to load divisions of year group {}", id))?;
        latch.record_write();
        pages += 1;
    }

    log::info!("{}", format!("Loaded {} division(s)", rows).cyan());
    let total = rows as u64;
    Ok(RunOutcome::Loaded {
        rows,
        pages,
        progress: Progress::new(total, total),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_group_ids() {
        let ids: Vec<_> = YEAR_GROUP_IDS.collect();
        assert_eq!(ids.len(), 17);
        assert_eq!(ids.first(), Some(&-2));
        assert_eq!(ids.last(), Some(&14));
    }

    #[test]
    fn test_divisions_path() {
        assert_eq!(divisions_path(-2), "/api/school/yeargroups/-2/divisions");
    }
}
