//! Extractor over one registry dataset endpoint

use super::{DatasetDescriptor, PageMode};
use crate::client::{IsamsClient, take_records};
use crate::error::Error;
use crate::etl::{Extractor, PageRequest, Pagination, Record, Totals};
use eyre::Result;
use serde_json::Value;

/// Reads the records of one dataset from the iSAMS API
pub struct EndpointExtractor<'a> {
    client: &'a IsamsClient,
    dataset: &'static DatasetDescriptor,
    page_size: u32,
}

impl<'a> EndpointExtractor<'a> {
    pub fn new(client: &'a IsamsClient, dataset: &'static DatasetDescriptor, page_size: u32) -> Self {
        Self {
            client,
            dataset,
            page_size,
        }
    }

    fn resource(&self) -> String {
        self.client
            .endpoint(self.dataset.path)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| self.dataset.path.to_string())
    }
}

impl Extractor for EndpointExtractor<'_> {
    type Item = Record;

    fn pagination(&self) -> Pagination {
        match self.dataset.pages {
            PageMode::Single => Pagination::Single,
            PageMode::Multi => Pagination::Multi {
                page_size: self.page_size,
            },
        }
    }

    async fn probe(&self) -> Result<Totals> {
        let body = self
            .client
            .get_json(self.dataset.path, Some(PageRequest::new(1, 1)))
            .await?;
        let totals = read_totals(&body);
        // only a denial fails the probe; other bodies fall back to their totals
        if body.get(self.dataset.object).is_none()
            && let Err(e @ Error::PermissionDenied { .. }) =
                take_records(body, self.dataset.object, &self.resource())
        {
            return Err(e.into());
        }
        log::debug!(
            "{}: totalCount = {}, totalPages = {}",
            self.dataset.id,
            totals.total_count,
            totals.total_pages
        );
        Ok(totals)
    }

    async fn extract(&self, page: Option<PageRequest>) -> Result<Vec<Record>> {
        let records = self
            .client
            .get_records(self.dataset.path, self.dataset.object, page)
            .await?;
        Ok(into_records(records, &self.resource())?)
    }
}

/// `totalCount` and `totalPages` of a probe response, 0 when absent
pub fn read_totals(body: &Value) -> Totals {
    let count = |key: &str| body.get(key).and_then(Value::as_u64).unwrap_or(0);
    Totals::new(count("totalCount"), count("totalPages"))
}

/// Turn the response list into records; every element must be an object
pub fn into_records(values: Vec<Value>, resource: &str) -> crate::error::Result<Vec<Record>> {
    values
        .into_iter()
        .enumerate()
        .map(|(i, value)| match value {
            Value::Object(map) => Ok(map),
            _ => Err(Error::invalid_response(
                resource,
                format!("item {i} is not an object"),
            )),
        })
        .collect()
}
