//! Record transforms applied between extraction and loading
//!
//! Each registry dataset maps to one [`ColumnTransform`] through
//! [`for_dataset`]; datetime parsing lives in [`datetime`].

mod columns;
pub mod datetime;

pub use columns::{AddColumn, ColumnTransform};
pub use datetime::TARGET_TZ;

use crate::isams::DatasetId;

/// The column transform registered for a dataset
pub fn for_dataset(id: DatasetId) -> ColumnTransform {
    match id {
        DatasetId::Applicants => ColumnTransform::datetimes(&[
            "dateOfBirth",
            "enquiryDate",
            "enrolmentDate",
            "lastUpdated",
            "registeredDate",
            "withdrawnDate",
        ]),
        DatasetId::Students => {
            ColumnTransform::datetimes(&["dob", "enrolmentDate", "lastUpdated", "leavingDate"])
        }
        DatasetId::Alumni => ColumnTransform::datetimes(&["lastUpdated"]),
        DatasetId::SchoolTerms => ColumnTransform::datetimes(&["finishDate", "startDate"]),
        DatasetId::YearGroups => ColumnTransform::datetimes(&["lastUpdated"]),
        DatasetId::BillingCycles => {
            ColumnTransform::datetimes(&["earlyPaymentDate", "startDate"]).with_nulled(&["endDate"])
        }
    }
}
