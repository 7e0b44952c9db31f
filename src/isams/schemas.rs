//! Warehouse schemas of the registry datasets

use crate::warehouse::FieldType::*;
use crate::warehouse::schema::{FieldMode, SchemaField, nullable, record, repeated, required};

/// `applicants`
pub const APPLICANTS: &[SchemaField] = &[
    nullable("admissionStatus", String),
    nullable("birthCounty", String),
    nullable("birthplace", String),
    nullable("boardingStatus", String),
    nullable("currentSchoolId", Integer),
    nullable("dateOfBirth", Datetime),
    nullable("enquiryDate", Datetime),
    nullable("enquiryReason", String),
    nullable("enquiryType", String),
    nullable("enrolmentAcademicHouseId", Integer),
    nullable("enrolmentBoardingHouseId", Integer),
    nullable("enrolmentDate", Datetime),
    nullable("enrolmentOfferType", String),
    nullable("enrolmentSchoolForm", String),
    nullable("enrolmentSchoolTerm", String),
    nullable("enrolmentSchoolYear", Integer),
    nullable("enrolmentSchoolYearGroup", Integer),
    nullable("ethnicity", String),
    nullable("familyId", Integer),
    nullable("forename", String),
    nullable("fullName", String),
    nullable("gender", String),
    nullable("initials", String),
    nullable("isReadmission", Boolean),
    nullable("isVisaRequired", Boolean),
    nullable("labelSalutation", String),
    repeated("languages", String),
    nullable("lastUpdated", Datetime),
    nullable("letterSalutation", String),
    nullable("middleNames", String),
    nullable("mobileNumber", String),
    repeated("nationalities", String),
    nullable("officialName", String),
    nullable("personGuid", String),
    nullable("personId", Integer),
    nullable("preferredName", String),
    nullable("registeredDate", Datetime),
    nullable("religion", String),
    nullable("residentCountry", String),
    nullable("schoolCode", String),
    nullable("schoolEmailAddress", String),
    nullable("schoolId", String),
    nullable("surname", String),
    nullable("systemStatus", String),
    nullable("title", String),
    nullable("uniquePupilNumber", String),
    nullable("withdrawnDate", Datetime),
    nullable("withdrawnReason", String),
    nullable("withdrawnReasonNote", String),
];

const HOME_ADDRESS: &[SchemaField] = &[
    nullable("id", Integer),
    nullable("address1", String),
    nullable("address2", String),
    nullable("address3", String),
    nullable("country", String),
    nullable("county", String),
    nullable("postcode", String),
    nullable("private", Boolean),
    nullable("town", String),
];

/// `students`; home addresses are a repeated record
pub const STUDENTS: &[SchemaField] = &[
    nullable("id", Integer),
    nullable("academicHouse", String),
    nullable("birthCounty", String),
    nullable("birthplace", String),
    nullable("boardingHouse", String),
    nullable("boardingStatus", String),
    nullable("dob", Date),
    nullable("enrolmentDate", Date),
    nullable("enrolmentStatus", String),
    nullable("enrolmentTerm", String),
    nullable("enrolmentYear", Integer),
    nullable("ethnicity", String),
    nullable("familyId", Integer),
    nullable("forename", String),
    nullable("formGroup", String),
    nullable("fullName", String),
    nullable("futureSchoolId", Integer),
    nullable("gender", String),
    record("homeAddresses", FieldMode::Repeated, HOME_ADDRESS),
    nullable("initials", String),
    nullable("isVisaRequired", Boolean),
    nullable("labelSalutation", String),
    repeated("languages", String),
    nullable("lastUpdated", Timestamp),
    nullable("latestPhotoId", Integer),
    nullable("leavingDate", Date),
    nullable("leavingReason", String),
    nullable("leavingYearGroup", Integer),
    nullable("letterSalutation", String),
    nullable("middlenames", String),
    nullable("mobileNumber", String),
    repeated("nationalities", String),
    nullable("officialName", String),
    nullable("personalEmailAddress", String),
    nullable("personGuid", String),
    nullable("personId", Integer),
    nullable("preferredName", String),
    nullable("previousName", String),
    nullable("religion", String),
    nullable("removalGrounds", String),
    nullable("residentCountry", String),
    nullable("schoolCode", String),
    nullable("schoolId", String),
    nullable("schoolEmailAddress", String),
    nullable("surname", String),
    nullable("systemStatus", String),
    nullable("title", String),
    nullable("tutorEmployeeId", Integer),
    nullable("uniquePupilNumber", String),
    nullable("yearGroup", Integer),
];

pub const ALUMNI: &[SchemaField] = &[
    nullable("admissionStatus", String),
    nullable("boardingStatus", String),
    nullable("enquiryDate", Date),
    nullable("enrolmentDate", Date),
    nullable("enrolmentYear", Integer),
    nullable("enrolmentYearGroup", Integer),
    nullable("forename", String),
    nullable("fullName", String),
    nullable("futureSchoolId", Integer),
    nullable("gender", String),
    nullable("initials", String),
    repeated("languages", String),
    nullable("lastUpdated", Datetime),
    nullable("leavingDate", Date),
    nullable("leavingReason", String),
    nullable("leavingTerm", String),
    nullable("leavingYear", Integer),
    nullable("leavingYearGroup", Integer),
    nullable("middlenames", String),
    repeated("nationalities", String),
    nullable("officialName", String),
    nullable("personGuid", String),
    nullable("personId", Integer),
    nullable("preferredName", String),
    nullable("registeredDate", Date),
    nullable("schoolCode", String),
    nullable("schoolId", String),
    nullable("surname", String),
    nullable("systemStatus", String),
    nullable("title", String),
    nullable("visitDate", Date),
    nullable("yearGroup", Integer),
];

pub const SCHOOL_TERMS: &[SchemaField] = &[
    nullable("id", Integer),
    nullable("finishDate", Datetime),
    nullable("name", String),
    nullable("schoolYear", Integer),
    nullable("startDate", Datetime),
];

/// `year_groups`; `code`, `name` and `ncYear` are always present
pub const YEAR_GROUPS: &[SchemaField] = &[
    nullable("assistantTutorId", Integer),
    nullable("averageStartingAge", Float),
    nullable("censusYearGroup", String),
    required("code", String),
    nullable("emailAddress", String),
    nullable("iscEnglandWalesYearGroup", String),
    nullable("iscIrelandYearGroup", String),
    nullable("iscScotlandYearGroup", String),
    nullable("lastUpdated", Timestamp),
    required("name", String),
    required("ncYear", Integer),
    nullable("reference", String),
    nullable("tutorId", Integer),
    nullable("websiteAddress", String),
];

pub const BILLING_CYCLES: &[SchemaField] = &[
    required("id", Integer),
    nullable("active", Boolean),
    nullable("earlyPaymentDate", Datetime),
    nullable("endDate", Datetime),
    nullable("name", String),
    nullable("schoolYear", Integer),
    nullable("startDate", Datetime),
];
