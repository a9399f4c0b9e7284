use chrono::{NaiveDate, NaiveTime};
use derive_new::new;
use rust_decimal::Decimal;

use crate::model::id::{CheckinId, FacilityId, GuestId};

#[derive(Debug)]
pub struct CreateCheckin {
    pub facility_id: FacilityId,
    pub checkin_date: NaiveDate,
    pub mat_number: i32,
    pub features: Option<String>,
    pub comments: Option<String>,
}

#[derive(Debug)]
pub struct UpdateCheckin {
    pub checkin_id: CheckinId,
    pub facility_id: FacilityId,
    pub checkin_date: NaiveDate,
    pub mat_number: i32,
    pub features: Option<String>,
    pub comments: Option<String>,
}

#[derive(Debug, new)]
pub struct DeleteCheckin {
    pub checkin_id: CheckinId,
    pub facility_id: FacilityId,
}

/// Assignment details carried from an edit form onto a mat.
#[derive(Debug, Clone)]
pub struct Assign {
    pub checkin_id: CheckinId,
    pub facility_id: FacilityId,
    pub guest_id: GuestId,
    pub payment_type: String,
    pub payment_amount: Option<Decimal>,
    pub shower_time: Option<NaiveTime>,
    pub wakeup_time: Option<NaiveTime>,
    pub comments: Option<String>,
}

#[derive(Debug, new)]
pub struct Deassign {
    pub checkin_id: CheckinId,
    pub facility_id: FacilityId,
}

#[derive(Debug, new)]
pub struct Reassign {
    pub facility_id: FacilityId,
    pub from_checkin_id: CheckinId,
    pub to_checkin_id: CheckinId,
}

#[derive(Debug, new)]
pub struct GenerateCheckins {
    pub facility_id: FacilityId,
    pub checkin_date: NaiveDate,
    pub mats: Vec<GeneratedMat>,
}

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct GeneratedMat {
    pub mat_number: i32,
    pub features: Option<String>,
}
