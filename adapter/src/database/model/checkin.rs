use chrono::{NaiveDate, NaiveTime};
use kernel::model::{
    checkin::{Checkin, CheckinGuest},
    id::{CheckinId, FacilityId, GuestId},
};
use rust_decimal::Decimal;

// ゲスト未割り当てのマットでは guest_id と氏名が None になる
#[derive(sqlx::FromRow)]
pub struct CheckinRow {
    pub checkin_id: CheckinId,
    pub facility_id: FacilityId,
    pub checkin_date: NaiveDate,
    pub mat_number: i32,
    pub features: Option<String>,
    pub guest_id: Option<GuestId>,
    pub payment_type: Option<String>,
    pub payment_amount: Option<Decimal>,
    pub shower_time: Option<NaiveTime>,
    pub wakeup_time: Option<NaiveTime>,
    pub comments: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl From<CheckinRow> for Checkin {
    fn from(value: CheckinRow) -> Self {
        let CheckinRow {
            checkin_id,
            facility_id,
            checkin_date,
            mat_number,
            features,
            guest_id,
            payment_type,
            payment_amount,
            shower_time,
            wakeup_time,
            comments,
            first_name,
            last_name,
        } = value;
        let guest = match (guest_id, first_name, last_name) {
            (Some(guest_id), Some(first_name), Some(last_name)) => Some(CheckinGuest {
                guest_id,
                first_name,
                last_name,
            }),
            _ => None,
        };
        Checkin {
            id: checkin_id,
            facility_id,
            checkin_date,
            mat_number,
            features,
            guest_id,
            payment_type,
            payment_amount,
            shower_time,
            wakeup_time,
            comments,
            guest,
        }
    }
}
