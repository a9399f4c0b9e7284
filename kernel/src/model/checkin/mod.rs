use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;

use crate::model::id::{CheckinId, FacilityId, GuestId};

pub mod event;

#[derive(Debug, Clone, PartialEq)]
pub struct Checkin {
    pub id: CheckinId,
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
    pub guest: Option<CheckinGuest>,
}

impl Checkin {
    pub fn is_assigned(&self) -> bool {
        self.guest_id.is_some()
    }
}

// 割り当て済みマットの表示用にゲスト名を同梱する
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckinGuest {
    pub guest_id: GuestId,
    pub first_name: String,
    pub last_name: String,
}
