use chrono::{NaiveDate, NaiveTime};
use derive_new::new;
use garde::Validate;
use kernel::model::{
    checkin::{
        event::{Assign, CreateCheckin, UpdateCheckin},
        Checkin, CheckinGuest,
    },
    id::{CheckinId, FacilityId, GuestId},
    payment::PaymentType,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::time::hh_mm_option;

fn payment_code(value: &String, _: &()) -> garde::Result {
    if PaymentType::is_valid_code(value) {
        Ok(())
    } else {
        Err(garde::Error::new(format!("'{value}' is not a payment type")))
    }
}

// NUMERIC(7,2) に収まる金額のみ受け付ける
fn amount_in_range(value: &Option<Decimal>, _: &()) -> garde::Result {
    match value {
        Some(amount) if amount.is_sign_negative() || *amount > Decimal::new(9_999_999, 2) => Err(
            garde::Error::new(format!("{amount} is not between 0.00 and 99999.99")),
        ),
        Some(amount) if amount.normalize().scale() > 2 => Err(
            garde::Error::new(format!("{amount} has more than two decimal places")),
        ),
        _ => Ok(()),
    }
}

#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckinListQuery {
    #[garde(skip)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckinRequest {
    #[garde(skip)]
    pub checkin_date: NaiveDate,
    #[garde(range(min = 1))]
    pub mat_number: i32,
    #[garde(pattern(r"^[HSW]{0,3}$"))]
    pub features: Option<String>,
    #[garde(skip)]
    pub comments: Option<String>,
}

#[derive(new)]
pub struct CreateCheckinRequestWithId(FacilityId, CheckinRequest);

impl From<CreateCheckinRequestWithId> for CreateCheckin {
    fn from(value: CreateCheckinRequestWithId) -> Self {
        let CreateCheckinRequestWithId(
            facility_id,
            CheckinRequest {
                checkin_date,
                mat_number,
                features,
                comments,
            },
        ) = value;
        CreateCheckin {
            facility_id,
            checkin_date,
            mat_number,
            features: features.filter(|f| !f.is_empty()),
            comments,
        }
    }
}

#[derive(new)]
pub struct UpdateCheckinRequestWithIds(FacilityId, CheckinId, CheckinRequest);

impl From<UpdateCheckinRequestWithIds> for UpdateCheckin {
    fn from(value: UpdateCheckinRequestWithIds) -> Self {
        let UpdateCheckinRequestWithIds(
            facility_id,
            checkin_id,
            CheckinRequest {
                checkin_date,
                mat_number,
                features,
                comments,
            },
        ) = value;
        UpdateCheckin {
            checkin_id,
            facility_id,
            checkin_date,
            mat_number,
            features: features.filter(|f| !f.is_empty()),
            comments,
        }
    }
}

/// Assignment details posted from the check-in edit form.
#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    #[garde(skip)]
    pub guest_id: GuestId,
    #[garde(custom(payment_code))]
    pub payment_type: String,
    #[garde(custom(amount_in_range))]
    pub payment_amount: Option<Decimal>,
    #[serde(default, with = "hh_mm_option")]
    #[garde(skip)]
    pub shower_time: Option<NaiveTime>,
    #[serde(default, with = "hh_mm_option")]
    #[garde(skip)]
    pub wakeup_time: Option<NaiveTime>,
    #[garde(skip)]
    pub comments: Option<String>,
}

#[derive(new)]
pub struct AssignRequestWithIds(FacilityId, CheckinId, AssignRequest);

impl From<AssignRequestWithIds> for Assign {
    fn from(value: AssignRequestWithIds) -> Self {
        let AssignRequestWithIds(
            facility_id,
            checkin_id,
            AssignRequest {
                guest_id,
                payment_type,
                payment_amount,
                shower_time,
                wakeup_time,
                comments,
            },
        ) = value;
        Assign {
            checkin_id,
            facility_id,
            guest_id,
            payment_type,
            payment_amount,
            shower_time,
            wakeup_time,
            comments,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinsResponse {
    pub items: Vec<CheckinResponse>,
}

impl From<Vec<Checkin>> for CheckinsResponse {
    fn from(value: Vec<Checkin>) -> Self {
        Self {
            items: value.into_iter().map(CheckinResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinResponse {
    pub id: CheckinId,
    pub facility_id: FacilityId,
    pub checkin_date: NaiveDate,
    pub mat_number: i32,
    pub features: Option<String>,
    pub guest_id: Option<GuestId>,
    pub payment_type: Option<String>,
    pub payment_amount: Option<Decimal>,
    #[serde(default, with = "hh_mm_option")]
    pub shower_time: Option<NaiveTime>,
    #[serde(default, with = "hh_mm_option")]
    pub wakeup_time: Option<NaiveTime>,
    pub comments: Option<String>,
    pub guest: Option<CheckinGuestResponse>,
}

impl From<Checkin> for CheckinResponse {
    fn from(value: Checkin) -> Self {
        let Checkin {
            id,
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
        } = value;
        Self {
            id,
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
            guest: guest.map(CheckinGuestResponse::from),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckinGuestResponse {
    pub id: GuestId,
    pub first_name: String,
    pub last_name: String,
}

impl From<CheckinGuest> for CheckinGuestResponse {
    fn from(value: CheckinGuest) -> Self {
        let CheckinGuest {
            guest_id,
            first_name,
            last_name,
        } = value;
        Self {
            id: guest_id,
            first_name,
            last_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_request_parses_times_and_validates_payment() {
        let guest_id = GuestId::new();
        let json = format!(
            r#"{{"guestId":"{guest_id}","paymentType":"$$","paymentAmount":5.0,"showerTime":"04:30","wakeupTime":"05:00"}}"#
        );
        let req: AssignRequest = serde_json::from_str(&json).unwrap();
        assert!(req.validate(&()).is_ok());
        assert_eq!(req.shower_time, NaiveTime::from_hms_opt(4, 30, 0));

        let checkin_id = CheckinId::new();
        let assign = Assign::from(AssignRequestWithIds::new(FacilityId::new(), checkin_id, req));
        assert_eq!(assign.guest_id, guest_id);
        assert_eq!(assign.checkin_id, checkin_id);
        assert_eq!(assign.payment_amount, Some(Decimal::new(500, 2)));
    }

    #[test]
    fn assign_request_bounds_payment_amount() {
        let guest_id = GuestId::new();
        for (amount, ok) in [("0.1", true), ("99999.99", true), ("-1", false), ("100000", false), ("1.005", false)] {
            let json = format!(
                r#"{{"guestId":"{guest_id}","paymentType":"$$","paymentAmount":{amount}}}"#
            );
            let req: AssignRequest = serde_json::from_str(&json).unwrap();
            assert_eq!(req.validate(&()).is_ok(), ok, "amount {amount}");
        }
    }

    #[test]
    fn assign_request_rejects_unknown_payment_type() {
        let json = format!(r#"{{"guestId":"{}","paymentType":"ZZ"}}"#, GuestId::new());
        let req: AssignRequest = serde_json::from_str(&json).unwrap();
        assert!(req.validate(&()).is_err());
    }

    #[test]
    fn checkin_request_checks_mat_and_features() {
        let req: CheckinRequest =
            serde_json::from_str(r#"{"checkinDate":"2024-03-01","matNumber":0}"#).unwrap();
        assert!(req.validate(&()).is_err());
        let req: CheckinRequest = serde_json::from_str(
            r#"{"checkinDate":"2024-03-01","matNumber":3,"features":"HX"}"#,
        )
        .unwrap();
        assert!(req.validate(&()).is_err());
        let req: CheckinRequest = serde_json::from_str(
            r#"{"checkinDate":"2024-03-01","matNumber":3,"features":""}"#,
        )
        .unwrap();
        assert!(req.validate(&()).is_ok());
        let event = CreateCheckin::from(CreateCheckinRequestWithId::new(FacilityId::new(), req));
        assert_eq!(event.features, None);
    }

    #[test]
    fn unassigned_checkin_serializes_nulls() {
        let checkin = Checkin {
            id: CheckinId::new(),
            facility_id: FacilityId::new(),
            checkin_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            mat_number: 4,
            features: Some("S".into()),
            guest_id: None,
            payment_type: None,
            payment_amount: None,
            shower_time: None,
            wakeup_time: NaiveTime::from_hms_opt(6, 0, 0),
            comments: None,
            guest: None,
        };
        let json = serde_json::to_value(CheckinResponse::from(checkin)).unwrap();
        assert!(json["guestId"].is_null());
        assert_eq!(json["checkinDate"], "2024-03-01");
        assert_eq!(json["wakeupTime"], "06:00");
    }
}
