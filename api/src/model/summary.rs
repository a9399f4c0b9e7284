use chrono::NaiveDate;
use kernel::model::{id::FacilityId, payment::PaymentType, summary::Summary};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummariesResponse {
    pub items: Vec<SummaryResponse>,
}

impl From<Vec<Summary>> for SummariesResponse {
    fn from(value: Vec<Summary>) -> Self {
        Self {
            items: value.iter().map(SummaryResponse::from).collect(),
        }
    }
}

/// Wire form of a summary: raw tallies plus display percentages.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub facility_id: Option<FacilityId>,
    pub checkin_date: Option<NaiveDate>,
    #[serde(rename = "total$$")]
    pub total_cash: i64,
    #[serde(rename = "totalAG")]
    pub total_ag: i64,
    #[serde(rename = "totalCT")]
    pub total_ct: i64,
    #[serde(rename = "totalFM")]
    pub total_fm: i64,
    #[serde(rename = "totalMM")]
    pub total_mm: i64,
    #[serde(rename = "totalSW")]
    pub total_sw: i64,
    #[serde(rename = "totalUK")]
    pub total_uk: i64,
    #[serde(rename = "totalWB")]
    pub total_wb: i64,
    pub total_amount: Decimal,
    pub total_assigned: i64,
    pub total_unassigned: i64,
    pub total_mats: i64,
    #[serde(rename = "percent$$")]
    pub percent_cash: String,
    #[serde(rename = "percentAG")]
    pub percent_ag: String,
    #[serde(rename = "percentCT")]
    pub percent_ct: String,
    #[serde(rename = "percentFM")]
    pub percent_fm: String,
    #[serde(rename = "percentMM")]
    pub percent_mm: String,
    #[serde(rename = "percentSW")]
    pub percent_sw: String,
    #[serde(rename = "percentUK")]
    pub percent_uk: String,
    #[serde(rename = "percentWB")]
    pub percent_wb: String,
    pub percent_assigned: String,
    pub percent_unassigned: String,
    pub display_amount: String,
}

impl From<&Summary> for SummaryResponse {
    fn from(value: &Summary) -> Self {
        Self {
            facility_id: value.facility_id,
            checkin_date: value.checkin_date,
            total_cash: value.total_cash,
            total_ag: value.total_agency,
            total_ct: value.total_client_trust,
            total_fm: value.total_free_mat,
            total_mm: value.total_mat_money,
            total_sw: value.total_shelter_worker,
            total_uk: value.total_unknown,
            total_wb: value.total_work_bed,
            total_amount: value.total_amount,
            total_assigned: value.total_assigned,
            total_unassigned: value.total_unassigned,
            total_mats: value.total_mats,
            percent_cash: value.percent_of(PaymentType::Cash),
            percent_ag: value.percent_of(PaymentType::Agency),
            percent_ct: value.percent_of(PaymentType::ClientTrust),
            percent_fm: value.percent_of(PaymentType::FreeMat),
            percent_mm: value.percent_of(PaymentType::MatMoney),
            percent_sw: value.percent_of(PaymentType::ShelterWorker),
            percent_uk: value.percent_of(PaymentType::Unknown),
            percent_wb: value.percent_of(PaymentType::WorkBed),
            percent_assigned: value.percent_assigned(),
            percent_unassigned: value.percent_unassigned(),
            display_amount: value.formatted_amount(),
        }
    }
}

impl From<Summary> for SummaryResponse {
    fn from(value: Summary) -> Self {
        Self::from(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_use_payment_codes() {
        let summary = Summary {
            total_cash: 1,
            total_agency: 1,
            total_assigned: 2,
            total_unassigned: 1,
            total_mats: 3,
            ..Default::default()
        };
        let json = serde_json::to_value(SummaryResponse::from(&summary)).unwrap();
        assert_eq!(json["total$$"], 1);
        assert_eq!(json["totalAG"], 1);
        assert_eq!(json["totalAssigned"], 2);
        assert_eq!(json["totalUnassigned"], 1);
        assert_eq!(json["totalMats"], 3);
        assert_eq!(json["percentAssigned"], "66.7%");
        assert_eq!(json["percent$$"], "33.3%");
        assert_eq!(json["displayAmount"], "0.00");
    }
}
