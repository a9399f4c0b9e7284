//! Per-date tallies of check-ins.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::model::{checkin::Checkin, id::FacilityId, payment::PaymentType};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub facility_id: Option<FacilityId>,
    pub checkin_date: Option<NaiveDate>,
    pub total_cash: i64,
    pub total_agency: i64,
    pub total_client_trust: i64,
    pub total_free_mat: i64,
    pub total_mat_money: i64,
    pub total_shelter_worker: i64,
    pub total_unknown: i64,
    pub total_work_bed: i64,
    pub total_amount: Decimal,
    pub total_assigned: i64,
    pub total_unassigned: i64,
    pub total_mats: i64,
}

impl Summary {
    pub fn new(facility_id: FacilityId, checkin_date: NaiveDate) -> Self {
        Self {
            facility_id: Some(facility_id),
            checkin_date: Some(checkin_date),
            ..Default::default()
        }
    }

    pub fn include_checkin(&mut self, checkin: &Checkin) {
        self.total_mats += 1;
        if !checkin.is_assigned() {
            self.total_unassigned += 1;
            return;
        }
        self.total_assigned += 1;
        *self.bucket_mut(PaymentType::classify(checkin.payment_type.as_deref())) += 1;
        if let Some(amount) = checkin.payment_amount {
            self.total_amount += amount;
        }
    }

    pub fn include_summary(&mut self, other: &Summary) {
        for payment_type in PaymentType::all() {
            *self.bucket_mut(payment_type) += other.count(payment_type);
        }
        self.total_amount += other.total_amount;
        self.total_assigned += other.total_assigned;
        self.total_unassigned += other.total_unassigned;
        self.total_mats += other.total_mats;
    }

    pub fn count(&self, payment_type: PaymentType) -> i64 {
        match payment_type {
            PaymentType::Cash => self.total_cash,
            PaymentType::Agency => self.total_agency,
            PaymentType::ClientTrust => self.total_client_trust,
            PaymentType::FreeMat => self.total_free_mat,
            PaymentType::MatMoney => self.total_mat_money,
            PaymentType::ShelterWorker => self.total_shelter_worker,
            PaymentType::Unknown => self.total_unknown,
            PaymentType::WorkBed => self.total_work_bed,
        }
    }

    fn bucket_mut(&mut self, payment_type: PaymentType) -> &mut i64 {
        match payment_type {
            PaymentType::Cash => &mut self.total_cash,
            PaymentType::Agency => &mut self.total_agency,
            PaymentType::ClientTrust => &mut self.total_client_trust,
            PaymentType::FreeMat => &mut self.total_free_mat,
            PaymentType::MatMoney => &mut self.total_mat_money,
            PaymentType::ShelterWorker => &mut self.total_shelter_worker,
            PaymentType::Unknown => &mut self.total_unknown,
            PaymentType::WorkBed => &mut self.total_work_bed,
        }
    }

    /// `count` as a share of all mats, e.g. `"66.7%"`.
    pub fn percent(&self, count: i64) -> String {
        if self.total_mats == 0 {
            return "0.0%".into();
        }
        format!("{:.1}%", count as f64 * 100.0 / self.total_mats as f64)
    }

    pub fn percent_of(&self, payment_type: PaymentType) -> String {
        self.percent(self.count(payment_type))
    }

    pub fn percent_assigned(&self) -> String {
        self.percent(self.total_assigned)
    }

    pub fn percent_unassigned(&self) -> String {
        self.percent(self.total_unassigned)
    }

    pub fn formatted_amount(&self) -> String {
        format!("{:.2}", self.total_amount.round_dp(2))
    }
}

/// Groups check-ins by date into one summary per date, ascending.
pub fn summarize_by_date(facility_id: FacilityId, checkins: &[Checkin]) -> Vec<Summary> {
    let mut by_date: std::collections::BTreeMap<NaiveDate, Summary> = Default::default();
    for checkin in checkins {
        by_date
            .entry(checkin.checkin_date)
            .or_insert_with(|| Summary::new(facility_id, checkin.checkin_date))
            .include_checkin(checkin);
    }
    by_date.into_values().collect()
}
