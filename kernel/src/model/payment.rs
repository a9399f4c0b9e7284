use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, AsRefStr, IntoStaticStr, EnumIter)]
pub enum PaymentType {
    #[strum(serialize = "$$")]
    Cash,
    #[strum(serialize = "AG")]
    Agency,
    #[strum(serialize = "CT")]
    ClientTrust,
    #[strum(serialize = "FM")]
    FreeMat,
    #[strum(serialize = "MM")]
    MatMoney,
    #[strum(serialize = "SW")]
    ShelterWorker,
    #[strum(serialize = "UK")]
    Unknown,
    #[strum(serialize = "WB")]
    WorkBed,
}

impl PaymentType {
    pub fn code(self) -> &'static str {
        self.into()
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Cash => "Cash Payment",
            Self::Agency => "Agency Voucher",
            Self::ClientTrust => "Client Trust Account",
            Self::FreeMat => "Free Mat",
            Self::MatMoney => "Mat Money",
            Self::ShelterWorker => "Shelter Worker",
            Self::Unknown => "Unknown Payment",
            Self::WorkBed => "Work Bed",
        }
    }

    /// Lenient lookup: missing or unrecognized codes count as `UK`.
    pub fn classify(code: Option<&str>) -> Self {
        code.and_then(|c| c.trim().parse().ok())
            .unwrap_or(Self::Unknown)
    }

    pub fn is_valid_code(code: &str) -> bool {
        code.parse::<Self>().is_ok()
    }

    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }
}
