//! Degree-family classification. The only place that inspects degree id tokens.

/// Reference degree holding the Engineering extended-credit pools.
pub const ENGINEERING_ECP_DEGREE_ID: &str = "ENGR_ECP";

/// Reference degree holding the Computer Science extended-credit pools.
pub const COMPUTER_SCIENCE_ECP_DEGREE_ID: &str = "COMP_ECP";

/// Stored pool holding the co-op work-term courses.
pub const COOP_POOL_ID: &str = "COOP_Co-op Work Terms";

pub const EXEMPTIONS_POOL_ID: &str = "exemptions";
pub const DEFICIENCIES_POOL_ID: &str = "deficiencies";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramFamily {
    Engineering,
    ComputerScience,
    Other,
}

impl ProgramFamily {
    /// Substring match on the degree id ("BEng_SOFTWARE", "BCompSc_CS").
    pub fn classify(degree_id: &str) -> Self {
        if degree_id.contains("BEng") {
            Self::Engineering
        } else if degree_id.contains("BCompSc") {
            Self::ComputerScience
        } else {
            Self::Other
        }
    }

    /// Reference degree whose pools make up this family's extended-credit program.
    pub fn ecp_degree_id(self) -> Option<&'static str> {
        match self {
            Self::Engineering => Some(ENGINEERING_ECP_DEGREE_ID),
            Self::ComputerScience => Some(COMPUTER_SCIENCE_ECP_DEGREE_ID),
            Self::Other => None,
        }
    }

    /// Longest co-op sequence before a warning is raised.
    pub fn max_coop_terms(self) -> usize {
        match self {
            Self::Engineering => 12,
            _ => 8,
        }
    }
}

/// ECP pseudo-degrees are catalog entries but never offered as programs.
pub fn is_ecp_degree(degree_id: &str) -> bool {
    degree_id == ENGINEERING_ECP_DEGREE_ID || degree_id == COMPUTER_SCIENCE_ECP_DEGREE_ID
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(ProgramFamily::classify("BEng_SOFTWARE"), ProgramFamily::Engineering);
        assert_eq!(ProgramFamily::classify("BCompSc_CS"), ProgramFamily::ComputerScience);
        assert_eq!(ProgramFamily::classify("BA_ECON"), ProgramFamily::Other);
        assert_eq!(ProgramFamily::Engineering.ecp_degree_id(), Some("ENGR_ECP"));
        assert_eq!(ProgramFamily::Other.ecp_degree_id(), None);
        assert_eq!(ProgramFamily::classify("BEng_X").max_coop_terms(), 12);
        assert_eq!(ProgramFamily::classify("BCompSc_X").max_coop_terms(), 8);
    }
}
