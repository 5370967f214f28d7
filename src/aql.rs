//! AQL sampling lookup, General Inspection Level II.
//!
//! Major defects are judged at AQL 2.5, minor defects at AQL 4.0. Critical
//! defects carry AQL 0: any occurrence rejects the lot.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptReject {
    pub accept: i64,
    pub reject: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AqlStandard {
    pub min: i64,
    pub max: i64,
    pub sample_size: i64,
    pub major: AcceptReject,
    pub minor: AcceptReject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LotJudgement {
    Passed,
    Failed,
}

const fn ar(accept: i64, reject: i64) -> AcceptReject {
    AcceptReject { accept, reject }
}

const AQL_TABLE: &[AqlStandard] = &[
    AqlStandard { min: 2, max: 8, sample_size: 2, major: ar(0, 1), minor: ar(0, 1) },
    AqlStandard { min: 9, max: 15, sample_size: 3, major: ar(0, 1), minor: ar(0, 1) },
    AqlStandard { min: 16, max: 25, sample_size: 5, major: ar(0, 1), minor: ar(0, 1) },
    AqlStandard { min: 26, max: 50, sample_size: 8, major: ar(0, 1), minor: ar(1, 2) },
    AqlStandard { min: 51, max: 90, sample_size: 13, major: ar(1, 2), minor: ar(1, 2) },
    AqlStandard { min: 91, max: 150, sample_size: 20, major: ar(1, 2), minor: ar(2, 3) },
    AqlStandard { min: 151, max: 280, sample_size: 32, major: ar(2, 3), minor: ar(3, 4) },
    AqlStandard { min: 281, max: 500, sample_size: 50, major: ar(3, 4), minor: ar(5, 6) },
    AqlStandard { min: 501, max: 1200, sample_size: 80, major: ar(5, 6), minor: ar(7, 8) },
    AqlStandard { min: 1201, max: 3200, sample_size: 125, major: ar(7, 8), minor: ar(10, 11) },
    AqlStandard { min: 3201, max: 10000, sample_size: 200, major: ar(10, 11), minor: ar(14, 15) },
    AqlStandard { min: 10001, max: 35000, sample_size: 315, major: ar(14, 15), minor: ar(21, 22) },
];

/// Sampling row for the given lot size. Lots beyond the table clamp to the
/// last row.
pub fn standard_for(lot_size: i64) -> AqlStandard {
    AQL_TABLE
        .iter()
        .find(|row| lot_size >= row.min && lot_size <= row.max)
        .copied()
        .unwrap_or(AQL_TABLE[AQL_TABLE.len() - 1])
}

pub fn judge(lot_size: i64, critical: i64, major: i64, minor: i64) -> LotJudgement {
    let standard = standard_for(lot_size);

    if critical > 0 {
        return LotJudgement::Failed;
    }
    if major > standard.major.accept {
        return LotJudgement::Failed;
    }
    if minor > standard.minor.accept {
        return LotJudgement::Failed;
    }
    LotJudgement::Passed
}
