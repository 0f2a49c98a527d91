use super::{Ideal, KeyedAttributeMetadata};

const fn stat(
    id: &'static str,
    display_name: &'static str,
    ideal: Option<Ideal>,
    critical: bool,
    default_threshold: i64,
) -> KeyedAttributeMetadata {
    KeyedAttributeMetadata {
        id,
        display_name,
        ideal,
        critical,
        description: "",
        default_threshold,
    }
}

const LOW: Option<Ideal> = Some(Ideal::Low);

/// ATA device statistics (GP log 0x04), keyed `devstat_<page>_<offset>`.
/// Sorted lexicographically by id, so `devstat_1_8` follows `devstat_1_48`.
pub static DEVICE_STATISTIC_METADATA: &[KeyedAttributeMetadata] = &[
    stat("devstat_1_16", "Power-on Hours", None, false, -1),
    stat("devstat_1_24", "Logical Sectors Written", None, false, -1),
    stat("devstat_1_32", "Number of Write Commands", None, false, -1),
    stat("devstat_1_40", "Logical Sectors Read", None, false, -1),
    stat("devstat_1_48", "Number of Read Commands", None, false, -1),
    stat("devstat_1_8", "Lifetime Power-On Resets", None, false, -1),
    stat("devstat_3_16", "Head Flying Hours", None, false, -1),
    stat("devstat_3_24", "Head Load Events", None, false, -1),
    stat("devstat_3_32", "Number of Reallocated Logical Sectors", LOW, true, -1),
    stat("devstat_3_40", "Read Recovery Attempts", None, false, -1),
    stat("devstat_3_48", "Number of Mechanical Start Failures", LOW, true, 0),
    stat("devstat_3_56", "Number of Realloc. Candidate Logical Sectors", LOW, true, 0),
    stat("devstat_3_64", "Number of High Priority Unload Events", None, false, -1),
    stat("devstat_3_8", "Spindle Motor Power-on Hours", None, false, -1),
    stat("devstat_4_16", "Resets Between Cmd Acceptance and Completion", None, false, -1),
    stat("devstat_4_8", "Number of Reported Uncorrectable Errors", LOW, true, 0),
    stat("devstat_5_16", "Average Short Term Temperature", None, false, -1),
    stat("devstat_5_24", "Average Long Term Temperature", None, false, -1),
    stat("devstat_5_32", "Highest Temperature", None, false, -1),
    stat("devstat_5_40", "Lowest Temperature", None, false, -1),
    stat("devstat_5_48", "Highest Average Short Term Temperature", None, false, -1),
    stat("devstat_5_56", "Lowest Average Short Term Temperature", None, false, -1),
    stat("devstat_5_64", "Highest Average Long Term Temperature", None, false, -1),
    stat("devstat_5_72", "Lowest Average Long Term Temperature", None, false, -1),
    stat("devstat_5_8", "Current Temperature", None, false, -1),
    stat("devstat_6_16", "Number of Interface CRC Errors", LOW, false, -1),
    stat("devstat_6_24", "Number of R_ERR Response", LOW, false, -1),
    stat("devstat_6_8", "Number of Hardware Resets", None, false, -1),
    stat("devstat_7_8", "Percentage Used Endurance Indicator", LOW, true, 100),
];
