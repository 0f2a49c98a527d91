use super::{Ideal, KeyedAttributeMetadata};

const fn keyed(
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

/// Sorted by id.
pub static SCSI_METADATA: &[KeyedAttributeMetadata] = &[
    keyed("read_correction_algorithm_invocations", "Read Correction Algorithm Invocations", Some(Ideal::Low), false, -1),
    keyed("read_errors_corrected_by_eccdelayed", "Read Errors Corrected by ECC Delayed", Some(Ideal::Low), false, -1),
    keyed("read_errors_corrected_by_eccfast", "Read Errors Corrected by ECC Fast", Some(Ideal::Low), false, -1),
    keyed("read_errors_corrected_by_rereads_rewrites", "Read Errors Corrected by ReReads/ReWrites", Some(Ideal::Low), false, -1),
    keyed("read_total_errors_corrected", "Read Total Errors Corrected", Some(Ideal::Low), false, -1),
    keyed("read_total_uncorrected_errors", "Read Total Uncorrected Errors", Some(Ideal::Low), true, 0),
    KeyedAttributeMetadata {
        id: "scsi_grown_defect_list",
        display_name: "Grown Defect List",
        ideal: Some(Ideal::Low),
        critical: true,
        description: "Number of defects the device has added to its grown defect list since manufacture.",
        default_threshold: 0,
    },
    keyed("write_correction_algorithm_invocations", "Write Correction Algorithm Invocations", Some(Ideal::Low), false, -1),
    keyed("write_errors_corrected_by_eccdelayed", "Write Errors Corrected by ECC Delayed", Some(Ideal::Low), false, -1),
    keyed("write_errors_corrected_by_eccfast", "Write Errors Corrected by ECC Fast", Some(Ideal::Low), false, -1),
    keyed("write_errors_corrected_by_rereads_rewrites", "Write Errors Corrected by ReReads/ReWrites", Some(Ideal::Low), false, -1),
    keyed("write_total_errors_corrected", "Write Total Errors Corrected", Some(Ideal::Low), false, -1),
    keyed("write_total_uncorrected_errors", "Write Total Uncorrected Errors", Some(Ideal::Low), true, 0),
];
