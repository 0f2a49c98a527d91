use super::{Ideal, KeyedAttributeMetadata};

const fn keyed(
    id: &'static str,
    display_name: &'static str,
    ideal: Option<Ideal>,
    critical: bool,
    default_threshold: i64,
    description: &'static str,
) -> KeyedAttributeMetadata {
    KeyedAttributeMetadata {
        id,
        display_name,
        ideal,
        critical,
        description,
        default_threshold,
    }
}

/// Sorted by id. `available_spare` is compared against the threshold the
/// device reports in the same log page.
pub static NVME_METADATA: &[KeyedAttributeMetadata] = &[
    keyed("available_spare", "Available Spare", Some(Ideal::High), true, -1,
        "Normalized percentage (0 to 100%) of the remaining spare capacity available."),
    keyed("available_spare_threshold", "Available Spare Threshold", None, false, -1,
        "When the Available Spare falls below this threshold, an asynchronous event completion may occur."),
    keyed("controller_busy_time", "Controller Busy Time", None, false, -1,
        "Amount of time the controller is busy with I/O commands, in minutes."),
    keyed("critical_comp_time", "Critical CompTime", Some(Ideal::Low), false, -1,
        "Minutes the controller has been above the critical composite temperature threshold."),
    keyed("critical_warning", "Critical Warning", Some(Ideal::Low), true, 0,
        "Bit field of critical warnings for the state of the controller. Any non-zero value is a failure."),
    keyed("data_units_read", "Data Units Read", None, false, -1,
        "Number of 512 byte data units the host has read from the controller, in thousands."),
    keyed("data_units_written", "Data Units Written", None, false, -1,
        "Number of 512 byte data units the host has written to the controller, in thousands."),
    keyed("host_reads", "Host Reads", None, false, -1,
        "Number of read commands completed by the controller."),
    keyed("host_writes", "Host Writes", None, false, -1,
        "Number of write commands completed by the controller."),
    keyed("media_errors", "Media Errors", Some(Ideal::Low), true, 0,
        "Number of occurrences where the controller detected an unrecovered data integrity error."),
    keyed("num_err_log_entries", "Numb Err Log Entries", Some(Ideal::Low), false, -1,
        "Number of error information log entries over the life of the controller."),
    keyed("percentage_used", "Percentage Used", Some(Ideal::Low), true, 100,
        "Vendor specific estimate of the percentage of device life used. Values above 100 are possible."),
    keyed("power_cycles", "Power Cycles", None, false, -1,
        "Number of power cycles."),
    keyed("power_on_hours", "Power on Hours", None, false, -1,
        "Number of power-on hours."),
    keyed("temperature", "Temperature", Some(Ideal::Low), false, -1,
        "Composite temperature of the controller in degrees Celsius."),
    keyed("unsafe_shutdowns", "Unsafe Shutdowns", None, false, -1,
        "Number of unsafe shutdowns, counted when a shutdown notification is not received before power loss."),
    keyed("warning_temp_time", "Warning Temp Time", Some(Ideal::Low), false, -1,
        "Minutes the controller has been above the warning composite temperature threshold."),
];
