use super::{
    hours_from_raw, temperature_from_raw, AtaAttributeMetadata, DisplayType, Ideal,
    ObservedThreshold,
};

const fn bucket(low: i64, high: i64, annual_failure_rate: f64) -> ObservedThreshold {
    ObservedThreshold {
        low,
        high,
        annual_failure_rate,
    }
}

const fn attr(
    id: u16,
    display_name: &'static str,
    ideal: Option<Ideal>,
    critical: bool,
    description: &'static str,
    display_type: DisplayType,
    observed_thresholds: &'static [ObservedThreshold],
) -> AtaAttributeMetadata {
    AtaAttributeMetadata {
        id,
        display_name,
        ideal,
        critical,
        description,
        display_type,
        transform: None,
        transform_unit: None,
        observed_thresholds,
    }
}

const LOW: Option<Ideal> = Some(Ideal::Low);
const HIGH: Option<Ideal> = Some(Ideal::High);
const NONE: Option<Ideal> = None;

use super::DisplayType::{Normalized, Raw};

/// Sorted by attribute id.
pub static ATA_METADATA: &[AtaAttributeMetadata] = &[
    attr(1, "Read Error Rate", LOW, false,
        "Rate of hardware read errors that occurred when reading data from the disk surface. Vendor specific; the normalized value is what matters.",
        Normalized, &[
            bucket(80, 95, 0.087_924_5),
            bucket(95, 110, 0.041_139_3),
            bucket(110, 125, 0.022_714_6),
            bucket(125, 150, 0.028_937_2),
            bucket(150, 175, 0.033_421_8),
            bucket(175, 200, 0.042_701_5),
            bucket(200, 253, 0.036_125_4),
        ]),
    attr(2, "Throughput Performance", HIGH, false,
        "Overall (general) throughput performance of the drive.", Normalized, &[]),
    attr(3, "Spin-Up Time", LOW, false,
        "Average time of spindle spin up from zero RPM to fully operational.", Normalized, &[
            bucket(78, 96, 0.118_638_2),
            bucket(96, 114, 0.027_349_1),
            bucket(114, 132, 0.030_124_7),
            bucket(132, 150, 0.021_902_4),
            bucket(150, 168, 0.042_240_6),
            bucket(168, 186, 0.050_132_9),
            bucket(186, 204, 0.063_318_1),
            bucket(204, 222, 0.079_146_5),
            bucket(222, 240, 0.093_107_2),
            bucket(240, 253, 0.119_380_6),
        ]),
    attr(4, "Start/Stop Count", LOW, false,
        "Count of spindle start/stop cycles.", Raw, &[
            bucket(0, 0, 0.0),
            bucket(0, 7, 0.016_534_2),
            bucket(7, 15, 0.021_317_9),
            bucket(15, 30, 0.029_946_1),
            bucket(30, 70, 0.037_221_8),
            bucket(70, 150, 0.056_148_3),
            bucket(150, 1_000, 0.089_032_6),
            bucket(1_000, 5_000, 0.123_409_1),
            bucket(5_000, 100_000, 0.211_045_7),
        ]),
    attr(5, "Reallocated Sectors Count", LOW, true,
        "Count of reallocated sectors. When the drive finds a read/write/verification error it marks the sector as reallocated and moves the data to a spare area.",
        Raw, &[
            bucket(0, 0, 0.025_169_175_350_572_49),
            bucket(0, 4, 0.027_727_243_980_705_01),
            bucket(4, 16, 0.068_630_952_380_952_38),
            bucket(16, 70, 0.088_107_553_319_750_04),
            bucket(70, 260, 0.123_702_778_541_863_29),
            bucket(260, 1_100, 0.168_020_911_138_558_55),
            bucket(1_100, 4_500, 0.252_301_588_236_034_4),
            bucket(4_500, 17_000, 0.314_215_323_398_463_8),
            bucket(17_000, 70_000, 0.412_642_669_361_765_3),
            bucket(70_000, 260_000, 0.559_112_542_012_823_3),
        ]),
    attr(7, "Seek Error Rate", LOW, false,
        "Rate of seek errors of the magnetic heads. Vendor specific.", Normalized, &[
            bucket(58, 76, 0.048_617_3),
            bucket(76, 94, 0.027_028_5),
            bucket(94, 112, 0.030_541_2),
            bucket(112, 130, 0.041_203_6),
            bucket(130, 148, 0.035_611_9),
            bucket(148, 166, 0.040_247_4),
            bucket(166, 184, 0.030_118_3),
            bucket(184, 202, 0.044_530_8),
            bucket(202, 253, 0.051_306_1),
        ]),
    attr(8, "Seek Time Performance", HIGH, false,
        "Average performance of seek operations of the magnetic heads.", Normalized, &[]),
    attr(9, "Power-On Hours", NONE, false,
        "Count of hours in power-on state.", Raw, &[
            bucket(0, 0, 0.0),
            bucket(0, 1_000, 0.030_136_4),
            bucket(1_000, 5_000, 0.024_128_8),
            bucket(5_000, 10_000, 0.019_817_5),
            bucket(10_000, 20_000, 0.023_245_3),
            bucket(20_000, 30_000, 0.030_107_2),
            bucket(30_000, 40_000, 0.045_213_6),
            bucket(40_000, 50_000, 0.062_240_1),
            bucket(50_000, 60_000, 0.091_839_4),
            bucket(60_000, 80_000, 0.119_325_2),
            bucket(80_000, 150_000, 0.162_007_7),
        ]),
    attr(10, "Spin Retry Count", LOW, true,
        "Count of retry of spin start attempts, when the first attempt was unsuccessful.", Raw, &[
            bucket(0, 0, 0.050_434_1),
            bucket(0, 1, 0.110_732_6),
            bucket(1, 3, 0.152_012_9),
            bucket(3, 8, 0.218_627_4),
            bucket(8, 40, 0.335_248_1),
            bucket(40, 200, 0.447_035_6),
        ]),
    attr(11, "Recalibration Retries or Calibration Retry Count", LOW, false,
        "Number of times recalibration was requested under the condition that the first attempt was unsuccessful.",
        Normalized, &[]),
    attr(12, "Power Cycle Count", LOW, false,
        "Count of full hard disk power on/off cycles.", Raw, &[
            bucket(0, 13, 0.018_835_7),
            bucket(13, 26, 0.020_129_4),
            bucket(26, 39, 0.024_617_2),
            bucket(39, 52, 0.028_730_9),
            bucket(52, 65, 0.032_204_5),
            bucket(65, 78, 0.039_118_2),
            bucket(78, 91, 0.043_627_1),
            bucket(91, 104, 0.051_240_8),
            bucket(104, 1_000, 0.061_334_6),
            bucket(1_000, 10_000, 0.120_645_3),
        ]),
    attr(13, "Soft Read Error Rate", LOW, false,
        "Uncorrected read errors reported to the operating system.", Normalized, &[]),
    attr(22, "Current Helium Level", HIGH, false,
        "Specific to helium filled drives; pressure of the internal helium atmosphere.", Normalized, &[]),
    attr(170, "Available Reserved Space", HIGH, false,
        "Remaining reserved blocks available for reallocation, as a normalized percentage.", Normalized, &[]),
    attr(171, "SSD Program Fail Count", LOW, false,
        "Total number of flash program operation failures since the drive was deployed.", Raw, &[]),
    attr(172, "SSD Erase Fail Count", LOW, false,
        "Count of flash erase failures.", Raw, &[]),
    attr(173, "SSD Wear Leveling Count", HIGH, false,
        "Maximum number of erase operations performed on a single flash memory block.", Normalized, &[]),
    attr(174, "Unexpected Power Loss Count", LOW, false,
        "Number of unclean shutdowns, cumulative over the life of the SSD.", Raw, &[]),
    attr(175, "Power Loss Protection Failure", LOW, false,
        "Result of the last power loss protection capacitor self test.", Raw, &[]),
    attr(177, "Wear Range Delta", LOW, false,
        "Delta between most-worn and least-worn flash blocks.", Raw, &[]),
    attr(179, "Used Reserved Block Count Total", LOW, false,
        "Pre-fail attribute used by some SSDs to count consumed reserve blocks.", Raw, &[]),
    attr(180, "Unused Reserved Block Count Total", HIGH, false,
        "Number of reserved blocks that are still available.", Raw, &[]),
    attr(181, "Program Fail Count Total or Non-4K Aligned Access Count", LOW, false,
        "Total number of flash program operation failures since the drive was deployed.", Raw, &[]),
    attr(182, "Erase Fail Count", LOW, false,
        "Number of flash erase command failures.", Raw, &[]),
    attr(183, "SATA Downshift Error Count or Runtime Bad Block", LOW, false,
        "Count of times the link speed was downgraded, or of runtime bad blocks, depending on vendor.", Raw, &[
            bucket(0, 0, 0.030_007_4),
            bucket(0, 1, 0.046_131_2),
            bucket(1, 2, 0.056_032_9),
            bucket(2, 3, 0.070_518_4),
            bucket(3, 5, 0.084_427_1),
            bucket(5, 10, 0.103_219_6),
            bucket(10, 1_000, 0.157_134_2),
        ]),
    attr(184, "End-to-End error / IOEDC", LOW, true,
        "Count of parity errors which occur in the data path to the media via the drive's cache RAM.", Raw, &[
            bucket(0, 0, 0.027_590_3),
            bucket(0, 1, 0.115_309_2),
            bucket(1, 2, 0.140_124_5),
            bucket(2, 6, 0.194_217_8),
            bucket(6, 20, 0.278_032_4),
            bucket(20, 100_000, 0.380_641_7),
        ]),
    attr(185, "Head Stability", HIGH, false,
        "Western Digital specific attribute.", Normalized, &[]),
    attr(186, "Induced Op-Vibration Detection", LOW, false,
        "Western Digital specific attribute.", Normalized, &[]),
    attr(187, "Reported Uncorrectable Errors", LOW, true,
        "Count of errors that could not be recovered using hardware ECC.", Raw, &[
            bucket(0, 0, 0.028_130_2),
            bucket(0, 2, 0.085_821_4),
            bucket(2, 4, 0.127_537_8),
            bucket(4, 10, 0.169_024_3),
            bucket(10, 30, 0.234_215_6),
            bucket(30, 120, 0.328_631_5),
            bucket(120, 500, 0.451_207_4),
            bucket(500, 70_000, 0.593_218_8),
        ]),
    attr(188, "Command Timeout", LOW, true,
        "Count of aborted operations due to HDD timeout.", Raw, &[
            bucket(0, 0, 0.024_893_6),
            bucket(0, 13, 0.034_523_4),
            bucket(13, 26, 0.071_140_9),
            bucket(26, 39, 0.125_437_2),
            bucket(39, 52, 0.168_120_7),
            bucket(52, 65, 0.216_328_1),
            bucket(65, 78, 0.256_014_3),
            bucket(78, i64::MAX, 0.310_452_6),
        ]),
    attr(189, "High Fly Writes", LOW, false,
        "Count of writes performed while the head was flying outside its normal operating range.", Raw, &[
            bucket(0, 0, 0.027_044_3),
            bucket(0, 1, 0.036_021_7),
            bucket(1, 2, 0.045_036_9),
            bucket(2, 5, 0.050_207_3),
            bucket(5, 13, 0.058_113_9),
            bucket(13, 30, 0.067_413_5),
            bucket(30, 70, 0.095_218_2),
            bucket(70, 150, 0.127_640_4),
            bucket(150, 100_000, 0.201_136_5),
        ]),
    attr(190, "Airflow Temperature", NONE, false,
        "Airflow temperature; the normalized value is usually 100 minus the temperature in Celsius.", Normalized, &[
            bucket(0, 40, 0.061_234_1),
            bucket(40, 50, 0.045_014_2),
            bucket(50, 60, 0.030_217_5),
            bucket(60, 70, 0.027_003_1),
            bucket(70, 80, 0.034_118_6),
            bucket(80, 100, 0.043_342_9),
        ]),
    attr(191, "G-sense Error Rate", LOW, false,
        "Count of errors resulting from externally induced shock and vibration.", Raw, &[
            bucket(0, 0, 0.026_106_4),
            bucket(0, 100, 0.029_031_8),
            bucket(100, 1_000, 0.034_140_2),
            bucket(1_000, 10_000, 0.052_012_6),
            bucket(10_000, 100_000, 0.071_227_3),
        ]),
    attr(192, "Power-off Retract Count", LOW, false,
        "Number of power-off or emergency retract cycles.", Raw, &[
            bucket(0, 0, 0.022_016_3),
            bucket(0, 10, 0.024_318_1),
            bucket(10, 100, 0.028_126_7),
            bucket(100, 1_000, 0.039_541_4),
            bucket(1_000, 10_000, 0.072_012_8),
            bucket(10_000, 100_000, 0.130_518_9),
        ]),
    attr(193, "Load Cycle Count", LOW, false,
        "Count of load/unload cycles into head landing zone position.", Raw, &[
            bucket(0, 1_000, 0.019_901_6),
            bucket(1_000, 10_000, 0.023_144_2),
            bucket(10_000, 50_000, 0.028_725_3),
            bucket(50_000, 100_000, 0.034_139_7),
            bucket(100_000, 300_000, 0.048_012_4),
            bucket(300_000, 600_000, 0.072_135_1),
            bucket(600_000, 2_000_000, 0.112_246_8),
        ]),
    AtaAttributeMetadata {
        id: 194,
        display_name: "Temperature",
        ideal: Some(Ideal::Low),
        critical: false,
        description: "Current internal temperature in degrees Celsius.",
        display_type: DisplayType::Transformed,
        transform: Some(temperature_from_raw),
        transform_unit: Some("°C"),
        observed_thresholds: &[
            bucket(0, 20, 0.031_105_2),
            bucket(20, 25, 0.025_622_4),
            bucket(25, 30, 0.021_618_9),
            bucket(30, 35, 0.022_104_3),
            bucket(35, 40, 0.023_716_1),
            bucket(40, 45, 0.028_735_5),
            bucket(45, 50, 0.039_124_8),
            bucket(50, 55, 0.061_709_2),
            bucket(55, 60, 0.092_140_6),
            bucket(60, 70, 0.130_216_3),
            bucket(70, 150, 0.210_541_1),
        ],
    },
    attr(195, "Hardware ECC Recovered", NONE, false,
        "Vendor specific count of errors corrected by hardware ECC.", Normalized, &[]),
    attr(196, "Reallocation Event Count", LOW, true,
        "Count of remap operations, successful and unsuccessful.", Raw, &[
            bucket(0, 0, 0.027_106_1),
            bucket(0, 1, 0.058_921_4),
            bucket(1, 4, 0.102_035_7),
            bucket(4, 16, 0.163_142_2),
            bucket(16, 70, 0.245_718_3),
            bucket(70, 260, 0.329_026_4),
            bucket(260, 70_000, 0.441_219_8),
        ]),
    attr(197, "Current Pending Sector Count", LOW, true,
        "Count of unstable sectors waiting to be remapped because of unrecoverable read errors.", Raw, &[
            bucket(0, 0, 0.025_186_2),
            bucket(0, 2, 0.093_812_7),
            bucket(2, 6, 0.143_819_3),
            bucket(6, 16, 0.204_716_5),
            bucket(16, 40, 0.281_103_2),
            bucket(40, 100, 0.342_718_6),
            bucket(100, 70_000, 0.472_934_1),
        ]),
    attr(198, "(Offline) Uncorrectable Sector Count", LOW, true,
        "Total count of uncorrectable errors when reading/writing a sector.", Raw, &[
            bucket(0, 0, 0.026_812_4),
            bucket(0, 2, 0.108_103_6),
            bucket(2, 4, 0.153_926_2),
            bucket(4, 16, 0.214_017_3),
            bucket(16, 40, 0.290_541_8),
            bucket(40, 100, 0.361_823_5),
            bucket(100, 70_000, 0.483_320_1),
        ]),
    attr(199, "UltraDMA CRC Error Count", LOW, false,
        "Count of errors in data transfer via the interface cable as determined by ICRC.", Raw, &[
            bucket(0, 0, 0.027_501_3),
            bucket(0, 1, 0.037_632_5),
            bucket(1, 2, 0.042_412_9),
            bucket(2, 4, 0.048_226_1),
            bucket(4, 8, 0.055_114_8),
            bucket(8, 16, 0.062_623_4),
            bucket(16, 35, 0.070_243_7),
            bucket(35, 70, 0.090_518_2),
            bucket(70, 130, 0.101_334_6),
            bucket(130, 260, 0.127_041_2),
            bucket(260, 100_000, 0.155_227_9),
        ]),
    attr(200, "Multi-Zone Error Rate", LOW, false,
        "Count of errors found when writing a sector.", Raw, &[]),
    attr(201, "Soft Read Error Rate or TA Counter Detected", LOW, true,
        "Count of off-track errors.", Raw, &[
            bucket(0, 0, 0.030_920_1),
            bucket(0, 2, 0.071_326_4),
            bucket(2, 8, 0.130_119_5),
            bucket(8, 40, 0.220_107_2),
            bucket(40, 200, 0.340_418_3),
            bucket(200, 100_000, 0.441_106_7),
        ]),
    attr(202, "Data Address Mark errors or TA Counter Increased", LOW, false,
        "Count of data address mark errors, or vendor specific.", Raw, &[]),
    attr(203, "Run Out Cancel", LOW, false,
        "The number of errors caused by incorrect checksum during the error correction.", Raw, &[]),
    attr(204, "Soft ECC Correction", LOW, false,
        "Count of errors corrected by the internal error correction software.", Raw, &[]),
    attr(205, "Thermal Asperity Rate", LOW, false,
        "Count of errors due to high temperature.", Raw, &[]),
    attr(206, "Flying Height", NONE, false,
        "Height of heads above the disk surface.", Raw, &[]),
    attr(207, "Spin High Current", LOW, false,
        "Amount of surge current used to spin up the drive.", Raw, &[]),
    attr(208, "Spin Buzz", NONE, false,
        "Count of buzz routines needed to spin up the drive due to insufficient power.", Raw, &[]),
    attr(209, "Offline Seek Performance", NONE, false,
        "Drive's seek performance during its internal tests.", Raw, &[]),
    attr(220, "Disk Shift", LOW, false,
        "Distance the disk has shifted relative to the spindle.", Raw, &[]),
    attr(221, "G-Sense Error Rate", LOW, false,
        "The count of errors resulting from externally induced shock and vibration.", Raw, &[]),
    attr(222, "Loaded Hours", NONE, false,
        "Time spent operating under data load.", Raw, &[]),
    attr(223, "Load/Unload Retry Count", NONE, false,
        "Count of times head changes position.", Raw, &[]),
    attr(224, "Load Friction", LOW, false,
        "Resistance caused by friction in mechanical parts while operating.", Raw, &[]),
    attr(225, "Load/Unload Cycle Count", LOW, false,
        "Total count of load cycles.", Raw, &[]),
    attr(226, "Load 'In'-time", NONE, false,
        "Total time of loading on the magnetic heads actuator.", Raw, &[]),
    attr(227, "Torque Amplification Count", LOW, false,
        "Count of attempts to compensate for platter speed variations.", Raw, &[]),
    attr(228, "Power-Off Retract Cycle", LOW, false,
        "The number of power-off cycles which are counted whenever there is a retract event.", Raw, &[]),
    attr(230, "GMR Head Amplitude / Drive Life Protection Status", NONE, false,
        "Amplitude of thrashing, or SSD life protection status, depending on vendor.", Raw, &[]),
    attr(231, "Life Left / Temperature", HIGH, false,
        "Approximate SSD life left in terms of program/erase cycles or flash blocks.", Normalized, &[]),
    attr(232, "Endurance Remaining / Available Reserved Space", HIGH, false,
        "Number of physical erase cycles completed on the SSD as a percentage of the maximum.", Normalized, &[]),
    attr(233, "Media Wearout Indicator / Power-On Hours", HIGH, false,
        "Normalized count of NAND erase cycles remaining.", Normalized, &[]),
    attr(234, "Average erase count AND Maximum Erase Count", NONE, false,
        "Decoded as: byte 0-1-2 = average erase count, byte 3-4-5 = max erase count.", Raw, &[]),
    attr(235, "Good Block Count AND System(Free) Block Count", NONE, false,
        "Decoded as: byte 0-1-2 = good block count, byte 3-4 = system (free) block count.", Raw, &[]),
    AtaAttributeMetadata {
        id: 240,
        display_name: "Head Flying Hours",
        ideal: None,
        critical: false,
        description: "Time spent during the positioning of the drive heads.",
        display_type: DisplayType::Transformed,
        transform: Some(hours_from_raw),
        transform_unit: Some("hours"),
        observed_thresholds: &[
            bucket(0, 0, 0.0),
            bucket(0, 1_000, 0.030_136_4),
            bucket(1_000, 10_000, 0.021_447_3),
            bucket(10_000, 30_000, 0.026_812_9),
            bucket(30_000, 50_000, 0.051_623_1),
            bucket(50_000, 150_000, 0.118_014_2),
        ],
    },
    attr(241, "Total LBAs Written", NONE, false,
        "Total count of LBAs written.", Raw, &[]),
    attr(242, "Total LBAs Read", NONE, false,
        "Total count of LBAs read.", Raw, &[]),
    attr(250, "Read Error Retry Rate", LOW, false,
        "Count of errors while reading from a disk.", Raw, &[]),
    attr(254, "Free Fall Protection", LOW, false,
        "Count of free fall events detected.", Raw, &[]),
];
