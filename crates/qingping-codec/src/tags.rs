//! Tag and command vocabulary of the Qingping TLV protocol.
//!
//! The raw `u8` constants are what callers put into outbound frames; the
//! `Tag` and `Command` enums are what the decoder matches on. Firmware
//! regularly sends tags that are not listed here, so both enums carry an
//! `Unknown` arm and conversion from `u8` never fails.

/// Frame commands
pub mod cmd {
    /// Ask the device to report its current settings
    pub const SETTINGS_QUERY: u8 = 0x01;
    /// Write settings (intervals, offsets)
    pub const SETTINGS_WRITE: u8 = 0x02;
    /// Push a single setting change (switches, calibration)
    pub const SETTINGS_PUSH: u8 = 0x32;
}

/// Sub-record tags
pub mod tag {
    /// History block: start timestamp, step, packed readings
    pub const HISTORY_DATA: u8 = 0x03;
    /// Report (upload) interval in minutes
    pub const REPORT_INTERVAL: u8 = 0x04;
    /// Collect (sample) interval in seconds
    pub const COLLECT_INTERVAL: u8 = 0x05;
    /// Battery percentage on older firmware
    pub const BATTERY_LEGACY: u8 = 0x09;
    /// Firmware version string
    pub const FIRMWARE_VERSION: u8 = 0x11;
    /// Realtime reading
    pub const REALTIME_DATA: u8 = 0x14;
    /// Temperature unit selection (0 = Celsius, 1 = Fahrenheit)
    pub const TEMPERATURE_UNIT: u8 = 0x19;
    /// Device running status
    pub const DEVICE_STATUS: u8 = 0x1d;
    /// USB plugged in / charging flag
    pub const USB_STATUS: u8 = 0x2c;
    /// Model version string
    pub const MODEL_VERSION: u8 = 0x34;
    /// MCU version string
    pub const MCU_VERSION: u8 = 0x35;
    /// Product id marker
    pub const PRODUCT_ID: u8 = 0x38;
    /// Screen off delay (CGDN1)
    pub const DISPLAY_OFF_TIME: u8 = 0x3b;
    /// Auto power off delay (CGDN1)
    pub const POWER_OFF_TIME: u8 = 0x3c;
    /// Page auto sliding interval (CGDN1)
    pub const AUTO_SLIDING_TIME: u8 = 0x3d;
    /// CO2 automatic self-calibration on/off
    pub const CO2_ASC: u8 = 0x40;
    /// Trigger manual CO2 calibration
    pub const CO2_CALIBRATION: u8 = 0x41;
    /// CO2 offset, ppm
    pub const CO2_OFFSET: u8 = 0x45;
    /// Temperature offset, tenths of a degree
    pub const TEMPERATURE_OFFSET: u8 = 0x46;
    /// Humidity offset, tenths of a percent
    pub const HUMIDITY_OFFSET: u8 = 0x48;
    /// PM2.5 offset
    pub const PM25_OFFSET: u8 = 0x4b;
    /// PM10 offset
    pub const PM10_OFFSET: u8 = 0x4d;
    /// PM module serial (empty when no module is fitted)
    pub const PM_MODULE_SERIAL: u8 = 0x61;
    /// Timezone offset
    pub const TIMEZONE: u8 = 0x62;
    /// Indicator LED on/off
    pub const LED_SWITCH: u8 = 0x63;
    /// Battery percentage
    pub const BATTERY: u8 = 0x64;
    /// Signal strength, dBm
    pub const SIGNAL_STRENGTH: u8 = 0x65;
    /// Versioned composite sensor block
    pub const SENSOR_DATA_V2: u8 = 0x85;
}

/// A sub-record tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    HistoryData,
    ReportInterval,
    CollectInterval,
    BatteryLegacy,
    FirmwareVersion,
    RealtimeData,
    TemperatureUnit,
    DeviceStatus,
    UsbStatus,
    ModelVersion,
    McuVersion,
    ProductId,
    DisplayOffTime,
    PowerOffTime,
    AutoSlidingTime,
    Co2Asc,
    Co2Calibration,
    Co2Offset,
    TemperatureOffset,
    HumidityOffset,
    Pm25Offset,
    Pm10Offset,
    PmModuleSerial,
    Timezone,
    LedSwitch,
    Battery,
    SignalStrength,
    SensorDataV2,
    Unknown(u8),
}

impl Tag {
    /// Human-readable name, used in logs and the inspect output.
    pub fn name(&self) -> &'static str {
        match self {
            Tag::HistoryData => "history_data",
            Tag::ReportInterval => "report_interval",
            Tag::CollectInterval => "collect_interval",
            Tag::BatteryLegacy => "battery_legacy",
            Tag::FirmwareVersion => "firmware_version",
            Tag::RealtimeData => "realtime_data",
            Tag::TemperatureUnit => "temperature_unit",
            Tag::DeviceStatus => "device_status",
            Tag::UsbStatus => "usb_status",
            Tag::ModelVersion => "model_version",
            Tag::McuVersion => "mcu_version",
            Tag::ProductId => "product_id",
            Tag::DisplayOffTime => "display_off_time",
            Tag::PowerOffTime => "power_off_time",
            Tag::AutoSlidingTime => "auto_sliding_time",
            Tag::Co2Asc => "co2_asc",
            Tag::Co2Calibration => "co2_calibration",
            Tag::Co2Offset => "co2_offset",
            Tag::TemperatureOffset => "temperature_offset",
            Tag::HumidityOffset => "humidity_offset",
            Tag::Pm25Offset => "pm25_offset",
            Tag::Pm10Offset => "pm10_offset",
            Tag::PmModuleSerial => "pm_module_serial",
            Tag::Timezone => "timezone",
            Tag::LedSwitch => "led_switch",
            Tag::Battery => "battery",
            Tag::SignalStrength => "signal_strength",
            Tag::SensorDataV2 => "sensor_data_v2",
            Tag::Unknown(_) => "unknown",
        }
    }
}

impl From<u8> for Tag {
    fn from(value: u8) -> Self {
        match value {
            tag::HISTORY_DATA => Tag::HistoryData,
            tag::REPORT_INTERVAL => Tag::ReportInterval,
            tag::COLLECT_INTERVAL => Tag::CollectInterval,
            tag::BATTERY_LEGACY => Tag::BatteryLegacy,
            tag::FIRMWARE_VERSION => Tag::FirmwareVersion,
            tag::REALTIME_DATA => Tag::RealtimeData,
            tag::TEMPERATURE_UNIT => Tag::TemperatureUnit,
            tag::DEVICE_STATUS => Tag::DeviceStatus,
            tag::USB_STATUS => Tag::UsbStatus,
            tag::MODEL_VERSION => Tag::ModelVersion,
            tag::MCU_VERSION => Tag::McuVersion,
            tag::PRODUCT_ID => Tag::ProductId,
            tag::DISPLAY_OFF_TIME => Tag::DisplayOffTime,
            tag::POWER_OFF_TIME => Tag::PowerOffTime,
            tag::AUTO_SLIDING_TIME => Tag::AutoSlidingTime,
            tag::CO2_ASC => Tag::Co2Asc,
            tag::CO2_CALIBRATION => Tag::Co2Calibration,
            tag::CO2_OFFSET => Tag::Co2Offset,
            tag::TEMPERATURE_OFFSET => Tag::TemperatureOffset,
            tag::HUMIDITY_OFFSET => Tag::HumidityOffset,
            tag::PM25_OFFSET => Tag::Pm25Offset,
            tag::PM10_OFFSET => Tag::Pm10Offset,
            tag::PM_MODULE_SERIAL => Tag::PmModuleSerial,
            tag::TIMEZONE => Tag::Timezone,
            tag::LED_SWITCH => Tag::LedSwitch,
            tag::BATTERY => Tag::Battery,
            tag::SIGNAL_STRENGTH => Tag::SignalStrength,
            tag::SENSOR_DATA_V2 => Tag::SensorDataV2,
            other => Tag::Unknown(other),
        }
    }
}

impl From<Tag> for u8 {
    fn from(value: Tag) -> Self {
        match value {
            Tag::HistoryData => tag::HISTORY_DATA,
            Tag::ReportInterval => tag::REPORT_INTERVAL,
            Tag::CollectInterval => tag::COLLECT_INTERVAL,
            Tag::BatteryLegacy => tag::BATTERY_LEGACY,
            Tag::FirmwareVersion => tag::FIRMWARE_VERSION,
            Tag::RealtimeData => tag::REALTIME_DATA,
            Tag::TemperatureUnit => tag::TEMPERATURE_UNIT,
            Tag::DeviceStatus => tag::DEVICE_STATUS,
            Tag::UsbStatus => tag::USB_STATUS,
            Tag::ModelVersion => tag::MODEL_VERSION,
            Tag::McuVersion => tag::MCU_VERSION,
            Tag::ProductId => tag::PRODUCT_ID,
            Tag::DisplayOffTime => tag::DISPLAY_OFF_TIME,
            Tag::PowerOffTime => tag::POWER_OFF_TIME,
            Tag::AutoSlidingTime => tag::AUTO_SLIDING_TIME,
            Tag::Co2Asc => tag::CO2_ASC,
            Tag::Co2Calibration => tag::CO2_CALIBRATION,
            Tag::Co2Offset => tag::CO2_OFFSET,
            Tag::TemperatureOffset => tag::TEMPERATURE_OFFSET,
            Tag::HumidityOffset => tag::HUMIDITY_OFFSET,
            Tag::Pm25Offset => tag::PM25_OFFSET,
            Tag::Pm10Offset => tag::PM10_OFFSET,
            Tag::PmModuleSerial => tag::PM_MODULE_SERIAL,
            Tag::Timezone => tag::TIMEZONE,
            Tag::LedSwitch => tag::LED_SWITCH,
            Tag::Battery => tag::BATTERY,
            Tag::SignalStrength => tag::SIGNAL_STRENGTH,
            Tag::SensorDataV2 => tag::SENSOR_DATA_V2,
            Tag::Unknown(raw) => raw,
        }
    }
}

/// A frame command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    SettingsQuery,
    SettingsWrite,
    SettingsPush,
    Unknown(u8),
}

impl From<u8> for Command {
    fn from(value: u8) -> Self {
        match value {
            cmd::SETTINGS_QUERY => Command::SettingsQuery,
            cmd::SETTINGS_WRITE => Command::SettingsWrite,
            cmd::SETTINGS_PUSH => Command::SettingsPush,
            other => Command::Unknown(other),
        }
    }
}

impl From<Command> for u8 {
    fn from(value: Command) -> Self {
        match value {
            Command::SettingsQuery => cmd::SETTINGS_QUERY,
            Command::SettingsWrite => cmd::SETTINGS_WRITE,
            Command::SettingsPush => cmd::SETTINGS_PUSH,
            Command::Unknown(raw) => raw,
        }
    }
}
